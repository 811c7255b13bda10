//! Random-insertion block store.
//!
//! [`SparseBlockList`] is the variant for callers that compute tuple
//! placement themselves (a parallel algorithm that already decided where
//! each element goes, an external index such as a union-find forest).
//! There is no append: the caller supplies the index, and blocks are
//! allocated on demand for whatever index arrives, in any order.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use scree_core::layout::MAX_BLOCKS;
use scree_core::{StoreConfig, StoreError};

use crate::table::BlockTable;

/// Thread-safe storage where the caller dictates element placement.
///
/// # Concurrency contract
///
/// `insert_at`, `get`, and `len` may be called from any number of threads,
/// as long as no two calls touch the same index concurrently and no index
/// is inserted twice. The store cannot detect a duplicate insertion — each
/// per-slot lifecycle is allocate once, write once — and a duplicate
/// silently corrupts the meaning of [`SparseBlockList::len`].
///
/// # Counter semantics
///
/// [`SparseBlockList::len`] counts *insertion calls*, not distinct occupied
/// indices, and is not an upper bound on the highest index in use. Callers
/// that need either of those must track them externally.
pub struct SparseBlockList<T> {
    table: BlockTable<T>,
    /// Count of `insert_at` calls, incremented unconditionally.
    insertions: AtomicUsize,
}

impl<T: Copy + Default> SparseBlockList<T> {
    /// Create an empty store with the default 65536-element first block.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::new()).expect("default config is valid")
    }

    /// Create an empty store with a caller-chosen configuration.
    pub fn with_config(config: StoreConfig) -> Result<Self, StoreError> {
        config.validate()?;
        Ok(Self {
            table: BlockTable::new(config.block_bits),
            insertions: AtomicUsize::new(0),
        })
    }

    /// The configured initial block-size exponent.
    pub fn block_bits(&self) -> u32 {
        self.table.block_bits()
    }

    /// Place `value` at `index`, allocating that index's block if needed.
    ///
    /// Only the destination block is allocated — indices arrive in no
    /// particular order, so there is no frontier to grow towards. The
    /// insertion counter is incremented unconditionally; inserting the same
    /// index twice is a caller error the store cannot detect.
    pub fn insert_at(&self, index: usize, value: T) {
        let loc = self.table.locate(index);
        self.table.ensure_block(loc.block);
        // SAFETY: the block was just ensured, and the no-duplicate-index
        // contract gives this thread exclusive use of the slot.
        unsafe { self.table.slot_ptr(loc).write(value) };
        self.insertions.fetch_add(1, Ordering::AcqRel);
    }

    /// Reference to the element at `index`.
    ///
    /// Lock-free. `index` must have been previously inserted, with the
    /// insertion visible to this thread.
    #[inline]
    pub fn get(&self, index: usize) -> &T {
        let loc = self.table.locate(index);
        debug_assert!(
            self.table.is_allocated(loc.block),
            "index {index} was never inserted"
        );
        // SAFETY: the insertion precondition means the block is allocated;
        // the slot outlives `&self` because blocks are never freed before
        // teardown.
        unsafe { &*self.table.slot_ptr(loc) }
    }

    /// Mutable reference to the element at `index`.
    pub fn get_mut(&mut self, index: usize) -> &mut T {
        let loc = self.table.locate(index);
        debug_assert!(
            self.table.is_allocated(loc.block),
            "index {index} was never inserted"
        );
        // SAFETY: `&mut self` rules out any other access.
        unsafe { &mut *self.table.slot_ptr(loc) }
    }

    /// Number of insertion calls performed.
    ///
    /// See the type-level caveat: this is not a distinct-index count and
    /// not a bound on the highest occupied index.
    #[inline]
    pub fn len(&self) -> usize {
        self.insertions.load(Ordering::Acquire)
    }

    /// Whether no insertion has been performed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the block at `block` has been allocated.
    pub fn is_block_allocated(&self, block: usize) -> bool {
        block < MAX_BLOCKS && self.table.is_allocated(block)
    }

    /// Number of blocks allocated so far (not necessarily contiguous).
    pub fn allocated_blocks(&self) -> usize {
        self.table.allocated_blocks()
    }

    /// Bytes of element storage currently allocated.
    pub fn memory_bytes(&self) -> usize {
        self.table.memory_bytes()
    }

    /// Release every block and reset to the freshly constructed state.
    ///
    /// Exclusive by construction; the configured block-size exponent is
    /// retained.
    pub fn clear(&mut self) {
        self.table.release_all();
        *self.insertions.get_mut() = 0;
    }
}

impl<T: Copy + Default> Default for SparseBlockList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Default> Clone for SparseBlockList<T> {
    /// Deep copy with independently owned blocks of the same capacities.
    ///
    /// Not supported concurrently with writers.
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            insertions: AtomicUsize::new(self.len()),
        }
    }
}

impl<T: Copy + Default> fmt::Debug for SparseBlockList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SparseBlockList")
            .field("insertions", &self.len())
            .field("allocated_blocks", &self.allocated_blocks())
            .field("block_bits", &self.block_bits())
            .finish_non_exhaustive()
    }
}
