//! Append-only block store with atomic index reservation.
//!
//! [`BlockList`] hands every element a fresh, strictly increasing logical
//! index from a single fetch-and-add counter, so concurrent producers never
//! collide. Blocks are allocated lazily as the reserved-index frontier
//! crosses a block boundary, each new block doubling the last, and an
//! element's address never changes once its index is reserved.

use std::fmt;
use std::iter::FusedIterator;
use std::sync::atomic::{AtomicUsize, Ordering};

use scree_core::{StoreConfig, StoreError};

use crate::table::BlockTable;

/// Thread-safe append-only storage with unique, never-reused indices.
///
/// Intended for relation tuple data: many producers append concurrently,
/// each gets back the index its element lives at, and `&T` references from
/// [`BlockList::get`] stay valid for the list's whole lifetime no matter
/// how much it grows.
///
/// # Concurrency contract
///
/// `append`, `reserve`, `set`, `get`, and `len` may be called from any
/// number of threads. The index space is partitioned by reservation: a slot
/// belongs to whichever caller reserved its index, and no two threads may
/// touch the same index concurrently. Reads of indices that were never
/// reserved (or whose reservation has not happened-before the read) see an
/// unspecified default-initialised value.
///
/// Iteration and [`BlockList::clone`] assume a quiesced writer set;
/// [`BlockList::clear`] takes `&mut self` and is therefore exclusive by
/// construction.
pub struct BlockList<T> {
    table: BlockTable<T>,
    /// Count of reserved indices; the fetch-and-add source of uniqueness.
    len: AtomicUsize,
    /// Number of contiguously allocated blocks, published after each
    /// growth run.
    blocks_allocated: AtomicUsize,
}

impl<T: Copy + Default> BlockList<T> {
    /// Create an empty list with the default 65536-element first block.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::new()).expect("default config is valid")
    }

    /// Create an empty list with a caller-chosen configuration.
    pub fn with_config(config: StoreConfig) -> Result<Self, StoreError> {
        config.validate()?;
        Ok(Self {
            table: BlockTable::new(config.block_bits),
            len: AtomicUsize::new(0),
            blocks_allocated: AtomicUsize::new(0),
        })
    }

    /// The configured initial block-size exponent.
    pub fn block_bits(&self) -> u32 {
        self.table.block_bits()
    }

    /// Reserve a fresh index without writing to it.
    ///
    /// Atomically claims the next index and grows the table so the slot
    /// exists. The slot holds `T::default()` until the caller populates it
    /// via [`BlockList::set`] or [`BlockList::get_mut`].
    pub fn reserve(&self) -> usize {
        let index = self.len.fetch_add(1, Ordering::AcqRel);
        self.grow_to_fit(index);
        index
    }

    /// Append `value`, returning the index it was stored at.
    pub fn append(&self, value: T) -> usize {
        let index = self.reserve();
        let loc = self.table.locate(index);
        // SAFETY: `index` was reserved above, so its block is allocated and
        // this thread is the only one touching the slot.
        unsafe { self.table.slot_ptr(loc).write(value) };
        index
    }

    /// Write `value` into a previously reserved slot.
    ///
    /// The caller must own `index` (it came from this thread's
    /// [`BlockList::reserve`]/[`BlockList::append`], or was handed over
    /// with proper synchronisation) and must not touch it from two threads
    /// at once.
    pub fn set(&self, index: usize, value: T) {
        debug_assert!(index < self.len(), "index {index} was never reserved");
        let loc = self.table.locate(index);
        // SAFETY: the reservation contract gives the caller exclusive use
        // of this slot, and reserved indices always lie in allocated
        // blocks.
        unsafe { self.table.slot_ptr(loc).write(value) };
    }

    /// Reference to the element at `index`.
    ///
    /// Lock-free: one acquire load of the block pointer plus an offset.
    /// `index` must have been reserved, with the reservation visible to
    /// this thread.
    #[inline]
    pub fn get(&self, index: usize) -> &T {
        debug_assert!(index < self.len(), "index {index} was never reserved");
        let loc = self.table.locate(index);
        // SAFETY: reserved indices lie in allocated blocks; the slot
        // outlives `&self` because blocks are never freed before teardown.
        unsafe { &*self.table.slot_ptr(loc) }
    }

    /// Mutable reference to the element at `index`.
    pub fn get_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.len(), "index {index} was never reserved");
        let loc = self.table.locate(index);
        // SAFETY: `&mut self` rules out any other access.
        unsafe { &mut *self.table.slot_ptr(loc) }
    }

    /// Number of reserved indices.
    ///
    /// A linearizable snapshot; it may be stale by the time it is used if
    /// reservations are still in flight.
    #[inline]
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    /// Whether no index has been reserved.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total capacity of the blocks allocated so far.
    pub fn capacity(&self) -> usize {
        self.table
            .cumulative_len(self.blocks_allocated.load(Ordering::Acquire))
    }

    /// Number of blocks allocated so far.
    pub fn allocated_blocks(&self) -> usize {
        self.blocks_allocated.load(Ordering::Acquire)
    }

    /// Capacity of block `block` in elements; doubles with each block.
    pub fn block_capacity(&self, block: usize) -> usize {
        self.table.block_len(block)
    }

    /// Bytes of element storage currently allocated.
    pub fn memory_bytes(&self) -> usize {
        self.table.memory_bytes()
    }

    /// Release every block and reset to the freshly constructed state.
    ///
    /// Exclusive by construction: concurrent readers or writers cannot
    /// exist while `&mut self` is held. The configured block-size exponent
    /// is retained.
    pub fn clear(&mut self) {
        self.table.release_all();
        *self.len.get_mut() = 0;
        *self.blocks_allocated.get_mut() = 0;
    }

    /// Iterate over `[0, len())` as snapshotted at the call.
    ///
    /// The sequence is lazy and restartable. Iterating while other threads
    /// reserve or write is not supported; quiesce writers first.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            front: 0,
            len: self.len(),
        }
    }

    /// Allocate blocks until `index` fits, taking the growth lock only on
    /// the slow path.
    ///
    /// The fast path compares against the published block count; on a miss
    /// the count is re-read under the lock, so racing threads allocate each
    /// block exactly once.
    fn grow_to_fit(&self, index: usize) {
        if index < self.capacity() {
            return;
        }
        let _guard = self.table.lock();
        let mut allocated = self.blocks_allocated.load(Ordering::Relaxed);
        while self.table.cumulative_len(allocated) <= index {
            self.table.allocate(allocated);
            allocated += 1;
            self.blocks_allocated.store(allocated, Ordering::Release);
        }
    }
}

impl<T: Copy + Default> Default for BlockList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Default> Clone for BlockList<T> {
    /// Deep copy with independently owned blocks of the same capacities.
    ///
    /// Not supported concurrently with writers.
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            len: AtomicUsize::new(self.len()),
            blocks_allocated: AtomicUsize::new(self.allocated_blocks()),
        }
    }
}

impl<T: Copy + Default> fmt::Debug for BlockList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockList")
            .field("len", &self.len())
            .field("allocated_blocks", &self.allocated_blocks())
            .field("block_bits", &self.block_bits())
            .finish_non_exhaustive()
    }
}

/// Forward iterator over a [`BlockList`], yielding `&T` for each index in
/// `[0, len)` where `len` was snapshotted when the iterator was created.
pub struct Iter<'a, T> {
    list: &'a BlockList<T>,
    front: usize,
    len: usize,
}

impl<'a, T: Copy + Default> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.front == self.len {
            return None;
        }
        let item = self.list.get(self.front);
        self.front += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.front;
        (remaining, Some(remaining))
    }
}

impl<T: Copy + Default> ExactSizeIterator for Iter<'_, T> {}
impl<T: Copy + Default> FusedIterator for Iter<'_, T> {}

impl<'a, T: Copy + Default> IntoIterator for &'a BlockList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}
