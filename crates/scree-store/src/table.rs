//! The block lookup table shared by both store variants.
//!
//! A [`BlockTable`] owns up to [`MAX_BLOCKS`] separately heap-allocated
//! blocks, addressed through atomic pointers. Pointer publication uses
//! release stores and readers use acquire loads, so a non-null pointer
//! always refers to a fully initialised block. A single mutex serialises
//! block allocation; element access never takes it.

use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};

use parking_lot::{Mutex, MutexGuard};

use scree_core::layout::{self, Location, MAX_BLOCKS};

/// Allocate a default-initialised block of `len` elements, returning an
/// owning raw pointer.
///
/// `Vec` aborts the process through the global allocation handler on OOM,
/// so a failed allocation is never observable, let alone published.
fn alloc_block<T: Copy + Default>(len: usize) -> *mut T {
    let block = vec![T::default(); len].into_boxed_slice();
    Box::into_raw(block) as *mut T
}

/// Free a block previously returned by [`alloc_block`].
///
/// # Safety
///
/// `ptr` must have been produced by [`alloc_block`] with the same `len`,
/// and must not be used afterwards.
unsafe fn free_block<T>(ptr: *mut T, len: usize) {
    drop(Box::from_raw(ptr::slice_from_raw_parts_mut(ptr, len)));
}

/// Fixed-size table of lazily allocated, geometrically growing blocks.
///
/// Block `k` holds `1 << (block_bits + k)` elements. Slots start null and
/// move to "allocated" exactly once; they return to null only under
/// exclusive access ([`BlockTable::release_all`]) or at drop.
pub(crate) struct BlockTable<T> {
    /// One owning pointer per block, null until allocated.
    blocks: [AtomicPtr<T>; MAX_BLOCKS],
    /// Initial block-size exponent; immutable after construction.
    block_bits: u32,
    /// Serialises block allocation only.
    grow_lock: Mutex<()>,
}

impl<T: Copy + Default> BlockTable<T> {
    pub(crate) fn new(block_bits: u32) -> Self {
        Self {
            blocks: std::array::from_fn(|_| AtomicPtr::new(ptr::null_mut())),
            block_bits,
            grow_lock: Mutex::new(()),
        }
    }

    pub(crate) fn block_bits(&self) -> u32 {
        self.block_bits
    }

    /// Decompose a logical index; panics past the representable ceiling.
    #[inline]
    pub(crate) fn locate(&self, index: usize) -> Location {
        layout::locate(self.block_bits, index)
    }

    /// Capacity of block `block` in elements.
    #[inline]
    pub(crate) fn block_len(&self, block: usize) -> usize {
        layout::block_len(self.block_bits, block)
    }

    /// Total capacity of the first `blocks` blocks.
    #[inline]
    pub(crate) fn cumulative_len(&self, blocks: usize) -> usize {
        layout::cumulative_len(self.block_bits, blocks)
    }

    /// Acquire-load the pointer for `block`; null means unallocated.
    #[inline]
    pub(crate) fn block_ptr(&self, block: usize) -> *mut T {
        self.blocks[block].load(Ordering::Acquire)
    }

    #[inline]
    pub(crate) fn is_allocated(&self, block: usize) -> bool {
        !self.block_ptr(block).is_null()
    }

    /// Count of allocated blocks (a scan, not a counter).
    pub(crate) fn allocated_blocks(&self) -> usize {
        (0..MAX_BLOCKS).filter(|&b| self.is_allocated(b)).count()
    }

    /// Bytes of element storage currently allocated.
    pub(crate) fn memory_bytes(&self) -> usize {
        (0..MAX_BLOCKS)
            .filter(|&b| self.is_allocated(b))
            .map(|b| self.block_len(b) * std::mem::size_of::<T>())
            .sum()
    }

    /// Take the growth lock for a multi-block allocation run.
    pub(crate) fn lock(&self) -> MutexGuard<'_, ()> {
        self.grow_lock.lock()
    }

    /// Allocate and publish block `block`.
    ///
    /// The caller must hold the growth lock and the slot must be null.
    pub(crate) fn allocate(&self, block: usize) {
        debug_assert!(
            self.blocks[block].load(Ordering::Relaxed).is_null(),
            "block {block} allocated twice"
        );
        let ptr = alloc_block::<T>(self.block_len(block));
        self.blocks[block].store(ptr, Ordering::Release);
    }

    /// Make sure block `block` exists, allocating it under the growth lock
    /// if needed.
    ///
    /// Fast path is a single acquire load; the lock is only taken on a
    /// miss, and the slot is re-checked after acquisition so concurrent
    /// callers allocate each block exactly once.
    pub(crate) fn ensure_block(&self, block: usize) {
        if self.is_allocated(block) {
            return;
        }
        let _guard = self.grow_lock.lock();
        if !self.is_allocated(block) {
            self.allocate(block);
        }
    }

    /// Raw pointer to the slot at `loc`.
    ///
    /// # Safety
    ///
    /// The block at `loc.block` must already be allocated. The returned
    /// pointer is valid for the table's lifetime; writes through it must
    /// not race with access to the same slot.
    #[inline]
    pub(crate) unsafe fn slot_ptr(&self, loc: Location) -> *mut T {
        let base = self.block_ptr(loc.block);
        debug_assert!(!base.is_null(), "access to an unallocated block");
        base.add(loc.offset)
    }

}

impl<T> BlockTable<T> {
    /// Free every block and reset all slots to null.
    ///
    /// `&mut self` guarantees no concurrent readers or writers, so no lock
    /// is needed.
    pub(crate) fn release_all(&mut self) {
        for block in 0..MAX_BLOCKS {
            let slot = self.blocks[block].get_mut();
            if slot.is_null() {
                continue;
            }
            let len = layout::block_len(self.block_bits, block);
            // SAFETY: non-null slots own a block of exactly `len` elements,
            // allocated by `alloc_block`.
            unsafe { free_block(*slot, len) };
            *slot = ptr::null_mut();
        }
    }
}

impl<T> Drop for BlockTable<T> {
    fn drop(&mut self) {
        self.release_all();
    }
}

impl<T: Copy + Default> Clone for BlockTable<T> {
    /// Deep copy: every allocated block is duplicated into independently
    /// owned memory of the same capacity.
    ///
    /// Cloning concurrently with writers is not supported; quiesce first.
    fn clone(&self) -> Self {
        let table = Self::new(self.block_bits);
        for block in 0..MAX_BLOCKS {
            let src = self.block_ptr(block);
            if src.is_null() {
                continue;
            }
            let len = self.block_len(block);
            // SAFETY: `src` points at a live block of `len` elements, and
            // `T: Copy` makes the bulk copy a plain bitwise duplication.
            let copy = unsafe { std::slice::from_raw_parts(src, len).to_vec() };
            let ptr = Box::into_raw(copy.into_boxed_slice()) as *mut T;
            table.blocks[block].store(ptr, Ordering::Release);
        }
        table
    }
}

// SAFETY: the table exclusively owns its blocks; sending it just moves
// that ownership along with the contained `T` values.
unsafe impl<T: Send> Send for BlockTable<T> {}

// SAFETY: shared access hands out references and raw pointers into block
// memory (`T: Sync`) and insertion moves `T` values in from other threads
// (`T: Send`); the table's own state is atomics and a mutex.
unsafe impl<T: Send + Sync> Sync for BlockTable<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let table = BlockTable::<u32>::new(2);
        assert_eq!(table.allocated_blocks(), 0);
        assert_eq!(table.memory_bytes(), 0);
        assert!(!table.is_allocated(0));
    }

    #[test]
    fn ensure_block_is_idempotent() {
        let table = BlockTable::<u32>::new(2);
        table.ensure_block(3);
        let first = table.block_ptr(3);
        table.ensure_block(3);
        assert_eq!(table.block_ptr(3), first);
        assert_eq!(table.allocated_blocks(), 1);
    }

    #[test]
    fn blocks_are_default_initialised() {
        let table = BlockTable::<u64>::new(2);
        table.ensure_block(0);
        for offset in 0..4 {
            // SAFETY: block 0 was just allocated.
            let value = unsafe { *table.slot_ptr(Location { block: 0, offset }) };
            assert_eq!(value, 0);
        }
    }

    #[test]
    fn memory_bytes_tracks_allocated_blocks() {
        let table = BlockTable::<u64>::new(2);
        table.ensure_block(0);
        assert_eq!(table.memory_bytes(), 4 * 8);
        table.ensure_block(2);
        assert_eq!(table.memory_bytes(), (4 + 16) * 8);
    }

    #[test]
    fn release_all_resets_every_slot() {
        let mut table = BlockTable::<u32>::new(2);
        table.ensure_block(0);
        table.ensure_block(5);
        table.release_all();
        assert_eq!(table.allocated_blocks(), 0);
        // Allocation works again afterwards.
        table.ensure_block(0);
        assert_eq!(table.allocated_blocks(), 1);
    }

    #[test]
    fn clone_copies_contents_into_disjoint_memory() {
        let table = BlockTable::<u32>::new(2);
        table.ensure_block(1);
        let loc = Location { block: 1, offset: 3 };
        // SAFETY: block 1 is allocated and nothing else touches the slot.
        unsafe { table.slot_ptr(loc).write(99) };

        let copy = table.clone();
        assert_ne!(copy.block_ptr(1), table.block_ptr(1));
        // SAFETY: both tables have block 1 allocated.
        unsafe {
            assert_eq!(*copy.slot_ptr(loc), 99);
            table.slot_ptr(loc).write(7);
            assert_eq!(*copy.slot_ptr(loc), 99, "clone must not alias");
        }
    }
}
