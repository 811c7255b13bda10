//! Index-to-block layout math.
//!
//! A store is a sequence of blocks whose capacities double: block *k* holds
//! `1 << (block_bits + k)` elements, so block 0 holds `2^block_bits`. A
//! logical index decomposes into a `(block, offset)` pair in closed form:
//! shift the index up by the initial block length, take the position of the
//! highest set bit to find the block, and mask it off to find the offset.
//!
//! The decomposition is branch-free and pure, so it lives here where it can
//! be tested independently of the stores built on it.

use crate::error::StoreError;

/// Number of slots in a block lookup table.
///
/// One slot per representable address bit; with geometric doubling this is
/// enough to cover the whole `usize` index space.
pub const MAX_BLOCKS: usize = usize::BITS as usize;

/// A logical index resolved to its physical position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Location {
    /// Index into the block lookup table.
    pub block: usize,
    /// Element offset within that block.
    pub offset: usize,
}

/// Capacity of block `block` in elements: `1 << (block_bits + block)`.
#[inline]
pub fn block_len(block_bits: u32, block: usize) -> usize {
    1usize << (block_bits + block as u32)
}

/// Total capacity of the first `blocks` blocks:
/// `(2^blocks - 1) << block_bits`.
///
/// Indices `[cumulative_len(k), cumulative_len(k + 1))` land exactly in
/// block `k`.
#[inline]
pub fn cumulative_len(block_bits: u32, blocks: usize) -> usize {
    ((1usize << blocks) - 1) << block_bits
}

/// Number of usable lookup-table slots for a given initial exponent.
///
/// Larger initial blocks consume address bits, leaving fewer doublings
/// before the index space is exhausted.
#[inline]
pub fn max_block_count(block_bits: u32) -> usize {
    MAX_BLOCKS - block_bits as usize
}

/// Decompose a logical index into its `(block, offset)` pair.
///
/// Returns [`StoreError::CapacityExceeded`] when the index lies beyond the
/// representable ceiling (`index + 2^block_bits` overflows the address
/// space).
#[inline]
pub fn try_locate(block_bits: u32, index: usize) -> Result<Location, StoreError> {
    let shifted = match index.checked_add(1usize << block_bits) {
        Some(n) => n,
        None => return Err(StoreError::CapacityExceeded { index }),
    };
    // Highest set bit of the shifted index; `shifted` is non-zero because
    // it is at least `1 << block_bits`.
    let msb = usize::BITS - 1 - shifted.leading_zeros();
    Ok(Location {
        block: (msb - block_bits) as usize,
        offset: shifted & ((1usize << msb) - 1),
    })
}

/// Decompose a logical index, panicking on the unrepresentable ceiling.
///
/// The hot-path form of [`try_locate`]: an index past the ceiling is a
/// caller precondition violation, reported by a fail-fast panic rather than
/// silently wrapped arithmetic.
#[inline]
pub fn locate(block_bits: u32, index: usize) -> Location {
    match try_locate(block_bits, index) {
        Ok(loc) => loc,
        Err(err) => panic!("{err}"),
    }
}
