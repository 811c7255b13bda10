//! Concurrent geometrically-blocked tuple storage.
//!
//! The backing store for relation and tuple data in a Datalog engine:
//! many threads append or place elements simultaneously, element addresses
//! never move once handed out, and random access by logical index is O(1).
//!
//! # Architecture
//!
//! ```text
//! BlockList<T>        append-only: atomic index reservation
//! SparseBlockList<T>  random insertion: caller supplies the index
//! └── BlockTable<T>   shared machinery: 64-slot atomic block lookup
//!                     table, locked growth, lock-free element access
//! ```
//!
//! Storage is a sequence of blocks whose capacities double, so the whole
//! `usize` index space fits in a fixed 64-slot lookup table and a block,
//! once allocated, is never resized or moved. Growth allocates new blocks
//! behind a mutex; reads and writes of elements never take it.
//!
//! # Safety
//!
//! This is the one crate in the workspace that contains `unsafe` code:
//! blocks are raw, separately-owned heap allocations addressed through
//! atomic pointers. Every `unsafe` block carries its justification, and the
//! element contract (`T: Copy + Default`) keeps slot writes free of drop
//! obligations.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod append;
pub mod sparse;
mod table;

// Public re-exports for the primary API surface.
pub use append::{BlockList, Iter};
pub use sparse::SparseBlockList;
