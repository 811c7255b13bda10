//! Scree: concurrent geometrically-blocked tuple storage.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the scree sub-crates. For most users, adding `scree` as a single
//! dependency is sufficient.
//!
//! The stores here back the tuple and relation data of a Datalog-style
//! evaluation engine: many threads fill a relation at once, element
//! addresses stay stable as the store grows, and random access by logical
//! index is O(1). Two variants cover the two filling patterns:
//!
//! - [`BlockList`](store::BlockList) hands each appended element a fresh,
//!   strictly increasing index from an atomic counter;
//! - [`SparseBlockList`](store::SparseBlockList) lets the caller dictate
//!   placement when indices are computed externally.
//!
//! # Quick start
//!
//! ```rust
//! use scree::prelude::*;
//!
//! // Producers append concurrently; each gets its element's index back.
//! let facts = BlockList::<u64>::new();
//! let a = facts.append(101);
//! let b = facts.append(202);
//! assert_eq!((*facts.get(a), *facts.get(b)), (101, 202));
//! assert_eq!(facts.len(), 2);
//!
//! // When placement is decided elsewhere, supply the index yourself.
//! let config = StoreConfig::with_block_bits(2);
//! let placed = SparseBlockList::<char>::with_config(config).unwrap();
//! placed.insert_at(0, 'a');
//! placed.insert_at(4, 'c'); // lands in the second block
//! assert_eq!(*placed.get(4), 'c');
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`store`] | `scree-store` | [`store::BlockList`], [`store::SparseBlockList`] |
//! | [`types`] | `scree-core` | Layout math, [`types::StoreConfig`], [`types::StoreError`] |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Block stores (`scree-store`).
///
/// The append-only [`store::BlockList`] and the random-insertion
/// [`store::SparseBlockList`] — both are also available in the [`prelude`].
pub use scree_store as store;

/// Core layout math, configuration, and errors (`scree-core`).
///
/// Contains the pure index decomposition ([`types::layout`]),
/// [`types::StoreConfig`], and [`types::StoreError`].
pub use scree_core as types;

/// Common imports for typical scree usage.
///
/// ```rust
/// use scree::prelude::*;
/// ```
pub mod prelude {
    pub use scree_core::{StoreConfig, StoreError};
    pub use scree_store::{BlockList, SparseBlockList};
}
