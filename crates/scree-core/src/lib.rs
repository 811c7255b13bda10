//! Core types for the scree tuple store.
//!
//! This is the leaf crate with zero dependencies. It defines the pure
//! index-to-block layout math, the store configuration, and the error
//! types shared by the storage crates.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod layout;

// Public re-exports for the primary API surface.
pub use config::StoreConfig;
pub use error::StoreError;
pub use layout::{Location, MAX_BLOCKS};
