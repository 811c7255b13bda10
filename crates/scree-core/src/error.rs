//! Error types for the scree tuple store.

use std::error::Error;
use std::fmt;

/// Errors that can occur while configuring or addressing a block store.
///
/// Allocation failure is deliberately absent: a block store treats system
/// out-of-memory as fatal and aborts through the global allocation handler,
/// never publishing a half-allocated block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreError {
    /// The initial block-size exponent is outside the accepted range.
    InvalidBlockBits {
        /// The rejected exponent.
        bits: u32,
    },
    /// A logical index lies beyond the representable address space.
    CapacityExceeded {
        /// The unrepresentable index.
        index: usize,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBlockBits { bits } => {
                write!(f, "initial block-size exponent {bits} is out of range")
            }
            Self::CapacityExceeded { index } => {
                write!(f, "index {index} exceeds the addressable capacity")
            }
        }
    }
}

impl Error for StoreError {}
