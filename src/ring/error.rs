// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
// (none)

/// Errors raised by [`super::HashRing`] lookups.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RingError {
    /// `owner_of` was called on a ring with zero silos.
    #[error("no silos registered in the hash ring")]
    NoSilos,
}
