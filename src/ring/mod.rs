//! Consistent hash ring for actor placement (§4.2).

pub mod error;
pub mod hash_ring;

pub use error::RingError;
pub use hash_ring::{HashRing, RingHandle, DEFAULT_VIRTUAL_NODES_PER_SILO};
