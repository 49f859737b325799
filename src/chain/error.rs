// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::util::ids::ChainId;

/// Failures raised while propagating or entering a call-chain.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChainError {
    /// The callee actor is already in the chain's `visited` set.
    #[error("reentrancy detected: {actor_type}/{actor_id} already visited in chain {chain_id}")]
    ReentrancyDetected {
        chain_id: ChainId,
        actor_type: String,
        actor_id: String,
    },

    /// The chain's hop count would exceed `chain_max_depth`.
    #[error("chain {chain_id} exceeded max depth {max_depth} (at depth {depth})")]
    DepthExceeded {
        chain_id: ChainId,
        depth: u32,
        max_depth: u32,
    },

    /// The chain's absolute deadline has passed.
    #[error("chain {chain_id} deadline exceeded")]
    DeadlineExceeded { chain_id: ChainId },
}

impl ChainError {
    /// These are all caller-visible dispatch failures, never transient.
    pub fn is_fatal(&self) -> bool {
        true
    }
}
