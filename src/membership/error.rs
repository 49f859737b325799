// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::util::ids::SiloId;

/// Errors raised by the membership table and its eviction machinery.
#[derive(Debug, Error)]
pub enum MembershipError {
    #[error("silo {0} is not registered in the membership table")]
    UnknownSilo(SiloId),

    #[error("silo {0} is already registered")]
    AlreadyRegistered(SiloId),

    #[error("eviction of {silo_id} did not reach quorum ({votes}/{required})")]
    QuorumNotReached {
        silo_id: SiloId,
        votes: usize,
        required: usize,
    },
}

impl MembershipError {
    pub fn is_transient(&self) -> bool {
        matches!(self, MembershipError::QuorumNotReached { .. })
    }
}
