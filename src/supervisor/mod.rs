//! Restart bookkeeping shared by the activation layer (§4.9).
//!
//! The silo coordinator owns supervision *decisions* directly — which
//! strategy applies, which siblings restart, in what order — driven by
//! [`crate::silo::SiloConfig`]'s [`crate::silo::SupervisionStrategy`] and
//! the coordinator's own child bookkeeping. This module only supplies the
//! per-instance building blocks that decision-making consumes: how a
//! freshly-registered actor type wants to be restarted ([`RestartPolicy`],
//! [`ShutdownPolicy`]) and how quickly repeated restarts back off
//! ([`RestartBackoff`]).

pub mod backoff;
pub mod types;

pub use backoff::RestartBackoff;
pub use types::{ChildHealth, ChildId, ChildState, RestartPolicy, ShutdownPolicy};
