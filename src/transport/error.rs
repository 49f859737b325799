// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::util::ids::SiloId;

/// Errors raised by a [`super::Transport`] implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("silo {0} is not reachable (no registered endpoint)")]
    UnknownSilo(SiloId),

    #[error("request to {target} timed out after {timeout:?}")]
    RequestTimeout { target: SiloId, timeout: Duration },

    #[error("stream to {0} lost, reconnecting")]
    StreamLost(SiloId),

    #[error("transport channel closed")]
    ChannelClosed,
}

impl TransportError {
    /// Stream loss and timeouts are retriable once a connection is
    /// reestablished; an unknown silo is not (it means the ring/membership
    /// view is stale, not that the link briefly dropped).
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TransportError::RequestTimeout { .. } | TransportError::StreamLost(_)
        )
    }
}
