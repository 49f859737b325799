// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
// (none)

/// Errors raised by a per-method codec. Encoders/decoders are pure and
/// never fail for any other reason than malformed bytes or a missing
/// registration.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("no codec registered for {actor_type}/{method_name}")]
    Unregistered {
        actor_type: String,
        method_name: String,
    },

    #[error("malformed request bytes for {actor_type}/{method_name}: {source}")]
    MalformedRequest {
        actor_type: String,
        method_name: String,
        #[source]
        source: serde_cbor::Error,
    },

    #[error("malformed response bytes for {actor_type}/{method_name}: {source}")]
    MalformedResponse {
        actor_type: String,
        method_name: String,
        #[source]
        source: serde_cbor::Error,
    },
}

impl CodecError {
    /// Codec errors are always surfaced to the caller as an error
    /// response; they never represent a transient condition.
    pub fn is_fatal(&self) -> bool {
        true
    }
}
