//! Completion path for dispatcher-produced responses (§4.6 step 4, §4.7).

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use crate::message::Envelope;

/// Hands a response envelope back to whatever is waiting for it — a
/// local awaiting future or the transport egress path for a remote
/// caller. The silo coordinator is the concrete implementor; it is the
/// one that also republishes onto the in-process dual-filter channel
/// (§4.7) so a genuinely remote caller's transport picks it up.
#[async_trait]
pub trait ResponseSink: Send + Sync {
    async fn send_response(&self, response: Envelope);
}
