// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use tokio::sync::broadcast;

// Layer 3: Internal module imports
use super::error::TransportError;
use crate::message::Envelope;
use crate::util::ids::SiloId;

/// A reliable, ordered, bidirectional stream of envelopes between two
/// silos (§4.4). The core never parses transport framing itself; this
/// trait is the external contract implementers (a gRPC/QUIC/TCP stack)
/// fulfil.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a request and awaits its correlated response.
    async fn send(&self, target_silo_id: &SiloId, envelope: Envelope) -> Result<Envelope, TransportError>;

    /// One-way response delivery on an already-established stream; also
    /// publishes the response onto the in-process channel so remote
    /// callers observe it via the egress subscriber (§4.7).
    async fn send_response(&self, response: Envelope) -> Result<(), TransportError>;

    /// Subscribes to envelopes received from peers (both requests and
    /// responses), forwarded up to the silo coordinator's dual-filter
    /// channel.
    fn subscribe(&self) -> broadcast::Receiver<Envelope>;
}
