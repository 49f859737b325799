// Layer 1: Standard library imports
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::warn;

// Layer 3: Internal module imports
use super::error::TransportError;
use super::traits::Transport;
use crate::message::Envelope;
use crate::util::ids::{MessageId, SiloId};

const INBOUND_CHANNEL_CAPACITY: usize = 4096;
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared process-local fabric connecting every [`LocalTransport`] in a
/// simulated cluster: one process hosting several silos (tests,
/// development, the loopback optimization of §4.4).
#[derive(Clone, Default)]
pub struct ClusterFabric {
    inboxes: Arc<DashMap<SiloId, mpsc::UnboundedSender<Envelope>>>,
    pending: Arc<DashMap<MessageId, oneshot::Sender<Envelope>>>,
}

impl ClusterFabric {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Loopback [`Transport`] implementation bypassing serialization: every
/// participating silo lives in this process and shares a
/// [`ClusterFabric`]. Observationally equivalent to a real remote
/// transport — same dual-filter shape, same error semantics — per the
/// §4.4 requirement on loopback optimizations.
pub struct LocalTransport {
    self_id: SiloId,
    fabric: ClusterFabric,
    inbound_tx: broadcast::Sender<Envelope>,
    request_timeout: Duration,
}

impl LocalTransport {
    /// Registers a new silo on `fabric` and starts its inbound forwarding
    /// task.
    pub fn join(self_id: SiloId, fabric: ClusterFabric) -> Self {
        Self::with_timeout(self_id, fabric, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(self_id: SiloId, fabric: ClusterFabric, request_timeout: Duration) -> Self {
        let (rx_tx, rx_rx) = mpsc::unbounded_channel();
        fabric.inboxes.insert(self_id.clone(), rx_tx);

        let (inbound_tx, _) = broadcast::channel(INBOUND_CHANNEL_CAPACITY);
        spawn_forwarder(rx_rx, inbound_tx.clone(), fabric.pending.clone());

        Self {
            self_id,
            fabric,
            inbound_tx,
            request_timeout,
        }
    }

    pub fn self_id(&self) -> &SiloId {
        &self.self_id
    }
}

fn spawn_forwarder(
    mut rx: mpsc::UnboundedReceiver<Envelope>,
    inbound_tx: broadcast::Sender<Envelope>,
    pending: Arc<DashMap<MessageId, oneshot::Sender<Envelope>>>,
) {
    tokio::spawn(async move {
        while let Some(envelope) = rx.recv().await {
            if !envelope.is_request() {
                if let Some((_, tx)) = pending.remove(&envelope.correlation_id) {
                    let _ = tx.send(envelope.clone());
                }
            }
            let _ = inbound_tx.send(envelope);
        }
    });
}

#[async_trait]
impl Transport for LocalTransport {
    async fn send(&self, target_silo_id: &SiloId, envelope: Envelope) -> Result<Envelope, TransportError> {
        let (tx, rx) = oneshot::channel();
        self.fabric.pending.insert(envelope.message_id, tx);

        let inbox = self
            .fabric
            .inboxes
            .get(target_silo_id)
            .map(|e| e.value().clone())
            .ok_or_else(|| {
                self.fabric.pending.remove(&envelope.message_id);
                TransportError::UnknownSilo(target_silo_id.clone())
            })?;

        inbox
            .send(envelope.clone())
            .map_err(|_| TransportError::ChannelClosed)?;

        match tokio::time::timeout(self.request_timeout, rx).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(_)) => Err(TransportError::ChannelClosed),
            Err(_) => {
                self.fabric.pending.remove(&envelope.message_id);
                Err(TransportError::RequestTimeout {
                    target: target_silo_id.clone(),
                    timeout: self.request_timeout,
                })
            }
        }
    }

    async fn send_response(&self, response: Envelope) -> Result<(), TransportError> {
        if let Some((_, tx)) = self.fabric.pending.remove(&response.correlation_id) {
            if tx.send(response.clone()).is_err() {
                warn!(message_id = %response.message_id, "awaiting caller dropped before response delivered");
            }
        }
        let _ = self.inbound_tx.send(response);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<Envelope> {
        self.inbound_tx.subscribe()
    }
}
