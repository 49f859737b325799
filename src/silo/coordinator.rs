//! The silo coordinator: wires activation, the hash ring, membership,
//! transport, and reminders into one running process (§4).
//!
//! Every cross-cutting concern in this crate meets here. An actor itself
//! never sees a silo, a ring, or a transport — it only ever sees an
//! [`crate::actor::ActorContext`]; this is the one type that turns
//! "call Counter/shard-7#increment" into "find who owns shard-7 today,
//! activate it if nobody has yet, and deliver."

// Layer 1: Standard library imports
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, Weak};

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use parking_lot::Mutex as SyncMutex;
use tokio::sync::{mpsc, oneshot, Mutex as AsyncMutex};
use tracing::{debug, error, warn};

// Layer 3: Internal module imports
use crate::activation::{self, ActorFactory, ActorTypeRegistry, DispatcherConfig, DispatcherHandles, ResponseSink};
use crate::actor::OutboundCaller;
use crate::chain::{self, ChainMeta};
use crate::codec::CodecRegistry;
use crate::mailbox::{BoundedMailboxSender, MailboxSender};
use crate::membership::{MembershipService, MembershipTable};
use crate::message::Envelope;
use crate::monitoring::{SupervisionEvent, SupervisionEventKind};
use crate::reminder::{Reminder, ReminderError, ReminderFirer, ReminderScheduler, ReminderSchedulerConfig, ReminderTable};
use crate::ring::RingHandle;
use crate::util::ids::ActorRef;

use super::config::{SiloConfig, SupervisionStrategy};
use super::error::SiloError;

/// Everything one silo process runs (§4): the activation registry, the
/// hash ring view, cluster membership, transport, and the reminder
/// scheduler, plus the bookkeeping needed to route a call, activate an
/// actor at most once, and restart the right set of siblings when one
/// escalates.
pub struct SiloCoordinator<M: MembershipTable, R: ReminderTable> {
    config: SiloConfig,
    types: ActorTypeRegistry,
    codec_registry: CodecRegistry,
    transport: Arc<dyn crate::transport::Transport>,
    membership: Arc<MembershipService<M>>,
    reminders: Arc<R>,

    instances: DashMap<ActorRef, DispatcherHandles>,
    activation_locks: DashMap<ActorRef, Arc<AsyncMutex<()>>>,

    /// Correlates a response envelope back to whichever local future is
    /// awaiting it: an in-silo [`Self::call`] or a reminder firing.
    /// Outbound calls to a *remote* silo never touch this table — that
    /// correlation already lives inside the transport implementation.
    pending_calls: DashMap<crate::util::ids::MessageId, oneshot::Sender<Envelope>>,

    /// Children of a supervising parent, in activation order — the
    /// ordering `RestForOne` restarts "from the failed child onward"
    /// against. `ActorInstanceState::children` is a `HashSet` and loses
    /// this order, so it is tracked here instead.
    children: DashMap<ActorRef, SyncMutex<Vec<ActorRef>>>,
    strategies: DashMap<ActorRef, SupervisionStrategy>,

    shutting_down: AtomicBool,
    supervision_tx: mpsc::UnboundedSender<SupervisionEvent>,
    supervision_rx: SyncMutex<Option<mpsc::UnboundedReceiver<SupervisionEvent>>>,

    self_ref: OnceLock<Weak<Self>>,
}

impl<M: MembershipTable + 'static, R: ReminderTable + 'static> SiloCoordinator<M, R> {
    pub fn new(
        config: SiloConfig,
        transport: Arc<dyn crate::transport::Transport>,
        membership: Arc<MembershipService<M>>,
        reminders: Arc<R>,
    ) -> Arc<Self> {
        let (supervision_tx, supervision_rx) = mpsc::unbounded_channel();
        let coordinator = Arc::new(Self {
            config,
            types: ActorTypeRegistry::new(),
            codec_registry: CodecRegistry::new(),
            transport,
            membership,
            reminders,
            instances: DashMap::new(),
            activation_locks: DashMap::new(),
            pending_calls: DashMap::new(),
            children: DashMap::new(),
            strategies: DashMap::new(),
            shutting_down: AtomicBool::new(false),
            supervision_tx,
            supervision_rx: SyncMutex::new(Some(supervision_rx)),
            self_ref: OnceLock::new(),
        });
        let _ = coordinator.self_ref.set(Arc::downgrade(&coordinator));
        coordinator
    }

    fn arc_self(&self) -> Arc<Self> {
        self.self_ref
            .get()
            .and_then(Weak::upgrade)
            .expect("SiloCoordinator::new always sets self_ref before handing out the Arc")
    }

    pub fn config(&self) -> &SiloConfig {
        &self.config
    }

    pub fn ring(&self) -> RingHandle {
        self.membership.ring()
    }

    pub fn register_actor_type(&self, factory: Arc<dyn ActorFactory>) {
        self.types.register(factory);
    }

    pub fn register_codec(&self, actor_type: impl Into<String>, method_name: impl Into<String>) {
        self.codec_registry.register(actor_type, method_name);
    }

    /// Joins cluster membership and rebuilds the ring with this silo
    /// included. Call once, before [`Self::run`].
    pub async fn join_cluster(&self, generation: u64) -> Result<(), SiloError> {
        self.membership.join(self.config.endpoint.clone(), generation).await?;
        Ok(())
    }

    /// Spawns every long-lived background task this silo needs:
    /// membership's heartbeat/watch/failure-detector loops, the
    /// reminder scheduler, the supervision escalation drain, and the
    /// transport's dual-filter subscribers (§4.4, §4.7).
    pub async fn run(self: &Arc<Self>) {
        tokio::spawn(Arc::clone(&self.membership).run_heartbeat_loop());
        tokio::spawn(Arc::clone(&self.membership).run_watch_loop());
        tokio::spawn(Arc::clone(&self.membership).run_failure_detector_loop());

        let scheduler = Arc::new(ReminderScheduler::new(
            Arc::clone(&self.reminders),
            self.membership.ring(),
            self.config.silo_id.clone(),
            self.arc_self() as Arc<dyn ReminderFirer>,
            ReminderSchedulerConfig {
                tick_interval: self.config.reminder_tick_interval,
            },
        ));
        tokio::spawn(scheduler.run());

        if let Some(mut rx) = self.supervision_rx.lock().take() {
            let this = Arc::clone(self);
            tokio::spawn(async move {
                while let Some(event) = rx.recv().await {
                    this.handle_supervision_event(event).await;
                }
            });
        }

        let mut dispatch_rx = self.transport.subscribe();
        let dispatch_coordinator = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                match dispatch_rx.recv().await {
                    Ok(envelope) if envelope.is_dispatch_target() => {
                        dispatch_coordinator.route_inbound(envelope).await;
                    }
                    Ok(_) => {}
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "dispatch subscriber lagged behind transport");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        let mut egress_rx = self.transport.subscribe();
        tokio::spawn(async move {
            loop {
                match egress_rx.recv().await {
                    Ok(envelope) if envelope.is_egress_target() => {
                        debug!(envelope = %envelope, "response observed on egress path");
                    }
                    Ok(_) => {}
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "egress subscriber lagged behind transport");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }

    /// Entry point for an externally-originated call: roots a fresh call
    /// chain and routes to whichever silo currently owns the target.
    pub async fn call(
        &self,
        actor_type: &str,
        actor_id: &str,
        method_name: &str,
        payload: Bytes,
    ) -> Result<Bytes, SiloError> {
        let chain = ChainMeta::new_root(self.config.chain_max_depth, self.config.chain_default_deadline);
        self.route_call(None, ActorRef::new(actor_type, actor_id), method_name, payload, Some(chain))
            .await
    }

    /// Explicitly activates `child` under `parent`'s supervision,
    /// applying `strategy` (or this silo's default) to escalations
    /// raised by `child` or any sibling registered the same way (§4.9).
    pub async fn activate_child(
        &self,
        parent: &ActorRef,
        child: ActorRef,
        strategy: Option<SupervisionStrategy>,
    ) -> Result<(), SiloError> {
        if let Some(strategy) = strategy {
            self.strategies.insert(parent.clone(), strategy);
        }
        self.ensure_activated(child, Some(parent.clone())).await?;
        Ok(())
    }

    /// Routes one call to its owning silo, propagating the ambient call
    /// chain (§4.8) when `caller` is another activated instance on this
    /// silo rather than an external entry point.
    async fn route_call(
        &self,
        caller: Option<&ActorRef>,
        target: ActorRef,
        method_name: &str,
        payload: Bytes,
        chain: Option<ChainMeta>,
    ) -> Result<Bytes, SiloError> {
        if self.shutting_down.load(Ordering::SeqCst) {
            return Err(SiloError::SiloShuttingDown);
        }
        if !self.types.is_registered(target.actor_type()) {
            return Err(SiloError::UnknownActorType {
                actor_type: target.actor_type().to_string(),
            });
        }

        let chain_for_hop = match (chain, caller) {
            (Some(c), Some(caller)) => Some(c.enter_hop(
                caller.actor_type(),
                caller.actor_id(),
                target.actor_type(),
                target.actor_id(),
                self.config.chain_max_depth,
            )?),
            (Some(c), None) => Some(c),
            (None, _) => None,
        };

        let mut envelope = Envelope::request(target.actor_type(), target.actor_id(), method_name, payload);
        if let Some(c) = chain_for_hop {
            envelope = envelope.with_chain(c);
        }

        let owner = self.membership.ring().owner_of(target.placement_key())?;
        let response = if owner == self.config.silo_id {
            self.deliver_local(target, envelope).await?
        } else {
            self.transport.send(&owner, envelope).await?
        };

        if response.is_error_response() {
            return Err(SiloError::HandlerException(
                response.error_message.unwrap_or_else(|| "handler failed with no message".to_string()),
            ));
        }
        Ok(response.response_payload)
    }

    /// Delivers a request envelope to a locally-owned actor and awaits
    /// its response via [`Self::pending_calls`]. The actor is activated
    /// on demand if this is its first message (§4.6).
    async fn deliver_local(&self, target: ActorRef, envelope: Envelope) -> Result<Envelope, SiloError> {
        let mailbox_tx = self.ensure_activated(target, None).await?;
        self.send_and_await(mailbox_tx, envelope).await
    }

    async fn send_and_await(&self, mailbox_tx: BoundedMailboxSender, envelope: Envelope) -> Result<Envelope, SiloError> {
        let (tx, rx) = oneshot::channel();
        self.pending_calls.insert(envelope.message_id, tx);

        let enqueued = match mailbox_tx.send(envelope.clone()).await {
            Ok(enqueued) => enqueued,
            Err(e) => {
                self.pending_calls.remove(&envelope.message_id);
                return Err(SiloError::from(e));
            }
        };
        if !enqueued {
            self.pending_calls.remove(&envelope.message_id);
            return Err(SiloError::Mailbox(crate::mailbox::MailboxError::BackpressureApplied {
                strategy: self.config.mailbox_overflow_policy,
            }));
        }

        match tokio::time::timeout(self.config.chain_default_deadline, rx).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(_)) => Err(SiloError::Mailbox(crate::mailbox::MailboxError::Closed)),
            Err(_) => {
                self.pending_calls.remove(&envelope.message_id);
                Err(SiloError::Timeout)
            }
        }
    }

    /// Delivers an envelope that arrived over transport (§4.4, §4.7
    /// dispatch-target path) to its local activation.
    async fn route_inbound(&self, envelope: Envelope) {
        let target = ActorRef::new(envelope.actor_type.clone(), envelope.actor_id.clone());
        let result = match self.ensure_activated(target, None).await {
            Ok(mailbox_tx) => mailbox_tx.send(envelope.clone()).await.map_err(SiloError::from),
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            warn!(envelope = %envelope, error = %e, "failed to deliver inbound envelope");
            let _ = self.transport.send_response(envelope.into_error_response(e.to_string())).await;
        }
    }

    /// Activates `actor_ref` if it has no live instance yet, or returns
    /// its existing mailbox — the at-most-once-concurrent-activation
    /// invariant (§4.6 testable property 2), enforced with a per-ref
    /// double-checked lock so two racing callers never both construct
    /// an instance.
    async fn ensure_activated(&self, actor_ref: ActorRef, parent: Option<ActorRef>) -> Result<BoundedMailboxSender, SiloError> {
        if let Some(handles) = self.instances.get(&actor_ref) {
            return Ok(handles.mailbox_tx.clone());
        }
        if !self.types.is_registered(actor_ref.actor_type()) {
            return Err(SiloError::UnknownActorType {
                actor_type: actor_ref.actor_type().to_string(),
            });
        }

        let lock = self
            .activation_locks
            .entry(actor_ref.clone())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        if let Some(handles) = self.instances.get(&actor_ref) {
            return Ok(handles.mailbox_tx.clone());
        }

        let caller: Arc<dyn OutboundCaller> = Arc::new(InstanceCaller {
            actor_ref: actor_ref.clone(),
            coordinator: self.arc_self(),
        });
        let response_sink: Arc<dyn ResponseSink> = self.arc_self();

        let dispatcher_config = DispatcherConfig {
            mailbox_capacity: self.config.mailbox_capacity,
            mailbox_strategy: self.config.mailbox_overflow_policy,
            ..DispatcherConfig::default()
        };

        let handles = activation::activate(
            self.types.clone(),
            actor_ref.clone(),
            parent.clone(),
            caller,
            response_sink,
            Some(self.supervision_tx.clone()),
            dispatcher_config,
        )
        .await?;

        let mailbox_tx = handles.mailbox_tx.clone();
        self.instances.insert(actor_ref.clone(), handles);

        if let Some(parent_ref) = parent {
            self.strategies.entry(parent_ref.clone()).or_insert(self.config.default_supervision_strategy);
            let siblings = self.children.entry(parent_ref).or_insert_with(|| SyncMutex::new(Vec::new()));
            let mut siblings = siblings.lock();
            if !siblings.contains(&actor_ref) {
                siblings.push(actor_ref);
            }
        }

        Ok(mailbox_tx)
    }

    async fn handle_supervision_event(&self, event: SupervisionEvent) {
        // The dispatcher's emit() helper records the failing actor's own
        // identity under `supervisor_id`/`child_id`, not its parent's.
        let Some(actor_id) = event.child_id.clone() else {
            return;
        };
        let failed_ref = ActorRef::new(event.supervisor_id.clone(), actor_id);

        if matches!(
            event.event_kind,
            SupervisionEventKind::ChildFailed { .. } | SupervisionEventKind::RestartLimitExceeded { .. }
        ) {
            self.escalate(failed_ref).await;
        }
    }

    /// Applies this failure's parent's restart strategy: `OneForOne`
    /// restarts just the failed child, `AllForOne` restarts every
    /// sibling, `RestForOne` restarts the failed child and every sibling
    /// activated after it (§4.9).
    async fn escalate(&self, failed_ref: ActorRef) {
        let parent = self
            .instances
            .get(&failed_ref)
            .and_then(|h| h.meta.lock().parent.clone());

        let Some(parent_ref) = parent else {
            error!(actor = %failed_ref, "escalation reached an unsupervised actor; stopping it");
            self.stop_instance(&failed_ref);
            return;
        };

        let strategy = self
            .strategies
            .get(&parent_ref)
            .map(|s| *s)
            .unwrap_or(self.config.default_supervision_strategy);
        let siblings: Vec<ActorRef> = self
            .children
            .get(&parent_ref)
            .map(|s| s.lock().clone())
            .unwrap_or_default();

        match strategy {
            SupervisionStrategy::OneForOne => {
                self.restart_instance(&failed_ref).await;
            }
            SupervisionStrategy::AllForOne => {
                for sibling in &siblings {
                    self.restart_instance(sibling).await;
                }
            }
            SupervisionStrategy::RestForOne => match siblings.iter().position(|r| r == &failed_ref) {
                Some(idx) => {
                    for sibling in &siblings[idx..] {
                        self.restart_instance(sibling).await;
                    }
                }
                None => self.restart_instance(&failed_ref).await,
            },
        }
    }

    async fn restart_instance(&self, actor_ref: &ActorRef) {
        let parent = self.instances.get(actor_ref).and_then(|h| h.meta.lock().parent.clone());
        self.stop_instance(actor_ref);
        if let Err(e) = self.ensure_activated(actor_ref.clone(), parent).await {
            error!(actor = %actor_ref, error = %e, "failed to restart actor after escalation");
        }
    }

    fn stop_instance(&self, actor_ref: &ActorRef) {
        if let Some((_, handles)) = self.instances.remove(actor_ref) {
            let _ = handles.shutdown_tx.send(true);
        }
    }

    /// Signals every live instance to stop and waits up to
    /// `shutdown_timeout` for in-flight turns to finish (§4.11). This
    /// silo's membership row is not actively retracted here —
    /// `MembershipService` exposes no graceful-leave call yet, so a
    /// shut-down silo is reclaimed through the ordinary failure-detector
    /// path once its heartbeats stop.
    pub async fn shutdown(&self) {
        self.shutting_down.store(true, Ordering::SeqCst);
        for entry in self.instances.iter() {
            let _ = entry.value().shutdown_tx.send(true);
        }
        tokio::time::sleep(self.config.shutdown_timeout).await;
    }
}

#[async_trait]
impl<M: MembershipTable + 'static, R: ReminderTable + 'static> ResponseSink for SiloCoordinator<M, R> {
    async fn send_response(&self, response: Envelope) {
        if let Some((_, tx)) = self.pending_calls.remove(&response.correlation_id) {
            let _ = tx.send(response);
            return;
        }
        if let Err(e) = self.transport.send_response(response).await {
            warn!(error = %e, "failed to forward response to transport");
        }
    }
}

#[async_trait]
impl<M: MembershipTable + 'static, R: ReminderTable + 'static> ReminderFirer for SiloCoordinator<M, R> {
    async fn fire(&self, reminder: &Reminder) -> Result<(), ReminderError> {
        let target = ActorRef::new(reminder.owner_actor_type.clone(), reminder.owner_actor_id.clone());
        let mailbox_tx = self
            .ensure_activated(target.clone(), None)
            .await
            .map_err(|e| ReminderError::CallbackFailed {
                id: reminder.id,
                reason: e.to_string(),
            })?;

        let envelope = Envelope::reminder(
            target.actor_type(),
            target.actor_id(),
            reminder.name.clone(),
            reminder.payload.clone(),
        );

        let response = self
            .send_and_await(mailbox_tx, envelope)
            .await
            .map_err(|e| ReminderError::CallbackFailed {
                id: reminder.id,
                reason: e.to_string(),
            })?;

        if response.is_error_response() {
            return Err(ReminderError::CallbackFailed {
                id: reminder.id,
                reason: response.error_message.unwrap_or_default(),
            });
        }
        Ok(())
    }
}

/// One instance's outbound-call capability: closes over that instance's
/// own identity so `OutboundCaller::call` (which carries no caller
/// parameter) still has someone to attribute the hop to for call-chain
/// propagation (§4.8).
struct InstanceCaller<M: MembershipTable, R: ReminderTable> {
    actor_ref: ActorRef,
    coordinator: Arc<SiloCoordinator<M, R>>,
}

#[async_trait]
impl<M: MembershipTable + 'static, R: ReminderTable + 'static> OutboundCaller for InstanceCaller<M, R> {
    async fn call(
        &self,
        actor_type: &str,
        actor_id: &str,
        method_name: &str,
        payload: Bytes,
    ) -> Result<Bytes, SiloError> {
        let ambient_chain = chain::current().unwrap_or_else(|| {
            ChainMeta::new_root(
                self.coordinator.config.chain_max_depth,
                self.coordinator.config.chain_default_deadline,
            )
        });
        self.coordinator
            .route_call(
                Some(&self.actor_ref),
                ActorRef::new(actor_type, actor_id),
                method_name,
                payload,
                Some(ambient_chain),
            )
            .await
    }
}
