//! The per-instance turn loop (§4.6 "Dispatch", §4.9 restart, §5 scheduling model).
//!
//! One task per actor instance, owning its mailbox exclusively. Pops one
//! envelope at a time, invokes the actor, replies, and only then pops
//! the next — the single-threaded-per-actor invariant (testable
//! property 1) falls directly out of "one task, no concurrent poll of
//! the same mailbox".

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};

// Layer 3: Internal module imports
use super::dyn_actor::{DynActor, DynDispatchError};
use super::error::ActivationError;
use super::factory::ActorTypeRegistry;
use super::response_sink::ResponseSink;
use super::state::{ActivationState, ActorInstanceState};
use crate::actor::{ActorContext, ErrorAction, NullOutboundCaller, OutboundCaller};
use crate::chain;
use crate::mailbox::{BackpressureStrategy, BoundedMailbox, BoundedMailboxSender, MailboxReceiver, MailboxSender};
use crate::message::Envelope;
use crate::monitoring::{SupervisionEvent, SupervisionEventKind};
use crate::supervisor::RestartBackoff;
use crate::util::ActorRef;

/// What the dispatcher needs beyond per-call arguments; shared
/// read-mostly configuration for one silo's activations.
#[derive(Clone)]
pub struct DispatcherConfig {
    pub mailbox_capacity: usize,
    pub mailbox_strategy: BackpressureStrategy,
    pub max_restarts_in_window: u32,
    pub restart_window: Duration,
    pub shutdown_drain_limit: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: crate::mailbox::DEFAULT_MAILBOX_CAPACITY,
            mailbox_strategy: BackpressureStrategy::default(),
            max_restarts_in_window: 3,
            restart_window: Duration::from_secs(10),
            shutdown_drain_limit: 1024,
        }
    }
}

/// Handles the activation registry keeps for a live instance.
pub struct DispatcherHandles {
    pub mailbox_tx: BoundedMailboxSender,
    pub shutdown_tx: watch::Sender<bool>,
    pub meta: Arc<Mutex<ActorInstanceState>>,
}

/// Constructs an instance and runs its `on_activate` hook; on success,
/// spawns the long-lived turn loop and returns the handles the registry
/// stores. On hook failure, no task is spawned and no slot should be
/// retained by the caller.
pub async fn activate(
    types: ActorTypeRegistry,
    actor_ref: ActorRef,
    parent: Option<ActorRef>,
    caller: Arc<dyn OutboundCaller>,
    response_sink: Arc<dyn ResponseSink>,
    supervision_events: Option<mpsc::UnboundedSender<SupervisionEvent>>,
    config: DispatcherConfig,
) -> Result<DispatcherHandles, ActivationError> {
    let mut actor = types.create(actor_ref.actor_type(), actor_ref.actor_id())?;

    let mut ctx = ActorContext::new(actor_ref.clone(), caller.clone());
    if let Err(e) = actor.on_activate(&mut ctx).await {
        return Err(ActivationError::ActivationFailed {
            actor_type: actor_ref.actor_type().to_string(),
            actor_id: actor_ref.actor_id().to_string(),
            reason: e.to_string(),
        });
    }

    let (mailbox, mailbox_tx) =
        BoundedMailbox::with_strategy(config.mailbox_capacity, config.mailbox_strategy);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let restart_backoff = RestartBackoff::new(config.max_restarts_in_window, config.restart_window);
    let meta = Arc::new(Mutex::new(ActorInstanceState::new(
        actor_ref.clone(),
        parent,
        restart_backoff,
    )));
    {
        let mut guard = meta.lock();
        guard.activation_state = ActivationState::Running;
    }

    tokio::spawn(run_loop(
        actor,
        mailbox,
        shutdown_rx,
        Arc::clone(&meta),
        types,
        caller,
        response_sink,
        supervision_events,
        config,
    ));

    Ok(DispatcherHandles {
        mailbox_tx,
        shutdown_tx,
        meta,
    })
}

#[allow(clippy::too_many_arguments)]
async fn run_loop(
    mut actor: Box<dyn DynActor>,
    mut mailbox: BoundedMailbox,
    mut shutdown_rx: watch::Receiver<bool>,
    meta: Arc<Mutex<ActorInstanceState>>,
    types: ActorTypeRegistry,
    caller: Arc<dyn OutboundCaller>,
    response_sink: Arc<dyn ResponseSink>,
    supervision_events: Option<mpsc::UnboundedSender<SupervisionEvent>>,
    config: DispatcherConfig,
) {
    loop {
        tokio::select! {
            biased;
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
            popped = mailbox.recv() => {
                match popped {
                    None => break,
                    Some(envelope) => {
                        let outcome = handle_one(&mut *actor, &envelope, &meta, &caller).await;
                        if let Some(response) = outcome.response {
                            response_sink.send_response(response).await;
                        }
                        if let Some(action) = outcome.escalated_action {
                            let actor_ref = meta.lock().actor_ref.clone();
                            if !apply_error_action(
                                action,
                                &mut actor,
                                &actor_ref,
                                &types,
                                &meta,
                                &caller,
                                &supervision_events,
                            )
                            .await
                            {
                                break;
                            }
                        }
                    }
                }
            }
        }
    }

    deactivate(
        &mut *actor,
        &mut mailbox,
        &meta,
        &caller,
        &response_sink,
        config.shutdown_drain_limit,
    )
    .await;
}

struct TurnOutcome {
    response: Option<Envelope>,
    escalated_action: Option<ErrorAction>,
}

async fn handle_one(
    actor: &mut dyn DynActor,
    envelope: &Envelope,
    meta: &Arc<Mutex<ActorInstanceState>>,
    caller: &Arc<dyn OutboundCaller>,
) -> TurnOutcome {
    meta.lock().touch();

    let actor_ref = meta.lock().actor_ref.clone();

    // Restore / validate ambient call-chain context (§4.8).
    let chain_result = match &envelope.chain {
        Some(incoming) => incoming.check_entry(actor_ref.actor_type(), actor_ref.actor_id()),
        None => Ok(()),
    };
    if let Err(chain_err) = chain_result {
        return TurnOutcome {
            response: Some(envelope.clone().into_error_response(chain_err.to_string())),
            escalated_action: None,
        };
    }

    let mut ctx = ActorContext::new(actor_ref, Arc::clone(caller));

    // Reminder firings (§4.10) skip method lookup and codec decoding
    // entirely, going straight to `on_reminder` instead of `dispatch`.
    if envelope.is_reminder {
        let run_reminder = actor.on_reminder(&envelope.method_name, envelope.payload.clone(), &mut ctx);
        let reminder_result = match &envelope.chain {
            Some(c) => chain::scope(c.clone(), run_reminder).await,
            None => run_reminder.await,
        };
        return match reminder_result {
            Ok(()) => TurnOutcome {
                response: Some(envelope.clone().into_success_response(Bytes::new())),
                escalated_action: None,
            },
            Err(e) => {
                let response = envelope
                    .clone()
                    .into_error_response(format!("HandlerException: {e}"));
                let mut error_ctx = ActorContext::new(meta.lock().actor_ref.clone(), Arc::clone(caller));
                let action = actor.on_error(&e, &mut error_ctx).await;
                TurnOutcome {
                    response: Some(response),
                    escalated_action: Some(action),
                }
            }
        };
    }

    let run_dispatch = actor.dispatch(&envelope.method_name, envelope.payload.clone(), &mut ctx);

    let dispatch_result = match &envelope.chain {
        Some(c) => chain::scope(c.clone(), run_dispatch).await,
        None => run_dispatch.await,
    };

    match dispatch_result {
        Ok(payload) => TurnOutcome {
            response: Some(envelope.clone().into_success_response(payload)),
            escalated_action: None,
        },
        Err(DynDispatchError::MethodNotFound { method_name }) => TurnOutcome {
            response: Some(
                envelope
                    .clone()
                    .into_error_response(format!("MethodNotFound: {method_name}")),
            ),
            escalated_action: None,
        },
        Err(DynDispatchError::Codec(e)) => TurnOutcome {
            response: Some(envelope.clone().into_error_response(format!("CodecError: {e}"))),
            escalated_action: None,
        },
        Err(DynDispatchError::Handler(e)) => {
            let response = envelope
                .clone()
                .into_error_response(format!("HandlerException: {e}"));
            let mut error_ctx = ActorContext::new(meta.lock().actor_ref.clone(), Arc::clone(caller));
            let action = actor.on_error(&e, &mut error_ctx).await;
            TurnOutcome {
                response: Some(response),
                escalated_action: Some(action),
            }
        }
    }
}

/// Applies the `ErrorAction` the actor returned from `on_error`,
/// implementing OneForOne self-restart bookkeeping directly on this
/// instance's own history (§4.9). Returns `false` if the loop should
/// stop.
async fn apply_error_action(
    action: ErrorAction,
    actor: &mut Box<dyn DynActor>,
    actor_ref: &ActorRef,
    types: &ActorTypeRegistry,
    meta: &Arc<Mutex<ActorInstanceState>>,
    caller: &Arc<dyn OutboundCaller>,
    supervision_events: &Option<mpsc::UnboundedSender<SupervisionEvent>>,
) -> bool {
    match action {
        ErrorAction::Resume => true,
        ErrorAction::Stop => {
            emit(supervision_events, actor_ref, SupervisionEventKind::ChildStopped);
            false
        }
        ErrorAction::Restart => {
            let exceeded = {
                let mut guard = meta.lock();
                guard.restart_backoff.is_limit_exceeded()
            };
            if exceeded {
                emit(
                    supervision_events,
                    actor_ref,
                    SupervisionEventKind::RestartLimitExceeded {
                        restart_count: meta.lock().restart_backoff.restart_count(),
                        window: Duration::from_secs(0),
                    },
                );
                return false;
            }
            let delay = meta.lock().restart_backoff.calculate_delay();
            tokio::time::sleep(delay).await;
            meta.lock().restart_backoff.record_restart();

            match types.create(actor_ref.actor_type(), actor_ref.actor_id()) {
                Ok(mut fresh) => {
                    let mut ctx = ActorContext::new(actor_ref.clone(), Arc::clone(caller));
                    if fresh.on_activate(&mut ctx).await.is_ok() {
                        *actor = fresh;
                        let mut guard = meta.lock();
                        guard.version += 1;
                        let restart_count = guard.restart_backoff.restart_count();
                        drop(guard);
                        emit(
                            supervision_events,
                            actor_ref,
                            SupervisionEventKind::ChildRestarted { restart_count },
                        );
                        true
                    } else {
                        false
                    }
                }
                Err(_) => false,
            }
        }
        ErrorAction::Escalate => {
            emit(
                supervision_events,
                actor_ref,
                SupervisionEventKind::ChildFailed {
                    error: "escalated".to_string(),
                    restart_count: meta.lock().restart_backoff.restart_count(),
                },
            );
            false
        }
    }
}

fn emit(
    tx: &Option<mpsc::UnboundedSender<SupervisionEvent>>,
    actor_ref: &ActorRef,
    kind: SupervisionEventKind,
) {
    if let Some(tx) = tx {
        let _ = tx.send(SupervisionEvent {
            timestamp: chrono::Utc::now(),
            supervisor_id: actor_ref.actor_type().to_string(),
            child_id: Some(actor_ref.actor_id().to_string()),
            event_kind: kind,
            metadata: HashMap::new(),
        });
    }
}

async fn deactivate(
    actor: &mut dyn DynActor,
    mailbox: &mut BoundedMailbox,
    meta: &Arc<Mutex<ActorInstanceState>>,
    caller: &Arc<dyn OutboundCaller>,
    response_sink: &Arc<dyn ResponseSink>,
    drain_limit: usize,
) {
    {
        let mut guard = meta.lock();
        guard.activation_state = ActivationState::Deactivating;
    }

    for leftover in mailbox.close_and_drain(drain_limit) {
        if leftover.is_request() {
            let response = leftover.into_error_response("MailboxClosed");
            response_sink.send_response(response).await;
        }
    }

    let actor_ref = meta.lock().actor_ref.clone();
    let mut ctx = ActorContext::new(actor_ref, Arc::clone(caller));
    let _ = actor.on_deactivate(&mut ctx).await;

    meta.lock().activation_state = ActivationState::Dead;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::actor::{Actor, ActorError};
    use async_trait::async_trait;
    use bytes::Bytes;
    use tokio::sync::Mutex as AsyncMutex;

    struct Echo {
        fail_next: bool,
    }

    #[derive(Debug)]
    struct EchoError;
    impl std::fmt::Display for EchoError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "echo error")
        }
    }
    impl std::error::Error for EchoError {}

    #[async_trait]
    impl Actor for Echo {
        type Error = EchoError;

        async fn dispatch(
            &mut self,
            method_name: &str,
            payload: Bytes,
            _ctx: &mut ActorContext,
        ) -> Result<Bytes, ActorError<Self::Error>> {
            if method_name == "fail" {
                return Err(ActorError::Handler(EchoError));
            }
            Ok(payload)
        }
    }

    struct EchoFactory;
    impl super::super::factory::ActorFactory for EchoFactory {
        fn actor_type(&self) -> &str {
            "Echo"
        }
        fn create(&self, _actor_id: &str) -> Box<dyn DynActor> {
            Box::new(Echo { fail_next: false })
        }
    }

    struct CapturingSink {
        responses: Arc<AsyncMutex<Vec<Envelope>>>,
    }

    #[async_trait]
    impl ResponseSink for CapturingSink {
        async fn send_response(&self, response: Envelope) {
            self.responses.lock().await.push(response);
        }
    }

    #[tokio::test]
    async fn activation_runs_on_activate_then_delivers_envelope() {
        let types = ActorTypeRegistry::new();
        types.register(Arc::new(EchoFactory));
        let responses = Arc::new(AsyncMutex::new(Vec::new()));
        let sink = Arc::new(CapturingSink {
            responses: Arc::clone(&responses),
        });

        let handles = activate(
            types,
            ActorRef::new("Echo", "a"),
            None,
            Arc::new(NullOutboundCaller),
            sink,
            None,
            DispatcherConfig::default(),
        )
        .await
        .unwrap();

        let envelope = Envelope::request("Echo", "a", "echo", Bytes::from_static(b"hi"));
        handles.mailbox_tx.send(envelope).await.unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;
        let got = responses.lock().await;
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].response_payload.as_ref(), b"hi");
    }

    #[tokio::test]
    async fn unregistered_type_fails_activation() {
        let types = ActorTypeRegistry::new();
        let err = activate(
            types,
            ActorRef::new("Ghost", "a"),
            None,
            Arc::new(NullOutboundCaller),
            Arc::new(CapturingSink {
                responses: Arc::new(AsyncMutex::new(Vec::new())),
            }),
            None,
            DispatcherConfig::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ActivationError::UnknownActorType { .. }));
    }

    #[tokio::test]
    async fn handler_exception_produces_error_response_and_restarts() {
        let types = ActorTypeRegistry::new();
        types.register(Arc::new(EchoFactory));
        let responses = Arc::new(AsyncMutex::new(Vec::new()));
        let sink = Arc::new(CapturingSink {
            responses: Arc::clone(&responses),
        });

        let mut config = DispatcherConfig::default();
        config.max_restarts_in_window = 3;

        let handles = activate(
            types,
            ActorRef::new("Echo", "a"),
            None,
            Arc::new(NullOutboundCaller),
            sink,
            None,
            config,
        )
        .await
        .unwrap();

        let envelope = Envelope::request("Echo", "a", "fail", Bytes::new());
        handles.mailbox_tx.send(envelope).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let got = responses.lock().await;
        assert_eq!(got.len(), 1);
        assert!(got[0].is_error_response());
        assert!(got[0].error_message.as_deref().unwrap().contains("HandlerException"));
    }

    #[tokio::test]
    async fn deactivate_answers_drained_requests_with_mailbox_closed() {
        let (mut mailbox, sender) = BoundedMailbox::new(8);
        sender
            .send(Envelope::request("Echo", "a", "echo", Bytes::new()))
            .await
            .unwrap();
        sender
            .send(Envelope::request("Echo", "a", "echo", Bytes::new()))
            .await
            .unwrap();

        let meta = Arc::new(Mutex::new(ActorInstanceState::new(
            ActorRef::new("Echo", "a"),
            None,
            RestartBackoff::new(3, Duration::from_secs(10)),
        )));
        let responses = Arc::new(AsyncMutex::new(Vec::new()));
        let sink: Arc<dyn ResponseSink> = Arc::new(CapturingSink {
            responses: Arc::clone(&responses),
        });
        let mut actor = Echo { fail_next: false };
        let caller: Arc<dyn OutboundCaller> = Arc::new(NullOutboundCaller);

        deactivate(&mut actor, &mut mailbox, &meta, &caller, &sink, 1024).await;

        let got = responses.lock().await;
        assert_eq!(got.len(), 2);
        assert!(got.iter().all(|r| r.is_error_response()));
        assert!(got
            .iter()
            .all(|r| r.error_message.as_deref() == Some("MailboxClosed")));
    }
}
