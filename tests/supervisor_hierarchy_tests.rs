//! Supervisor hierarchy integration tests.
//!
//! Exercises the coordinator-level restart strategies — OneForOne,
//! AllForOne, RestForOne — against real activations, plus the
//! unsupervised-escalation path and the dispatcher's own restart-limit
//! escalation. Every scenario drives a [`SiloCoordinator`] exactly the
//! way an embedding application would: register a type, join the ring,
//! run the background tasks, then call.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use quark::activation::{ActorFactory, DynActor};
use quark::membership::{MembershipConfig, MembershipService};
use quark::{
    Actor, ActorContext, ActorError, ActorRef, ClusterFabric, ErrorAction, InMemoryMembershipTable,
    InMemoryReminderTable, LocalTransport, SiloConfig, SiloCoordinator, SiloId, SupervisionStrategy,
};

/// Fails every `"boom"` call, always escalating. Tracks how many times
/// each `actor_id` has been constructed and activated so restarts are
/// observable from outside the coordinator.
struct FlakyActor {
    count: u32,
    activations: Arc<AtomicU32>,
}

#[derive(Debug)]
struct Boom;

impl std::fmt::Display for Boom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "boom")
    }
}

impl std::error::Error for Boom {}

#[async_trait]
impl Actor for FlakyActor {
    type Error = Boom;

    async fn on_activate(&mut self, _ctx: &mut ActorContext) -> Result<(), Boom> {
        self.activations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn dispatch(
        &mut self,
        method_name: &str,
        _payload: Bytes,
        _ctx: &mut ActorContext,
    ) -> Result<Bytes, ActorError<Boom>> {
        match method_name {
            "bump" => {
                self.count += 1;
                Ok(Bytes::from(self.count.to_string()))
            }
            "boom" => Err(ActorError::Handler(Boom)),
            other => Err(ActorError::MethodNotFound {
                method_name: other.to_string(),
            }),
        }
    }

    async fn on_error(&mut self, _error: &Boom, _ctx: &mut ActorContext) -> ErrorAction {
        ErrorAction::Escalate
    }
}

/// One factory per silo, tracking per-`actor_id` activation counts so a
/// test can tell a restarted instance from one that never failed.
struct FlakyFactory {
    activations: DashMap<String, Arc<AtomicU32>>,
}

impl FlakyFactory {
    fn new() -> Self {
        Self {
            activations: DashMap::new(),
        }
    }

    fn activations_for(&self, actor_id: &str) -> Arc<AtomicU32> {
        Arc::clone(
            &self
                .activations
                .entry(actor_id.to_string())
                .or_insert_with(|| Arc::new(AtomicU32::new(0))),
        )
    }

    fn activation_count(&self, actor_id: &str) -> u32 {
        self.activations_for(actor_id).load(Ordering::SeqCst)
    }
}

impl ActorFactory for FlakyFactory {
    fn actor_type(&self) -> &str {
        "Flaky"
    }

    fn create(&self, actor_id: &str) -> Box<dyn DynActor> {
        Box::new(FlakyActor {
            count: 0,
            activations: self.activations_for(actor_id),
        })
    }
}

type Coordinator = SiloCoordinator<InMemoryMembershipTable, InMemoryReminderTable>;

async fn coordinator_for(silo_id: &str) -> Arc<Coordinator> {
    let config = SiloConfig::builder(SiloId::new(silo_id), "127.0.0.1:0")
        .build()
        .unwrap();
    let fabric = ClusterFabric::new();
    let transport = Arc::new(LocalTransport::join(config.silo_id.clone(), fabric));
    let membership = Arc::new(MembershipService::new(
        Arc::new(InMemoryMembershipTable::new()),
        config.silo_id.clone(),
        MembershipConfig {
            heartbeat_interval: config.heartbeat_interval,
            failure_threshold: config.failure_threshold,
            self_expel_threshold: config.self_expel_threshold(),
            virtual_nodes_per_silo: config.virtual_nodes_per_silo,
        },
    ));
    let reminders = Arc::new(InMemoryReminderTable::new());
    let coordinator = SiloCoordinator::new(config, transport, membership, reminders);
    coordinator.join_cluster(1).await.unwrap();
    coordinator.run().await;
    coordinator
}

async fn bump(coordinator: &Coordinator, actor_id: &str) -> u32 {
    let out = coordinator
        .call("Flaky", actor_id, "bump", Bytes::new())
        .await
        .unwrap();
    String::from_utf8(out.to_vec()).unwrap().parse().unwrap()
}

async fn boom(coordinator: &Coordinator, actor_id: &str) {
    let err = coordinator
        .call("Flaky", actor_id, "boom", Bytes::new())
        .await
        .unwrap_err();
    assert!(matches!(err, quark::SiloError::HandlerException(_)));
}

/// Long enough for the supervision-event channel's consumer task to
/// observe the escalation and finish restarting before the test asserts.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

#[tokio::test]
async fn one_for_one_restarts_only_the_failed_child() {
    let coordinator = coordinator_for("s1").await;
    let factory = Arc::new(FlakyFactory::new());
    coordinator.register_actor_type(Arc::clone(&factory) as Arc<dyn ActorFactory>);

    let parent = ActorRef::new("Root", "root");
    coordinator
        .activate_child(&parent, ActorRef::new("Flaky", "a"), Some(SupervisionStrategy::OneForOne))
        .await
        .unwrap();
    coordinator
        .activate_child(&parent, ActorRef::new("Flaky", "b"), None)
        .await
        .unwrap();

    assert_eq!(bump(&coordinator, "a").await, 1);
    assert_eq!(bump(&coordinator, "a").await, 2);
    assert_eq!(bump(&coordinator, "b").await, 1);

    boom(&coordinator, "a").await;
    settle().await;

    // "a" was recreated: its counter state reset and its activation
    // count went from 1 to 2.
    assert_eq!(bump(&coordinator, "a").await, 1);
    assert_eq!(factory.activation_count("a"), 2);

    // "b" was never touched by the restart.
    assert_eq!(bump(&coordinator, "b").await, 2);
    assert_eq!(factory.activation_count("b"), 1);
}

#[tokio::test]
async fn all_for_one_restarts_every_sibling() {
    let coordinator = coordinator_for("s1").await;
    let factory = Arc::new(FlakyFactory::new());
    coordinator.register_actor_type(Arc::clone(&factory) as Arc<dyn ActorFactory>);

    let parent = ActorRef::new("Root", "root");
    coordinator
        .activate_child(&parent, ActorRef::new("Flaky", "a"), Some(SupervisionStrategy::AllForOne))
        .await
        .unwrap();
    coordinator
        .activate_child(&parent, ActorRef::new("Flaky", "b"), None)
        .await
        .unwrap();
    coordinator
        .activate_child(&parent, ActorRef::new("Flaky", "c"), None)
        .await
        .unwrap();

    bump(&coordinator, "a").await;
    bump(&coordinator, "b").await;
    bump(&coordinator, "c").await;
    assert_eq!(factory.activation_count("a"), 1);
    assert_eq!(factory.activation_count("b"), 1);
    assert_eq!(factory.activation_count("c"), 1);

    boom(&coordinator, "b").await;
    settle().await;

    // Every sibling restarted, including ones activated before "b".
    assert_eq!(factory.activation_count("a"), 2);
    assert_eq!(factory.activation_count("b"), 2);
    assert_eq!(factory.activation_count("c"), 2);
    assert_eq!(bump(&coordinator, "a").await, 1);
    assert_eq!(bump(&coordinator, "c").await, 1);
}

#[tokio::test]
async fn rest_for_one_restarts_the_failed_child_and_later_siblings_only() {
    let coordinator = coordinator_for("s1").await;
    let factory = Arc::new(FlakyFactory::new());
    coordinator.register_actor_type(Arc::clone(&factory) as Arc<dyn ActorFactory>);

    let parent = ActorRef::new("Root", "root");
    coordinator
        .activate_child(&parent, ActorRef::new("Flaky", "a"), Some(SupervisionStrategy::RestForOne))
        .await
        .unwrap();
    coordinator
        .activate_child(&parent, ActorRef::new("Flaky", "b"), None)
        .await
        .unwrap();
    coordinator
        .activate_child(&parent, ActorRef::new("Flaky", "c"), None)
        .await
        .unwrap();

    bump(&coordinator, "a").await;
    bump(&coordinator, "b").await;
    bump(&coordinator, "c").await;

    boom(&coordinator, "b").await;
    settle().await;

    // "a" came before "b" in activation order and is left alone.
    assert_eq!(factory.activation_count("a"), 1);
    assert_eq!(bump(&coordinator, "a").await, 2);

    // "b" and "c" came at or after the failed child and both restarted.
    assert_eq!(factory.activation_count("b"), 2);
    assert_eq!(factory.activation_count("c"), 2);
    assert_eq!(bump(&coordinator, "b").await, 1);
    assert_eq!(bump(&coordinator, "c").await, 1);
}

#[tokio::test]
async fn unsupervised_escalation_stops_instead_of_restarting_in_place() {
    let coordinator = coordinator_for("s1").await;
    let factory = Arc::new(FlakyFactory::new());
    coordinator.register_actor_type(Arc::clone(&factory) as Arc<dyn ActorFactory>);

    // Activated directly via `call`, never through `activate_child` —
    // it has no parent, so escalation has nowhere to go.
    assert_eq!(bump(&coordinator, "lonely").await, 1);
    assert_eq!(factory.activation_count("lonely"), 1);

    boom(&coordinator, "lonely").await;
    settle().await;

    // The stale activation was dropped; the next call activates fresh.
    assert_eq!(bump(&coordinator, "lonely").await, 1);
    assert_eq!(factory.activation_count("lonely"), 2);
}

#[tokio::test]
async fn repeated_self_restart_past_the_window_limit_escalates() {
    use quark::activation::{activate, ActorTypeRegistry, DispatcherConfig, ResponseSink};
    use quark::monitoring::{SupervisionEvent, SupervisionEventKind};
    use quark::OutboundCaller;
    use quark::SiloError;
    use tokio::sync::mpsc;

    struct AlwaysFails;

    #[derive(Debug)]
    struct Fails;
    impl std::fmt::Display for Fails {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "fails")
        }
    }
    impl std::error::Error for Fails {}

    #[async_trait]
    impl Actor for AlwaysFails {
        type Error = Fails;

        async fn dispatch(
            &mut self,
            _method_name: &str,
            _payload: Bytes,
            _ctx: &mut ActorContext,
        ) -> Result<Bytes, ActorError<Fails>> {
            Err(ActorError::Handler(Fails))
        }

        async fn on_error(&mut self, _error: &Fails, _ctx: &mut ActorContext) -> ErrorAction {
            ErrorAction::Restart
        }
    }

    struct AlwaysFailsFactory;
    impl ActorFactory for AlwaysFailsFactory {
        fn actor_type(&self) -> &str {
            "AlwaysFails"
        }
        fn create(&self, _actor_id: &str) -> Box<dyn DynActor> {
            Box::new(AlwaysFails)
        }
    }

    struct NoCaller;
    #[async_trait]
    impl OutboundCaller for NoCaller {
        async fn call(
            &self,
            _actor_type: &str,
            _actor_id: &str,
            _method_name: &str,
            _payload: Bytes,
        ) -> Result<Bytes, SiloError> {
            Err(SiloError::UnknownActorType {
                actor_type: "unused".to_string(),
            })
        }
    }

    struct DiscardingSink;
    #[async_trait]
    impl ResponseSink for DiscardingSink {
        async fn send_response(&self, _response: quark::Envelope) {}
    }

    let types = ActorTypeRegistry::new();
    types.register(Arc::new(AlwaysFailsFactory));
    let (supervision_tx, mut supervision_rx) = mpsc::unbounded_channel::<SupervisionEvent>();

    let handles = activate(
        types,
        ActorRef::new("AlwaysFails", "a"),
        None,
        Arc::new(NoCaller),
        Arc::new(DiscardingSink),
        Some(supervision_tx),
        DispatcherConfig {
            max_restarts_in_window: 2,
            restart_window: Duration::from_secs(60),
            ..DispatcherConfig::default()
        },
    )
    .await
    .unwrap();

    // Each restart sleeps an exponentially growing backoff delay before
    // the instance is usable again, so each send waits out a generous
    // margin rather than racing the dispatcher.
    for _ in 0..3 {
        handles
            .mailbox_tx
            .send(quark::Envelope::request("AlwaysFails", "a", "go", Bytes::new()))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(400)).await;
    }

    let mut saw_restart_limit_exceeded = false;
    while let Ok(event) = supervision_rx.try_recv() {
        if matches!(event.event_kind, SupervisionEventKind::RestartLimitExceeded { .. }) {
            saw_restart_limit_exceeded = true;
        }
    }
    assert!(saw_restart_limit_exceeded);
}
