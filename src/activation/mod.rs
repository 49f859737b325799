//! Activation registry and per-instance dispatcher (§4.6).

pub mod dispatcher;
pub mod dyn_actor;
pub mod error;
pub mod factory;
pub mod response_sink;
pub mod state;

pub use dispatcher::{activate, DispatcherConfig, DispatcherHandles};
pub use dyn_actor::{DynActor, DynActorError, DynDispatchError};
pub use error::ActivationError;
pub use factory::{ActorFactory, ActorTypeRegistry};
pub use response_sink::ResponseSink;
pub use state::{ActivationState, ActorInstanceState};
