//! The `Actor` capability: lifecycle hooks and method dispatch (§4.1, §4.6, §9).
//!
//! An actor is any type implementing [`Actor`] — no base class, no
//! runtime type lookup. The activation registry (`crate::activation`)
//! erases concrete actor types behind an object-safe wrapper so a
//! single factory table can construct any registered actor type by
//! name.

pub mod context;
pub mod traits;

pub use context::{ActorContext, NullOutboundCaller, OutboundCaller};
pub use traits::{Actor, ActorError, ErrorAction};
