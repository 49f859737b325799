//! Call-chain context and reentrancy detection (§4.8).
//!
//! A chain scopes one logical request tree across reentrant, cross-actor
//! (and cross-silo) calls. It is carried in envelope metadata and
//! restored into ambient task-local context ([`CURRENT_CHAIN`]) when an
//! actor's dispatcher turn begins, so outbound calls issued from within
//! that turn automatically inherit and extend it.

pub mod context;
pub mod error;

pub use context::{current, scope, ChainMeta, CURRENT_CHAIN};
pub use error::ChainError;
