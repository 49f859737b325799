// Layer 1: Standard library imports
use std::fmt;

// Layer 2: Third-party crate imports
use bytes::Bytes;
use chrono::{DateTime, Utc}; // §3.2 MANDATORY
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use crate::chain::ChainMeta;
use crate::util::ids::MessageId;

/// The wire envelope — the sole unit of cross-component traffic.
///
/// Exactly one of `{request, successful response, error response}` holds
/// for any given envelope:
///
/// - **request**: `response_payload` empty and `is_error` false.
/// - **successful response**: `response_payload` non-empty and `is_error` false.
/// - **error response**: `is_error` true (`response_payload` may be empty).
///
/// This shape is what the dual-filter routing in
/// [`crate::silo::SiloCoordinator`] discriminates on; never add a field
/// whose presence/absence the shape depends on without updating both
/// filters.
///
/// # Example
/// ```rust
/// use quark::message::Envelope;
///
/// let req = Envelope::request("Counter", "shard-7", "increment", vec![1].into());
/// assert!(req.is_request());
///
/// let ok = req.clone().into_success_response(vec![2].into());
/// assert!(ok.is_success_response());
///
/// let err = req.into_error_response("boom".to_string());
/// assert!(err.is_error_response());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub message_id: MessageId,
    pub correlation_id: MessageId,
    pub actor_type: String,
    pub actor_id: String,
    pub method_name: String,
    pub payload: Bytes,
    pub response_payload: Bytes,
    pub is_error: bool,
    pub error_message: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub chain: Option<ChainMeta>,
    /// Set for a reminder firing (§4.10): the dispatcher routes these to
    /// `Actor::on_reminder` instead of `Actor::dispatch`, bypassing
    /// method lookup and codec decoding entirely. Never set on an
    /// envelope that also flows through the dual-filter transport path.
    pub is_reminder: bool,
}

impl Envelope {
    /// Builds a fresh request envelope; `correlation_id` equals `message_id`.
    pub fn request(
        actor_type: impl Into<String>,
        actor_id: impl Into<String>,
        method_name: impl Into<String>,
        payload: Bytes,
    ) -> Self {
        let message_id = MessageId::new();
        Self {
            message_id,
            correlation_id: message_id,
            actor_type: actor_type.into(),
            actor_id: actor_id.into(),
            method_name: method_name.into(),
            payload,
            response_payload: Bytes::new(),
            is_error: false,
            error_message: None,
            timestamp: Utc::now(),
            chain: None,
            is_reminder: false,
        }
    }

    /// Builds an envelope carrying a due reminder's payload to its
    /// owning actor's `on_reminder` hook (§4.10). Shaped like a request
    /// so the dispatch subscriber's dual-filter predicate still routes
    /// it, but flagged so the turn loop skips method lookup.
    pub fn reminder(actor_type: impl Into<String>, actor_id: impl Into<String>, name: impl Into<String>, payload: Bytes) -> Self {
        let message_id = MessageId::new();
        Self {
            message_id,
            correlation_id: message_id,
            actor_type: actor_type.into(),
            actor_id: actor_id.into(),
            method_name: name.into(),
            payload,
            response_payload: Bytes::new(),
            is_error: false,
            error_message: None,
            timestamp: Utc::now(),
            chain: None,
            is_reminder: true,
        }
    }

    pub fn with_chain(mut self, chain: ChainMeta) -> Self {
        self.chain = Some(chain);
        self
    }

    /// Turns this (request) envelope into a success response correlated to it.
    pub fn into_success_response(self, response_payload: Bytes) -> Self {
        Self {
            message_id: MessageId::new(),
            correlation_id: self.correlation_id,
            actor_type: self.actor_type,
            actor_id: self.actor_id,
            method_name: self.method_name,
            payload: Bytes::new(),
            response_payload,
            is_error: false,
            error_message: None,
            timestamp: Utc::now(),
            chain: self.chain,
            is_reminder: false,
        }
    }

    /// Turns this (request) envelope into an error response correlated to it.
    pub fn into_error_response(self, error_message: impl Into<String>) -> Self {
        Self {
            message_id: MessageId::new(),
            correlation_id: self.correlation_id,
            actor_type: self.actor_type,
            actor_id: self.actor_id,
            method_name: self.method_name,
            payload: Bytes::new(),
            response_payload: Bytes::new(),
            is_error: true,
            error_message: Some(error_message.into()),
            timestamp: Utc::now(),
            chain: self.chain,
            is_reminder: false,
        }
    }

    /// request ⇔ `response_payload` empty ∧ ¬`is_error`.
    pub fn is_request(&self) -> bool {
        self.response_payload.is_empty() && !self.is_error
    }

    /// successful response ⇔ `response_payload` non-empty ∧ ¬`is_error`.
    pub fn is_success_response(&self) -> bool {
        !self.response_payload.is_empty() && !self.is_error
    }

    /// error response ⇔ `is_error`.
    pub fn is_error_response(&self) -> bool {
        self.is_error
    }

    /// Dual-filter predicate: does the silo dispatch subscriber act on this envelope?
    pub fn is_dispatch_target(&self) -> bool {
        self.is_request()
    }

    /// Dual-filter predicate: does the transport egress subscriber act on this envelope?
    pub fn is_egress_target(&self) -> bool {
        !self.is_request()
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}#{} [{}]",
            self.actor_type, self.actor_id, self.method_name, self.message_id
        )
    }
}
