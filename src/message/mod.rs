//! The wire envelope: the sole unit of cross-component traffic.
//!
//! Every request, success response and error response is the same
//! `Envelope` type; shape is distinguished structurally (see the
//! invariants on [`Envelope`]), never by a separate request/response
//! type pair. Generated per-method codecs (see [`crate::codec`]) only
//! ever touch the opaque `payload` / `response_payload` byte buffers.

pub mod envelope;

pub use envelope::Envelope;
