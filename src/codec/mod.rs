//! Per-method wire codec layer (§4.1).
//!
//! The core never parses envelope payloads itself; it only ever calls
//! through these pure encode/decode helpers, addressed by
//! `(actor_type, method_name)`. Version skew between sender and
//! receiver codecs surfaces as [`CodecError`], turned into an error
//! envelope by the dispatcher — it is never a panic.

pub mod codec;
pub mod error;
pub mod registry;

pub use codec::{decode_request, decode_response, encode_request, encode_response};
pub use error::CodecError;
pub use registry::CodecRegistry;
