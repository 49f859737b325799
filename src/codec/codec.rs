// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use bytes::Bytes;
use serde::{de::DeserializeOwned, Serialize};

// Layer 3: Internal module imports
use super::error::CodecError;

/// Encodes `value` as the request (or response) payload for
/// `actor_type`/`method_name`. Pure: fails only if `T`'s `Serialize`
/// impl itself fails, which `serde_cbor` does not do for ordinary data.
pub fn encode_request<T: Serialize>(
    value: &T,
    actor_type: &str,
    method_name: &str,
) -> Result<Bytes, CodecError> {
    serde_cbor::to_vec(value)
        .map(Bytes::from)
        .map_err(|source| CodecError::MalformedRequest {
            actor_type: actor_type.to_string(),
            method_name: method_name.to_string(),
            source,
        })
}

/// Decodes request bytes into `T`. Fails only with `CodecError` on
/// malformed bytes, per the §4.1 contract.
pub fn decode_request<T: DeserializeOwned>(
    bytes: &[u8],
    actor_type: &str,
    method_name: &str,
) -> Result<T, CodecError> {
    serde_cbor::from_slice(bytes).map_err(|source| CodecError::MalformedRequest {
        actor_type: actor_type.to_string(),
        method_name: method_name.to_string(),
        source,
    })
}

/// Encodes a method's return value as the response payload.
pub fn encode_response<T: Serialize>(
    value: &T,
    actor_type: &str,
    method_name: &str,
) -> Result<Bytes, CodecError> {
    serde_cbor::to_vec(value)
        .map(Bytes::from)
        .map_err(|source| CodecError::MalformedResponse {
            actor_type: actor_type.to_string(),
            method_name: method_name.to_string(),
            source,
        })
}

/// Decodes response bytes into `T`.
pub fn decode_response<T: DeserializeOwned>(
    bytes: &[u8],
    actor_type: &str,
    method_name: &str,
) -> Result<T, CodecError> {
    serde_cbor::from_slice(bytes).map_err(|source| CodecError::MalformedResponse {
        actor_type: actor_type.to_string(),
        method_name: method_name.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Args {
        amount: i64,
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn request_round_trips() {
        let args = Args { amount: 7 };
        let bytes = encode_request(&args, "Counter", "increment").unwrap();
        let back: Args = decode_request(&bytes, "Counter", "increment").unwrap();
        assert_eq!(args, back);
    }

    #[test]
    #[allow(clippy::expect_used)]
    fn malformed_request_bytes_surface_codec_error() {
        let err = decode_request::<Args>(b"not cbor \xff\xff", "Counter", "increment")
            .expect_err("should fail to decode");
        assert!(matches!(err, CodecError::MalformedRequest { .. }));
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn response_round_trips() {
        let value = 42i64;
        let bytes = encode_response(&value, "Counter", "increment").unwrap();
        let back: i64 = decode_response(&bytes, "Counter", "increment").unwrap();
        assert_eq!(value, back);
    }
}
