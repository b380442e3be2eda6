use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Wire error codes.
///
/// The JSON-RPC 2.0 reserved codes plus the ad hoc `422` used for
/// JSONAPI-shaped validation errors. Callers may use any other `i64` for
/// their own domain errors.
pub mod code {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
    /// Validation errors wrapping a JSONAPI error array.
    pub const JSONAPI_ERRORS: i64 = 422;
}

/// A structured RPC error, serializing to exactly `{code, message, data}`.
///
/// Returning one of these from a handler (as [`HandlerError::Rpc`]) is the
/// sanctioned way to deliver a structured error reply to the caller; any
/// other failure is logged server-side and produces no reply at all.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Error)]
#[error("rpc error {code}: {message}")]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl RpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// The reply sent when a request names a method the server does not
    /// expose. The requested name travels in `data`.
    pub fn method_not_found(method: &str) -> Self {
        Self::new(code::METHOD_NOT_FOUND, "Method not found").with_data(json!({ "method": method }))
    }

    /// Wraps a JSONAPI-shaped result (an object with an `errors` array) into
    /// the wire error object under the fixed 422 code.
    pub fn jsonapi(data: Value) -> Self {
        Self::new(code::JSONAPI_ERRORS, "JSONAPI error").with_data(data)
    }
}

/// What a [`Handler`](crate::Handler) invocation can produce besides a result.
///
/// The two variants are the error-tier split: `Rpc` becomes a structured
/// error reply; `Internal` propagates to the consume boundary, where it is
/// logged and the message dropped without any reply.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(err.into())
    }
}

/// Failures constructing or starting an [`RpcServer`](crate::RpcServer).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ServerError {
    #[error("broker operation failed: {0}")]
    Broker(#[from] lapin::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_to_exactly_code_message_data() {
        let err = RpcError::new(code::INVALID_PARAMS, "bad params");
        let wire = serde_json::to_value(&err).expect("serialize");
        assert_eq!(
            wire,
            json!({ "code": -32602, "message": "bad params", "data": null })
        );
    }

    #[test]
    fn method_not_found_carries_the_requested_name() {
        let err = RpcError::method_not_found("bogus");
        assert_eq!(err.code, code::METHOD_NOT_FOUND);
        assert_eq!(err.message, "Method not found");
        assert_eq!(err.data, Some(json!({ "method": "bogus" })));
    }

    #[test]
    fn jsonapi_error_uses_fixed_code_and_message() {
        let err = RpcError::jsonapi(json!({ "errors": [{ "title": "x" }] }));
        assert_eq!(err.code, 422);
        assert_eq!(err.message, "JSONAPI error");
    }

    #[test]
    fn deserializes_without_data_field() {
        let err: RpcError =
            serde_json::from_value(json!({ "code": 1, "message": "m" })).expect("deserialize");
        assert_eq!(err, RpcError::new(1, "m"));
    }
}
