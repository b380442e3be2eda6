//! Wire envelopes and per-delivery transport metadata.
//!
//! Requests and replies travel as UTF-8 JSON bodies on broker messages. The
//! reply is correlated to its request purely through transport metadata: the
//! inbound message's `reply_to` names the queue the reply is published to
//! (via the default exchange) and its `correlation_id` is echoed on the
//! outbound message.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::RpcError;

/// The only protocol version this crate speaks.
pub const PROTOCOL_VERSION: &str = "2.0";

/// Zero-sized marker for the `jsonrpc` field; serializes to `"2.0"` and
/// rejects any other value on parse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProtocolVersion;

impl Serialize for ProtocolVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(PROTOCOL_VERSION)
    }
}

impl<'de> Deserialize<'de> for ProtocolVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == PROTOCOL_VERSION {
            Ok(ProtocolVersion)
        } else {
            Err(D::Error::custom(format!(
                "unsupported jsonrpc version `{raw}`"
            )))
        }
    }
}

/// An inbound request body: `{"method": ..., "params": ..., "id": ...}`.
///
/// `id` is an opaque caller-chosen value echoed verbatim on the reply;
/// absent or duplicate ids are the caller's responsibility. `params` and
/// `id` default to JSON null when omitted — only `method` is required.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub id: Value,
}

/// An outbound reply body.
///
/// Exactly one of `result`/`error` is present, never both — the two variants
/// make any other shape unrepresentable. Both carry the echoed request id
/// and the fixed `"jsonrpc": "2.0"` member.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReplyEnvelope {
    Success {
        id: Value,
        jsonrpc: ProtocolVersion,
        result: Value,
    },
    Error {
        id: Value,
        jsonrpc: ProtocolVersion,
        error: RpcError,
    },
}

impl ReplyEnvelope {
    pub fn result(id: Value, result: Value) -> Self {
        Self::Success {
            id,
            jsonrpc: ProtocolVersion,
            result,
        }
    }

    pub fn error(id: Value, error: RpcError) -> Self {
        Self::Error {
            id,
            jsonrpc: ProtocolVersion,
            error,
        }
    }

    /// The echoed request id.
    pub fn id(&self) -> &Value {
        match self {
            Self::Success { id, .. } | Self::Error { id, .. } => id,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

/// The transport metadata a reply must thread back unchanged.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeliveryProperties {
    pub correlation_id: Option<String>,
    pub reply_to: Option<String>,
}

impl From<&lapin::BasicProperties> for DeliveryProperties {
    fn from(properties: &lapin::BasicProperties) -> Self {
        Self {
            correlation_id: properties
                .correlation_id()
                .as_ref()
                .map(|s| s.as_str().to_string()),
            reply_to: properties
                .reply_to()
                .as_ref()
                .map(|s| s.as_str().to_string()),
        }
    }
}
