//! Client error types.
//!
//! Every failure path gets a dedicated variant so callers cannot forget
//! one; the single non-error outcome (404 on lookup endpoints) is a
//! success value, not an error.

use serde_json::Value;
use thiserror::Error;

use tether_core::ValidationError;

use crate::rpc::RpcError;
use crate::transport::TransportError;

/// Server-reported application error embedded in a REST response body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct RemoteError {
    /// Server-reported message.
    pub message: String,

    /// Server-reported error type, stringified.
    pub kind: String,

    /// Server-reported numeric code.
    pub code: i64,
}

impl RemoteError {
    /// Build from the `error` member of a response body.
    ///
    /// The server's `type` member is taken as-is when it is a string and
    /// in its JSON rendering otherwise; missing members default to empty.
    #[must_use]
    pub fn from_body(error: &Value) -> Self {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let kind = error
            .get("type")
            .map(|value| match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .unwrap_or_default();
        let code = error.get("code").and_then(Value::as_i64).unwrap_or_default();
        Self {
            message,
            kind,
            code,
        }
    }
}

/// Errors surfaced by [`ApiClient`](crate::ApiClient) methods.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The server rejected the request's credentials.
    #[error("Unauthorized (bad API key).")]
    Auth,

    /// The server answered, but not in the expected shape.
    #[error("{0}")]
    Protocol(String),

    /// Application-level error reported in a REST response body.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// JSON-RPC error, server-reported or locally synthesized.
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// The transport failed before a response was produced.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Malformed input.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
