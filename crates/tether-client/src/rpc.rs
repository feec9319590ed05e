//! JSON-RPC envelope types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Code used for locally synthesized unauthorized errors: -1 as u32.
pub const UNAUTHORIZED_CODE: u32 = u32::MAX;

/// JSON-RPC request envelope.
///
/// `params` serializes as `null` when absent. `id` comes from the
/// client's per-instance counter, starting at 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    /// Method name.
    pub method: String,

    /// Method parameters, nullable.
    pub params: Option<Value>,

    /// Request ID.
    pub id: u64,
}

/// JSON-RPC error carrying the numeric code the server reported.
///
/// Distinct from HTTP status handling: `code` is the `error.code` member
/// of the response envelope, carried in its unsigned 32-bit
/// representation (so a wire value of -1 reads as 4294967295).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("RPC error {code}: {message}")]
pub struct RpcError {
    /// Error message.
    pub message: String,

    /// Numeric error code.
    pub code: u32,
}

impl RpcError {
    /// Build from the `error` member of a response envelope.
    ///
    /// Missing members default to an empty message and code 0.
    #[must_use]
    pub fn from_envelope(error: &Value) -> Self {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let code = error.get("code").and_then(Value::as_i64).unwrap_or_default() as u32;
        Self { message, code }
    }
}
