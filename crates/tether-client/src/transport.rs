//! Transport seam: request/response descriptors and collaborator traits.
//!
//! The client builds [`RequestDescriptor`] values and hands them to an
//! [`HttpTransport`]; the transport answers with a [`ResponseDescriptor`]
//! carrying only what normalization needs: a status code, a content-type
//! classification, and the parsed JSON body, if any. Persistent
//! connections go through [`Connector`] instead.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use tether_core::Secret;

/// Request parameters: a JSON object map.
pub type Params = serde_json::Map<String, Value>;

/// Transport errors.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Network error from the HTTP layer.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Request method is not a valid HTTP token.
    #[error("Invalid HTTP method: {0}")]
    Method(String),

    /// Socket connect failed.
    #[error("Connect error: {0}")]
    Connect(#[from] std::io::Error),

    /// The bundled connector does not open TLS sockets.
    #[error("TLS sockets require a custom Connector")]
    TlsUnsupported,
}

/// The fully-assembled description of one outbound HTTP call.
///
/// Carries either `query` (GET) or `body` (other verbs), never both.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// HTTP method.
    pub method: String,

    /// Use TLS.
    pub use_tls: bool,

    /// Server hostname.
    pub host: String,

    /// Server port.
    pub port: u16,

    /// Absolute request path.
    pub path: String,

    /// Basic-auth username.
    pub username: Option<String>,

    /// Basic-auth password.
    pub password: Option<Secret>,

    /// Query parameters (GET).
    pub query: Option<Params>,

    /// JSON body (non-GET).
    pub body: Option<Value>,

    /// Hint to reuse pooled connections; no effect on the response.
    pub use_pool: bool,
}

/// Content-type classification of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// A JSON media type.
    Json,
    /// Anything else.
    Other,
}

/// The transport's normalized view of one HTTP response.
#[derive(Debug, Clone)]
pub struct ResponseDescriptor {
    /// HTTP status code.
    pub status: u16,

    /// Content-type classification.
    pub content_type: ContentKind,

    /// Parsed JSON body, absent when empty or unparseable.
    pub body: Option<Value>,
}

impl ResponseDescriptor {
    /// Whether the response declared a JSON content type.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self.content_type, ContentKind::Json)
    }
}

/// HTTP collaborator: executes one assembled request.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Execute the request and return the normalized response.
    async fn execute(
        &self,
        request: RequestDescriptor,
    ) -> Result<ResponseDescriptor, TransportError>;
}

/// Socket collaborator: opens one persistent bidirectional connection.
#[async_trait]
pub trait Connector: Send + Sync {
    /// The live connection type.
    type Connection: Send;

    /// Open a connection to `host:port`; resolves once established.
    async fn connect(
        &self,
        host: &str,
        port: u16,
        use_tls: bool,
    ) -> Result<Self::Connection, TransportError>;
}
