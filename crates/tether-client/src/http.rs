//! Bundled transport over reqwest and tokio.

use async_trait::async_trait;
use reqwest::header::{CONNECTION, CONTENT_TYPE, HeaderValue};
use serde_json::Value;
use tokio::net::TcpStream;

use tether_core::Secret;

use crate::transport::{
    Connector, ContentKind, HttpTransport, Params, RequestDescriptor, ResponseDescriptor,
    TransportError,
};

/// HTTP transport backed by a pooled [`reqwest::Client`].
///
/// Also opens plaintext TCP sockets for [`Connector`]; TLS sockets are
/// left to custom connectors.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with a fresh pooled client.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Create a transport over a preconfigured client (timeouts, proxies).
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(
        &self,
        request: RequestDescriptor,
    ) -> Result<ResponseDescriptor, TransportError> {
        let scheme = if request.use_tls { "https" } else { "http" };
        let url = format!(
            "{scheme}://{}:{}{}",
            request.host, request.port, request.path
        );

        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|_| TransportError::Method(request.method.clone()))?;

        let mut builder = self.client.request(method, &url);
        if let Some(query) = &request.query {
            builder = builder.query(&flatten_query(query));
        }
        if let Some(username) = &request.username {
            builder = builder.basic_auth(username, request.password.as_ref().map(Secret::expose));
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if !request.use_pool {
            builder = builder.header(CONNECTION, HeaderValue::from_static("close"));
        }

        let response = builder.send().await?;

        let status = response.status().as_u16();
        let content_type = classify_content_type(
            response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok()),
        );
        let text = response.text().await?;
        let body = if text.trim().is_empty() {
            None
        } else {
            serde_json::from_str(&text).ok()
        };

        tracing::debug!(%url, status, "request executed");

        Ok(ResponseDescriptor {
            status,
            content_type,
            body,
        })
    }
}

#[async_trait]
impl Connector for ReqwestTransport {
    type Connection = TcpStream;

    async fn connect(
        &self,
        host: &str,
        port: u16,
        use_tls: bool,
    ) -> Result<TcpStream, TransportError> {
        if use_tls {
            return Err(TransportError::TlsUnsupported);
        }
        let stream = TcpStream::connect((host, port)).await?;
        tracing::debug!(host, port, "connection established");
        Ok(stream)
    }
}

/// Render query values as strings: JSON strings as-is, everything else
/// in its JSON rendering.
fn flatten_query(params: &Params) -> Vec<(String, String)> {
    params
        .iter()
        .map(|(key, value)| {
            let rendered = match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            (key.clone(), rendered)
        })
        .collect()
}

/// Classify a content-type header as JSON or other.
fn classify_content_type(header: Option<&str>) -> ContentKind {
    let Some(header) = header else {
        return ContentKind::Other;
    };
    let essence = header
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    if essence.ends_with("/json") || essence.ends_with("+json") {
        ContentKind::Json
    } else {
        ContentKind::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_flatten_query_renders_values() {
        let mut params = Params::new();
        params.insert("name".to_string(), json!("spool"));
        params.insert("limit".to_string(), json!(5));
        params.insert("all".to_string(), json!(true));

        // `serde_json::Map` iterates in key order.
        let flat = flatten_query(&params);
        assert_eq!(
            flat,
            vec![
                ("all".to_string(), "true".to_string()),
                ("limit".to_string(), "5".to_string()),
                ("name".to_string(), "spool".to_string()),
            ]
        );
    }

    #[test]
    fn test_classify_content_type() {
        assert_eq!(
            classify_content_type(Some("application/json")),
            ContentKind::Json
        );
        assert_eq!(
            classify_content_type(Some("application/json; charset=utf-8")),
            ContentKind::Json
        );
        assert_eq!(
            classify_content_type(Some("application/problem+json")),
            ContentKind::Json
        );
        assert_eq!(classify_content_type(Some("text/html")), ContentKind::Other);
        assert_eq!(classify_content_type(None), ContentKind::Other);
    }
}
