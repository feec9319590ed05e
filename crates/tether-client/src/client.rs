//! The request client: verb methods, raw requests, JSON-RPC calls.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::de::DeserializeOwned;
use serde_json::Value;

use tether_core::{ClientOptions, ConnectionConfig, ValidationError};

use crate::error::{ClientError, RemoteError};
use crate::http::ReqwestTransport;
use crate::rpc::{RpcError, RpcRequest, UNAUTHORIZED_CODE};
use crate::transport::{
    Connector, HttpTransport, Params, RequestDescriptor, ResponseDescriptor, TransportError,
};

/// Client for one remote API server.
///
/// Holds a resolved, immutable [`ConnectionConfig`] plus the
/// per-instance JSON-RPC id counter; callers wanting different settings
/// construct a new client. Generic over the transport seam, with the
/// bundled [`ReqwestTransport`] as the default.
pub struct ApiClient<T = ReqwestTransport> {
    config: ConnectionConfig,
    transport: T,
    next_id: AtomicU64,
}

impl ApiClient<ReqwestTransport> {
    /// Create a client from raw options (a URL string or a field bag).
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the options fail to resolve.
    pub fn new(options: impl Into<ClientOptions>) -> Result<Self, ValidationError> {
        Self::with_transport(options, ReqwestTransport::new())
    }
}

impl<T> ApiClient<T> {
    /// Create a client over a custom transport.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the options fail to resolve.
    pub fn with_transport(
        options: impl Into<ClientOptions>,
        transport: T,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            config: ConnectionConfig::resolve(options)?,
            transport,
            next_id: AtomicU64::new(1),
        })
    }

    /// The resolved connection configuration.
    #[must_use]
    pub const fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    fn descriptor(&self, method: &str, endpoint: &str) -> RequestDescriptor {
        RequestDescriptor {
            method: method.to_string(),
            use_tls: self.config.use_tls,
            host: self.config.host.clone(),
            port: self.config.port,
            path: format!("{}{}", self.config.base_path, endpoint),
            username: self.config.username.clone(),
            password: self.config.password.clone(),
            query: None,
            body: None,
            use_pool: true,
        }
    }
}

impl<T: HttpTransport> ApiClient<T> {
    /// Issue a request and normalize the response.
    ///
    /// `params` is sent as the query for GET and as a JSON body for
    /// every other method; the configured token is injected either way.
    /// 404 is a normal outcome for lookup endpoints and maps to
    /// `Ok(None)`.
    ///
    /// # Errors
    ///
    /// [`ClientError::Auth`] on 401, [`ClientError::Remote`] when the
    /// body reports an application error, [`ClientError::Protocol`] for
    /// responses in an unexpected shape, [`ClientError::Transport`] when
    /// no response was produced at all.
    pub async fn request(
        &self,
        method: &str,
        endpoint: &str,
        params: Params,
    ) -> Result<Option<Value>, ClientError> {
        if method.is_empty() {
            return Err(ValidationError::EmptyMethod.into());
        }

        let mut params = params;
        if let Some(token) = &self.config.auth_token {
            params.insert(
                "token".to_string(),
                Value::String(token.expose().to_string()),
            );
        }

        let mut descriptor = self.descriptor(method, endpoint);
        if method.eq_ignore_ascii_case("GET") {
            descriptor.query = Some(params);
        } else {
            descriptor.body = Some(Value::Object(params));
        }

        tracing::debug!(method, endpoint, "dispatching request");
        let response = self.transport.execute(descriptor).await?;
        normalize_rest(response)
    }

    /// GET `endpoint`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn get(&self, endpoint: &str, params: Params) -> Result<Option<Value>, ClientError> {
        self.request("GET", endpoint, params).await
    }

    /// POST `endpoint`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn post(&self, endpoint: &str, params: Params) -> Result<Option<Value>, ClientError> {
        self.request("POST", endpoint, params).await
    }

    /// PUT `endpoint`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn put(&self, endpoint: &str, params: Params) -> Result<Option<Value>, ClientError> {
        self.request("PUT", endpoint, params).await
    }

    /// DELETE `endpoint`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn delete(
        &self,
        endpoint: &str,
        params: Params,
    ) -> Result<Option<Value>, ClientError> {
        self.request("DELETE", endpoint, params).await
    }

    /// Issue a JSON-RPC call.
    ///
    /// POSTs the `{method, params, id}` envelope to
    /// `base_path + endpoint` with the config's basic-auth credentials;
    /// the token is never injected here. `id` increments once per call,
    /// starting at 1, and never repeats across concurrent calls.
    ///
    /// Returns `body.result`, which may be any JSON value including
    /// `null`.
    ///
    /// # Errors
    ///
    /// [`ClientError::Rpc`] on 401 (code 4294967295) or when the
    /// envelope reports an error, [`ClientError::Protocol`] for
    /// responses in an unexpected shape, [`ClientError::Transport`] when
    /// no response was produced at all.
    pub async fn call(
        &self,
        endpoint: &str,
        method: &str,
        params: Option<Value>,
    ) -> Result<Value, ClientError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let envelope = RpcRequest {
            method: method.to_string(),
            params,
            id,
        };

        let mut descriptor = self.descriptor("POST", endpoint);
        descriptor.body = Some(serde_json::to_value(&envelope).map_err(TransportError::from)?);

        tracing::debug!(method, endpoint, id, "dispatching rpc call");
        let response = self.transport.execute(descriptor).await?;
        normalize_rpc(response)
    }

    /// [`ApiClient::call`], deserialized into a caller-chosen type.
    ///
    /// # Errors
    ///
    /// As [`ApiClient::call`], plus [`ClientError::Protocol`] when the
    /// result does not match `R`.
    pub async fn call_as<R: DeserializeOwned>(
        &self,
        endpoint: &str,
        method: &str,
        params: Option<Value>,
    ) -> Result<R, ClientError> {
        let result = self.call(endpoint, method, params).await?;
        serde_json::from_value(result)
            .map_err(|error| ClientError::Protocol(format!("Bad response ({error}).")))
    }
}

impl<T: Connector> ApiClient<T> {
    /// Open a persistent bidirectional connection to the configured
    /// server.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] when the connection cannot be
    /// established.
    pub async fn connect(&self) -> Result<T::Connection, ClientError> {
        tracing::debug!(host = %self.config.host, port = self.config.port, "connecting");
        self.transport
            .connect(&self.config.host, self.config.port, self.config.use_tls)
            .await
            .map_err(Into::into)
    }
}

/// Normalize a REST response into value / absent / error.
fn normalize_rest(response: ResponseDescriptor) -> Result<Option<Value>, ClientError> {
    if response.status == 404 {
        return Ok(None);
    }
    if response.status == 401 {
        return Err(ClientError::Auth);
    }
    if !response.is_json() {
        return Err(ClientError::Protocol(
            "Bad response (wrong content-type).".to_string(),
        ));
    }
    let Some(body) = response.body else {
        return Err(ClientError::Protocol("Bad response (no body).".to_string()));
    };
    if let Some(error) = body.get("error").filter(|error| !error.is_null()) {
        return Err(RemoteError::from_body(error).into());
    }
    if response.status != 200 {
        return Err(ClientError::Protocol(format!(
            "Status code: {}.",
            response.status
        )));
    }
    Ok(Some(body))
}

/// Normalize a JSON-RPC response into its `result`.
fn normalize_rpc(response: ResponseDescriptor) -> Result<Value, ClientError> {
    if response.status == 401 {
        return Err(RpcError {
            message: "Unauthorized (bad API key).".to_string(),
            code: UNAUTHORIZED_CODE,
        }
        .into());
    }
    if !response.is_json() {
        return Err(ClientError::Protocol(
            "Bad response (wrong content-type).".to_string(),
        ));
    }
    let Some(body) = response.body else {
        return Err(ClientError::Protocol(
            "No body for JSON-RPC response.".to_string(),
        ));
    };
    if let Some(error) = body.get("error").filter(|error| !error.is_null()) {
        return Err(RpcError::from_envelope(error).into());
    }
    if response.status != 200 {
        return Err(ClientError::Protocol(format!(
            "Status code: {}.",
            response.status
        )));
    }
    Ok(body.get("result").cloned().unwrap_or(Value::Null))
}
