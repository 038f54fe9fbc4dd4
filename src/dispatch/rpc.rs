//! XML-RPC transport over HTTP with basic auth

use super::xmlrpc::{self, Reply, Value};
use crate::config::NzbGetConfig;
use crate::error::DispatchError;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;
use url::Url;

/// Fault string / HTTP reason NZBGet uses for rejected credentials
pub(crate) const UNAUTHORIZED: &str = "Unauthorized";

/// Authenticated NZBGet endpoint
#[derive(Clone, Debug)]
pub struct Endpoint {
    address: Url,
    username: String,
    password: String,
}

impl Endpoint {
    /// Build `{scheme}://{user}:{password}@{host}/xmlrpc` from configuration
    ///
    /// Fails with [`DispatchError::Configuration`] when no host is set.
    pub fn from_config(config: &NzbGetConfig) -> Result<Self, DispatchError> {
        let host = config.host().ok_or_else(|| {
            DispatchError::Configuration(
                "No NZBGet host found in configuration. Please configure it.".to_string(),
            )
        })?;

        let authority = match config.port {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        let invalid = |reason: String| {
            DispatchError::Configuration(format!("invalid NZBGet host '{}': {}", authority, reason))
        };

        let mut address = Url::parse(&format!("{}://{}/xmlrpc", config.scheme(), authority))
            .map_err(|e| invalid(e.to_string()))?;
        address
            .set_username(&config.username)
            .map_err(|_| invalid("cannot carry credentials".to_string()))?;
        address
            .set_password(Some(&config.password))
            .map_err(|_| invalid("cannot carry credentials".to_string()))?;

        Ok(Self {
            address,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// Full address including credentials
    pub fn address(&self) -> &Url {
        &self.address
    }

    /// Address with the password replaced, safe for logs
    pub fn redacted(&self) -> String {
        let mut url = self.address.clone();
        if url.password().is_some() {
            let _ = url.set_password(Some("***"));
        }
        url.to_string()
    }

    fn request_url(&self) -> Url {
        let mut url = self.address.clone();
        let _ = url.set_username("");
        let _ = url.set_password(None);
        url
    }
}

/// Failure of a single RPC round-trip
#[derive(Debug)]
pub(crate) enum RpcError {
    /// Host unreachable or timed out before answering
    Connect(String),
    /// Non-success HTTP status
    Status { status: u16, reason: String },
    /// XML-RPC fault
    Fault { code: i64, message: String },
    /// Request failed after connecting, or body unreadable
    Transport(String),
    /// Body is not a valid `methodResponse`
    Decode(String),
}

impl RpcError {
    fn is_unauthorized(&self) -> bool {
        match self {
            RpcError::Status { status, reason } => *status == 401 || reason == UNAUTHORIZED,
            RpcError::Fault { message, .. } => message == UNAUTHORIZED,
            _ => false,
        }
    }

    /// Classify a failure of the liveness probe
    pub(crate) fn into_probe_error(self, endpoint: &Endpoint) -> DispatchError {
        if self.is_unauthorized() {
            return DispatchError::Authentication;
        }
        match self {
            RpcError::Connect(reason) => DispatchError::Connectivity {
                endpoint: endpoint.redacted(),
                reason,
            },
            RpcError::Status { reason, .. } => DispatchError::Protocol { message: reason },
            RpcError::Fault { code, message } => {
                debug!(code, "NZBGet answered the probe with a fault");
                DispatchError::Protocol { message }
            }
            RpcError::Transport(reason) => DispatchError::Connectivity {
                endpoint: endpoint.redacted(),
                reason,
            },
            RpcError::Decode(reason) => DispatchError::Protocol { message: reason },
        }
    }

    /// Classify a failure after the probe succeeded
    pub(crate) fn into_call_error(self) -> DispatchError {
        if self.is_unauthorized() {
            return DispatchError::Authentication;
        }
        match self {
            RpcError::Connect(reason) | RpcError::Transport(reason) => {
                DispatchError::Transport(reason)
            }
            RpcError::Status { reason, .. } => DispatchError::Protocol { message: reason },
            RpcError::Fault { code, message } => {
                debug!(code, "NZBGet answered with a fault");
                DispatchError::Protocol { message }
            }
            RpcError::Decode(reason) => DispatchError::UnexpectedReply(reason),
        }
    }
}

/// Issues XML-RPC calls against one endpoint
pub(crate) struct RpcClient<'a> {
    http: &'a reqwest::Client,
    endpoint: &'a Endpoint,
}

impl<'a> RpcClient<'a> {
    pub(crate) fn new(http: &'a reqwest::Client, endpoint: &'a Endpoint) -> Self {
        Self { http, endpoint }
    }

    pub(crate) async fn call(&self, method: &str, params: &[Value]) -> Result<Value, RpcError> {
        let body = xmlrpc::encode_call(method, params)
            .map_err(|e| RpcError::Transport(format!("failed to encode {}: {}", method, e)))?;

        let response = self
            .http
            .post(self.endpoint.request_url())
            .basic_auth(&self.endpoint.username, Some(&self.endpoint.password))
            .header(CONTENT_TYPE, "text/xml")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    RpcError::Connect(e.to_string())
                } else {
                    RpcError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        match xmlrpc::decode_response(&text).map_err(|e| RpcError::Decode(e.to_string()))? {
            Reply::Value(value) => Ok(value),
            Reply::Fault { code, message } => Err(RpcError::Fault { code, message }),
        }
    }
}
