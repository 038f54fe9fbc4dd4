//! NZBGet dispatch client
//!
//! Submits one release to a remote NZBGet instance over XML-RPC:
//! 1. Build the authenticated endpoint (fails fast without a host)
//! 2. Probe the server with `writelog`
//! 3. Derive category, priority and dedupe fields ([`job::JobPlan`])
//! 4. Ask for `version` and pick a [`protocol::CallShape`]
//! 5. Encode the payload, fetching URLs first for legacy servers
//! 6. Send the matching `append`/`appendurl` call and interpret the reply
//!
//! A single attempt is made; nothing is retried.

pub mod job;
pub mod protocol;
pub mod rpc;
pub mod xmlrpc;

use crate::config::NzbGetConfig;
use crate::error::{DispatchError, Result};
use crate::types::{Payload, SubmissionRequest};
use crate::utils::{USER_AGENT, build_http_client, fetch_bytes};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{Local, NaiveDate};
use tracing::{debug, error, info};

use job::JobPlan;
use protocol::{CallShape, Content, parse_version};
use rpc::{Endpoint, RpcClient};
use xmlrpc::Value;

pub use protocol::Accepted;

/// Anything that can hand a release to a download client
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Submit `request`, reporting why it failed if it did
    async fn dispatch(
        &self,
        request: &SubmissionRequest,
    ) -> std::result::Result<Accepted, DispatchError>;
}

/// Client for a single NZBGet instance
#[derive(Clone, Debug)]
pub struct NzbGetClient {
    config: NzbGetConfig,
    http: reqwest::Client,
}

impl NzbGetClient {
    /// Create a client for the configured endpoint
    ///
    /// A missing host is not an error here; it is reported by each
    /// submission so a misconfigured host never causes network I/O.
    pub fn new(config: NzbGetConfig) -> Result<Self> {
        let http = build_http_client(config.timeout, USER_AGENT)?;
        Ok(Self { config, http })
    }

    /// Configuration this client was built with
    pub fn config(&self) -> &NzbGetConfig {
        &self.config
    }

    /// Submit a release and report only whether it was queued
    ///
    /// Every failure is logged here and folded into `false`.
    pub async fn submit(&self, request: &SubmissionRequest) -> bool {
        match self.try_submit(request).await {
            Ok(accepted) => {
                debug!(
                    shape = ?accepted.shape,
                    nzb_id = ?accepted.nzb_id,
                    "NZB sent to NZBGet successfully"
                );
                true
            }
            Err(e) => {
                error!(
                    error = %e,
                    code = e.error_code(),
                    "Failed to send {} to NZBGet",
                    request.nzb_name()
                );
                false
            }
        }
    }

    /// Submit a release, deciding recency against the local date
    pub async fn try_submit(
        &self,
        request: &SubmissionRequest,
    ) -> std::result::Result<Accepted, DispatchError> {
        self.try_submit_on(request, Local::now().date_naive()).await
    }

    /// Submit a release, deciding recency against `today`
    pub async fn try_submit_on(
        &self,
        request: &SubmissionRequest,
        today: NaiveDate,
    ) -> std::result::Result<Accepted, DispatchError> {
        let endpoint = Endpoint::from_config(&self.config)?;
        let rpc = RpcClient::new(&self.http, &endpoint);

        self.probe(&rpc, &endpoint, &request.nzb_name()).await?;

        let plan = JobPlan::new(request, &self.config, today);

        info!("Sending NZB to NZBGet");
        debug!(
            url = %endpoint.redacted(),
            category = %plan.category,
            add_to_top = plan.add_to_top,
            dupe_key = %plan.dupe_key,
            dupe_score = plan.dupe_score,
            "Prepared NZBGet job {}",
            plan.name
        );

        let version_reply = rpc
            .call("version", &[])
            .await
            .map_err(|e| e.into_call_error())?;
        let version_str = version_reply.as_str().ok_or_else(|| {
            DispatchError::UnexpectedReply(format!(
                "expected a version string, got {:?}",
                version_reply
            ))
        })?;
        let shape = CallShape::for_version(parse_version(version_str));
        debug!(version = %version_str, ?shape, "Selected NZBGet call shape");

        let content = self.prepare_content(&request.payload, shape).await?;
        let method = shape.method(&content);
        let params = shape.params(&plan, &content);

        let reply = rpc
            .call(method, &params)
            .await
            .map_err(|e| e.into_call_error())?;
        shape.interpret(&reply, &plan.name)
    }

    /// Round-trip a log message to check connectivity and credentials
    async fn probe(
        &self,
        rpc: &RpcClient<'_>,
        endpoint: &Endpoint,
        nzb_name: &str,
    ) -> std::result::Result<(), DispatchError> {
        let message = format!(
            "{} connected to drop of {} any moment now.",
            job::DUPE_KEY_BRAND,
            nzb_name
        );

        let reply = rpc
            .call("writelog", &[Value::from("INFO"), Value::from(message)])
            .await
            .map_err(|e| e.into_probe_error(endpoint))?;

        if reply.as_bool() == Some(true) {
            debug!("Successfully connected to NZBGet");
        } else {
            error!("Successfully connected to NZBGet, but unable to send a message");
        }
        Ok(())
    }

    /// Encode the payload, fetching it first if the server cannot
    async fn prepare_content(
        &self,
        payload: &Payload,
        shape: CallShape,
    ) -> std::result::Result<Content, DispatchError> {
        match payload {
            Payload::Inline(data) => Ok(Content::Data(STANDARD.encode(data))),
            Payload::Url(url) if shape.supports_url() => Ok(Content::Url(url.clone())),
            Payload::Url(url) => {
                debug!(url = %url, "NZBGet cannot fetch URLs, downloading NZB first");
                let data = fetch_bytes(&self.http, url).await.map_err(|source| {
                    DispatchError::PayloadFetch {
                        url: url.clone(),
                        source,
                    }
                })?;
                Ok(Content::Data(STANDARD.encode(data)))
            }
        }
    }
}

#[async_trait]
impl Dispatcher for NzbGetClient {
    async fn dispatch(
        &self,
        request: &SubmissionRequest,
    ) -> std::result::Result<Accepted, DispatchError> {
        self.try_submit(request).await
    }
}
