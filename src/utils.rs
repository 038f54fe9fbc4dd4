//! Utility functions shared by both adapters

use crate::error::{FetchError, Result};
use std::time::Duration;

/// User-Agent sent with every request
pub const USER_AGENT: &str = concat!("acquire-bridge/", env!("CARGO_PKG_VERSION"));

/// Build an HTTP client with a request timeout and user agent
///
/// Both adapters delegate cancellation entirely to this timeout. An invalid
/// user agent surfaces here as [`crate::Error::Network`].
pub fn build_http_client(timeout: Duration, user_agent: &str) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()?)
}

/// Fetch a URL and return its body
///
/// Non-success statuses are errors.
pub async fn fetch_bytes(
    client: &reqwest::Client,
    url: &str,
) -> std::result::Result<Vec<u8>, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::from_transport(&e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| FetchError::Body(e.to_string()))?;
    Ok(bytes.to_vec())
}
