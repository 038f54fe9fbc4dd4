//! Error types for acquire-bridge
//!
//! This module provides the error taxonomy for both adapters:
//! - [`DispatchError`] for submissions to a remote NZBGet queue manager
//! - [`FormatError`] for feed documents and individual feed entries
//! - [`SearchError`] for per-term failures while querying a feed
//!
//! None of these are meant to abort a batch. The public entry points
//! ([`crate::dispatch::NzbGetClient::submit`], [`crate::search::TorrentzProvider::search`])
//! log them and fold them into a boolean or a partial result set, while the
//! `try_*` variants hand them back to callers that want the detail.

use thiserror::Error;

/// Result type alias for acquire-bridge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for acquire-bridge
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "nzbget.host")
        key: Option<String>,
    },

    /// Submission to the remote queue manager failed
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// Feed document or feed entry could not be parsed
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    /// Feed query failed for a single search term
    #[error("search error: {0}")]
    Search(#[from] SearchError),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error for a specific key
    pub fn config(message: impl Into<String>, key: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Machine-readable error code, suitable for log fields and metrics labels
    pub fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Dispatch(e) => e.error_code(),
            Error::Format(e) => e.error_code(),
            Error::Search(_) => "search_error",
            Error::Network(_) => "network_error",
            Error::Serialization(_) => "serialization_error",
        }
    }
}

/// Errors raised while submitting a job to NZBGet
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Required endpoint configuration is missing; no I/O was attempted
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The remote host could not be reached (refused, DNS, timeout)
    #[error("NZBGet is not responding at {endpoint}: {reason}")]
    Connectivity {
        /// Endpoint address with the password redacted
        endpoint: String,
        /// Underlying transport failure
        reason: String,
    },

    /// The remote rejected the configured credentials
    #[error("NZBGet username or password is incorrect")]
    Authentication,

    /// The remote answered with a protocol fault other than an auth failure
    #[error("protocol error: {message}")]
    Protocol {
        /// Fault string or HTTP reason reported by the remote
        message: String,
    },

    /// The job only carried a URL and fetching it for inline upload failed
    #[error("failed to fetch payload from {url}: {source}")]
    PayloadFetch {
        /// URL that was fetched
        url: String,
        /// Why the fetch failed
        #[source]
        source: FetchError,
    },

    /// The remote processed the call but refused to queue the job
    #[error("NZBGet could not add {name} to the queue")]
    Rejected {
        /// Job name sent to the remote
        name: String,
    },

    /// Transport failure after the liveness probe succeeded
    #[error("connect error to NZBGet: {0}")]
    Transport(String),

    /// The remote replied with something other than the expected return type
    #[error("unexpected reply from NZBGet: {0}")]
    UnexpectedReply(String),
}

impl DispatchError {
    /// Machine-readable error code
    pub fn error_code(&self) -> &str {
        match self {
            DispatchError::Configuration(_) => "configuration_error",
            DispatchError::Connectivity { .. } => "connectivity_error",
            DispatchError::Authentication => "authentication_error",
            DispatchError::Protocol { .. } => "protocol_error",
            DispatchError::PayloadFetch { .. } => "payload_fetch_error",
            DispatchError::Rejected { .. } => "rejected",
            DispatchError::Transport(_) => "transport_error",
            DispatchError::UnexpectedReply(_) => "unexpected_reply",
        }
    }

    /// Returns true if a later attempt of the same submission could succeed.
    ///
    /// This crate never retries on its own; the flag is for callers that run
    /// their own retry policy.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DispatchError::Connectivity { .. }
                | DispatchError::Transport(_)
                | DispatchError::PayloadFetch { .. }
        )
    }
}

/// Failure to download a document over HTTP
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request timed out
    #[error("request timed out")]
    Timeout,

    /// The host could not be reached
    #[error("connection failed: {0}")]
    Connect(String),

    /// The request failed for another reason
    #[error("request failed: {0}")]
    Request(String),

    /// The server answered with a non-success status
    #[error("HTTP status {0}")]
    Status(u16),

    /// The response body could not be read
    #[error("failed to read response body: {0}")]
    Body(String),
}

impl FetchError {
    /// Classify a transport error from reqwest
    pub fn from_transport(e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_connect() {
            FetchError::Connect(e.to_string())
        } else {
            FetchError::Request(e.to_string())
        }
    }
}

/// Errors raised while parsing a feed document or one of its entries
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The document does not start with an XML declaration
    #[error("expected XML but got something else, is the mirror failing?")]
    NotXml,

    /// The document is XML but not a readable feed
    #[error("malformed feed document: {0}")]
    Malformed(String),

    /// An entry lacks a required field, or the field is empty
    #[error("entry is missing required field '{0}'")]
    MissingField(&'static str),

    /// The description holds fewer than three integers
    #[error("description has {found} integers, expected at least 3")]
    Description {
        /// How many integers were found
        found: usize,
    },

    /// An integer in the description does not fit its target type
    #[error("value '{0}' is out of range")]
    NumberOutOfRange(String),
}

impl FormatError {
    /// Machine-readable error code
    pub fn error_code(&self) -> &str {
        match self {
            FormatError::NotXml => "not_xml",
            FormatError::Malformed(_) => "malformed_feed",
            FormatError::MissingField(_) => "missing_field",
            FormatError::Description { .. } => "bad_description",
            FormatError::NumberOutOfRange(_) => "number_out_of_range",
        }
    }
}

/// Per-term failure while querying a feed
#[derive(Debug, Error)]
pub enum SearchError {
    /// The request could not be sent or timed out
    #[error("request for '{term}' failed: {reason}")]
    Transport {
        /// Search string that was being queried
        term: String,
        /// Underlying transport failure
        reason: String,
    },

    /// The feed answered with a non-success status
    #[error("feed returned HTTP {status} for '{term}'")]
    Status {
        /// Search string that was being queried
        term: String,
        /// HTTP status code
        status: u16,
    },

    /// The response body could not be read
    #[error("failed to read feed body for '{term}': {reason}")]
    Body {
        /// Search string that was being queried
        term: String,
        /// Underlying read failure
        reason: String,
    },
}

impl SearchError {
    /// Search string the failure belongs to
    pub fn term(&self) -> &str {
        match self {
            SearchError::Transport { term, .. }
            | SearchError::Status { term, .. }
            | SearchError::Body { term, .. } => term,
        }
    }
}
