//! # acquire-bridge
//!
//! Adapters between a TV acquisition pipeline and the outside services it
//! depends on.
//!
//! ## Design Philosophy
//!
//! acquire-bridge is designed to be:
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Batch-safe** - One bad endpoint or feed entry never aborts the batch
//! - **Single attempt** - Nothing is retried internally; callers own retry policy
//!
//! It contains two independent components:
//! - [`NzbGetClient`] submits a release to NZBGet over XML-RPC, speaking the
//!   `append` dialect of whichever server version answers
//! - [`TorrentzProvider`] queries a Torrentz-style RSS feed and normalizes
//!   its entries into [`ResultRecord`]s
//!
//! ## Quick Start
//!
//! ```no_run
//! use acquire_bridge::{
//!     Config, Episode, NzbGetClient, Payload, Quality, SearchMode, SearchTerms, ShowId,
//!     SubmissionRequest, TorrentzProvider,
//! };
//! use chrono::NaiveDate;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_json_str(r#"{ "nzbget": { "host": "localhost:6789" } }"#)?;
//!     config.validate()?;
//!
//!     let nzbget = NzbGetClient::new(config.nzbget.clone())?;
//!     let queued = nzbget
//!         .submit(&SubmissionRequest {
//!             name: "Show.S01E02.720p".to_string(),
//!             payload: Payload::Url("https://indexer.example/get/123".to_string()),
//!             show: ShowId::tvdb(100),
//!             quality: Quality(4),
//!             proper: false,
//!             episodes: vec![Episode::new(1, 2, NaiveDate::from_ymd_opt(2024, 6, 14).unwrap())],
//!             is_anime: false,
//!         })
//!         .await;
//!     println!("queued: {}", queued);
//!
//!     let torrentz = TorrentzProvider::new(config.torrentz.clone())?;
//!     let terms = SearchTerms::new().with(SearchMode::Episode, ["Show S01E02"]);
//!     for record in torrentz.search(&terms).await {
//!         println!("{} ({} seeders)", record.title, record.seeders);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// NZBGet dispatch over XML-RPC
pub mod dispatch;
/// Error types
pub mod error;
/// Torrent feed search and parsing
pub mod search;
/// Core types shared by both adapters
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use config::{Config, NzbGetConfig, TorrentzConfig};
pub use dispatch::{Accepted, Dispatcher, NzbGetClient};
pub use error::{DispatchError, Error, FetchError, FormatError, Result, SearchError};
pub use search::{ParseOutcome, SearchProvider, SearchReport, TorrentzProvider};
pub use types::{
    Episode, Indexer, Payload, Quality, ResultRecord, SearchMode, SearchTerms, ShowId,
    SubmissionRequest, UNKNOWN_SIZE,
};
