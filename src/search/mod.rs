//! Torrent feed search provider
//!
//! Queries the feed once per search string, in the order given, and parses
//! every answer into [`ResultRecord`]s. A failing term is recorded and the
//! remaining terms are still queried, so one bad request never empties the
//! whole result set.

pub mod parser;

use crate::config::TorrentzConfig;
use crate::error::{Result, SearchError};
use crate::types::{ResultRecord, SearchMode, SearchTerms};
use crate::utils::build_http_client;
use async_trait::async_trait;
use tracing::{debug, info, warn};

pub use parser::{ParseOutcome, parse};

/// Everything a search produced, including per-term failures
#[derive(Debug, Default)]
pub struct SearchReport {
    /// Records from every term that answered, in term order
    pub records: Vec<ResultRecord>,
    /// Terms whose request failed
    pub failures: Vec<SearchError>,
}

/// Anything that can turn search strings into result records
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &str;

    /// Run every search string and collect what could be parsed
    async fn search_terms(&self, terms: &SearchTerms) -> SearchReport;
}

/// Search provider backed by a Torrentz-style RSS feed
#[derive(Clone, Debug)]
pub struct TorrentzProvider {
    config: TorrentzConfig,
    http: reqwest::Client,
}

impl TorrentzProvider {
    /// Create a provider for the configured feed
    pub fn new(config: TorrentzConfig) -> Result<Self> {
        let http = build_http_client(config.timeout, &config.user_agent)?;
        Ok(Self { config, http })
    }

    /// Configuration this provider was built with
    pub fn config(&self) -> &TorrentzConfig {
        &self.config
    }

    /// Search and return only the records
    ///
    /// Failed terms are logged and skipped.
    pub async fn search(&self, terms: &SearchTerms) -> Vec<ResultRecord> {
        let report = self.try_search(terms).await;
        for failure in &report.failures {
            warn!(term = failure.term(), "Torrent feed search failed: {}", failure);
        }
        report.records
    }

    /// Search and report failures alongside the records
    pub async fn try_search(&self, terms: &SearchTerms) -> SearchReport {
        let mut report = SearchReport::default();
        let feed_url = self.config.feed_url();

        for (mode, term) in terms.iter() {
            if mode != SearchMode::Rss {
                debug!(%mode, "Search string: {}", term);
            }

            let document = match self.fetch(&feed_url, term).await {
                Ok(document) => document,
                Err(e) => {
                    report.failures.push(e);
                    continue;
                }
            };

            let outcome = parse(&document, &self.config.category_filter);
            if !outcome.rejected.is_empty() {
                debug!(
                    term,
                    rejected = outcome.rejected.len(),
                    "Some feed entries were unusable"
                );
            }

            let before = outcome.records.len();
            let records: Vec<_> = outcome
                .records
                .into_iter()
                .filter(|record| self.meets_minimums(record))
                .collect();
            if records.len() < before {
                debug!(
                    term,
                    dropped = before - records.len(),
                    "Dropped results below the seeder/leecher minimums"
                );
            }

            report.records.extend(records);
        }

        info!(
            terms = terms.len(),
            results = report.records.len(),
            failed = report.failures.len(),
            "Torrent feed search finished"
        );
        report
    }

    fn meets_minimums(&self, record: &ResultRecord) -> bool {
        self.config
            .min_seeders
            .is_none_or(|min| record.seeders >= min)
            && self
                .config
                .min_leechers
                .is_none_or(|min| record.leechers >= min)
    }

    async fn fetch(&self, feed_url: &str, term: &str) -> std::result::Result<String, SearchError> {
        let response = self
            .http
            .get(feed_url)
            .query(&[("f", term)])
            .send()
            .await
            .map_err(|e| SearchError::Transport {
                term: term.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status {
                term: term.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| SearchError::Body {
            term: term.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl SearchProvider for TorrentzProvider {
    fn name(&self) -> &str {
        "Torrentz"
    }

    async fn search_terms(&self, terms: &SearchTerms) -> SearchReport {
        self.try_search(terms).await
    }
}
