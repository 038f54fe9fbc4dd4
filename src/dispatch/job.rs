//! Values derived from a submission before it is sent
//!
//! Everything here is a pure function of the request, the configuration and
//! the current date, so it is computed once per submission in [`JobPlan::new`].

use crate::config::NzbGetConfig;
use crate::types::{Episode, Indexer, Quality, ShowId, SubmissionRequest};
use chrono::{Duration, NaiveDate};

/// Episodes that aired this many days ago or later count as recent
pub const RECENT_WINDOW_DAYS: i64 = 7;

/// Brand prefix of every dedupe key
pub const DUPE_KEY_BRAND: &str = "SiCKRAGE";

/// Dedupe mode sent to NZBGet 1+
pub const DUPE_MODE: &str = "score";

/// Returns true if `airdate` is at most [`RECENT_WINDOW_DAYS`] before `today`
///
/// Air dates in the future are recent as well.
pub fn is_recent(airdate: NaiveDate, today: NaiveDate) -> bool {
    today.signed_duration_since(airdate) <= Duration::days(RECENT_WINDOW_DAYS)
}

/// Build the dedupe key, e.g. `SiCKRAGE-100-1.2-1.3`
pub fn dupe_key(show: ShowId, episodes: &[Episode]) -> String {
    let mut key = match show.indexer {
        Indexer::Tvdb => format!("{}-{}", DUPE_KEY_BRAND, show.id),
        Indexer::TvRage => format!("{}-tvr{}", DUPE_KEY_BRAND, show.id),
    };
    for ep in episodes {
        key.push_str(&format!("-{}.{}", ep.season, ep.episode));
    }
    key
}

/// Quality × 100, plus 10 for a proper; unknown quality contributes nothing
pub fn dupe_score(quality: Quality, proper: bool) -> i64 {
    let base = if quality.is_known() {
        i64::from(quality.0) * 100
    } else {
        0
    };
    if proper { base + 10 } else { base }
}

/// Pick one of the four configured categories
pub fn resolve_category(config: &NzbGetConfig, is_anime: bool, recent: bool) -> &str {
    match (is_anime, recent) {
        (false, true) => &config.category,
        (false, false) => &config.category_backlog,
        (true, true) => &config.category_anime,
        (true, false) => &config.category_anime_backlog,
    }
}

/// Everything the protocol layer needs besides the payload
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobPlan {
    /// Job name including the `.nzb` extension
    pub name: String,
    /// Effective category
    pub category: String,
    /// At least one episode is recent
    pub add_to_top: bool,
    /// Configured priority when recent, otherwise 0
    pub priority: i32,
    /// Duplicate detection key
    pub dupe_key: String,
    /// Duplicate detection score
    pub dupe_score: i64,
}

impl JobPlan {
    /// Derive the plan for `request` as of `today`
    pub fn new(request: &SubmissionRequest, config: &NzbGetConfig, today: NaiveDate) -> Self {
        let recent = request
            .episodes
            .iter()
            .any(|ep| is_recent(ep.airdate, today));

        Self {
            name: request.nzb_name(),
            category: resolve_category(config, request.is_anime, recent).to_string(),
            add_to_top: recent,
            priority: if recent { config.priority } else { 0 },
            dupe_key: dupe_key(request.show, &request.episodes),
            dupe_score: dupe_score(request.quality, request.proper),
        }
    }
}
