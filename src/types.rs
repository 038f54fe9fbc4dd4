//! Core types for acquire-bridge

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Metadata source a show identifier belongs to
///
/// The two sources have overlapping numeric id spaces, so the indexer is
/// part of every dedupe key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Indexer {
    /// TheTVDB (indexer 1)
    Tvdb,
    /// TVRage (indexer 2)
    TvRage,
}

/// Stable identifier of a show within one indexer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShowId {
    /// Which indexer issued `id`
    pub indexer: Indexer,
    /// Indexer-specific show id
    pub id: u64,
}

impl ShowId {
    /// Show id from TheTVDB
    pub fn tvdb(id: u64) -> Self {
        Self {
            indexer: Indexer::Tvdb,
            id,
        }
    }

    /// Show id from TVRage
    pub fn tvrage(id: u64) -> Self {
        Self {
            indexer: Indexer::TvRage,
            id,
        }
    }
}

/// One episode contained in a release
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    /// Season number
    pub season: u32,
    /// Episode number within the season
    pub episode: u32,
    /// Original air date
    pub airdate: NaiveDate,
}

impl Episode {
    /// Create a new episode reference
    pub fn new(season: u32, episode: u32, airdate: NaiveDate) -> Self {
        Self {
            season,
            episode,
            airdate,
        }
    }
}

/// Release quality score
///
/// Opaque to this crate apart from the `UNKNOWN` sentinel, which does not
/// contribute to the dedupe score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quality(pub u32);

impl Quality {
    /// Quality could not be determined
    pub const UNKNOWN: Quality = Quality(1 << 15);

    /// Returns false for the `UNKNOWN` sentinel
    pub fn is_known(&self) -> bool {
        *self != Self::UNKNOWN
    }
}

/// NZB content carried by a submission: either the document itself or a
/// URL the remote (or this crate) can fetch it from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payload {
    /// Raw NZB document bytes
    Inline(Vec<u8>),
    /// URL of the NZB document
    Url(String),
}

/// A job to hand to the remote queue manager
#[derive(Clone, Debug)]
pub struct SubmissionRequest {
    /// Release name, without the `.nzb` extension
    pub name: String,
    /// NZB content
    pub payload: Payload,
    /// Show the release belongs to
    pub show: ShowId,
    /// Quality score of the release
    pub quality: Quality,
    /// Release is a PROPER/REPACK of an earlier one
    pub proper: bool,
    /// Episodes contained in the release, in release order
    pub episodes: Vec<Episode>,
    /// Show is flagged as anime
    pub is_anime: bool,
}

impl SubmissionRequest {
    /// Name the remote queue stores the job under
    pub fn nzb_name(&self) -> String {
        format!("{}.nzb", self.name)
    }
}

/// Search mode a batch of search strings belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchMode {
    /// Latest-items poll; the search string is usually empty
    #[serde(rename = "RSS")]
    Rss,
    /// Whole-season search
    Season,
    /// Single-episode search
    Episode,
}

impl std::fmt::Display for SearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SearchMode::Rss => "RSS",
            SearchMode::Season => "Season",
            SearchMode::Episode => "Episode",
        };
        write!(f, "{}", s)
    }
}

/// Search strings grouped by mode, in the order they should be tried
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchTerms {
    entries: Vec<(SearchMode, Vec<String>)>,
}

impl SearchTerms {
    /// Create an empty set of terms
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a mode with its search strings
    pub fn with(
        mut self,
        mode: SearchMode,
        strings: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.push(mode, strings);
        self
    }

    /// Append a mode with its search strings
    pub fn push(
        &mut self,
        mode: SearchMode,
        strings: impl IntoIterator<Item = impl Into<String>>,
    ) {
        self.entries
            .push((mode, strings.into_iter().map(Into::into).collect()));
    }

    /// Iterate `(mode, search string)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (SearchMode, &str)> {
        self.entries
            .iter()
            .flat_map(|(mode, strings)| strings.iter().map(move |s| (*mode, s.as_str())))
    }

    /// Total number of search strings
    pub fn len(&self) -> usize {
        self.entries.iter().map(|(_, strings)| strings.len()).sum()
    }

    /// True if there is nothing to search for
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Size value used when a record's size is not known
pub const UNKNOWN_SIZE: i64 = -1;

/// One normalized search hit
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Release title
    pub title: String,
    /// Magnet URI or direct download URL
    pub link: String,
    /// Size in bytes, or [`UNKNOWN_SIZE`]
    pub size: i64,
    /// Seeder count
    pub seeders: u32,
    /// Leecher count
    pub leechers: u32,
    /// Info hash
    pub hash: String,
}

impl ResultRecord {
    /// True if the size is known
    pub fn has_size(&self) -> bool {
        self.size != UNKNOWN_SIZE
    }
}
