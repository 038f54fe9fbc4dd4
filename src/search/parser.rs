//! Torrent feed parsing
//!
//! Turns an RSS document from the feed into [`ResultRecord`]s. A bad entry is
//! rejected on its own and never discards the rest of the document.
//!
//! Documents are read with the `rss` crate first. Mirrors often serve feeds
//! that are not well-formed (a bare `&` in a title is the usual culprit), so
//! when that fails the `<item>` elements are read one at a time with a lenient
//! `quick-xml` scan instead.

use crate::error::FormatError;
use crate::types::ResultRecord;
use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesText, Event};
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Prefix every usable feed document starts with
const XML_DECLARATION: &str = "<?xml";

const MIB: i64 = 1024 * 1024;

/// Records built from a document, plus the reasons entries were dropped
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    /// Usable records in document order
    pub records: Vec<ResultRecord>,
    /// One error per rejected entry, plus any document-level error
    pub rejected: Vec<FormatError>,
}

/// Text fields of one feed entry
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeedEntry {
    /// `<title>`
    pub title: Option<String>,
    /// `<guid>`
    pub guid: Option<String>,
    /// `<description>`
    pub description: Option<String>,
    /// First `<category>`
    pub category: Option<String>,
}

impl From<&rss::Item> for FeedEntry {
    fn from(item: &rss::Item) -> Self {
        Self {
            title: item.title().map(str::to_string),
            guid: item.guid().map(|guid| guid.value().to_string()),
            description: item.description().map(str::to_string),
            category: item
                .categories()
                .first()
                .map(|category| category.name().to_string()),
        }
    }
}

#[allow(clippy::expect_used)]
fn integers() -> &'static Regex {
    static INTEGERS: OnceLock<Regex> = OnceLock::new();
    INTEGERS.get_or_init(|| Regex::new(r"[0-9]+").expect("integer pattern is valid"))
}

/// Parse a feed document
///
/// The document must begin with an XML declaration; anything else, leading
/// whitespace included, yields no records.
///
/// Entries with a category that does not contain `category_filter` are
/// skipped silently; they are not errors. The match ignores ASCII case, so a
/// `TV` category passes the `tv` filter. An entry without a category and an
/// empty filter both accept everything.
pub fn parse(document: &str, category_filter: &str) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();

    if !document.starts_with(XML_DECLARATION) {
        warn!("Expected XML but got something else, is the feed mirror failing?");
        outcome.rejected.push(FormatError::NotXml);
        return outcome;
    }

    let entries: Vec<Result<FeedEntry, FormatError>> = match document.parse::<rss::Channel>() {
        Ok(channel) => channel
            .items()
            .iter()
            .map(|item| Ok(FeedEntry::from(item)))
            .collect(),
        Err(e) => {
            debug!("Feed is not well-formed RSS ({}), reading entries one by one", e);
            let entries = scan_entries(document);
            if entries.is_empty() {
                warn!("Failed to parse feed document: {}", e);
                outcome.rejected.push(FormatError::Malformed(e.to_string()));
            }
            entries
        }
    };

    let wanted = category_filter.to_ascii_lowercase();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!(code = e.error_code(), "Skipping feed entry: {}", e);
                outcome.rejected.push(e);
                continue;
            }
        };

        if let Some(category) = &entry.category
            && !category.to_ascii_lowercase().contains(&wanted)
        {
            debug!(
                category = %category,
                "Skipping entry outside the wanted category"
            );
            continue;
        }

        match parse_entry(&entry) {
            Ok(record) => outcome.records.push(record),
            Err(e) => {
                debug!(
                    title = entry.title.as_deref().unwrap_or(""),
                    code = e.error_code(),
                    "Skipping feed entry: {}",
                    e
                );
                outcome.rejected.push(e);
            }
        }
    }

    outcome
}

/// Build a record from one feed entry
pub fn parse_entry(entry: &FeedEntry) -> Result<ResultRecord, FormatError> {
    let title = entry
        .title
        .as_deref()
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .ok_or(FormatError::MissingField("title"))?;

    let guid = entry
        .guid
        .as_deref()
        .ok_or(FormatError::MissingField("guid"))?;
    let hash = info_hash(guid).ok_or(FormatError::MissingField("hash"))?;

    let description = entry
        .description
        .as_deref()
        .ok_or(FormatError::MissingField("description"))?;
    let (size, seeders, leechers) = parse_description(description)?;

    Ok(ResultRecord {
        title: title.to_string(),
        link: magnet_link(hash, title),
        size,
        seeders,
        leechers,
        hash: hash.to_string(),
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    Title,
    Guid,
    Description,
    Category,
}

impl Field {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"title" => Some(Field::Title),
            b"guid" => Some(Field::Guid),
            b"description" => Some(Field::Description),
            b"category" => Some(Field::Category),
            _ => None,
        }
    }
}

impl FeedEntry {
    fn set(&mut self, field: Field, text: String) {
        let slot = match field {
            Field::Title => &mut self.title,
            Field::Guid => &mut self.guid,
            Field::Description => &mut self.description,
            Field::Category => &mut self.category,
        };
        slot.get_or_insert(text);
    }
}

/// Read `<item>` elements one at a time, tolerating bad escapes and
/// mismatched closing tags
///
/// A read error rejects the entry it happens in and ends the scan; entries
/// completed before it are kept.
fn scan_entries(document: &str) -> Vec<Result<FeedEntry, FormatError>> {
    let mut reader = Reader::from_str(document);
    reader.config_mut().check_end_names = false;

    let mut entries = Vec::new();
    let mut current: Option<FeedEntry> = None;
    let mut depth = 0usize;
    let mut field: Option<Field> = None;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if current.is_some() {
                    depth += 1;
                    if depth == 2 {
                        field = Field::from_name(e.local_name().as_ref());
                        text.clear();
                    }
                } else if e.local_name().as_ref() == b"item" {
                    current = Some(FeedEntry::default());
                    depth = 1;
                }
            }
            Ok(Event::End(_)) => {
                if current.is_none() {
                    continue;
                }
                depth = depth.saturating_sub(1);
                if depth == 1 {
                    if let (Some(entry), Some(done)) = (current.as_mut(), field.take()) {
                        entry.set(done, std::mem::take(&mut text));
                    }
                } else if depth == 0
                    && let Some(entry) = current.take()
                {
                    entries.push(Ok(entry));
                }
            }
            Ok(Event::Text(t)) => {
                if field.is_some() {
                    text.push_str(&lenient_text(&t));
                }
            }
            Ok(Event::CData(c)) => {
                if field.is_some() {
                    text.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                let error = FormatError::Malformed(format!(
                    "at position {}: {}",
                    reader.buffer_position(),
                    e
                ));
                if current.take().is_some() || !entries.is_empty() {
                    entries.push(Err(error));
                }
                return entries;
            }
        }
    }

    if current.is_some() {
        entries.push(Err(FormatError::Malformed("unclosed <item>".to_string())));
    }
    entries
}

/// Unescape text, keeping a bare `&` that does not start a valid reference
fn lenient_text(text: &BytesText<'_>) -> String {
    if let Ok(unescaped) = text.unescape() {
        return unescaped.into_owned();
    }

    let raw = String::from_utf8_lossy(text);
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw.as_ref();
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let reference = rest
            .find(';')
            .map(|end| &rest[..=end])
            .and_then(|r| unescape(r).ok().map(|decoded| (r.len(), decoded.into_owned())));
        match reference {
            Some((len, decoded)) => {
                out.push_str(&decoded);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Final path segment of a guid, if non-empty
pub fn info_hash(guid: &str) -> Option<&str> {
    guid.trim()
        .rsplit('/')
        .next()
        .filter(|hash| !hash.is_empty())
}

/// Magnet URI carrying only the info hash and display name
pub fn magnet_link(hash: &str, title: &str) -> String {
    format!(
        "magnet:?xt=urn:btih:{}&dn={}",
        hash,
        urlencoding::encode(title)
    )
}

/// Extract `(size_bytes, seeders, leechers)` from a free-text description
///
/// The first three integers are size in MiB, seeders and leechers.
pub fn parse_description(description: &str) -> Result<(i64, u32, u32), FormatError> {
    let numbers: Vec<&str> = integers()
        .find_iter(description)
        .take(3)
        .map(|m| m.as_str())
        .collect();

    let [size, seeders, leechers] = numbers[..] else {
        return Err(FormatError::Description {
            found: numbers.len(),
        });
    };

    let out_of_range = |text: &str| FormatError::NumberOutOfRange(text.to_string());
    let size = size
        .parse::<i64>()
        .ok()
        .and_then(|mib| mib.checked_mul(MIB))
        .ok_or_else(|| out_of_range(size))?;
    let seeders = seeders.parse().map_err(|_| out_of_range(seeders))?;
    let leechers = leechers.parse().map_err(|_| out_of_range(leechers))?;

    Ok((size, seeders, leechers))
}
