//! NZB and feed fixtures

use acquire_bridge::{Episode, Payload, Quality, ShowId, SubmissionRequest};
use chrono::NaiveDate;

/// Minimal valid NZB for testing (single segment)
pub const MINIMAL_NZB: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE nzb PUBLIC "-//newzBin//DTD NZB 1.1//EN" "http://www.newzbin.com/DTD/nzb/nzb-1.1.dtd">
<nzb xmlns="http://www.newzbin.com/DTD/2003/nzb">
  <head>
    <meta type="title">Test Download</meta>
  </head>
  <file poster="test@example.com" date="1234567890" subject="test.txt (1/1)">
    <groups>
      <group>alt.test</group>
    </groups>
    <segments>
      <segment bytes="100" number="1">test-msgid-12345@example.com</segment>
    </segments>
  </file>
</nzb>"#;

/// Two-entry feed: a movie (wrong category) and a TV episode
pub const MIXED_CATEGORY_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Torrentz2</title>
    <link>https://torrentz2.eu</link>
    <description>Torrentz2 search feed</description>
    <item>
      <title>Some Movie 2024 1080p</title>
      <category>movies hd</category>
      <guid>https://torrentz2.eu/0123456789abcdef0123456789abcdef01234567</guid>
      <description>Size: 4200 MB Seeds: 812 Peers: 95 Hash: 0123456789abcdef0123456789abcdef01234567</description>
    </item>
    <item>
      <title>Show S01E02 720p HDTV x264</title>
      <category>tv shows</category>
      <guid>https://torrentz2.eu/fedcba9876543210fedcba9876543210fedcba98</guid>
      <description>Size: 700 MB Seeds: 42 Peers: 7 Hash: fedcba9876543210fedcba9876543210fedcba98</description>
    </item>
  </channel>
</rss>"#;

/// Info hash of the TV entry in [`MIXED_CATEGORY_FEED`]
pub const MIXED_CATEGORY_TV_HASH: &str = "fedcba9876543210fedcba9876543210fedcba98";

/// Fixed "today" used by dispatch tests
pub fn test_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap_or_default()
}

/// A release of S01E02 of TVDB show 100 that aired `days_ago` before [`test_today`]
pub fn release(payload: Payload, days_ago: i64) -> SubmissionRequest {
    SubmissionRequest {
        name: "Show.S01E02.720p.HDTV.x264".to_string(),
        payload,
        show: ShowId::tvdb(100),
        quality: Quality(4),
        proper: false,
        episodes: vec![Episode::new(
            1,
            2,
            test_today() - chrono::Duration::days(days_ago),
        )],
        is_anime: false,
    }
}
