//! End-to-end search tests against a mock torrent feed

mod common;

use acquire_bridge::search::parse;
use acquire_bridge::{SearchMode, SearchProvider, SearchTerms, TorrentzProvider};
use common::{MIXED_CATEGORY_FEED, MIXED_CATEGORY_TV_HASH, mock_torrentz_config};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn mixed_category_feed_yields_only_the_tv_entry() {
    let outcome = parse(MIXED_CATEGORY_FEED, "tv");

    assert_eq!(outcome.records.len(), 1);
    let record = &outcome.records[0];
    assert_eq!(record.title, "Show S01E02 720p HDTV x264");
    assert_eq!(record.hash, MIXED_CATEGORY_TV_HASH);
    assert_eq!(record.size, 700 * 1024 * 1024);
    assert_eq!(record.seeders, 42);
    assert_eq!(record.leechers, 7);
    assert!(record.link.starts_with(&format!(
        "magnet:?xt=urn:btih:{}&dn=",
        MIXED_CATEGORY_TV_HASH
    )));
}

#[tokio::test]
async fn search_sends_literal_term_as_query_parameter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .and(query_param("f", "Show S01E02 & friends"))
        .respond_with(ResponseTemplate::new(200).set_body_string(MIXED_CATEGORY_FEED))
        .expect(1)
        .mount(&server)
        .await;

    let provider = TorrentzProvider::new(mock_torrentz_config(&server.uri())).unwrap();
    let terms = SearchTerms::new().with(SearchMode::Episode, ["Show S01E02 & friends"]);
    let records = provider.search(&terms).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].hash, MIXED_CATEGORY_TV_HASH);
}

#[tokio::test]
async fn terms_are_queried_in_supplied_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string(MIXED_CATEGORY_FEED))
        .mount(&server)
        .await;

    let provider = TorrentzProvider::new(mock_torrentz_config(&server.uri())).unwrap();
    let terms = SearchTerms::new()
        .with(SearchMode::Rss, [""])
        .with(SearchMode::Season, ["Show S01"])
        .with(SearchMode::Episode, ["Show S01E01", "Show S01E02"]);
    let report = provider.search_terms(&terms).await;

    let queried: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter_map(|req| {
            req.url
                .query_pairs()
                .find(|(key, _)| key == "f")
                .map(|(_, value)| value.into_owned())
        })
        .collect();
    assert_eq!(queried, vec!["", "Show S01", "Show S01E01", "Show S01E02"]);
    assert_eq!(report.records.len(), 4);
    assert!(report.failures.is_empty());
}

#[tokio::test]
async fn partial_results_survive_a_failing_mirror_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .and(query_param("f", "first"))
        .respond_with(ResponseTemplate::new(200).set_body_string(MIXED_CATEGORY_FEED))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .and(query_param("f", "second"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .and(query_param("f", "third"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let provider = TorrentzProvider::new(mock_torrentz_config(&server.uri())).unwrap();
    let terms = SearchTerms::new().with(SearchMode::Episode, ["first", "second", "third"]);
    let report = provider.try_search(&terms).await;

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].term(), "second");
}
