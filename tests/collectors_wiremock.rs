//! Collector contract tests against mock HTTP servers.
//!
//! Each collector is pointed at a `wiremock` server through its
//! `base_url` setting; no real network traffic is made.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use factryl::collectors::{Bing, DuckDuckGo, HackerNews, Wikipedia};
use factryl::{FactrylConfig, build_engine};
use factryl_search::{Collector, SearchError, SourceSettings};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(base: String) -> SourceSettings {
    SourceSettings {
        base_url: Some(base),
        ..Default::default()
    }
}

fn wikipedia_body() -> serde_json::Value {
    json!({
        "batchcomplete": "",
        "query": {
            "searchinfo": { "totalhits": 2 },
            "search": [
                {
                    "ns": 0,
                    "title": "Python (programming language)",
                    "pageid": 23862,
                    "wordcount": 12000,
                    "snippet": "<span class=\"searchmatch\">Python</span> is a high-level, general-purpose programming language.",
                    "timestamp": "2024-06-01T08:00:00Z"
                },
                {
                    "ns": 0,
                    "title": "Monty Python",
                    "pageid": 18942,
                    "snippet": "British comedy troupe",
                    "timestamp": "2024-02-11T08:00:00Z"
                }
            ]
        }
    })
}

#[tokio::test]
async fn wikipedia_maps_search_hits() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("list", "search"))
        .and(query_param("srsearch", "python"))
        .respond_with(ResponseTemplate::new(200).set_body_json(wikipedia_body()))
        .expect(1)
        .mount(&server)
        .await;

    let wiki = Wikipedia::new(&settings(server.uri()));
    assert!(wiki.validate().await);
    let records = wiki.fetch("python").await.expect("fetch");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["title"], "Python (programming language)");
    assert_eq!(
        records[0]["url"],
        format!("{}/wiki/Python_(programming_language)", server.uri()).as_str()
    );
    assert_eq!(
        records[0]["content"],
        "Python is a high-level, general-purpose programming language."
    );
    wiki.close().await;
}

#[tokio::test]
async fn wikipedia_server_error_is_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let wiki = Wikipedia::new(&settings(server.uri()));
    assert!(wiki.validate().await);
    let err = wiki.fetch("python").await.unwrap_err();
    assert!(matches!(err, SearchError::Http(_)));
}

#[tokio::test]
async fn wikipedia_malformed_body_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let wiki = Wikipedia::new(&settings(server.uri()));
    assert!(wiki.validate().await);
    let err = wiki.fetch("python").await.unwrap_err();
    assert!(matches!(err, SearchError::Parse(_)));
}

#[tokio::test]
async fn hackernews_maps_hits() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/search"))
        .and(query_param("tags", "story"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": [
                {
                    "objectID": "100",
                    "title": "Python 3.13 released",
                    "url": "https://python.example/3.13",
                    "author": "guido",
                    "points": 512,
                    "num_comments": 200,
                    "created_at": "2024-10-07T12:00:00.000Z"
                },
                { "objectID": "101", "title": null, "url": null }
            ]
        })))
        .mount(&server)
        .await;

    let hn = HackerNews::new(&settings(server.uri()));
    assert!(hn.validate().await);
    let records = hn.fetch("python").await.expect("fetch");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["author"], "guido");
    assert_eq!(records[0]["points"], 512);
}

#[tokio::test]
async fn duckduckgo_posts_query_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/html"))
        .and(body_string_contains("q=rust"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body>
            <div class="result results_links results_links_deep web-result">
              <a class="result__a" href="https://www.rust-lang.org/">Rust</a>
              <div class="result__snippet">Reliable software.</div>
            </div>
            </body></html>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let ddg = DuckDuckGo::new(&settings(format!("{}/html/", server.uri())));
    assert!(ddg.validate().await);
    let records = ddg.fetch("rust").await.expect("fetch");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["url"], "https://www.rust-lang.org/");
}

#[tokio::test]
async fn bing_sends_query_parameter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "rust"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body><ol id="b_results">
            <li class="b_algo"><h2><a href="https://doc.rust-lang.org/">Docs</a></h2>
            <div class="b_caption"><p>Rust documentation.</p></div></li>
            </ol></body></html>"#,
        ))
        .mount(&server)
        .await;

    let bing = Bing::new(&settings(format!("{}/search", server.uri())));
    assert!(bing.validate().await);
    let records = bing.fetch("rust").await.expect("fetch");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["title"], "Docs");
}

#[tokio::test]
async fn fetch_after_close_is_contract_error() {
    let hn = HackerNews::new(&SourceSettings::default());
    assert!(hn.validate().await);
    hn.close().await;
    let err = hn.fetch("anything").await.unwrap_err();
    assert!(matches!(err, SearchError::Contract(_)));
}

#[tokio::test]
async fn engine_merges_wikipedia_and_hackernews_on_shared_url() {
    let wiki_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(wikipedia_body()))
        .mount(&wiki_server)
        .await;

    let article = format!("{}/wiki/Python_(programming_language)", wiki_server.uri());
    let hn_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": [{
                "objectID": "9",
                "title": "Python (programming language) on Wikipedia",
                "url": article.clone(),
                "points": 10,
                "num_comments": 2
            }]
        })))
        .mount(&hn_server)
        .await;

    let broken_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&broken_server)
        .await;

    let mut config = FactrylConfig::default();
    config.engine.default_rate_limit_per_sec = 100.0;
    config
        .engine
        .sources
        .insert("wikipedia".into(), settings(wiki_server.uri()));
    config
        .engine
        .sources
        .insert("hackernews".into(), settings(hn_server.uri()));
    config
        .engine
        .sources
        .insert("bing".into(), settings(format!("{}/search", broken_server.uri())));
    config.engine.sources.insert(
        "duckduckgo".into(),
        SourceSettings {
            enabled: false,
            ..Default::default()
        },
    );

    let engine = build_engine(&config).await.expect("engine");
    assert_eq!(engine.list_sources(), vec!["bing", "hackernews", "wikipedia"]);

    let response = engine.search("python", 10, None).await;

    let merged: Vec<_> = response
        .items
        .iter()
        .filter(|r| r.url == article)
        .collect();
    assert_eq!(merged.len(), 1);
    assert_eq!(
        merged[0].contributing_sources(),
        vec!["hackernews".to_string(), "wikipedia".to_string()]
    );
    assert_eq!(response.stats.sources_searched, 3);
    assert_eq!(response.stats.successful_sources, 2);
    assert_eq!(response.items.len(), 2);

    engine.shutdown().await;
}
