//! DuckDuckGo collector: most scraper-friendly general search source.
//!
//! Uses the HTML-only endpoint at `https://html.duckduckgo.com/html/`,
//! which needs no JavaScript and tolerates automated requests.

use async_trait::async_trait;
use factryl_search::{Collector, RawRecord, Result, SearchError, SourceClass, SourceSettings};
use url::Url;

use super::http::HttpSession;
use super::{endpoint, http_timeout, scrape_hits, PageLayout, DEFAULT_MAX_RESULTS};

const DEFAULT_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

/// DuckDuckGo HTML search scraper.
#[derive(Debug)]
pub struct DuckDuckGo {
    endpoint: String,
    max_results: usize,
    session: HttpSession,
}

impl DuckDuckGo {
    pub const NAME: &'static str = "duckduckgo";

    pub fn new(settings: &SourceSettings) -> Self {
        Self {
            endpoint: endpoint(settings, DEFAULT_ENDPOINT),
            max_results: settings.max_results.unwrap_or(DEFAULT_MAX_RESULTS),
            session: HttpSession::new(Self::NAME, http_timeout(settings, SourceClass::Search)),
        }
    }

    /// Extract the actual URL from DuckDuckGo's redirect wrapper.
    ///
    /// DDG wraps URLs like: `//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=...`
    fn extract_url(href: &str) -> Option<String> {
        let full_href = if href.starts_with("//") {
            format!("https:{href}")
        } else {
            href.to_string()
        };

        let parsed = Url::parse(&full_href).ok()?;

        if parsed.host_str() == Some("duckduckgo.com") && parsed.path().starts_with("/l/") {
            parsed
                .query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, value)| value.into_owned())
        } else {
            Some(full_href)
        }
    }
}

#[async_trait]
impl Collector for DuckDuckGo {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn class(&self) -> SourceClass {
        SourceClass::Search
    }

    async fn validate(&self) -> bool {
        match self.session.open() {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!(source = Self::NAME, error = %err, "session could not be opened");
                false
            }
        }
    }

    async fn fetch(&self, query: &str) -> Result<Vec<RawRecord>> {
        let client = self.session.client()?;
        tracing::trace!(query, "DuckDuckGo search");

        let response = client
            .post(&self.endpoint)
            .form(&[("q", query)])
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("DuckDuckGo request failed: {e}")))?
            .error_for_status()
            .map_err(|e| SearchError::Http(format!("DuckDuckGo HTTP error: {e}")))?;

        let html = response
            .text()
            .await
            .map_err(|e| SearchError::Http(format!("DuckDuckGo response read failed: {e}")))?;

        tracing::trace!(bytes = html.len(), "DuckDuckGo response received");

        parse_duckduckgo_html(&html, self.max_results)
    }

    async fn close(&self) {
        self.session.close();
    }
}

/// Organic hits on the HTML endpoint; sponsored blocks carry `result--ad`.
const LAYOUT: PageLayout = PageLayout {
    hit: ".result.results_links.results_links_deep:not(.result--ad), .web-result:not(.result--ad)",
    anchor: ".result__a",
    summary: ".result__snippet",
};

/// Parse a DuckDuckGo HTML results page into raw records.
pub(crate) fn parse_duckduckgo_html(html: &str, max_results: usize) -> Result<Vec<RawRecord>> {
    let records = scrape_hits(html, LAYOUT, max_results, DuckDuckGo::extract_url)?;
    tracing::debug!(count = records.len(), "DuckDuckGo results parsed");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOCK_DDG_HTML: &str = r#"<!DOCTYPE html>
<html>
<body>
<div class="result results_links results_links_deep web-result">
    <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.rust-lang.org%2F&amp;rut=abc123">
        Rust Programming Language
    </a>
    <div class="result__snippet">
        A language empowering everyone to build reliable and efficient software.
    </div>
</div>
<div class="result results_links results_links_deep web-result result--ad">
    <a class="result__a" href="https://ads.example.com/">Sponsored</a>
    <div class="result__snippet">Buy now</div>
</div>
<div class="result results_links results_links_deep web-result">
    <a class="result__a" href="https://doc.rust-lang.org/book/">
        The Rust Programming Language Book
    </a>
    <div class="result__snippet">
        An introductory book about Rust.
    </div>
</div>
</body>
</html>"#;

    #[test]
    fn extract_url_from_ddg_redirect() {
        let href = "//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fpage&rut=abc";
        assert_eq!(
            DuckDuckGo::extract_url(href),
            Some("https://example.com/page".to_string())
        );
    }

    #[test]
    fn extract_url_direct_link() {
        let href = "https://example.com/direct";
        assert_eq!(DuckDuckGo::extract_url(href), Some(href.to_string()));
    }

    #[test]
    fn parse_skips_ads_and_unwraps_redirects() {
        let records = parse_duckduckgo_html(MOCK_DDG_HTML, 10).expect("should parse");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["title"], "Rust Programming Language");
        assert_eq!(records[0]["url"], "https://www.rust-lang.org/");
        assert!(records[0]["content"]
            .as_str()
            .is_some_and(|s| s.contains("reliable and efficient")));
        assert_eq!(records[1]["url"], "https://doc.rust-lang.org/book/");
    }

    #[test]
    fn parse_respects_max_results() {
        let records = parse_duckduckgo_html(MOCK_DDG_HTML, 1).expect("should parse");
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn parse_empty_html_returns_empty() {
        let records = parse_duckduckgo_html("<html><body></body></html>", 10).expect("should parse");
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn fetch_before_validate_is_contract_error() {
        let ddg = DuckDuckGo::new(&SourceSettings::default());
        let err = ddg.fetch("rust").await.unwrap_err();
        assert!(matches!(err, SearchError::Contract(_)));
    }

    #[tokio::test]
    #[ignore] // Live test: run with `cargo test -- --ignored`
    async fn live_duckduckgo_search() {
        let ddg = DuckDuckGo::new(&SourceSettings::default());
        assert!(ddg.validate().await);
        let records = ddg.fetch("rust programming").await.expect("live search should work");
        assert!(!records.is_empty());
        ddg.close().await;
    }
}
