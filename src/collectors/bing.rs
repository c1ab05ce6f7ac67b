//! Bing collector: general web search with a different index from DuckDuckGo.

use async_trait::async_trait;
use factryl_search::{Collector, RawRecord, Result, SearchError, SourceClass, SourceSettings};
use url::Url;

use super::http::HttpSession;
use super::{endpoint, http_timeout, scrape_hits, PageLayout, DEFAULT_MAX_RESULTS};

const DEFAULT_ENDPOINT: &str = "https://www.bing.com/search";

/// Bing HTML search scraper.
#[derive(Debug)]
pub struct Bing {
    endpoint: String,
    max_results: usize,
    session: HttpSession,
}

impl Bing {
    pub const NAME: &'static str = "bing";

    pub fn new(settings: &SourceSettings) -> Self {
        Self {
            endpoint: endpoint(settings, DEFAULT_ENDPOINT),
            max_results: settings.max_results.unwrap_or(DEFAULT_MAX_RESULTS),
            session: HttpSession::new(Self::NAME, http_timeout(settings, SourceClass::Search)),
        }
    }
}

#[async_trait]
impl Collector for Bing {
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
        tracing::trace!(query, "Bing search");

        let response = client
            .get(&self.endpoint)
            .query(&[("q", query), ("setlang", "en")])
            .header("Accept", "text/html,application/xhtml+xml")
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("Bing request failed: {e}")))?
            .error_for_status()
            .map_err(|e| SearchError::Http(format!("Bing HTTP error: {e}")))?;

        let html = response
            .text()
            .await
            .map_err(|e| SearchError::Http(format!("Bing response read failed: {e}")))?;

        tracing::trace!(bytes = html.len(), "Bing response received");

        parse_bing_html(&html, self.max_results)
    }

    async fn close(&self) {
        self.session.close();
    }
}

/// Organic hits are `li.b_algo`; summaries appear in either caption markup.
const LAYOUT: PageLayout = PageLayout {
    hit: "li.b_algo",
    anchor: "h2 a",
    summary: ".b_caption p, .b_lineclamp2",
};

/// Parse a Bing results page into raw records. Only absolute links are kept.
fn parse_bing_html(html: &str, max_results: usize) -> Result<Vec<RawRecord>> {
    let records = scrape_hits(html, LAYOUT, max_results, |href| {
        Url::parse(href).is_ok().then(|| href.to_owned())
    })?;
    tracing::debug!(count = records.len(), "Bing results parsed");
    Ok(records)
}
