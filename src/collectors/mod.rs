//! Concrete HTTP-backed collectors and the default registration list.
//!
//! | Source | Class | Backend |
//! |--------|-------|---------|
//! | `duckduckgo` | search | HTML endpoint, CSS selectors |
//! | `bing` | search | HTML results page, CSS selectors |
//! | `wikipedia` | reference | MediaWiki search API (JSON) |
//! | `hackernews` | forum | Algolia search API (JSON) |
//!
//! Adding a source means writing a [`Collector`] and appending one
//! [`Registration`] to [`default_registrations`]; the orchestration core
//! needs no changes.

pub mod bing;
pub mod duckduckgo;
pub mod hackernews;
pub mod http;
pub mod wikipedia;

use std::time::Duration;

use factryl_search::{
    Collector, RawRecord, Registration, Result, SearchError, SourceClass, SourceSettings,
};
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

pub use bing::Bing;
pub use duckduckgo::DuckDuckGo;
pub use hackernews::HackerNews;
pub use wikipedia::Wikipedia;

/// Records requested per fetch when the source sets no `max_results`.
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Every built-in collector, in no particular order.
pub fn default_registrations() -> Vec<Registration> {
    vec![
        Registration::new(DuckDuckGo::NAME, |settings: &SourceSettings| {
            Ok(Box::new(DuckDuckGo::new(settings)) as Box<dyn Collector>)
        }),
        Registration::new(Bing::NAME, |settings: &SourceSettings| {
            Ok(Box::new(Bing::new(settings)) as Box<dyn Collector>)
        }),
        Registration::new(Wikipedia::NAME, |settings: &SourceSettings| {
            Ok(Box::new(Wikipedia::new(settings)) as Box<dyn Collector>)
        }),
        Registration::new(HackerNews::NAME, |settings: &SourceSettings| {
            Ok(Box::new(HackerNews::new(settings)) as Box<dyn Collector>)
        }),
    ]
}

/// HTTP timeout for a collector's session: the per-source override, else
/// the class fetch budget.
pub(crate) fn http_timeout(settings: &SourceSettings, class: SourceClass) -> Duration {
    settings
        .timeout_secs
        .map_or_else(|| class.fetch_timeout(), Duration::from_secs)
}

/// Endpoint for a collector: the configured override without a trailing
/// slash, else `default`.
pub(crate) fn endpoint(settings: &SourceSettings, default: &str) -> String {
    settings
        .base_url
        .as_deref()
        .map(|u| u.trim_end_matches('/').to_owned())
        .unwrap_or_else(|| default.to_owned())
}

/// Build a raw record from the three fields every source provides.
pub(crate) fn raw_record(title: &str, content: &str, url: &str) -> RawRecord {
    let mut raw = RawRecord::new();
    raw.insert("title".into(), Value::from(title));
    raw.insert("content".into(), Value::from(content));
    raw.insert("url".into(), Value::from(url));
    raw
}

/// Where organic hits sit on an HTML results page.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PageLayout {
    /// One element per organic hit.
    pub hit: &'static str,
    /// Anchor inside a hit; its text is the title and its `href` the link.
    pub anchor: &'static str,
    /// Optional summary text inside a hit.
    pub summary: &'static str,
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| SearchError::Parse(format!("bad selector {css:?}: {e:?}")))
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Scrape up to `limit` hits from `html` laid out as `layout`.
///
/// `resolve` maps an anchor's `href` to the record URL; hits whose anchor
/// has no text or whose link does not resolve are skipped.
pub(crate) fn scrape_hits<F>(
    html: &str,
    layout: PageLayout,
    limit: usize,
    resolve: F,
) -> Result<Vec<RawRecord>>
where
    F: Fn(&str) -> Option<String>,
{
    let hit = selector(layout.hit)?;
    let anchor = selector(layout.anchor)?;
    let summary = selector(layout.summary)?;
    let page = Html::parse_document(html);

    let records = page
        .select(&hit)
        .filter_map(|item| {
            let link = item.select(&anchor).next()?;
            let title = element_text(link);
            let url = link.value().attr("href").and_then(&resolve)?;
            if title.is_empty() || url.is_empty() {
                return None;
            }
            let text = item.select(&summary).next().map(element_text).unwrap_or_default();
            Some(raw_record(&title, &text, &url))
        })
        .take(limit)
        .collect();
    Ok(records)
}

/// Visible text of an HTML fragment, whitespace collapsed.
pub(crate) fn strip_html(fragment: &str) -> String {
    Html::parse_fragment(fragment)
        .root_element()
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
