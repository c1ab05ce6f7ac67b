//! URL canonicalisation for record identity and clustering.
//!
//! Equivalent pages that differ only in query-parameter order, tracking
//! parameters, fragments, a `www.` prefix, a trailing slash or the case of
//! the scheme and host normalise to the same string. Paths keep their case.

use url::Url;

/// Query parameters removed outright.
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "si", "feature"];

/// Query parameters removed when their key starts with one of these.
const TRACKING_PREFIXES: &[&str] = &["utm_", "ref", "source", "medium"];

fn is_tracking(key: &str) -> bool {
    let key = key.to_lowercase();
    TRACKING_PARAMS.contains(&key.as_str()) || TRACKING_PREFIXES.iter().any(|p| key.starts_with(p))
}

/// Normalise a URL for identity comparison.
///
/// 1. Lowercase the scheme and host and drop a leading `www.` from the host.
/// 2. Remove default ports and the fragment.
/// 3. Strip tracking parameters (`utm_*`, `ref*`, `fbclid`, ...) and sort the rest.
/// 4. Remove a trailing slash from the path (unless the path is `/`).
///
/// Input that cannot be parsed is returned trimmed and lower-cased.
/// Parsed URLs keep the case of their path and query.
///
/// ```
/// use factryl_search::aggregate::url_normalize::normalize_url;
///
/// let a = normalize_url("https://www.Example.COM/path/?b=2&a=1#section");
/// let b = normalize_url("https://example.com/path?a=1&b=2&utm_source=feed");
/// assert_eq!(a, b);
/// ```
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    // The parser lowercases the scheme and the host of special schemes.
    let Ok(mut parsed) = Url::parse(trimmed) else {
        return trimmed.to_lowercase();
    };

    parsed.set_fragment(None);

    if is_default_port(&parsed) {
        let _ = parsed.set_port(None);
    }

    if let Some(host) = parsed.host_str().and_then(|h| h.strip_prefix("www.")) {
        let host = host.to_owned();
        let _ = parsed.set_host(Some(&host));
    }

    let mut params: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| !is_tracking(key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    params.sort();

    if params.is_empty() {
        parsed.set_query(None);
    } else {
        let qs = params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        parsed.set_query(Some(&qs));
    }

    let path = parsed.path().to_owned();
    if path.len() > 1 && path.ends_with('/') {
        parsed.set_path(path.trim_end_matches('/'));
    }

    parsed.to_string()
}

fn is_default_port(url: &Url) -> bool {
    matches!(
        (url.scheme(), url.port()),
        ("http", Some(80)) | ("https", Some(443))
    )
}
