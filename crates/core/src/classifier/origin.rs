//! Resolution of the analyzer's base URL.

use reqwest::Url;

/// Pick the origin the analyzer is reached on.
///
/// A dashboard served over http(s) talks to its own origin. Anything else
/// (no page URL, `file://`, unparseable) falls back to `default_origin`.
pub fn resolve_origin(page_url: Option<&str>, default_origin: &str) -> String {
    page_url
        .and_then(|url| Url::parse(url).ok())
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .map(|url| url.origin().ascii_serialization())
        .unwrap_or_else(|| default_origin.trim_end_matches('/').to_string())
}

/// Fully resolved analyzer endpoint URLs.
#[derive(Debug, Clone)]
pub struct AnalyzerEndpoints {
    pub origin: String,
    pub analyze: Url,
    pub recommend: Url,
}

impl AnalyzerEndpoints {
    pub fn from_origin(origin: &str) -> Result<Self, String> {
        let base = Url::parse(origin).map_err(|e| format!("invalid origin {}: {}", origin, e))?;
        let analyze = base.join("/analyze").map_err(|e| e.to_string())?;
        let recommend = base.join("/recommend").map_err(|e| e.to_string())?;

        Ok(Self {
            origin: origin.to_string(),
            analyze,
            recommend,
        })
    }
}
