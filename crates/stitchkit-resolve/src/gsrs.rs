//! G-SRS substance search

use indicatif::ProgressBar;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ResolveError;

pub const DEFAULT_BASE_URL: &str = "https://tripod.nih.gov/ginas/app";

/// Exact-name lookup of a substance code.
///
/// `Ok(None)` means no record matched; conflicting records are an error.
pub trait NameLookup {
    fn lookup(&self, name: &str) -> Result<Option<String>, ResolveError>;
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    total: u64,
    #[serde(default)]
    content: Vec<Map<String, Value>>,
}

/// Client for `{base}/api/v1/substances/search`.
#[derive(Debug, Clone)]
pub struct GsrsClient {
    base_url: String,
}

impl Default for GsrsClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl GsrsClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Search URL anchoring the name at both ends: `root_names_name:"^NAME$"`.
    pub fn search_url(&self, name: &str) -> String {
        let base = format!("{}/api/v1/substances/search", self.base_url);
        match reqwest::Url::parse(&base) {
            Ok(mut url) => {
                url.query_pairs_mut()
                    .append_pair("q", &format!("root_names_name:\"^{name}$\""));
                url.into()
            }
            Err(_) => format!("{base}?q=root_names_name:\"^{name}$\""),
        }
    }
}

impl NameLookup for GsrsClient {
    fn lookup(&self, name: &str) -> Result<Option<String>, ResolveError> {
        let url = self.search_url(name);
        log::debug!("G-SRS lookup: {url}");
        let fetched = stitchkit_core::retry_with_backoff(name, &ProgressBar::hidden(), || {
            stitchkit_core::get_json::<Value>(&url)
        });
        match fetched {
            Ok(body) => parse_search_response(name, body),
            Err(e) => {
                // Unreachable service counts as no hit; the name lands in the missing report
                log::warn!("G-SRS lookup failed for {name:?}: {e}");
                Ok(None)
            }
        }
    }
}

/// Pull the single approval code out of a search response.
pub fn parse_search_response(name: &str, body: Value) -> Result<Option<String>, ResolveError> {
    let page: SearchPage = serde_json::from_value(body)
        .map_err(|_| ResolveError::Malformed { name: name.into() })?;
    if page.total == 0 {
        return Ok(None);
    }
    let mut found: Option<String> = None;
    for record in &page.content {
        let code = record
            .get("_approvalIDDisplay")
            .or_else(|| record.get("approvalID"))
            .and_then(Value::as_str)
            .ok_or_else(|| ResolveError::Malformed { name: name.into() })?;
        match &found {
            None => found = Some(code.to_string()),
            Some(first) if first != code => {
                return Err(ResolveError::Conflict {
                    name: name.into(),
                    first: first.clone(),
                    second: code.to_string(),
                });
            }
            Some(_) => {}
        }
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn url_is_encoded() {
        let client = GsrsClient::new("https://example.org/ginas/app/");
        let url = client.search_url("TECHNETIUM TC-99M");
        assert!(url.starts_with("https://example.org/ginas/app/api/v1/substances/search?q="));
        assert!(!url.contains(' '));
        assert!(url.contains("root_names_name"));
    }

    #[test]
    fn zero_total_is_no_hit() {
        assert_eq!(parse_search_response("X", json!({"total": 0})).unwrap(), None);
    }

    #[test]
    fn display_id_preferred() {
        let body = json!({
            "total": 2,
            "content": [
                {"_approvalIDDisplay": "R16CO5Y76E", "approvalID": "ignored"},
                {"approvalID": "R16CO5Y76E"}
            ]
        });
        assert_eq!(
            parse_search_response("ASPIRIN", body).unwrap().as_deref(),
            Some("R16CO5Y76E")
        );
    }

    #[test]
    fn conflicting_codes_fail() {
        let body = json!({
            "total": 2,
            "content": [{"approvalID": "AAAAAAAAAA"}, {"approvalID": "BBBBBBBBBB"}]
        });
        let err = parse_search_response("DUP", body).unwrap_err();
        assert!(matches!(err, ResolveError::Conflict { .. }));
    }

    #[test]
    fn record_without_code_is_malformed() {
        let body = json!({"total": 1, "content": [{"uuid": "x"}]});
        let err = parse_search_response("ODD", body).unwrap_err();
        assert!(matches!(err, ResolveError::Malformed { .. }));
    }
}
