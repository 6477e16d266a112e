//! Query parameter assembly and normalization
//!
//! Parameters are kept as an ordered list of string pairs, exactly as they
//! go on the wire. The same list drives the cache key, so two logically
//! identical requests map to the same entry.

use serde_json::{Map, Value};
use url::form_urlencoded;

/// Upstream query parameter carrying the search text
pub const QUERY_PARAM: &str = "s";
/// Upstream query parameter carrying the pagination token
pub const PAGE_TOKEN_PARAM: &str = "npt";
/// Upstream query parameter toggling extended web search
pub const EXTENDED_SEARCH_PARAM: &str = "extendedsearch";
/// Upstream query parameter selecting the scraper
pub const SCRAPER_PARAM: &str = "scraper";

/// Normalized, ordered query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Start a parameter list for a search
    ///
    /// A non-empty page token wins over the query, which is then omitted.
    /// `extra` is merged afterwards: null values are skipped and a repeated
    /// key replaces the earlier value in place.
    pub fn for_search(query: &str, page_token: Option<&str>, extra: &Map<String, Value>) -> Self {
        let mut merged = Map::new();
        match page_token.filter(|token| !token.is_empty()) {
            Some(token) => merged.insert(PAGE_TOKEN_PARAM.to_string(), Value::from(token)),
            None => merged.insert(QUERY_PARAM.to_string(), Value::from(query)),
        };
        for (key, value) in extra {
            if !value.is_null() {
                merged.insert(key.clone(), value.clone());
            }
        }
        Self::from_map(&merged)
    }

    /// Normalize a JSON object into query pairs, preserving key order
    pub fn from_map(map: &Map<String, Value>) -> Self {
        let mut params = Self::default();
        for (key, value) in map {
            params.push_value(key, value);
        }
        params
    }

    /// Set `key`, replacing an existing value in place or appending
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        let mut seen = false;
        self.pairs.retain_mut(|(k, v)| {
            if k != key {
                return true;
            }
            if seen {
                return false;
            }
            seen = true;
            *v = value.clone();
            true
        });
        if !seen {
            self.pairs.push((key.to_string(), value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `application/x-www-form-urlencoded` rendering, in pair order
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }

    /// Deterministic cache key for a request to `endpoint` with these parameters
    pub fn cache_key(&self, endpoint: &str) -> String {
        format!("{}:{}", endpoint, self.to_query_string())
    }

    fn push_value(&mut self, key: &str, value: &Value) {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    if let Some(scalar) = scalar_to_string(item) {
                        self.pairs.push((key.to_string(), scalar));
                    }
                }
            }
            other => {
                if let Some(scalar) = scalar_to_string(other) {
                    self.pairs.push((key.to_string(), scalar));
                }
            }
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(if *b { "true" } else { "false" }.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        // Nested structures have no query-string form; send their JSON text
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_query_without_token() {
        let params = QueryParams::for_search("rust", None, &Map::new());
        assert_eq!(params.pairs(), &[("s".to_string(), "rust".to_string())]);
    }

    #[test]
    fn test_page_token_replaces_query() {
        let params = QueryParams::for_search("ignored", Some("token123"), &Map::new());
        assert_eq!(params.get("npt"), Some("token123"));
        assert!(!params.contains("s"));
    }

    #[test]
    fn test_empty_page_token_falls_back_to_query() {
        let params = QueryParams::for_search("rust", Some(""), &Map::new());
        assert_eq!(params.get("s"), Some("rust"));
        assert!(!params.contains("npt"));
    }

    #[test]
    fn test_extra_params_normalized_in_order() {
        let extra = map(json!({
            "lang": "en",
            "skip": null,
            "safe": false,
            "count": 20,
            "tags": ["a", null, "b"],
        }));
        let params = QueryParams::for_search("rust", None, &extra);

        let expected: Vec<(String, String)> = [
            ("s", "rust"),
            ("lang", "en"),
            ("safe", "false"),
            ("count", "20"),
            ("tags", "a"),
            ("tags", "b"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        assert_eq!(params.pairs(), expected.as_slice());
    }

    #[test]
    fn test_extra_can_override_query_in_place() {
        let extra = map(json!({"lang": "en", "s": "override"}));
        let params = QueryParams::for_search("rust", None, &extra);
        assert_eq!(params.pairs()[0], ("s".to_string(), "override".to_string()));
        assert_eq!(params.pairs().len(), 2);
    }

    #[test]
    fn test_set_replaces_or_appends() {
        let mut params = QueryParams::for_search("rust", None, &Map::new());
        params.set("extendedsearch", "true");
        params.set("s", "go");
        assert_eq!(params.to_query_string(), "s=go&extendedsearch=true");
    }

    #[test]
    fn test_set_collapses_repeated_key() {
        let extra = map(json!({"tags": ["a", "b"]}));
        let mut params = QueryParams::for_search("rust", None, &extra);
        params.set("tags", "c");
        assert_eq!(params.to_query_string(), "s=rust&tags=c");
    }

    #[test]
    fn test_cache_key_is_deterministic() {
        let extra = map(json!({"lang": "en", "safe": true}));
        let a = QueryParams::for_search("hello world", None, &extra);
        let b = QueryParams::for_search("hello world", None, &extra);
        assert_eq!(a.cache_key("web"), b.cache_key("web"));
        assert_eq!(a.cache_key("web"), "web:s=hello+world&lang=en&safe=true");
        assert_ne!(a.cache_key("web"), a.cache_key("news"));
    }

    #[test]
    fn test_cache_key_respects_insertion_order() {
        let a = QueryParams::for_search("q", None, &map(json!({"a": "1", "b": "2"})));
        let b = QueryParams::for_search("q", None, &map(json!({"b": "2", "a": "1"})));
        assert_ne!(a.cache_key("web"), b.cache_key("web"));
    }

    #[test]
    fn test_object_values_sent_as_json() {
        let extra = map(json!({"filter": {"size": "large"}}));
        let params = QueryParams::for_search("q", None, &extra);
        assert_eq!(params.get("filter"), Some(r#"{"size":"large"}"#));
    }
}
