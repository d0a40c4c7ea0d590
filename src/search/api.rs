//! Caller-facing request and response shapes.
//!
//! A response is always one JSON object tagged by `status`:
//!
//! ```json
//! {"status":"success","results":[...],"query":"...","count":2,"search_method":"semantic"}
//! {"status":"error","message":"Query cannot be empty","query":""}
//! ```

use serde::{Deserialize, Serialize};

use super::engine::{
    DEFAULT_MIN_SCORE, DEFAULT_TOP_K, SearchError, SearchMethod, SearchOutcome, SearchResult,
};

/// A single search invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_min_score")]
    pub min_score: f32,
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

fn default_min_score() -> f32 {
    DEFAULT_MIN_SCORE
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, top_k: usize, min_score: f32) -> Self {
        Self {
            query: query.into(),
            top_k,
            min_score,
        }
    }

    /// Parse a request piped on stdin.
    ///
    /// A JSON object supplies `query` and optionally `top_k` / `min_score`;
    /// missing fields take `defaults`. A JSON object with mistyped fields is an
    /// [`SearchError::InvalidRequest`]. Input that is not JSON at all is the
    /// query text itself.
    pub fn from_stdin(input: &str, defaults: &SearchRequest) -> Result<Self, SearchError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(SearchError::InvalidQuery);
        }

        if trimmed.starts_with('{')
            && let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed)
        {
            let partial: PartialRequest = serde_json::from_value(value)
                .map_err(|e| SearchError::InvalidRequest(e.to_string()))?;
            return Ok(Self {
                query: partial.query.unwrap_or_default(),
                top_k: partial.top_k.unwrap_or(defaults.top_k),
                min_score: partial.min_score.unwrap_or(defaults.min_score),
            });
        }

        Ok(Self {
            query: trimmed.to_string(),
            top_k: defaults.top_k,
            min_score: defaults.min_score,
        })
    }
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self::new(String::new(), DEFAULT_TOP_K, DEFAULT_MIN_SCORE)
    }
}

#[derive(Deserialize)]
struct PartialRequest {
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    top_k: Option<usize>,
    #[serde(default)]
    min_score: Option<f32>,
}

/// Envelope written back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SearchResponse {
    Success {
        results: Vec<SearchResult>,
        query: String,
        count: usize,
        search_method: SearchMethod,
    },
    Error {
        message: String,
        /// The query being answered; omitted when no query could be read.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        query: Option<String>,
    },
}

impl SearchResponse {
    pub fn success(outcome: SearchOutcome) -> Self {
        SearchResponse::Success {
            count: outcome.results.len(),
            results: outcome.results,
            query: outcome.query,
            search_method: outcome.method,
        }
    }

    pub fn error(message: impl Into<String>, query: Option<&str>) -> Self {
        SearchResponse::Error {
            message: message.into(),
            query: query.map(str::to_string),
        }
    }

    /// Envelope for the result of [`SearchEngine::search`](super::engine::SearchEngine::search).
    pub fn from_result(result: Result<SearchOutcome, SearchError>, query: &str) -> Self {
        match result {
            Ok(outcome) => Self::success(outcome),
            Err(e) => Self::error(e.to_string(), Some(query)),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SearchResponse::Success { .. })
    }

    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::Year;
    use serde_json::{Value, json};

    fn result(title: &str, score: f32) -> SearchResult {
        SearchResult {
            title: title.to_string(),
            summary: "s".to_string(),
            similarity_score: score,
            tags: vec!["Criminal Law".to_string()],
            year: Year::Unknown,
            id: None,
            jurisdiction: None,
            doc_type: None,
            citation: None,
        }
    }

    #[test]
    fn stdin_plain_text_is_query() {
        let req = SearchRequest::from_stdin("  right to counsel\n", &SearchRequest::default()).unwrap();
        assert_eq!(req.query, "right to counsel");
        assert_eq!(req.top_k, DEFAULT_TOP_K);
    }

    #[test]
    fn stdin_json_overrides_defaults() {
        let defaults = SearchRequest::new("", 5, 0.3);
        let req = SearchRequest::from_stdin(r#"{"query":"privacy","top_k":2}"#, &defaults).unwrap();
        assert_eq!(req, SearchRequest::new("privacy", 2, 0.3));
    }

    #[test]
    fn stdin_blank_is_rejected() {
        assert!(matches!(
            SearchRequest::from_stdin(" \n", &SearchRequest::default()),
            Err(SearchError::InvalidQuery)
        ));
    }

    #[test]
    fn stdin_malformed_json_is_treated_as_text() {
        let req = SearchRequest::from_stdin("{not json", &SearchRequest::default()).unwrap();
        assert_eq!(req.query, "{not json");
    }

    #[test]
    fn stdin_json_with_mistyped_fields_is_rejected() {
        let defaults = SearchRequest::default();
        for input in [
            r#"{"query":"miranda","top_k":-1}"#,
            r#"{"query":"miranda","min_score":"0.3"}"#,
            r#"{"query":42}"#,
        ] {
            let err = SearchRequest::from_stdin(input, &defaults).unwrap_err();
            assert!(
                matches!(err, SearchError::InvalidRequest(_)),
                "{input}: {err:?}"
            );
            assert!(err.to_string().starts_with("invalid request: "));
        }
    }

    #[test]
    fn success_shape() {
        let response = SearchResponse::success(SearchOutcome {
            query: "miranda".to_string(),
            method: SearchMethod::Keyword,
            results: vec![result("Miranda v. Arizona", 0.95)],
        });
        let value: Value = serde_json::from_str(&response.to_json(false).unwrap()).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["count"], 1);
        assert_eq!(value["search_method"], "keyword");
        assert_eq!(value["query"], "miranda");
        assert_eq!(value["results"][0]["year"], "N/A");
        assert!(value["results"][0].get("citation").is_none());
    }

    #[test]
    fn error_shape() {
        let response = SearchResponse::from_result(Err(SearchError::InvalidQuery), "");
        assert!(!response.is_success());
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"status": "error", "message": "Query cannot be empty", "query": ""})
        );
        let bare = SearchResponse::error("boom", None);
        assert_eq!(
            serde_json::to_value(&bare).unwrap(),
            json!({"status": "error", "message": "boom"})
        );
    }

    #[test]
    fn pretty_output_is_multiline() {
        let response = SearchResponse::error("boom", None);
        assert!(response.to_json(true).unwrap().contains('\n'));
    }
}
