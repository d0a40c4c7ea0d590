//! Search orchestrator.
//!
//! One entry point, [`SearchEngine::search`], with a fixed policy per call:
//!
//! ```text
//! validate ──→ semantic (index ready?) ──hits ≥ min_score──→ results [semantic]
//!                  │ unavailable / error / nothing qualifies
//!                  ▼
//!              keyword (score > 0) ─────────────────────────→ results [keyword]
//! ```
//!
//! `min_score` gates only the semantic path. Keyword results carry their own
//! floor of "at least one token matched" and may score below `min_score`.
//! A single call never mixes results from both scorers.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::ScoredHit;
use super::embedder::EmbedderResult;
use super::lexical::KeywordScorer;
use super::semantic::{EmbeddingIndex, EmbeddingScorer};
use crate::model::types::{Corpus, Document, Year};

/// Default number of results per query.
pub const DEFAULT_TOP_K: usize = 5;

/// Default semantic threshold.
pub const DEFAULT_MIN_SCORE: f32 = 0.1;

/// Character budget for summaries cut from content.
pub const DEFAULT_SUMMARY_CHARS: usize = 200;

/// Which scorer produced a batch of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMethod {
    Semantic,
    Keyword,
}

impl SearchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMethod::Semantic => "semantic",
            SearchMethod::Keyword => "keyword",
        }
    }
}

impl std::fmt::Display for SearchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ranked document, projected for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub summary: String,
    pub similarity_score: f32,
    pub tags: Vec<String>,
    pub year: Year,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,
}

impl SearchResult {
    fn project(document: &Document, score: f32, summary_chars: usize) -> Self {
        Self {
            title: document.title.clone(),
            summary: document.display_summary(summary_chars),
            similarity_score: score,
            tags: document.tags.clone(),
            year: document.year,
            id: Some(document.id.clone()),
            jurisdiction: document.jurisdiction.clone(),
            doc_type: document.doc_type.clone(),
            citation: document.citation.clone(),
        }
    }
}

/// A completed search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// The trimmed query that was scored.
    pub query: String,
    pub method: SearchMethod,
    pub results: Vec<SearchResult>,
}

/// Failures a caller can see. Scorer problems never show up here.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Query cannot be empty")]
    InvalidQuery,
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("unexpected search failure: {0}")]
    Internal(String),
}

struct SemanticState {
    scorer: EmbeddingScorer,
    index: EmbeddingIndex,
}

/// Immutable search engine over one corpus.
///
/// Construction does the expensive work (model load, index build); `search`
/// is cheap and may be called any number of times.
pub struct SearchEngine {
    corpus: Corpus,
    semantic: Option<SemanticState>,
    keyword: KeywordScorer,
    summary_chars: usize,
}

impl SearchEngine {
    /// Engine that always answers with the keyword scorer.
    pub fn keyword_only(corpus: Corpus) -> Self {
        Self {
            corpus,
            semantic: None,
            keyword: KeywordScorer::new(),
            summary_chars: DEFAULT_SUMMARY_CHARS,
        }
    }

    /// Engine with semantic ranking, if the index can be built.
    ///
    /// An index build failure is logged and leaves the engine keyword-only.
    pub fn with_scorer(corpus: Corpus, scorer: EmbeddingScorer) -> Self {
        let mut engine = Self::keyword_only(corpus);
        if engine.corpus.is_empty() {
            debug!("empty corpus; skipping embedding index");
            return engine;
        }
        match scorer.build_index(&engine.corpus) {
            Ok(index) => engine.semantic = Some(SemanticState { scorer, index }),
            Err(e) => warn!(
                error = %e,
                embedder = scorer.embedder_id(),
                "embedding index build failed; keyword search only"
            ),
        }
        engine
    }

    /// Engine from the outcome of [`EmbeddingScorer::initialize`].
    ///
    /// A model that failed to load is logged and never surfaces to the caller.
    pub fn from_initialization(corpus: Corpus, scorer: EmbedderResult<EmbeddingScorer>) -> Self {
        match scorer {
            Ok(scorer) => Self::with_scorer(corpus, scorer),
            Err(e) => {
                warn!(error = %e, "embedding model unavailable; keyword search only");
                Self::keyword_only(corpus)
            }
        }
    }

    /// Override the summary character budget.
    pub fn with_summary_chars(mut self, summary_chars: usize) -> Self {
        self.summary_chars = summary_chars;
        self
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Whether the semantic path will be attempted.
    pub fn semantic_ready(&self) -> bool {
        self.semantic
            .as_ref()
            .is_some_and(|state| !state.index.is_empty())
    }

    /// Embedder behind the semantic path, if any.
    pub fn embedder_id(&self) -> Option<&str> {
        self.semantic.as_ref().map(|s| s.scorer.embedder_id())
    }

    /// Rank the corpus against `query`.
    pub fn search(
        &self,
        query: &str,
        top_k: usize,
        min_score: f32,
    ) -> Result<SearchOutcome, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::InvalidQuery);
        }
        let start = Instant::now();

        if self.corpus.is_empty() {
            warn!("no documents loaded; returning empty result");
            return Ok(SearchOutcome {
                query: query.to_string(),
                method: SearchMethod::Keyword,
                results: Vec::new(),
            });
        }

        if top_k == 0 {
            let method = if self.semantic_ready() {
                SearchMethod::Semantic
            } else {
                SearchMethod::Keyword
            };
            return Ok(SearchOutcome {
                query: query.to_string(),
                method,
                results: Vec::new(),
            });
        }

        let (method, hits) = match self.semantic_hits(query, top_k, min_score) {
            Some(hits) => (SearchMethod::Semantic, hits),
            None => {
                let mut hits = self.keyword.rank(query, &self.corpus);
                hits.truncate(top_k);
                (SearchMethod::Keyword, hits)
            }
        };

        let results = self.assemble(&hits)?;
        info!(
            method = method.as_str(),
            top_k,
            min_score,
            count = results.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "search complete"
        );
        Ok(SearchOutcome {
            query: query.to_string(),
            method,
            results,
        })
    }

    /// Qualifying semantic hits, or `None` when the keyword path must run.
    fn semantic_hits(&self, query: &str, top_k: usize, min_score: f32) -> Option<Vec<ScoredHit>> {
        let state = self.semantic.as_ref()?;
        if state.index.is_empty() {
            return None;
        }

        match state.scorer.score(query, &state.index) {
            Ok(hits) => {
                let qualifying: Vec<ScoredHit> = hits
                    .into_iter()
                    .take_while(|hit| hit.score >= min_score)
                    .take(top_k)
                    .collect();
                if qualifying.is_empty() {
                    debug!(min_score, "no semantic hit above threshold; falling back");
                    None
                } else {
                    Some(qualifying)
                }
            }
            Err(e) => {
                warn!(error = %e, "semantic scoring failed; falling back to keyword search");
                None
            }
        }
    }

    fn assemble(&self, hits: &[ScoredHit]) -> Result<Vec<SearchResult>, SearchError> {
        hits.iter()
            .map(|hit| {
                let document = self.corpus.get(hit.position).ok_or_else(|| {
                    SearchError::Internal(format!(
                        "hit position {} outside corpus of {}",
                        hit.position,
                        self.corpus.len()
                    ))
                })?;
                Ok(SearchResult::project(document, hit.score, self.summary_chars))
            })
            .collect()
    }
}
