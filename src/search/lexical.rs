//! Keyword overlap scorer.
//!
//! Score = fraction of query tokens that occur as substrings of the document's
//! lower-cased searchable text, capped at [`KEYWORD_SCORE_CAP`]. Repeated query
//! tokens are counted once per occurrence in both numerator and denominator, so
//! `"ohio ohio court"` weighs "ohio" twice.

use tracing::debug;

use super::{ScoredHit, sort_hits};
use crate::model::types::{Corpus, Document};

/// Ceiling for keyword scores, below a perfect semantic match.
pub const KEYWORD_SCORE_CAP: f32 = 0.95;

/// Lower-cased whitespace tokens of `query`, duplicates kept.
pub fn query_tokens(query: &str) -> Vec<String> {
    query.to_lowercase().split_whitespace().map(str::to_string).collect()
}

/// Stateless bag-of-words scorer.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordScorer;

impl KeywordScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score one document in `[0, KEYWORD_SCORE_CAP]`.
    pub fn score(&self, query: &str, document: &Document) -> f32 {
        score_tokens(&query_tokens(query), &document.searchable_text())
    }

    /// Every document with at least one matching token, best first.
    ///
    /// Documents scoring 0 are left out entirely. Ties keep corpus order.
    pub fn rank(&self, query: &str, corpus: &Corpus) -> Vec<ScoredHit> {
        let tokens = query_tokens(query);
        if tokens.is_empty() {
            return Vec::new();
        }

        let hits: Vec<ScoredHit> = corpus
            .iter()
            .enumerate()
            .filter_map(|(position, doc)| {
                let score = score_tokens(&tokens, &doc.searchable_text());
                (score > 0.0).then_some(ScoredHit { position, score })
            })
            .collect();

        debug!(
            tokens = tokens.len(),
            matched = hits.len(),
            corpus = corpus.len(),
            "keyword scoring complete"
        );
        sort_hits(hits)
    }
}

fn score_tokens(tokens: &[String], searchable: &str) -> f32 {
    if tokens.is_empty() {
        return 0.0;
    }
    let matches = tokens
        .iter()
        .filter(|token| searchable.contains(token.as_str()))
        .count();
    (matches as f32 / tokens.len() as f32).min(KEYWORD_SCORE_CAP)
}
