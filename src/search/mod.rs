//! Search layer facade.
//!
//! - **[`engine`]**: the orchestrator. Tries semantic ranking, falls back to keywords.
//! - **[`api`]**: request parsing and the JSON response contract.
//! - **[`lexical`]**: keyword overlap scorer (always available).
//! - **[`semantic`]**: embedding scorer and the per-corpus embedding index.
//! - **[`embedder`]**: Embedder trait for semantic search (hash and ML implementations).
//! - **[`embedder_registry`]**: model-name resolution and availability checks.
//! - **[`hash_embedder`]**: FNV-1a feature hashing embedder (deterministic, no model files).
//! - **[`fastembed_embedder`]**: FastEmbed-backed ML embedder (MiniLM).
//! - **[`canonicalize`]**: Text preprocessing for consistent embedding input.

pub mod api;
pub mod canonicalize;
pub mod embedder;
pub mod embedder_registry;
pub mod engine;
pub mod fastembed_embedder;
pub mod hash_embedder;
pub mod lexical;
pub mod semantic;

/// A corpus position paired with the score a scorer gave it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredHit {
    pub position: usize,
    pub score: f32,
}

/// Sort descending by score. The sort is stable, so ties keep corpus order.
pub(crate) fn sort_hits(mut hits: Vec<ScoredHit>) -> Vec<ScoredHit> {
    hits.sort_by(|a, b| b.score.total_cmp(&a.score));
    hits
}
