//! Embedder trait and types for semantic search.
//!
//! The [`Embedder`] trait is the seam between the search orchestrator and whatever
//! produces dense vectors. Swapping implementations is how the engine runs with
//! the MiniLM model in production, the hash embedder in deterministic setups, and
//! test doubles that fail on purpose.
//!
//! # Implementations
//!
//! - **Hash embedder**: FNV-1a feature hashing. No model files, always available.
//! - **FastEmbed embedder**: MiniLM via FastEmbed, loaded from a local model directory.

use thiserror::Error;

/// Error type for embedder operations.
///
/// None of these reach the caller of a search: the orchestrator logs them and
/// answers with the keyword scorer instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmbedderError {
    /// The model could not be acquired (missing weights, unknown name, init failure).
    #[error("embedder unavailable: {0}")]
    Unavailable(String),
    /// Encoding ran but failed or produced malformed output.
    #[error("embedding failed: {0}")]
    EmbeddingFailed(String),
    /// Input text is empty or invalid.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Internal error in the embedder.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for embedder operations.
pub type EmbedderResult<T> = Result<T, EmbedderError>;

/// Trait for text embedding implementations.
///
/// All embedders produce fixed-dimension vectors. Vectors are expected to be
/// L2-normalized, but the scorer computes full cosine similarity and does not
/// rely on it.
pub trait Embedder: Send + Sync {
    /// Embed a single text into a vector of length [`dimension()`](Self::dimension).
    ///
    /// # Errors
    ///
    /// - [`EmbedderError::InvalidInput`] if the text is empty.
    /// - [`EmbedderError::EmbeddingFailed`] if inference fails.
    fn embed(&self, text: &str) -> EmbedderResult<Vec<f32>>;

    /// Embed multiple texts in one call, preserving input order.
    ///
    /// The default implementation calls [`embed()`](Self::embed) for each text;
    /// ML embedders override it with a single batched inference.
    fn embed_batch(&self, texts: &[&str]) -> EmbedderResult<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// The output dimension of this embedder.
    fn dimension(&self) -> usize;

    /// Unique identifier, formatted `{type}-{dimension}` (e.g. `minilm-384`).
    fn id(&self) -> &str;

    /// Whether this is a true semantic embedder (ML-based).
    fn is_semantic(&self) -> bool;
}
