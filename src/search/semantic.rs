//! Embedding scorer: dense-vector ranking by cosine similarity.
//!
//! The scorer owns an [`Embedder`] and turns a [`Corpus`] into an
//! [`EmbeddingIndex`] with one row per document, in corpus order. Queries are
//! encoded with the same embedder and compared against every row.
//!
//! ```text
//! Corpus ──embed_batch──→ EmbeddingIndex (row-major f32, cached norms)
//! Query  ──embed──────────→ q ──cosine(q, row_i)──→ stable descending hits
//! ```

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};
use wide::f32x8;

use super::ScoredHit;
use super::canonicalize::canonicalize_for_embedding;
use super::embedder::{Embedder, EmbedderError, EmbedderResult};
use super::embedder_registry::EmbedderRegistry;
use crate::model::types::Corpus;

/// Dense vectors for a corpus, one row per document.
///
/// Either complete (`len() == corpus.len()`) or never constructed.
#[derive(Debug, Clone)]
pub struct EmbeddingIndex {
    embedder_id: String,
    dimension: usize,
    /// Row-major, `len * dimension` values.
    vectors: Vec<f32>,
    norms: Vec<f32>,
}

impl EmbeddingIndex {
    fn from_rows(
        embedder_id: &str,
        dimension: usize,
        rows: Vec<Vec<f32>>,
    ) -> EmbedderResult<Self> {
        let mut vectors = Vec::with_capacity(rows.len() * dimension);
        let mut norms = Vec::with_capacity(rows.len());
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != dimension {
                return Err(EmbedderError::EmbeddingFailed(format!(
                    "embedding dimension mismatch at document {}: expected {}, got {}",
                    i,
                    dimension,
                    row.len()
                )));
            }
            norms.push(l2_norm(&row));
            vectors.extend(row);
        }
        Ok(Self {
            embedder_id: embedder_id.to_string(),
            dimension,
            vectors,
            norms,
        })
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.norms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.norms.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Embedder that produced the rows.
    pub fn embedder_id(&self) -> &str {
        &self.embedder_id
    }

    /// Vector for the document at `position`.
    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        let start = position.checked_mul(self.dimension)?;
        self.vectors.get(start..start + self.dimension)
    }
}

/// Ranks documents by cosine similarity to the query.
#[derive(Clone)]
pub struct EmbeddingScorer {
    embedder: Arc<dyn Embedder>,
}

impl std::fmt::Debug for EmbeddingScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingScorer")
            .field("embedder", &self.embedder.id())
            .finish()
    }
}

impl EmbeddingScorer {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }

    /// Acquire the model named `model` from the registry.
    ///
    /// Any load problem comes back as [`EmbedderError::Unavailable`].
    pub fn initialize(registry: &EmbedderRegistry, model: &str) -> EmbedderResult<Self> {
        let start = Instant::now();
        let embedder = registry.load(model)?;
        info!(
            embedder = embedder.id(),
            semantic = embedder.is_semantic(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "embedding model initialized"
        );
        Ok(Self::new(embedder))
    }

    pub fn embedder_id(&self) -> &str {
        self.embedder.id()
    }

    /// Encode every document once, in corpus order, with a single batch call.
    pub fn build_index(&self, corpus: &Corpus) -> EmbedderResult<EmbeddingIndex> {
        let start = Instant::now();
        let texts: Vec<String> = corpus
            .iter()
            .map(|doc| canonicalize_for_embedding(&doc.embedding_text()))
            .collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();

        let rows = self.embedder.embed_batch(&refs)?;
        if rows.len() != corpus.len() {
            return Err(EmbedderError::EmbeddingFailed(format!(
                "embedder returned {} vectors for {} documents",
                rows.len(),
                corpus.len()
            )));
        }
        let index = EmbeddingIndex::from_rows(self.embedder.id(), self.embedder.dimension(), rows)?;

        info!(
            embedder = self.embedder.id(),
            documents = index.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "built embedding index"
        );
        Ok(index)
    }

    /// Similarity of `query` to every indexed document.
    ///
    /// Sorted descending by similarity; equal scores keep corpus order.
    pub fn score(&self, query: &str, index: &EmbeddingIndex) -> EmbedderResult<Vec<ScoredHit>> {
        if index.embedder_id() != self.embedder.id() {
            return Err(EmbedderError::Internal(format!(
                "index built by '{}' queried with '{}'",
                index.embedder_id(),
                self.embedder.id()
            )));
        }

        let query_vec = self.embedder.embed(&canonicalize_for_embedding(query))?;
        if query_vec.len() != index.dimension() {
            return Err(EmbedderError::EmbeddingFailed(format!(
                "query dimension mismatch: expected {}, got {}",
                index.dimension(),
                query_vec.len()
            )));
        }
        let query_norm = l2_norm(&query_vec);

        let hits = (0..index.len())
            .filter_map(|position| {
                let row = index.vector(position)?;
                let score = cosine_from_parts(
                    dot_product(&query_vec, row),
                    query_norm,
                    index.norms[position],
                );
                Some(ScoredHit { position, score })
            })
            .collect();
        let hits = super::sort_hits(hits);

        debug!(
            embedder = self.embedder.id(),
            candidates = index.len(),
            top_score = hits.first().map(|h| h.score),
            "semantic scoring complete"
        );
        Ok(hits)
    }
}

/// Cosine similarity: `dot(a, b) / (|a| |b|)`, or 0 when either norm is 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    cosine_from_parts(dot_product(a, b), l2_norm(a), l2_norm(b))
}

fn cosine_from_parts(dot: f32, norm_a: f32, norm_b: f32) -> f32 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let sim = dot / (norm_a * norm_b);
    if sim.is_finite() { sim } else { 0.0 }
}

fn l2_norm(v: &[f32]) -> f32 {
    dot_product(v, v).sqrt()
}

/// SIMD-accelerated f32 dot product over the shared prefix of `a` and `b`.
#[inline]
fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    let len = a.len().min(b.len());
    let (a, b) = (&a[..len], &b[..len]);

    let mut sum = f32x8::ZERO;
    let a_chunks = a.chunks_exact(8);
    let b_chunks = b.chunks_exact(8);
    let (a_rem, b_rem) = (a_chunks.remainder(), b_chunks.remainder());

    let mut lane_a = [0.0f32; 8];
    let mut lane_b = [0.0f32; 8];
    for (ca, cb) in a_chunks.zip(b_chunks) {
        lane_a.copy_from_slice(ca);
        lane_b.copy_from_slice(cb);
        sum += f32x8::from(lane_a) * f32x8::from(lane_b);
    }

    let mut result: f32 = sum.reduce_add();
    for (x, y) in a_rem.iter().zip(b_rem) {
        result += x * y;
    }
    result
}
