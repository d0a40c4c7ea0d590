//! FNV-1a feature hashing embedder.
//!
//! Maps each lower-cased alphanumeric token to a signed bucket of a fixed-size
//! vector and L2-normalizes the result. It captures lexical overlap only, but it
//! is deterministic, needs no model files, and exercises the whole semantic path.

use super::embedder::{Embedder, EmbedderError, EmbedderResult};

/// Default output dimension, matching MiniLM so indexes are shape-compatible.
pub const DEFAULT_DIMENSION: usize = 384;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Feature-hashing embedder.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
    id: String,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        let dimension = dimension.max(1);
        Self {
            dimension,
            id: format!("fnv1a-{dimension}"),
        }
    }

    pub fn default_dimension() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::default_dimension()
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME)
    })
}

impl Embedder for HashEmbedder {
    fn embed(&self, text: &str) -> EmbedderResult<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(EmbedderError::InvalidInput("empty text".to_string()));
        }

        let mut embedding = vec![0.0f32; self.dimension];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let hash = fnv1a(token.to_lowercase().as_bytes());
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            embedding[bucket] += sign;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in embedding.iter_mut() {
                *v /= norm;
            }
        }
        Ok(embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn is_semantic(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_embedder_shape_and_norm() {
        let embedder = HashEmbedder::default();
        let v = embedder.embed("right to counsel").unwrap();
        assert_eq!(v.len(), DEFAULT_DIMENSION);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
        assert_eq!(embedder.id(), "fnv1a-384");
        assert!(!embedder.is_semantic());
    }

    #[test]
    fn test_hash_embedder_deterministic_and_case_insensitive() {
        let embedder = HashEmbedder::new(64);
        assert_eq!(
            embedder.embed("Judicial Review").unwrap(),
            embedder.embed("judicial review").unwrap()
        );
    }

    #[test]
    fn test_hash_embedder_rejects_blank() {
        let embedder = HashEmbedder::new(16);
        assert!(matches!(
            embedder.embed("   "),
            Err(EmbedderError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_punctuation_only_yields_zero_vector() {
        let embedder = HashEmbedder::new(16);
        let v = embedder.embed("?!").unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_zero_dimension_is_clamped() {
        assert_eq!(HashEmbedder::new(0).dimension(), 1);
    }

    #[test]
    fn test_fnv1a_known_vector() {
        assert_eq!(fnv1a(b""), FNV_OFFSET_BASIS);
        assert_eq!(fnv1a(b"a"), 0xaf63_dc4c_8601_ec8c);
    }
}
