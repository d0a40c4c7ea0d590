//! FastEmbed-based ML embedder (all-MiniLM-L6-v2).
//!
//! Loads a local ONNX model + tokenizer bundle and produces semantic embeddings.
//! Model assets are never fetched at search time; a missing or unreadable file
//! surfaces as [`EmbedderError::Unavailable`] so the engine can fall back to
//! keyword search.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use fastembed::{
    InitOptionsUserDefined, Pooling, TextEmbedding, TokenizerFiles, UserDefinedEmbeddingModel,
};
use tracing::debug;

use super::embedder::{Embedder, EmbedderError, EmbedderResult};

const MODEL_DIR_NAME: &str = "all-MiniLM-L6-v2";
const EMBEDDER_ID: &str = "minilm-384";
const EMBEDDING_DIMENSION: usize = 384;

const MODEL_FILE: &str = "model.onnx";
const TOKENIZER_JSON: &str = "tokenizer.json";
const CONFIG_JSON: &str = "config.json";
const SPECIAL_TOKENS_JSON: &str = "special_tokens_map.json";
const TOKENIZER_CONFIG_JSON: &str = "tokenizer_config.json";

/// FastEmbed-backed semantic embedder using MiniLM.
pub struct FastEmbedder {
    model: Mutex<TextEmbedding>,
    dimension: usize,
}

impl FastEmbedder {
    /// Stable embedder identifier for MiniLM.
    pub fn embedder_id_static() -> &'static str {
        EMBEDDER_ID
    }

    /// Required model files for MiniLM (must all exist locally).
    pub fn required_model_files() -> &'static [&'static str] {
        &[
            MODEL_FILE,
            TOKENIZER_JSON,
            CONFIG_JSON,
            SPECIAL_TOKENS_JSON,
            TOKENIZER_CONFIG_JSON,
        ]
    }

    /// Model directory below the configured model root.
    pub fn default_model_dir(model_root: &Path) -> PathBuf {
        model_root.join(MODEL_DIR_NAME)
    }

    /// Load the MiniLM model + tokenizer from a local directory.
    pub fn load_from_dir(model_dir: &Path) -> EmbedderResult<Self> {
        if !model_dir.is_dir() {
            return Err(EmbedderError::Unavailable(format!(
                "model directory not found: {}",
                model_dir.display()
            )));
        }

        let missing: Vec<&str> = Self::required_model_files()
            .iter()
            .copied()
            .filter(|name| !model_dir.join(name).is_file())
            .collect();
        if !missing.is_empty() {
            return Err(EmbedderError::Unavailable(format!(
                "model files missing in {}: {}",
                model_dir.display(),
                missing.join(", ")
            )));
        }

        let model_file = Self::read_required(model_dir.join(MODEL_FILE), MODEL_FILE)?;
        let tokenizer_files = TokenizerFiles {
            tokenizer_file: Self::read_required(model_dir.join(TOKENIZER_JSON), TOKENIZER_JSON)?,
            config_file: Self::read_required(model_dir.join(CONFIG_JSON), CONFIG_JSON)?,
            special_tokens_map_file: Self::read_required(
                model_dir.join(SPECIAL_TOKENS_JSON),
                SPECIAL_TOKENS_JSON,
            )?,
            tokenizer_config_file: Self::read_required(
                model_dir.join(TOKENIZER_CONFIG_JSON),
                TOKENIZER_CONFIG_JSON,
            )?,
        };

        let mut model = UserDefinedEmbeddingModel::new(model_file, tokenizer_files);
        model.pooling = Some(Pooling::Mean);

        let model =
            TextEmbedding::try_new_from_user_defined(model, InitOptionsUserDefined::new())
                .map_err(|e| EmbedderError::Unavailable(format!("fastembed init failed: {e}")))?;

        debug!(model_dir = %model_dir.display(), "loaded MiniLM embedder");

        Ok(Self {
            model: Mutex::new(model),
            dimension: EMBEDDING_DIMENSION,
        })
    }

    fn read_required(path: PathBuf, label: &str) -> EmbedderResult<Vec<u8>> {
        fs::read(&path).map_err(|e| {
            EmbedderError::Unavailable(format!("unable to read {label} at {}: {e}", path.display()))
        })
    }

    fn check_dimension(&self, embedding: &[f32]) -> EmbedderResult<()> {
        if embedding.len() != self.dimension {
            return Err(EmbedderError::EmbeddingFailed(format!(
                "fastembed dimension mismatch: expected {}, got {}",
                self.dimension,
                embedding.len()
            )));
        }
        Ok(())
    }

    fn normalize_in_place(embedding: &mut [f32]) {
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in embedding.iter_mut() {
                *v /= norm;
            }
        }
    }
}

impl Embedder for FastEmbedder {
    fn embed(&self, text: &str) -> EmbedderResult<Vec<f32>> {
        let mut batch = self.embed_batch(&[text])?;
        batch.pop().ok_or_else(|| {
            EmbedderError::EmbeddingFailed("fastembed returned no embedding".to_string())
        })
    }

    fn embed_batch(&self, texts: &[&str]) -> EmbedderResult<Vec<Vec<f32>>> {
        if texts.iter().any(|t| t.is_empty()) {
            return Err(EmbedderError::InvalidInput(
                "empty text in batch".to_string(),
            ));
        }
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut model = self
            .model
            .lock()
            .map_err(|_| EmbedderError::Internal("fastembed lock poisoned".to_string()))?;

        let mut embeddings = model
            .embed(texts.to_vec(), None)
            .map_err(|e| EmbedderError::EmbeddingFailed(format!("fastembed embed failed: {e}")))?;

        if embeddings.len() != texts.len() {
            return Err(EmbedderError::EmbeddingFailed(format!(
                "fastembed returned {} embeddings for {} texts",
                embeddings.len(),
                texts.len()
            )));
        }
        for embedding in embeddings.iter_mut() {
            self.check_dimension(embedding)?;
            Self::normalize_in_place(embedding);
        }

        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn id(&self) -> &str {
        EMBEDDER_ID
    }

    fn is_semantic(&self) -> bool {
        true
    }
}
