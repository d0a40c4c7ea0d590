//! Embedder registry for model selection.
//!
//! Maps the model identifier given in config or on the command line to a
//! concrete [`Embedder`], and reports which models are usable under the model
//! root without loading them.
//!
//! | Name | ID | Dimension | Type | Notes |
//! |------|-----|-----------|------|-------|
//! | minilm | minilm-384 | 384 | ML | Default semantic embedder |
//! | hash | fnv1a-384 | 384 | Hash | Always available |

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use super::embedder::{Embedder, EmbedderError, EmbedderResult};
use super::fastembed_embedder::FastEmbedder;
use super::hash_embedder::HashEmbedder;

/// Default embedder name when none specified.
pub const DEFAULT_EMBEDDER: &str = "minilm";

/// Hash embedder name (always available).
pub const HASH_EMBEDDER: &str = "hash";

/// Information about a registered embedder.
#[derive(Debug, Clone, Serialize)]
pub struct RegisteredEmbedder {
    /// Short name for CLI/config (e.g., "minilm", "hash").
    pub name: &'static str,
    /// Unique embedder ID (e.g., "minilm-384", "fnv1a-384").
    pub id: &'static str,
    pub dimension: usize,
    pub is_semantic: bool,
    pub description: &'static str,
    /// Whether model files are required (false = always available).
    pub requires_model_files: bool,
    /// HuggingFace model ID for reference.
    pub huggingface_id: &'static str,
}

impl RegisteredEmbedder {
    /// Model directory for this embedder below `model_root`, if it has one.
    pub fn model_dir(&self, model_root: &Path) -> Option<PathBuf> {
        self.requires_model_files
            .then(|| FastEmbedder::default_model_dir(model_root))
    }

    /// Required files that are not present under `model_root`.
    pub fn missing_files(&self, model_root: &Path) -> Vec<String> {
        match self.model_dir(model_root) {
            Some(dir) => FastEmbedder::required_model_files()
                .iter()
                .filter(|f| !dir.join(f).is_file())
                .map(|f| (*f).to_string())
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn is_available(&self, model_root: &Path) -> bool {
        self.missing_files(model_root).is_empty()
    }
}

/// Static registry of all supported embedders.
pub static EMBEDDERS: &[RegisteredEmbedder] = &[
    RegisteredEmbedder {
        name: "minilm",
        id: "minilm-384",
        dimension: 384,
        is_semantic: true,
        description: "MiniLM L6 v2 sentence embeddings",
        requires_model_files: true,
        huggingface_id: "sentence-transformers/all-MiniLM-L6-v2",
    },
    RegisteredEmbedder {
        name: "hash",
        id: "fnv1a-384",
        dimension: 384,
        is_semantic: false,
        description: "FNV-1a feature hashing, deterministic and always available",
        requires_model_files: false,
        huggingface_id: "",
    },
];

/// Availability of one registered embedder under a model root.
#[derive(Debug, Clone, Serialize)]
pub struct EmbedderStatus {
    #[serde(flatten)]
    pub embedder: RegisteredEmbedder,
    pub available: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_files: Vec<String>,
}

/// Embedder registry bound to a model root directory.
pub struct EmbedderRegistry {
    model_root: PathBuf,
}

impl EmbedderRegistry {
    pub fn new(model_root: &Path) -> Self {
        Self {
            model_root: model_root.to_path_buf(),
        }
    }

    pub fn model_root(&self) -> &Path {
        &self.model_root
    }

    /// Get all registered embedders.
    pub fn all(&self) -> &'static [RegisteredEmbedder] {
        EMBEDDERS
    }

    /// Look up by name or id (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&'static RegisteredEmbedder> {
        let name_lower = name.trim().to_ascii_lowercase();
        EMBEDDERS
            .iter()
            .find(|e| e.name == name_lower || e.id == name_lower)
    }

    /// Availability report for every registered embedder.
    pub fn status(&self) -> Vec<EmbedderStatus> {
        EMBEDDERS
            .iter()
            .map(|e| {
                let missing_files = e.missing_files(&self.model_root);
                EmbedderStatus {
                    embedder: e.clone(),
                    available: missing_files.is_empty(),
                    missing_files,
                }
            })
            .collect()
    }

    /// Resolve `name` and check its files, without loading the model.
    pub fn validate(&self, name: &str) -> EmbedderResult<&'static RegisteredEmbedder> {
        let embedder = self.get(name).ok_or_else(|| {
            EmbedderError::Unavailable(format!(
                "unknown embedder '{}'. Available: {}",
                name,
                EMBEDDERS
                    .iter()
                    .map(|e| e.name)
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })?;

        let missing = embedder.missing_files(&self.model_root);
        if !missing.is_empty() {
            let model_dir = embedder
                .model_dir(&self.model_root)
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            return Err(EmbedderError::Unavailable(format!(
                "embedder '{}' not available: missing files in {}: {}",
                embedder.name,
                model_dir,
                missing.join(", ")
            )));
        }

        Ok(embedder)
    }

    /// Validate and load an embedder by name.
    pub fn load(&self, name: &str) -> EmbedderResult<Arc<dyn Embedder>> {
        let info = self.validate(name)?;
        match info.name {
            HASH_EMBEDDER => Ok(Arc::new(HashEmbedder::new(info.dimension))),
            DEFAULT_EMBEDDER => {
                let dir = FastEmbedder::default_model_dir(&self.model_root);
                Ok(Arc::new(FastEmbedder::load_from_dir(&dir)?))
            }
            other => Err(EmbedderError::Unavailable(format!(
                "embedder '{other}' not implemented"
            ))),
        }
    }
}

/// Load an embedder by name from `model_root`.
pub fn get_embedder(model_root: &Path, name: &str) -> EmbedderResult<Arc<dyn Embedder>> {
    EmbedderRegistry::new(model_root).load(name)
}
