//! Layered search configuration.
//!
//! Precedence, lowest to highest: built-in defaults, TOML config file,
//! `CASE_SEARCH_*` environment variables (a `.env` file is honored), CLI flags.
//! The CLI layer is applied by the binary after [`SearchConfig::load`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::search::embedder_registry::DEFAULT_EMBEDDER;
use crate::search::engine::{DEFAULT_MIN_SCORE, DEFAULT_SUMMARY_CHARS, DEFAULT_TOP_K};

/// Model name that turns the semantic path off.
pub const MODEL_DISABLED: &str = "none";

pub const ENV_CONFIG: &str = "CASE_SEARCH_CONFIG";
pub const ENV_TOP_K: &str = "CASE_SEARCH_TOP_K";
pub const ENV_MIN_SCORE: &str = "CASE_SEARCH_MIN_SCORE";
pub const ENV_SUMMARY_CHARS: &str = "CASE_SEARCH_SUMMARY_CHARS";
pub const ENV_MODEL: &str = "CASE_SEARCH_MODEL";
pub const ENV_MODEL_DIR: &str = "CASE_SEARCH_MODEL_DIR";
pub const ENV_CORPUS: &str = "CASE_SEARCH_CORPUS";
pub const ENV_DB: &str = "CASE_SEARCH_DB";
pub const ENV_LOG_FILE: &str = "CASE_SEARCH_LOG_FILE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid {key} value {value:?}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub top_k: usize,
    pub min_score: f32,
    pub summary_chars: usize,
    /// Registered embedder name, or `"none"`.
    pub model: String,
    /// Root under which embedder model directories live.
    pub model_dir: Option<PathBuf>,
    /// JSON corpus file.
    pub corpus_path: Option<PathBuf>,
    /// SQLite database with a `legal_resources` table.
    pub db_path: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            min_score: DEFAULT_MIN_SCORE,
            summary_chars: DEFAULT_SUMMARY_CHARS,
            model: DEFAULT_EMBEDDER.to_string(),
            model_dir: None,
            corpus_path: None,
            db_path: None,
            log_file: None,
        }
    }
}

/// Partial configuration as written in a config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigPatch {
    top_k: Option<usize>,
    min_score: Option<f32>,
    summary_chars: Option<usize>,
    model: Option<String>,
    model_dir: Option<PathBuf>,
    corpus_path: Option<PathBuf>,
    db_path: Option<PathBuf>,
    log_file: Option<PathBuf>,
}

impl SearchConfig {
    /// Defaults, then config file, then environment.
    ///
    /// `explicit_path` (or `CASE_SEARCH_CONFIG`) must exist when given; the
    /// default location is optional.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| dotenvy::var(ENV_CONFIG).ok().map(PathBuf::from));

        match explicit {
            Some(path) => {
                let patch = load_patch(&path)?.ok_or_else(|| ConfigError::Read {
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
                    path: path.clone(),
                })?;
                config.merge_patch(patch);
            }
            None => {
                if let Some(path) = default_config_path()
                    && let Some(patch) = load_patch(&path)?
                {
                    config.merge_patch(patch);
                }
            }
        }

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply `CASE_SEARCH_*` variables from the process environment or `.env`.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| dotenvy::var(key).ok())
    }

    /// Apply overrides from any key lookup.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(value) = get(ENV_TOP_K) {
            self.top_k = parse_value(ENV_TOP_K, &value)?;
        }
        if let Some(value) = get(ENV_MIN_SCORE) {
            self.min_score = parse_min_score(ENV_MIN_SCORE, &value)?;
        }
        if let Some(value) = get(ENV_SUMMARY_CHARS) {
            self.summary_chars = parse_value(ENV_SUMMARY_CHARS, &value)?;
        }
        if let Some(value) = get(ENV_MODEL) {
            self.model = value.trim().to_string();
        }
        if let Some(value) = get(ENV_MODEL_DIR) {
            self.model_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = get(ENV_CORPUS) {
            self.corpus_path = Some(PathBuf::from(value));
        }
        if let Some(value) = get(ENV_DB) {
            self.db_path = Some(PathBuf::from(value));
        }
        if let Some(value) = get(ENV_LOG_FILE) {
            self.log_file = Some(PathBuf::from(value));
        }
        Ok(())
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(v) = patch.top_k {
            self.top_k = v;
        }
        if let Some(v) = patch.min_score {
            self.min_score = v;
        }
        if let Some(v) = patch.summary_chars {
            self.summary_chars = v;
        }
        if let Some(v) = patch.model {
            self.model = v;
        }
        if patch.model_dir.is_some() {
            self.model_dir = patch.model_dir;
        }
        if patch.corpus_path.is_some() {
            self.corpus_path = patch.corpus_path;
        }
        if patch.db_path.is_some() {
            self.db_path = patch.db_path;
        }
        if patch.log_file.is_some() {
            self.log_file = patch.log_file;
        }
    }

    /// Whether an embedding model should be loaded at all.
    pub fn semantic_enabled(&self) -> bool {
        !self.model.trim().eq_ignore_ascii_case(MODEL_DISABLED)
    }

    /// Model root, defaulting to `models/` under `data_dir`.
    pub fn model_root(&self, data_dir: &Path) -> PathBuf {
        self.model_dir
            .clone()
            .unwrap_or_else(|| data_dir.join("models"))
    }
}

fn load_patch(path: &Path) -> Result<Option<ConfigPatch>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let patch = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "loaded config file");
    Ok(Some(patch))
}

/// `<config dir>/case-search/config.toml`, when the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "case-search", "case-search")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|err| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: err.to_string(),
        })
}

fn parse_min_score(key: &str, value: &str) -> Result<f32, ConfigError> {
    let score: f32 = parse_value(key, value)?;
    if !score.is_finite() {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: "must be a finite number".to_string(),
        });
    }
    Ok(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_engine_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.top_k, 5);
        assert!((config.min_score - 0.1).abs() < f32::EPSILON);
        assert_eq!(config.summary_chars, 200);
        assert_eq!(config.model, "minilm");
        assert!(config.semantic_enabled());
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = SearchConfig::default();
        config
            .apply_overrides_from(lookup(&[
                (ENV_TOP_K, "3"),
                (ENV_MIN_SCORE, "0.3"),
                (ENV_MODEL, "none"),
                (ENV_CORPUS, "/tmp/cases.json"),
                (ENV_DB, ""),
            ]))
            .unwrap();
        assert_eq!(config.top_k, 3);
        assert!((config.min_score - 0.3).abs() < 1e-6);
        assert!(!config.semantic_enabled());
        assert_eq!(config.corpus_path, Some(PathBuf::from("/tmp/cases.json")));
        assert_eq!(config.db_path, None);
    }

    #[test]
    fn invalid_env_value_is_reported() {
        let mut config = SearchConfig::default();
        let err = config
            .apply_overrides_from(lookup(&[(ENV_TOP_K, "many")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_TOP_K));

        let err = config
            .apply_overrides_from(lookup(&[(ENV_MIN_SCORE, "NaN")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn config_file_patch_merges() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "top_k = 2\nmodel = \"hash\"\ndb_path = \"cases.db\"\n").unwrap();

        let mut config = SearchConfig::default();
        config.merge_patch(load_patch(&path).unwrap().unwrap());
        assert_eq!(config.top_k, 2);
        assert_eq!(config.model, "hash");
        assert_eq!(config.db_path, Some(PathBuf::from("cases.db")));
        assert_eq!(config.summary_chars, 200);
    }

    #[test]
    fn unknown_config_key_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "topk = 2\n").unwrap();
        assert!(matches!(load_patch(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn missing_default_file_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(load_patch(&dir.path().join("absent.toml")).unwrap().is_none());
    }

    #[test]
    fn model_root_defaults_under_data_dir() {
        let mut config = SearchConfig::default();
        assert_eq!(
            config.model_root(Path::new("/data")),
            PathBuf::from("/data/models")
        );
        config.model_dir = Some(PathBuf::from("/opt/models"));
        assert_eq!(
            config.model_root(Path::new("/data")),
            PathBuf::from("/opt/models")
        );
    }
}
