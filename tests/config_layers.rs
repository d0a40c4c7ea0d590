mod util;

use case_search::config::{ConfigError, ENV_CONFIG, ENV_MIN_SCORE, ENV_MODEL, ENV_TOP_K, SearchConfig};
use serial_test::serial;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use util::EnvGuard;

fn write_config(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, body).unwrap();
    path
}

#[test]
#[serial]
fn env_beats_config_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "top_k = 3\nmin_score = 0.3\nmodel = \"hash\"\n");
    let _top_k = EnvGuard::set(ENV_TOP_K, "8");
    let _min = EnvGuard::remove(ENV_MIN_SCORE);
    let _model = EnvGuard::remove(ENV_MODEL);

    let config = SearchConfig::load(Some(&path)).unwrap();
    assert_eq!(config.top_k, 8);
    assert!((config.min_score - 0.3).abs() < 1e-6);
    assert_eq!(config.model, "hash");
}

#[test]
#[serial]
fn config_path_from_environment() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "summary_chars = 80\n");
    let _config = EnvGuard::set(ENV_CONFIG, path.to_string_lossy());
    let _top_k = EnvGuard::remove(ENV_TOP_K);

    let config = SearchConfig::load(None).unwrap();
    assert_eq!(config.summary_chars, 80);
    assert_eq!(config.top_k, 5);
}

#[test]
#[serial]
fn explicit_missing_config_is_error() {
    let dir = TempDir::new().unwrap();
    let _config = EnvGuard::remove(ENV_CONFIG);
    let err = SearchConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
#[serial]
fn invalid_env_number_is_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "");
    let _top_k = EnvGuard::set(ENV_TOP_K, "-2");

    let err = SearchConfig::load(Some(&path)).unwrap_err();
    assert!(err.to_string().contains(ENV_TOP_K));
}
