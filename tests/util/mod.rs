use case_search::model::types::{Corpus, Document, Year};
use case_search::search::embedder::{Embedder, EmbedderError, EmbedderResult};
use case_search::storage::SampleStore;
use rusqlite::{Connection, params};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Captures tracing output for tests.
#[allow(dead_code)]
pub struct TestTracing {
    buffer: std::sync::Arc<std::sync::Mutex<Vec<u8>>>,
}

#[allow(dead_code)]
impl TestTracing {
    pub fn new() -> Self {
        Self {
            buffer: std::sync::Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.buffer.clone();
        let make_writer = move || TestWriter(writer.clone());
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .without_time()
            .with_writer(make_writer)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn output(&self) -> String {
        let buf = self.buffer.lock().unwrap();
        String::from_utf8_lossy(&buf).to_string()
    }

    /// Assert that the captured log output contains the provided substring.
    pub fn assert_contains(&self, needle: &str) {
        let out = self.output();
        assert!(
            out.contains(needle),
            "expected logs to contain `{needle}`, got:\n{out}"
        );
    }
}

struct TestWriter(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for TestWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut guard = self.0.lock().unwrap();
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[allow(dead_code)]
pub struct EnvGuard {
    key: String,
    prev: Option<String>,
}

#[allow(dead_code)]
impl EnvGuard {
    pub fn set(key: &str, val: impl AsRef<str>) -> Self {
        let prev = std::env::var(key).ok();
        unsafe { std::env::set_var(key, val.as_ref()) };
        Self {
            key: key.to_string(),
            prev,
        }
    }

    pub fn remove(key: &str) -> Self {
        let prev = std::env::var(key).ok();
        unsafe { std::env::remove_var(key) };
        Self {
            key: key.to_string(),
            prev,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match &self.prev {
            Some(v) => unsafe { std::env::set_var(&self.key, v) },
            None => unsafe { std::env::remove_var(&self.key) },
        }
    }
}

/// The seven built-in Supreme Court cases.
#[allow(dead_code)]
pub fn sample_corpus() -> Corpus {
    Corpus::new(SampleStore::documents(), "samples")
}

#[allow(dead_code)]
pub fn doc(id: &str, title: &str, content: &str) -> Document {
    Document {
        id: id.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        summary: None,
        tags: Vec::new(),
        year: Year::Unknown,
        jurisdiction: None,
        doc_type: None,
        citation: None,
    }
}

/// Embedder whose model never loads: every call fails.
#[allow(dead_code)]
pub struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn embed(&self, _text: &str) -> EmbedderResult<Vec<f32>> {
        Err(EmbedderError::Unavailable("model weights missing".into()))
    }
    fn dimension(&self) -> usize {
        384
    }
    fn id(&self) -> &str {
        "failing"
    }
    fn is_semantic(&self) -> bool {
        true
    }
}

/// Embedder that places every text on one axis, so each document scores 1.0.
#[allow(dead_code)]
pub struct ConstantEmbedder;

impl Embedder for ConstantEmbedder {
    fn embed(&self, _text: &str) -> EmbedderResult<Vec<f32>> {
        Ok(vec![1.0, 0.0, 0.0, 0.0])
    }
    fn dimension(&self) -> usize {
        4
    }
    fn id(&self) -> &str {
        "constant-4"
    }
    fn is_semantic(&self) -> bool {
        true
    }
}

/// Write `{"documents": [...]}` and return its path.
#[allow(dead_code)]
pub fn write_json_corpus(dir: &TempDir, documents: Value) -> PathBuf {
    let path = dir.path().join("legal_documents.json");
    std::fs::write(&path, json!({ "documents": documents }).to_string()).unwrap();
    path
}

/// Create a `legal_resources` database holding `(title, content, tags, year)` rows.
#[allow(dead_code)]
pub fn write_sqlite_corpus(dir: &TempDir, rows: &[(&str, Option<&str>, &str, i64)]) -> PathBuf {
    let path = dir.path().join("legal.db");
    create_legal_resources(&path, rows);
    path
}

#[allow(dead_code)]
pub fn create_legal_resources(path: &Path, rows: &[(&str, Option<&str>, &str, i64)]) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE legal_resources (
            resource_id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            content TEXT,
            summary TEXT,
            tags TEXT,
            type TEXT,
            jurisdiction TEXT,
            year INTEGER,
            citation TEXT
        );",
    )
    .unwrap();
    for (title, content, tags, year) in rows {
        conn.execute(
            "INSERT INTO legal_resources (title, content, tags, type, year) VALUES (?1, ?2, ?3, 'case', ?4)",
            params![title, content, tags, year],
        )
        .unwrap();
    }
}
