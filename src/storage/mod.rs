//! Document stores and corpus loading.
//!
//! A store produces normalized [`Document`]s from one source. [`load_corpus`]
//! chains a primary and a secondary store and never fails: the worst case is an
//! empty corpus, which the engine answers with empty results.

pub mod json;
pub mod sample;
pub mod sqlite;

use std::collections::HashSet;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{info, warn};

use crate::config::SearchConfig;
use crate::model::types::{Corpus, Document, RawRecord};

pub use json::JsonFileStore;
pub use sample::SampleStore;
pub use sqlite::SqliteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("source not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unexpected structure in {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// A source of legal-case documents.
pub trait DocumentStore {
    /// Short label used in logs and as the corpus source.
    fn name(&self) -> String;

    /// Load and normalize every usable record.
    fn load(&self) -> Result<Vec<Document>, StoreError>;
}

/// Turn raw records into documents.
///
/// Records without a title or body are skipped with a warning. Duplicate
/// identifiers get a `-<position>` suffix (extended until unused), so ids are
/// unique within one load.
pub fn normalize_records(source: &str, records: Vec<RawRecord>) -> Vec<Document> {
    let total = records.len();
    let mut seen: HashSet<String> = HashSet::with_capacity(total);
    let mut documents = Vec::with_capacity(total);

    for (index, record) in records.into_iter().enumerate() {
        let position = index + 1;
        match record.into_document(position) {
            Ok(mut doc) => {
                if !seen.insert(doc.id.clone()) {
                    let renamed = unused_id(&seen, &doc.id, position);
                    warn!(source, id = %doc.id, renamed = %renamed, "duplicate document id");
                    seen.insert(renamed.clone());
                    doc.id = renamed;
                }
                documents.push(doc);
            }
            Err(e) => warn!(source, position, error = %e, "skipping record"),
        }
    }

    if documents.len() < total {
        info!(
            source,
            kept = documents.len(),
            skipped = total - documents.len(),
            "normalized records"
        );
    }
    documents
}

/// `{id}-{position}`, with further `-<n>` suffixes until the name is free.
fn unused_id(seen: &HashSet<String>, id: &str, position: usize) -> String {
    let base = format!("{id}-{position}");
    let mut candidate = base.clone();
    let mut n = 1;
    while seen.contains(&candidate) {
        n += 1;
        candidate = format!("{base}-{n}");
    }
    candidate
}

/// Load from `primary`, falling back to `secondary` on failure or emptiness.
pub fn load_corpus(primary: &dyn DocumentStore, secondary: Option<&dyn DocumentStore>) -> Corpus {
    if let Some(corpus) = try_store(primary) {
        return corpus;
    }
    if let Some(store) = secondary {
        info!(
            primary = %primary.name(),
            secondary = %store.name(),
            "falling back to secondary document store"
        );
        if let Some(corpus) = try_store(store) {
            return corpus;
        }
    }
    warn!("no document store produced documents; corpus is empty");
    Corpus::empty()
}

fn try_store(store: &dyn DocumentStore) -> Option<Corpus> {
    let name = store.name();
    match store.load() {
        Ok(documents) if documents.is_empty() => {
            warn!(store = %name, "document store is empty");
            None
        }
        Ok(documents) => {
            info!(store = %name, documents = documents.len(), "loaded corpus");
            Some(Corpus::new(documents, name))
        }
        Err(e) => {
            warn!(store = %name, error = %e, "document store failed");
            None
        }
    }
}

/// Primary and optional secondary store for a configuration.
///
/// A database wins when configured, backed by the JSON file if one is set and
/// by the built-in samples otherwise. A JSON file alone is backed by the
/// samples. With neither, the samples are the only source.
pub fn configured_stores(
    config: &SearchConfig,
) -> (Box<dyn DocumentStore>, Option<Box<dyn DocumentStore>>) {
    let json = config.corpus_path.clone().map(JsonFileStore::new);
    match (config.db_path.clone(), json) {
        (Some(db), Some(json)) => (Box::new(SqliteStore::new(db)), Some(Box::new(json))),
        (Some(db), None) => (
            Box::new(SqliteStore::new(db)),
            Some(Box::new(SampleStore::new())),
        ),
        (None, Some(json)) => (Box::new(json), Some(Box::new(SampleStore::new()))),
        (None, None) => (Box::new(SampleStore::new()), None),
    }
}

/// Load the corpus described by `config`.
pub fn load_configured_corpus(config: &SearchConfig) -> Corpus {
    let (primary, secondary) = configured_stores(config);
    load_corpus(primary.as_ref(), secondary.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FixedStore(Vec<Document>);

    impl DocumentStore for FixedStore {
        fn name(&self) -> String {
            "fixed".into()
        }
        fn load(&self) -> Result<Vec<Document>, StoreError> {
            Ok(self.0.clone())
        }
    }

    struct BrokenStore;

    impl DocumentStore for BrokenStore {
        fn name(&self) -> String {
            "broken".into()
        }
        fn load(&self) -> Result<Vec<Document>, StoreError> {
            Err(StoreError::NotFound(PathBuf::from("/nowhere")))
        }
    }

    fn records(values: Vec<serde_json::Value>) -> Vec<RawRecord> {
        values
            .into_iter()
            .map(|v| serde_json::from_value(v).unwrap())
            .collect()
    }

    #[test]
    fn normalize_skips_bad_records() {
        let docs = normalize_records(
            "test",
            records(vec![
                json!({"title": "A", "content": "a"}),
                json!({"content": "no title"}),
                json!({"title": "C", "content": "c"}),
            ]),
        );
        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn normalize_disambiguates_duplicate_ids() {
        let docs = normalize_records(
            "test",
            records(vec![
                json!({"id": 1, "title": "A", "content": "a"}),
                json!({"id": 1, "title": "B", "content": "b"}),
            ]),
        );
        assert_eq!(docs[0].id, "1");
        assert_eq!(docs[1].id, "1-2");
    }

    #[test]
    fn renamed_duplicate_never_collides_with_existing_id() {
        let docs = normalize_records(
            "test",
            records(vec![
                json!({"id": "1", "title": "A", "content": "a"}),
                json!({"id": "1-3", "title": "B", "content": "b"}),
                json!({"id": "1", "title": "C", "content": "c"}),
                json!({"id": "1-3-2", "title": "D", "content": "d"}),
                json!({"id": "1-3", "title": "E", "content": "e"}),
            ]),
        );
        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "1-3", "1-3-2", "1-3-2-4", "1-3-5"]);
        let unique: HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn primary_wins_when_it_has_documents() {
        let corpus = load_corpus(&SampleStore::new(), Some(&BrokenStore));
        assert_eq!(corpus.len(), 7);
        assert_eq!(corpus.source(), Some("samples"));
    }

    #[test]
    fn failing_primary_falls_back() {
        let corpus = load_corpus(&BrokenStore, Some(&SampleStore::new()));
        assert_eq!(corpus.source(), Some("samples"));
    }

    #[test]
    fn empty_primary_falls_back() {
        let corpus = load_corpus(&FixedStore(Vec::new()), Some(&SampleStore::new()));
        assert_eq!(corpus.len(), 7);
    }

    #[test]
    fn everything_failing_is_empty_corpus() {
        let corpus = load_corpus(&BrokenStore, Some(&FixedStore(Vec::new())));
        assert!(corpus.is_empty());
        assert!(load_corpus(&BrokenStore, None).is_empty());
    }

    #[test]
    fn store_selection_follows_config() {
        let mut config = SearchConfig::default();
        let (primary, secondary) = configured_stores(&config);
        assert_eq!(primary.name(), "samples");
        assert!(secondary.is_none());

        config.corpus_path = Some(PathBuf::from("cases.json"));
        let (primary, secondary) = configured_stores(&config);
        assert_eq!(primary.name(), "json:cases.json");
        assert_eq!(secondary.map(|s| s.name()).as_deref(), Some("samples"));

        config.db_path = Some(PathBuf::from("cases.db"));
        let (primary, secondary) = configured_stores(&config);
        assert_eq!(primary.name(), "sqlite:cases.db");
        assert_eq!(
            secondary.map(|s| s.name()).as_deref(),
            Some("json:cases.json")
        );
    }
}
