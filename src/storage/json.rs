//! JSON file store: `{"documents": [...]}` or a bare array of records.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use super::{DocumentStore, StoreError, normalize_records};
use crate::model::types::{Document, RawRecord};

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn records(&self, value: Value) -> Result<Vec<Value>, StoreError> {
        match value {
            Value::Array(items) => Ok(items),
            Value::Object(mut map) => match map.remove("documents") {
                Some(Value::Array(items)) => Ok(items),
                Some(other) => Err(self.malformed(format!(
                    "\"documents\" must be an array, found {}",
                    json_kind(&other)
                ))),
                None => Err(self.malformed("missing \"documents\" array".to_string())),
            },
            other => Err(self.malformed(format!(
                "expected an object or array, found {}",
                json_kind(&other)
            ))),
        }
    }

    fn malformed(&self, reason: String) -> StoreError {
        StoreError::Malformed {
            path: self.path.clone(),
            reason,
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl DocumentStore for JsonFileStore {
    fn name(&self) -> String {
        format!("json:{}", self.path.display())
    }

    fn load(&self) -> Result<Vec<Document>, StoreError> {
        if !self.path.is_file() {
            return Err(StoreError::NotFound(self.path.clone()));
        }
        let text = fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        let value: Value = serde_json::from_str(&text).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })?;

        let items = self.records(value)?;
        debug!(path = %self.path.display(), records = items.len(), "read JSON corpus");

        let name = self.name();
        let raw: Vec<RawRecord> = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                serde_json::from_value(item).unwrap_or_else(|e| {
                    warn!(source = %name, position = index + 1, error = %e, "unreadable record");
                    // An empty record is rejected by normalization, keeping positions aligned.
                    RawRecord::default()
                })
            })
            .collect();
        Ok(normalize_records(&name, raw))
    }
}
