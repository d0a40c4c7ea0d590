//! Normalized corpus entities.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::search::canonicalize::truncate_to_chars;

/// Marker appended to summaries cut down from document content.
pub const ELLIPSIS: &str = "...";

/// Decision year of a case, when the source knows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Year {
    Known(i32),
    #[default]
    Unknown,
}

impl Year {
    /// Placeholder reported for documents without a year.
    pub const UNKNOWN_LABEL: &'static str = "N/A";

    /// Parse loosely typed year text ("1966", " 1966 ", "N/A").
    pub fn parse(text: &str) -> Self {
        text.trim()
            .parse::<i32>()
            .map(Year::Known)
            .unwrap_or(Year::Unknown)
    }

    pub fn as_known(&self) -> Option<i32> {
        match self {
            Year::Known(year) => Some(*year),
            Year::Unknown => None,
        }
    }
}

impl From<Option<i64>> for Year {
    fn from(value: Option<i64>) -> Self {
        value
            .and_then(|v| i32::try_from(v).ok())
            .map(Year::Known)
            .unwrap_or(Year::Unknown)
    }
}

impl Serialize for Year {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Year::Known(year) => serializer.serialize_i32(*year),
            Year::Unknown => serializer.serialize_str(Self::UNKNOWN_LABEL),
        }
    }
}

impl<'de> Deserialize<'de> for Year {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum YearRepr {
            Int(i64),
            Float(f64),
            Text(String),
        }

        Ok(match Option::<YearRepr>::deserialize(deserializer)? {
            Some(YearRepr::Int(v)) => Year::from(Some(v)),
            Some(YearRepr::Float(v)) if v.fract() == 0.0 => Year::from(Some(v as i64)),
            Some(YearRepr::Text(text)) => Year::parse(&text),
            Some(YearRepr::Float(_)) | None => Year::Unknown,
        })
    }
}

/// A legal-case document ready for scoring.
///
/// `title` and `content` are trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub content: String,
    pub summary: Option<String>,
    pub tags: Vec<String>,
    pub year: Year,
    pub jurisdiction: Option<String>,
    pub doc_type: Option<String>,
    pub citation: Option<String>,
}

impl Document {
    /// Lower-cased concatenation of every field the keyword scorer matches against.
    pub fn searchable_text(&self) -> String {
        let mut text = String::with_capacity(self.title.len() + self.content.len() + 64);
        text.push_str(&self.title);
        text.push(' ');
        text.push_str(&self.content);
        if let Some(summary) = &self.summary {
            text.push(' ');
            text.push_str(summary);
        }
        for tag in &self.tags {
            text.push(' ');
            text.push_str(tag);
        }
        text.to_lowercase()
    }

    /// Text handed to the embedding model: `"{title}. {content}"`.
    pub fn embedding_text(&self) -> String {
        format!("{}. {}", self.title, self.content)
    }

    /// Summary shown to the caller.
    ///
    /// The stored summary wins; otherwise content is cut to `budget` characters
    /// and marked with [`ELLIPSIS`] when anything was dropped.
    pub fn display_summary(&self, budget: usize) -> String {
        if let Some(summary) = self.summary.as_deref().filter(|s| !s.is_empty()) {
            return summary.to_string();
        }
        let truncated = truncate_to_chars(&self.content, budget);
        if truncated.len() < self.content.len() {
            format!("{truncated}{ELLIPSIS}")
        } else {
            truncated
        }
    }
}

/// Identifier as it appears in a source record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordId::Int(v) => write!(f, "{v}"),
            RecordId::Text(v) => f.write_str(v),
        }
    }
}

/// A corpus record before normalization, as supplied by a store.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub resource_id: Option<RecordId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub year: Year,
    #[serde(default)]
    pub jurisdiction: Option<String>,
    #[serde(default, rename = "type")]
    pub doc_type: Option<String>,
    #[serde(default)]
    pub citation: Option<String>,
}

/// Why a record could not become a [`Document`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("record has no title")]
    MissingTitle,
    #[error("record has neither content nor summary")]
    MissingContent,
}

impl RawRecord {
    /// Normalize into a [`Document`].
    ///
    /// `position` is the 1-based place of the record in its load and becomes the
    /// identifier when the source supplied none. A record without content but
    /// with a summary uses the summary as its body.
    pub fn into_document(self, position: usize) -> Result<Document, RecordError> {
        let title = non_empty(self.title).ok_or(RecordError::MissingTitle)?;
        let summary = non_empty(self.summary);
        let content = non_empty(self.content)
            .or_else(|| summary.clone())
            .ok_or(RecordError::MissingContent)?;
        let id = self
            .id
            .or(self.resource_id)
            .map(|id| id.to_string())
            .unwrap_or_else(|| position.to_string());
        let tags = self
            .tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        Ok(Document {
            id,
            title,
            content,
            summary,
            tags,
            year: self.year,
            jurisdiction: non_empty(self.jurisdiction),
            doc_type: non_empty(self.doc_type),
            citation: non_empty(self.citation),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Split tag text stored as a JSON array (`["a","b"]`) or comma separated (`a, b`).
pub fn parse_tag_text(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.starts_with('[')
        && let Ok(tags) = serde_json::from_str::<Vec<String>>(trimmed)
    {
        return tags;
    }
    trimmed
        .split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn deserialize_tags<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TagsRepr {
        List(Vec<String>),
        Text(String),
    }

    Ok(match Option::<TagsRepr>::deserialize(deserializer)? {
        Some(TagsRepr::List(tags)) => tags,
        Some(TagsRepr::Text(text)) => parse_tag_text(&text),
        None => Vec::new(),
    })
}

/// Ordered, read-only document collection for one engine lifetime.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    documents: Vec<Document>,
    source: Option<String>,
}

impl Corpus {
    pub fn new(documents: Vec<Document>, source: impl Into<String>) -> Self {
        Self {
            documents,
            source: Some(source.into()),
        }
    }

    /// Corpus that no source could provide.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Document> {
        self.documents.get(position)
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.documents.iter()
    }

    /// Name of the store the documents came from.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}
