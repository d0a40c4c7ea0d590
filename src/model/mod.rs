//! Corpus data model shared by the stores and the search layer.

pub mod types;
