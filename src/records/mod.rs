pub mod dedupe;
pub mod io;

pub use dedupe::*;
pub use io::{load_records, save_records};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const TITLE: &str = "title";
pub const YEAR: &str = "year";
pub const ABSTRACT: &str = "abstract";
pub const KEYWORDS: &str = "keywords";
pub const SOURCE: &str = "source";
pub const MULTIPLE_SOURCES: &str = "multiple_sources";
pub const CITATION_TEXT: &str = "citation_text";
pub const CLEANED_TITLE: &str = "cleaned_title";

/// Fields written back by validation
pub const DOWNLOADED: &str = "downloaded";
pub const FILE_LOCATION: &str = "file_location";
pub const VALIDATION_METHOD: &str = "validation_method";

/// One bibliographic citation as an open set of string fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CitationRecord {
    fields: BTreeMap<String, String>,
}

impl CitationRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Field value, or empty string when absent
    pub fn get_or_empty(&self, field: &str) -> &str {
        self.get(field).unwrap_or("")
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.fields.remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }
}

/// A batch of records with a stable column order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordTable {
    columns: Vec<String>,
    records: Vec<CitationRecord>,
}

impl RecordTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            records: Vec::new(),
        }
    }

    /// Build from records, ordering columns by first appearance
    pub fn from_records(records: Vec<CitationRecord>) -> Self {
        let mut table = Self::default();
        for record in records {
            table.push(record);
        }
        table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Append a column name if it is not already present
    pub fn ensure_column(&mut self, name: &str) {
        if !self.has_column(name) {
            self.columns.push(name.to_string());
        }
    }

    pub fn push(&mut self, record: CitationRecord) {
        for (field, _) in record.fields() {
            if !self.has_column(field) {
                self.columns.push(field.to_string());
            }
        }
        self.records.push(record);
    }

    pub fn records(&self) -> &[CitationRecord] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [CitationRecord] {
        &mut self.records
    }

    pub fn into_records(self) -> Vec<CitationRecord> {
        self.records
    }

    /// Replace the records while keeping the column order
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Column values in row order, empty string where missing
    pub fn column_values(&self, name: &str) -> Vec<&str> {
        self.records.iter().map(|r| r.get_or_empty(name)).collect()
    }
}
