use serde::Serialize;

use crate::validation::FunnelCounts;

/// Statistics from citations step
#[derive(Debug, Clone, Default, Serialize)]
pub struct CitationsStats {
    pub records_loaded: usize,
    pub duplicates_removed: usize,
    pub records_written: usize,
}

/// Statistics from keywords step
#[derive(Debug, Clone, Default, Serialize)]
pub struct KeywordStats {
    pub keyword_groups: usize,
    pub unique_keywords: usize,
    pub rows_counted: usize,
    pub rows_with_keywords: usize,
    pub total_occurrences: usize,
}

/// Statistics from select step
#[derive(Debug, Clone, Default, Serialize)]
pub struct SelectStats {
    pub input_records: usize,
    pub min_limit: Option<u64>,
    pub selected_records: usize,
    pub exact_hit: bool,
}

/// Statistics from validate step
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidateStats {
    pub total_records: usize,
    pub files_indexed: usize,
    pub extraction_failures: usize,
    pub funnel: FunnelCounts,
}

/// Outcome of a single title match
#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    pub title: String,
    pub file: String,
    pub matched: bool,
    pub score: f64,
    pub strategy: String,
}
