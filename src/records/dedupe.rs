use anyhow::{bail, Result};
use log::{debug, info};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use super::io::{detect_format, load_records};
use super::{
    CitationRecord, RecordTable, ABSTRACT, CITATION_TEXT, KEYWORDS, MULTIPLE_SOURCES, SOURCE, TITLE, YEAR,
};
use crate::extract::list_all_files;
use crate::text::TextManipulation;

/// Name of a citation export without any extensions: `scopus.csv.gz` -> `scopus`
pub fn source_name(path: &Path) -> String {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    name.split('.').next().unwrap_or(name).to_string()
}

/// Load every record file under `dir` into one table, tagging each record with
/// the export it came from.
pub fn collect_citations(dir: &Path) -> Result<RecordTable> {
    let mut table = RecordTable::default();
    let mut files_loaded = 0;

    for path in list_all_files(dir)? {
        if detect_format(&path).is_err() {
            debug!("Skipping non-record file {}", path.display());
            continue;
        }
        let source = source_name(&path);
        let loaded = load_records(&path)?;
        for column in loaded.columns() {
            table.ensure_column(column);
        }
        table.ensure_column(SOURCE);
        for mut record in loaded.into_records() {
            record.set(SOURCE, source.as_str());
            table.push(record);
        }
        files_loaded += 1;
    }

    if files_loaded == 0 {
        bail!("No citation files found in {}", dir.display());
    }
    info!(
        "Collected {} citations from {} files",
        table.len(),
        files_loaded
    );
    Ok(table)
}

fn group_key(record: &CitationRecord, subset: &[&str]) -> Vec<String> {
    subset
        .iter()
        .map(|field| record.get_or_empty(field).to_string())
        .collect()
}

/// Record in `multiple_sources` every source a (title, year) pair was found in
pub fn add_multiple_sources(table: &mut RecordTable) {
    let subset = [TITLE, YEAR];
    let mut sources: HashMap<Vec<String>, Vec<String>> = HashMap::new();
    for record in table.records() {
        sources
            .entry(group_key(record, &subset))
            .or_default()
            .push(record.get_or_empty(SOURCE).to_string());
    }

    table.ensure_column(MULTIPLE_SOURCES);
    for record in table.records_mut() {
        let joined = sources
            .get(&group_key(record, &subset))
            .map(|list| list.join(";"))
            .unwrap_or_default();
        record.set(MULTIPLE_SOURCES, joined);
    }
}

/// Title, abstract, and keywords joined into one searchable field
pub fn add_citation_text(table: &mut RecordTable) {
    table.ensure_column(CITATION_TEXT);
    for record in table.records_mut() {
        let text = [TITLE, ABSTRACT, KEYWORDS]
            .iter()
            .map(|field| record.get_or_empty(field))
            .collect::<Vec<_>>()
            .join(" ");
        record.set(CITATION_TEXT, text);
    }
}

/// Add `cleaned_<title_column>` holding the manipulated title
pub fn add_cleaned_title(
    table: &mut RecordTable,
    title_column: &str,
    manipulation: &TextManipulation,
) -> String {
    let cleaned_column = format!("cleaned_{}", title_column);
    table.ensure_column(&cleaned_column);
    for record in table.records_mut() {
        let cleaned = manipulation.apply(record.get_or_empty(title_column));
        record.set(cleaned_column.as_str(), cleaned);
    }
    cleaned_column
}

/// Drop records repeating an earlier record's values on `subset`, keeping the first
pub fn drop_duplicates(table: &mut RecordTable, subset: &[&str]) -> usize {
    let before = table.len();
    let mut seen: HashSet<Vec<String>> = HashSet::new();
    table
        .records
        .retain(|record| seen.insert(group_key(record, subset)));
    before - table.len()
}

/// Full citation step: collect, annotate, clean titles, deduplicate
pub fn build_citations(
    dir: &Path,
    title_column: &str,
    manipulation: &TextManipulation,
) -> Result<(RecordTable, usize)> {
    let mut table = collect_citations(dir)?;
    add_multiple_sources(&mut table);
    add_citation_text(&mut table);
    add_cleaned_title(&mut table, title_column, manipulation);
    let removed = drop_duplicates(&mut table, &[TITLE, YEAR]);
    Ok((table, removed))
}
