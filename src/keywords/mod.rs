use anyhow::{bail, Context, Result};
use indicatif::ProgressBar;
use log::{info, warn};
use rayon::prelude::*;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::extract::{DocumentReader, FileReader};
use crate::records::{CitationRecord, RecordTable};
use crate::text::{normalize, TextManipulation};

pub const COUNT_SUFFIX: &str = "_count";
pub const TOTAL_KEYWORDS: &str = "total_keywords";
pub const ARTICLE: &str = "article";
const DEFAULT_GROUP_PREFIX: &str = "keyword_group_";

/// A named set of search keywords
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordGroup {
    pub name: String,
    pub keywords: Vec<String>,
}

impl KeywordGroup {
    pub fn count_column(&self) -> String {
        format!("{}{}", self.name, COUNT_SUFFIX)
    }
}

/// Keyword groups after cleanup. Each keyword belongs to exactly one group:
/// the first group, in order, that listed it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordGroups {
    groups: Vec<KeywordGroup>,
    owner: HashMap<String, usize>,
}

impl KeywordGroups {
    /// Build from (group name, raw keyword string) pairs
    pub fn from_pairs<I, N, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, K)>,
        N: Into<String>,
        K: AsRef<str>,
    {
        let mut groups = Vec::new();
        let mut owner: HashMap<String, usize> = HashMap::new();

        for (name, raw) in pairs {
            let index = groups.len();
            let mut keywords = Vec::new();
            for word in normalize(raw.as_ref()) {
                if owner.contains_key(&word) {
                    continue;
                }
                owner.insert(word.clone(), index);
                keywords.push(word);
            }
            groups.push(KeywordGroup {
                name: name.into(),
                keywords,
            });
        }

        Self { groups, owner }
    }

    /// Name unnamed keyword strings `keyword_group_1..N`
    pub fn from_list<K: AsRef<str>>(list: &[K]) -> Self {
        Self::from_pairs(
            list.iter()
                .enumerate()
                .map(|(i, raw)| (format!("{}{}", DEFAULT_GROUP_PREFIX, i + 1), raw.as_ref())),
        )
    }

    /// Parse a JSON object of `name -> "keywords"` or a JSON list of keyword strings
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(Self::from_pairs(keyword_pairs_from_json(json)?))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read keywords file: {}", path.display()))?;
        let pairs = keyword_pairs_from_json(&raw)
            .with_context(|| format!("Invalid keywords file: {}", path.display()))?;

        let shared = shared_keywords(&pairs.iter().map(|(_, k)| k.as_str()).collect::<Vec<_>>());
        if !shared.is_empty() {
            warn!(
                "Keywords listed in more than one group are only counted for the first: {}",
                shared.join(", ")
            );
        }

        let groups = Self::from_pairs(pairs);
        info!(
            "Loaded {} keyword groups ({} keywords) from {}",
            groups.len(),
            groups.keyword_count(),
            path.display()
        );
        Ok(groups)
    }

    pub fn groups(&self) -> &[KeywordGroup] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn keyword_count(&self) -> usize {
        self.owner.len()
    }

    /// Every keyword, in group order
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.groups
            .iter()
            .flat_map(|g| g.keywords.iter().map(String::as_str))
    }

    /// Output columns in order: per group its count then its keywords, then the total
    pub fn columns(&self) -> Vec<String> {
        let mut columns = Vec::with_capacity(self.owner.len() + self.groups.len() + 1);
        for group in &self.groups {
            columns.push(group.count_column());
            columns.extend(group.keywords.iter().cloned());
        }
        columns.push(TOTAL_KEYWORDS.to_string());
        columns
    }

    /// Count keyword occurrences in `text`. Counts start from zero on every call.
    pub fn count(&self, text: &str) -> KeywordCounts {
        let mut counts = KeywordCounts {
            total: 0,
            per_group: vec![0; self.groups.len()],
            per_keyword: HashMap::new(),
        };
        for token in normalize(text) {
            if let Some(&group) = self.owner.get(&token) {
                counts.total += 1;
                counts.per_group[group] += 1;
                *counts.per_keyword.entry(token).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Write the counts into `record` under `columns()`, zero where absent
    pub fn apply_counts(&self, record: &mut CitationRecord, counts: &KeywordCounts) {
        for (group, count) in self.groups.iter().zip(&counts.per_group) {
            record.set(group.count_column(), count.to_string());
            for keyword in &group.keywords {
                record.set(keyword.as_str(), counts.keyword(keyword).to_string());
            }
        }
        record.set(TOTAL_KEYWORDS, counts.total.to_string());
    }
}

/// (group name, raw keyword string) pairs; a JSON list gets `keyword_group_N` names
fn keyword_pairs_from_json(json: &str) -> Result<Vec<(String, String)>> {
    let value: Value = serde_json::from_str(json).context("Failed to parse keywords JSON")?;
    match value {
        Value::Object(map) => map
            .into_iter()
            .map(|(name, keywords)| Ok((name, json_keywords(&keywords)?)))
            .collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, keywords)| {
                Ok((format!("{}{}", DEFAULT_GROUP_PREFIX, i + 1), json_keywords(keywords)?))
            })
            .collect(),
        _ => bail!("Keywords JSON must be an object or a list"),
    }
}

fn json_keywords(value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Array(items) => Ok(items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" ")),
        other => bail!("Keyword group must be a string or list of strings, got {}", other),
    }
}

/// Occurrence counts for one text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordCounts {
    pub total: usize,
    pub per_group: Vec<usize>,
    pub per_keyword: HashMap<String, usize>,
}

impl KeywordCounts {
    pub fn keyword(&self, keyword: &str) -> usize {
        self.per_keyword.get(keyword).copied().unwrap_or(0)
    }
}

/// Example keywords file users can edit
pub fn sample_keywords_json() -> String {
    let mut map = Map::new();
    map.insert(
        "keywords_finance".to_string(),
        Value::String("Management investing corporate pricing risk".to_string()),
    );
    map.insert(
        "keywords_machine_learning".to_string(),
        Value::String(
            "neural fuzzy inference system artificial intelligence artificial computational neural networks"
                .to_string(),
        ),
    );
    map.insert(
        "keywords_common_words".to_string(),
        Value::String(
            "accuracy classification cross sectional cross-section expected metrics prediction predict expert system"
                .to_string(),
        ),
    );
    serde_json::to_string_pretty(&Value::Object(map)).unwrap_or_default()
}

/// Add keyword count columns to every record, counting over `text_column`
pub fn annotate_table(
    table: &mut RecordTable,
    groups: &KeywordGroups,
    text_column: &str,
    progress: Option<&ProgressBar>,
) -> Result<usize> {
    if !table.is_empty() && !table.has_column(text_column) {
        bail!("Column '{}' not found in records", text_column);
    }
    for column in groups.columns() {
        if table.has_column(&column) && column != TOTAL_KEYWORDS && !column.ends_with(COUNT_SUFFIX) {
            warn!("Keyword column '{}' overwrites an existing column", column);
        }
        table.ensure_column(&column);
    }

    let total: usize = table
        .records_mut()
        .par_iter_mut()
        .map(|record| {
            let counts = groups.count(record.get_or_empty(text_column));
            groups.apply_counts(record, &counts);
            if let Some(pb) = progress {
                pb.inc(1);
            }
            counts.total
        })
        .sum();
    Ok(total)
}

/// Count keywords in downloaded files, one row per readable file
pub fn count_in_files(
    files: &[PathBuf],
    groups: &KeywordGroups,
    manipulation: &TextManipulation,
    progress: Option<&ProgressBar>,
) -> RecordTable {
    let reader = FileReader;
    let rows: Vec<Option<CitationRecord>> = files
        .par_iter()
        .map(|path| {
            let result = reader.read(path);
            if let Some(pb) = progress {
                pb.inc(1);
            }
            let text = match result {
                Ok(text) => text,
                Err(e) => {
                    warn!("Skipping {}: {:#}", path.display(), e);
                    return None;
                }
            };
            let article = path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(|s| manipulation.apply(s))
                .unwrap_or_default();
            let mut record = CitationRecord::new().with(ARTICLE, article);
            groups.apply_counts(&mut record, &groups.count(&text));
            Some(record)
        })
        .collect();

    let mut columns = vec![ARTICLE.to_string()];
    columns.extend(groups.columns());
    let mut table = RecordTable::new(columns);
    for record in rows.into_iter().flatten() {
        table.push(record);
    }
    table
}

/// Keywords that appear in more than one input group, before cleanup
pub fn shared_keywords<K: AsRef<str>>(raw_groups: &[K]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut shared = Vec::new();
    for raw in raw_groups {
        let unique: HashSet<String> = normalize(raw.as_ref()).into_iter().collect();
        let mut words: Vec<String> = unique.into_iter().collect();
        words.sort();
        for word in words {
            if !seen.insert(word.clone()) && !shared.contains(&word) {
                shared.push(word);
            }
        }
    }
    shared
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_groups_dedupe_within_and_across() {
        let groups = KeywordGroups::from_pairs([
            ("finance", "Management risk Risk Pre-process"),
            ("ml", "neural risk networks"),
        ]);
        assert_eq!(
            groups.groups()[0].keywords,
            vec!["management", "risk", "pre", "process"]
        );
        assert_eq!(groups.groups()[1].keywords, vec!["neural", "networks"]);
        assert_eq!(groups.keyword_count(), 6);
    }

    #[test]
    fn test_from_list_names_groups() {
        let groups = KeywordGroups::from_list(&["a b", "c"]);
        let names: Vec<&str> = groups.groups().iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["keyword_group_1", "keyword_group_2"]);
    }

    #[test]
    fn test_from_json_object_keeps_group_order() {
        let groups =
            KeywordGroups::from_json_str(r#"{"zeta": "risk", "alpha": ["neural", "fuzzy"]}"#)
                .unwrap();
        assert_eq!(groups.groups()[0].name, "zeta");
        assert_eq!(groups.groups()[1].keywords, vec!["neural", "fuzzy"]);
    }

    #[test]
    fn test_invalid_json_shapes() {
        assert!(KeywordGroups::from_json_str("42").is_err());
        assert!(KeywordGroups::from_json_str(r#"{"a": 3}"#).is_err());
        assert!(KeywordGroups::from_json_str("not json").is_err());
    }

    #[test]
    fn test_count_fresh_per_call() {
        let groups = KeywordGroups::from_pairs([("finance", "risk pricing"), ("ml", "neural")]);
        let first = groups.count("Risk, risk and neural pricing");
        assert_eq!(first.total, 4);
        assert_eq!(first.per_group, vec![3, 1]);
        assert_eq!(first.keyword("risk"), 2);

        let second = groups.count("neural");
        assert_eq!(second.total, 1);
        assert_eq!(second.per_group, vec![0, 1]);
        assert_eq!(second.keyword("risk"), 0);
    }

    #[test]
    fn test_annotate_table_emits_all_columns() {
        let groups = KeywordGroups::from_pairs([("finance", "risk"), ("ml", "neural")]);
        let mut table = RecordTable::from_records(vec![
            CitationRecord::new().with("citation_text", "risk risk"),
            CitationRecord::new().with("citation_text", "nothing here"),
        ]);
        let total = annotate_table(&mut table, &groups, "citation_text", None).unwrap();

        assert_eq!(total, 2);
        assert_eq!(
            table.columns(),
            &["citation_text", "finance_count", "risk", "ml_count", "neural", "total_keywords"]
        );
        assert_eq!(table.column_values("finance_count"), vec!["2", "0"]);
        assert_eq!(table.column_values("ml_count"), vec!["0", "0"]);
        assert_eq!(table.column_values(TOTAL_KEYWORDS), vec!["2", "0"]);
    }

    #[test]
    fn test_annotate_requires_text_column() {
        let groups = KeywordGroups::from_list(&["risk"]);
        let mut table =
            RecordTable::from_records(vec![CitationRecord::new().with("title", "risk")]);
        assert!(annotate_table(&mut table, &groups, "citation_text", None).is_err());
    }

    #[test]
    fn test_count_in_files() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("Risk Paper.txt");
        let bad = dir.path().join("sheet.xlsx");
        fs::write(&good, "risk neural risk").unwrap();
        fs::write(&bad, b"PK").unwrap();

        let groups = KeywordGroups::from_pairs([("finance", "risk"), ("ml", "neural")]);
        let table = count_in_files(&[good, bad], &groups, &TextManipulation::default(), None);
        assert_eq!(table.len(), 1);
        assert_eq!(table.records()[0].get(ARTICLE), Some("risk paper"));
        assert_eq!(table.records()[0].get(TOTAL_KEYWORDS), Some("3"));
    }

    #[test]
    fn test_sample_template_parses() {
        let groups = KeywordGroups::from_json_str(&sample_keywords_json()).unwrap();
        assert_eq!(groups.len(), 3);
        // "system" is claimed by the machine learning group first
        assert!(!groups.groups()[2].keywords.contains(&"system".to_string()));
    }

    #[test]
    fn test_shared_keywords() {
        let shared = shared_keywords(&["risk pricing", "neural risk", "risk pricing"]);
        assert_eq!(shared, vec!["risk", "pricing"]);
    }
}
