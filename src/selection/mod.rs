use log::debug;
use std::cmp::Ordering;

use crate::keywords::{COUNT_SUFFIX, TOTAL_KEYWORDS};
use crate::records::{CitationRecord, RecordTable};

/// A single filter trial: how many records survive at `min_limit`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitProbe {
    pub min_limit: u64,
    pub count: usize,
}

/// Result of searching for a min-limit yielding a target number of records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitSearch {
    Exact(LimitProbe),
    /// No limit hits the target; the nearest probes below and above it
    Bracketed {
        lower: Option<LimitProbe>,
        upper: Option<LimitProbe>,
    },
}

impl LimitSearch {
    /// The probe to select with: the exact hit, or whichever bound lands
    /// nearer the target (the upper bound on ties).
    pub fn closest(&self, target: usize) -> Option<LimitProbe> {
        match *self {
            LimitSearch::Exact(probe) => Some(probe),
            LimitSearch::Bracketed { lower, upper } => match (lower, upper) {
                (Some(l), Some(u)) => {
                    if target.abs_diff(l.count) < u.count.abs_diff(target) {
                        Some(l)
                    } else {
                        Some(u)
                    }
                }
                (l, u) => u.or(l),
            },
        }
    }
}

/// Columns holding per-group keyword counts, in table order
pub fn group_count_columns(table: &RecordTable) -> Vec<String> {
    table
        .columns()
        .iter()
        .filter(|c| c.ends_with(COUNT_SUFFIX))
        .cloned()
        .collect()
}

/// Numeric value of a count field. Blank or unparsable cells count as zero.
pub fn count_value(record: &CitationRecord, column: &str) -> u64 {
    let raw = record.get_or_empty(column).trim();
    raw.parse::<u64>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().filter(|v| *v >= 0.0).map(|v| v as u64))
        .unwrap_or(0)
}

fn passes(record: &CitationRecord, columns: &[String], min_limit: u64) -> bool {
    // No group columns means nothing qualifies
    !columns.is_empty() && columns.iter().all(|c| count_value(record, c) >= min_limit)
}

/// Keep records whose every group count is at least `min_limit`
pub fn filter_by_min_limit(table: &RecordTable, min_limit: u64) -> RecordTable {
    let columns = group_count_columns(table);
    let mut filtered = RecordTable::new(table.columns().to_vec());
    for record in table.records() {
        if passes(record, &columns, min_limit) {
            filtered.push(record.clone());
        }
    }
    filtered
}

/// Number of records surviving `min_limit`
pub fn count_at_min_limit(table: &RecordTable, min_limit: u64) -> usize {
    let columns = group_count_columns(table);
    table
        .records()
        .iter()
        .filter(|r| passes(r, &columns, min_limit))
        .count()
}

/// Search upward for a min-limit leaving exactly `target` records.
///
/// From a base limit, probes base+1, base+3, base+7, ... while the count stays
/// above target, remembering the last such probe as the upper bound. Once a
/// probe drops below target the base moves to the previous probe and the
/// doubling restarts. The search ends on an exact hit, or when two consecutive
/// rounds bottom out at the same count. `count_at` must be non-increasing.
pub fn search_min_limit_with<F>(target: usize, mut count_at: F, max_limit: u64) -> LimitSearch
where
    F: FnMut(u64) -> usize,
{
    let mut base = 0u64;
    let mut prev_lower_count = 0usize;
    let mut upper: Option<LimitProbe> = None;

    loop {
        let mut min_limit = base;
        let mut step = 1u64;
        loop {
            let previous = min_limit;
            min_limit = min_limit.saturating_add(step);
            step = step.saturating_mul(2);

            let probe = LimitProbe {
                min_limit,
                count: count_at(min_limit),
            };
            debug!("min_limit: {} records: {}", probe.min_limit, probe.count);

            match probe.count.cmp(&target) {
                Ordering::Equal => return LimitSearch::Exact(probe),
                Ordering::Greater => {
                    upper = Some(probe);
                    if min_limit > max_limit {
                        return LimitSearch::Bracketed { lower: None, upper };
                    }
                }
                Ordering::Less => {
                    base = previous;
                    if probe.count == prev_lower_count {
                        return LimitSearch::Bracketed {
                            lower: Some(probe),
                            upper,
                        };
                    }
                    prev_lower_count = probe.count;
                    break;
                }
            }
        }
    }
}

/// Search over a keyword-counted table
pub fn search_min_limit(table: &RecordTable, target: usize) -> LimitSearch {
    let columns = group_count_columns(table);
    let max_limit = table
        .records()
        .iter()
        .flat_map(|r| columns.iter().map(move |c| count_value(r, c)))
        .max()
        .unwrap_or(0);
    search_min_limit_with(target, |limit| count_at_min_limit(table, limit), max_limit)
}

/// Step the limit linearly from `start` by `step`, stopping once at most
/// `target` records remain or after `iterations` probes.
pub fn scan_min_limits(
    table: &RecordTable,
    target: usize,
    start: u64,
    step: u64,
    iterations: usize,
) -> Vec<LimitProbe> {
    let mut probes = Vec::new();
    let mut min_limit = start;
    for _ in 0..iterations {
        let count = count_at_min_limit(table, min_limit);
        probes.push(LimitProbe { min_limit, count });
        if count <= target {
            break;
        }
        min_limit = min_limit.saturating_add(step);
    }
    probes
}

/// Sort criteria in priority order: total, group counts, then keyword counts,
/// limited to columns present in the table.
pub fn sorting_criteria(table: &RecordTable, keyword_columns: &[String]) -> Vec<String> {
    let mut criteria = Vec::new();
    if table.has_column(TOTAL_KEYWORDS) {
        criteria.push(TOTAL_KEYWORDS.to_string());
    }
    criteria.extend(group_count_columns(table));
    for keyword in keyword_columns {
        if table.has_column(keyword) && !criteria.contains(keyword) {
            criteria.push(keyword.clone());
        }
    }
    criteria
}

/// Stable sort, descending on each criterion in turn
pub fn sort_by_keywords(table: &mut RecordTable, criteria: &[String]) {
    table.records_mut().sort_by(|a, b| {
        criteria
            .iter()
            .map(|c| count_value(b, c).cmp(&count_value(a, c)))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
}
