use anyhow::{anyhow, bail, Context, Result};
use log::{info, warn};
use std::path::Path;
use std::time::Instant;

use crate::cli::SelectArgs;
use crate::common::{format_elapsed, setup_logging, SelectStats};
use crate::keywords::KeywordGroups;
use crate::records::{load_records, save_records};
use crate::selection::{
    count_at_min_limit, filter_by_min_limit, group_count_columns, scan_min_limits,
    search_min_limit, sort_by_keywords, sorting_criteria, LimitSearch,
};

/// Parse "start,step,iterations"
fn parse_scan(raw: &str) -> Result<(u64, u64, usize)> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        bail!("--scan expects start,step,iterations, got '{}'", raw);
    }
    let start: u64 = parts[0].parse().with_context(|| format!("Invalid scan start '{}'", parts[0]))?;
    let step: u64 = parts[1].parse().with_context(|| format!("Invalid scan step '{}'", parts[1]))?;
    let iterations: usize = parts[2]
        .parse()
        .with_context(|| format!("Invalid scan iterations '{}'", parts[2]))?;
    Ok((start, step, iterations))
}

/// Pick a min-limit for the target sample size, then filter and sort
pub fn run_select(args: SelectArgs) -> Result<SelectStats> {
    let start_time = Instant::now();

    setup_logging(&args.log_level)?;

    info!("Starting sample selection");
    info!("Input: {}", args.input);
    info!("Output: {}", args.output);

    let mut table = load_records(Path::new(&args.input))
        .with_context(|| format!("Failed to load records from {}", args.input))?;

    let group_columns = group_count_columns(&table);
    if group_columns.is_empty() {
        warn!("No keyword group count columns in {}; nothing can be selected", args.input);
    } else {
        info!("Group count columns: {}", group_columns.join(", "));
    }

    if let (Some(raw), Some(target)) = (&args.scan, args.target) {
        let (start, step, iterations) = parse_scan(raw)?;
        for probe in scan_min_limits(&table, target, start, step, iterations) {
            info!("Scan: min_limit {} -> {} records", probe.min_limit, probe.count);
        }
    }

    let mut exact_hit = false;
    let min_limit = match (args.min_limit, args.target) {
        (Some(limit), _) => {
            info!("Using min_limit {} ({} records)", limit, count_at_min_limit(&table, limit));
            limit
        }
        (None, Some(target)) => {
            info!("Searching for a min_limit leaving {} records", target);
            let search = search_min_limit(&table, target);
            match search {
                LimitSearch::Exact(probe) => {
                    exact_hit = true;
                    info!("Exact hit: min_limit {} -> {} records", probe.min_limit, probe.count);
                }
                LimitSearch::Bracketed { lower, upper } => {
                    if let Some(p) = lower {
                        info!("Closest below target: min_limit {} -> {} records", p.min_limit, p.count);
                    }
                    if let Some(p) = upper {
                        info!("Closest above target: min_limit {} -> {} records", p.min_limit, p.count);
                    }
                }
            }
            search
                .closest(target)
                .map(|probe| probe.min_limit)
                .ok_or_else(|| anyhow!("Min-limit search produced no candidate"))?
        }
        (None, None) => bail!("Either --target or --min-limit is required"),
    };

    let keyword_columns: Vec<String> = match &args.keywords {
        Some(path) => KeywordGroups::load(Path::new(path))?
            .keywords()
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    };

    let input_records = table.len();
    table = filter_by_min_limit(&table, min_limit);
    let criteria = sorting_criteria(&table, &keyword_columns);
    sort_by_keywords(&mut table, &criteria);

    save_records(&table, Path::new(&args.output))
        .with_context(|| format!("Failed to write selection to {}", args.output))?;

    let stats = SelectStats {
        input_records,
        min_limit: Some(min_limit),
        selected_records: table.len(),
        exact_hit,
    };

    info!("==================== FINAL SUMMARY ====================");
    info!("Total execution time: {}", format_elapsed(start_time.elapsed()));
    info!("Input records: {}", stats.input_records);
    info!("Min limit: {}", min_limit);
    info!("Selected records: {}", stats.selected_records);
    info!("Sorted by: {}", criteria.join(", "));
    info!("Output file: {}", args.output);
    info!("========================================================");

    Ok(stats)
}
