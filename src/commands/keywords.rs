use anyhow::{anyhow, Context, Result};
use log::info;
use std::fs;
use std::path::Path;
use std::time::Instant;

use crate::cli::KeywordsArgs;
use crate::common::{
    configure_thread_pool, create_count_progress_bar, format_elapsed, setup_logging, KeywordStats,
};
use crate::extract::list_all_files;
use crate::keywords::{annotate_table, count_in_files, sample_keywords_json, KeywordGroups, TOTAL_KEYWORDS};
use crate::records::{load_records, save_records, RecordTable};
use crate::selection::count_value;
use crate::text::TextManipulation;

fn rows_with_keywords(table: &RecordTable) -> usize {
    table
        .records()
        .iter()
        .filter(|r| count_value(r, TOTAL_KEYWORDS) > 0)
        .count()
}

fn write_template(path: &str) -> Result<()> {
    let target = Path::new(path);
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(target, sample_keywords_json())
        .with_context(|| format!("Failed to write keywords template: {}", path))?;
    info!("Wrote keywords template to {}", path);
    Ok(())
}

/// Count keyword groups in a records table, or in every file of a directory
pub fn run_keywords(args: KeywordsArgs) -> Result<KeywordStats> {
    let start_time = Instant::now();

    setup_logging(&args.log_level)?;

    if let Some(template) = &args.write_template {
        write_template(template)?;
        if args.keywords.is_none() {
            return Ok(KeywordStats::default());
        }
    }

    let keywords_path = args
        .keywords
        .as_deref()
        .ok_or_else(|| anyhow!("A keywords file is required"))?;

    info!("Starting keyword counting");
    info!("Keywords: {}", keywords_path);
    info!("Output: {}", args.output);

    configure_thread_pool(args.threads);

    let groups = KeywordGroups::load(Path::new(keywords_path))?;

    let (table, total_occurrences) = match (&args.input, &args.files_dir) {
        (Some(input), _) => {
            info!("Input records: {}", input);
            let mut table = load_records(Path::new(input))
                .with_context(|| format!("Failed to load records from {}", input))?;
            let progress = create_count_progress_bar(table.len() as u64, "Counting keywords");
            let total = annotate_table(&mut table, &groups, &args.text_column, Some(&progress))?;
            progress.finish_with_message("Keyword counting complete");
            (table, total)
        }
        (None, Some(dir)) => {
            info!("Input files: {}", dir);
            let files = list_all_files(Path::new(dir))?;
            let manipulation = TextManipulation::from(args.manipulation);
            let progress = create_count_progress_bar(files.len() as u64, "Counting keywords in files");
            let table = count_in_files(&files, &groups, &manipulation, Some(&progress));
            progress.finish_with_message("Keyword counting complete");
            let total = table
                .records()
                .iter()
                .map(|r| count_value(r, TOTAL_KEYWORDS) as usize)
                .sum();
            (table, total)
        }
        (None, None) => return Err(anyhow!("Either --input or --files-dir is required")),
    };

    save_records(&table, Path::new(&args.output))
        .with_context(|| format!("Failed to write keyword counts to {}", args.output))?;

    let stats = KeywordStats {
        keyword_groups: groups.len(),
        unique_keywords: groups.keyword_count(),
        rows_counted: table.len(),
        rows_with_keywords: rows_with_keywords(&table),
        total_occurrences,
    };

    info!("==================== FINAL SUMMARY ====================");
    info!("Total execution time: {}", format_elapsed(start_time.elapsed()));
    info!("Keyword groups: {}", stats.keyword_groups);
    info!("Unique keywords: {}", stats.unique_keywords);
    info!("Rows counted: {}", stats.rows_counted);
    info!("Rows with at least one keyword: {}", stats.rows_with_keywords);
    info!("Total keyword occurrences: {}", stats.total_occurrences);
    info!("Output file: {}", args.output);
    info!("========================================================");

    Ok(stats)
}
