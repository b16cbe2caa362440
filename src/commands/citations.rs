use anyhow::{Context, Result};
use log::info;
use std::path::Path;
use std::time::Instant;

use crate::cli::CitationsArgs;
use crate::common::{create_spinner, format_elapsed, setup_logging, CitationsStats};
use crate::records::{build_citations, save_records};
use crate::text::TextManipulation;

/// Merge every citation export under the input directory into one deduplicated table
pub fn run_citations(args: CitationsArgs) -> Result<CitationsStats> {
    let start_time = Instant::now();

    setup_logging(&args.log_level)?;

    info!("Starting citation collection");
    info!("Input directory: {}", args.input);
    info!("Output: {}", args.output);
    info!("Title manipulation: {}", args.manipulation);

    let input = Path::new(&args.input);
    if !input.is_dir() {
        return Err(anyhow::anyhow!("Input directory does not exist: {}", args.input));
    }

    let manipulation = TextManipulation::from(args.manipulation);
    let spinner = create_spinner("Collecting citations...");
    let (table, duplicates_removed) = build_citations(input, &args.title_column, &manipulation)
        .with_context(|| format!("Failed to collect citations from {}", args.input))?;
    spinner.finish_with_message(format!("Collected {} unique citations", table.len()));

    save_records(&table, Path::new(&args.output))
        .with_context(|| format!("Failed to write citations to {}", args.output))?;

    let stats = CitationsStats {
        records_loaded: table.len() + duplicates_removed,
        duplicates_removed,
        records_written: table.len(),
    };

    info!("==================== FINAL SUMMARY ====================");
    info!("Total execution time: {}", format_elapsed(start_time.elapsed()));
    info!("Records loaded: {}", stats.records_loaded);
    info!("Duplicates removed: {}", stats.duplicates_removed);
    info!("Records written: {}", stats.records_written);
    info!("Output file: {}", args.output);
    info!("========================================================");

    Ok(stats)
}
