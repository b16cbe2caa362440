use anyhow::{Context, Result};
use log::{info, warn};
use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;

use crate::cli::ValidateArgs;
use crate::common::{
    configure_thread_pool, create_count_progress_bar, format_elapsed, setup_logging,
    ValidateStats, ValidationOutputPaths,
};
use crate::records::{load_records, save_records, RecordTable, DOWNLOADED};
use crate::text::TextManipulation;
use crate::validation::{load_inaccessible, ValidationConfig, ValidationController, ValidationState};

/// Records left for a person to look at
fn manual_check_table(table: &RecordTable) -> RecordTable {
    let mut manual = RecordTable::new(table.columns().to_vec());
    let wanted = ValidationState::ManualCheckRequired.as_str();
    for record in table.records() {
        if record.get_or_empty(DOWNLOADED) == wanted {
            manual.push(record.clone());
        }
    }
    manual
}

/// Check downloaded full texts against citation titles
pub fn run_validate(args: ValidateArgs) -> Result<ValidateStats> {
    let start_time = Instant::now();

    setup_logging(&args.log_level)?;

    let outputs = ValidationOutputPaths::from_base(&args.output);

    info!("Starting full-text validation");
    info!("Input records: {}", args.input);
    info!("Files directory: {}", args.files_dir);
    if let Some(ref path) = args.inaccessible {
        info!("Inaccessible list: {}", path);
    }
    info!("Output: {}", outputs.records.display());
    info!("Funnel counts: {}", outputs.funnel.display());
    info!("Manual check list: {}", outputs.manual.display());
    info!(
        "Thresholds: ordered {} | jumbled {} (wrong word limit {}) | pages {}",
        args.matching.ordered_threshold,
        args.matching.jumbled_threshold,
        args.matching.wrong_word_limit,
        args.matching.pages
    );

    configure_thread_pool(args.threads);

    let files_dir = Path::new(&args.files_dir);
    if !files_dir.is_dir() {
        return Err(anyhow::anyhow!("Files directory does not exist: {}", args.files_dir));
    }

    let table = load_records(Path::new(&args.input))
        .with_context(|| format!("Failed to load records from {}", args.input))?;
    if !table.has_column(&args.cleaned_title_column) && !table.has_column(&args.title_column) {
        warn!(
            "Neither '{}' nor '{}' is a column of {}; no record can be matched",
            args.cleaned_title_column, args.title_column, args.input
        );
    }

    let manipulation = TextManipulation::from(args.manipulation);
    let inaccessible = match &args.inaccessible {
        Some(path) => load_inaccessible(Path::new(path), &manipulation)?,
        None => HashSet::new(),
    };

    let config = ValidationConfig {
        matching: args.matching.match_config(),
        page_scope: args.matching.pages,
        cleaned_title_column: args.cleaned_title_column.clone(),
        title_column: args.title_column.clone(),
        manipulation,
        parallel: true,
    };

    let total_records = table.len();
    let mut controller = ValidationController::new(table, files_dir, &inaccessible, config)?;
    let files_indexed = controller.indexed_files();

    let progress = create_count_progress_bar(total_records as u64, "Checking records");
    let funnel = controller.check_with_progress(Some(&progress));
    progress.finish_with_message("Check pass complete");

    let extraction_failures = controller.extraction_failures();
    let validated = controller.into_table();
    let manual = manual_check_table(&validated);

    save_records(&validated, &outputs.records)
        .with_context(|| format!("Failed to write records to {}", outputs.records.display()))?;
    funnel.write_json(&outputs.funnel)?;
    save_records(&manual, &outputs.manual)
        .with_context(|| format!("Failed to write manual list to {}", outputs.manual.display()))?;

    let stats = ValidateStats {
        total_records,
        files_indexed,
        extraction_failures,
        funnel,
    };

    info!("==================== FINAL SUMMARY ====================");
    info!("Total execution time: {}", format_elapsed(start_time.elapsed()));
    info!("Records checked: {}", stats.total_records);
    info!("Files indexed: {}", stats.files_indexed);
    for state in ValidationState::ALL {
        info!("  {}: {}", state, stats.funnel.get(state));
    }
    if stats.extraction_failures > 0 {
        info!("Extraction failures: {}", stats.extraction_failures);
    }
    info!("Output file: {}", outputs.records.display());
    info!("Funnel counts: {}", outputs.funnel.display());
    info!("Manual check list: {} ({} records)", outputs.manual.display(), manual.len());
    info!("========================================================");

    Ok(stats)
}
