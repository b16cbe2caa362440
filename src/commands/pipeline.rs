use anyhow::{Context, Result};
use log::info;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use uuid::Uuid;

use crate::cli::{CitationsArgs, KeywordsArgs, PipelineArgs, SelectArgs};
use crate::commands::{citations, keywords, select};
use crate::common::{format_elapsed, setup_logging, CitationsStats, KeywordStats, SelectStats};
use crate::records::CITATION_TEXT;

/// Context for managing pipeline state and temp files
struct PipelineContext {
    temp_dir: PathBuf,
    citations_output: PathBuf,
    keywords_output: PathBuf,
    keep_intermediates: bool,
}

impl PipelineContext {
    fn new(args: &PipelineArgs) -> Result<Self> {
        let run_id = &Uuid::new_v4().to_string()[..8];

        let temp_dir = args
            .temp_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(env::temp_dir);

        fs::create_dir_all(&temp_dir)
            .with_context(|| format!("Failed to create temp directory: {}", temp_dir.display()))?;

        Ok(Self {
            citations_output: temp_dir.join(format!("citations_{}.jsonl", run_id)),
            keywords_output: temp_dir.join(format!("keyword_counts_{}.jsonl", run_id)),
            temp_dir,
            keep_intermediates: args.keep_intermediates,
        })
    }

    fn intermediates(&self) -> [&PathBuf; 2] {
        [&self.citations_output, &self.keywords_output]
    }

    fn cleanup(&self) -> Result<()> {
        if self.keep_intermediates {
            info!("Keeping intermediate files:");
            info!("  Citations output: {}", self.citations_output.display());
            info!("  Keyword counts output: {}", self.keywords_output.display());
            return Ok(());
        }

        info!("Cleaning up intermediate files...");
        for path in self.intermediates() {
            if path.exists() {
                fs::remove_file(path)
                    .with_context(|| format!("Failed to remove: {}", path.display()))?;
            }
        }
        Ok(())
    }
}

impl Drop for PipelineContext {
    fn drop(&mut self) {
        if !self.keep_intermediates {
            for path in self.intermediates() {
                let _ = fs::remove_file(path);
            }
        }
    }
}

/// Run citations -> keywords -> select
pub fn run_pipeline(args: PipelineArgs) -> Result<(CitationsStats, KeywordStats, SelectStats)> {
    let start_time = Instant::now();

    setup_logging(&args.log_level)?;

    info!("Starting screening pipeline");
    info!("Input directory: {}", args.input);
    info!("Keywords: {}", args.keywords);
    info!("Target sample size: {}", args.target);
    info!("Output: {}", args.output);

    let ctx = PipelineContext::new(&args)?;

    info!("Temp directory: {}", ctx.temp_dir.display());

    info!("");
    info!("=== STEP 1/3: Collecting citations ===");
    info!("");

    let citations_args = CitationsArgs {
        input: args.input.clone(),
        output: ctx.citations_output.to_string_lossy().to_string(),
        title_column: crate::records::TITLE.to_string(),
        manipulation: args.manipulation,
        log_level: "OFF".to_string(),
    };
    let citations_stats =
        citations::run_citations(citations_args).context("Citations step failed")?;

    setup_logging(&args.log_level)?;
    info!(
        "Citations complete: {} records ({} duplicates removed)",
        citations_stats.records_written, citations_stats.duplicates_removed
    );

    info!("");
    info!("=== STEP 2/3: Counting keywords ===");
    info!("");

    let keywords_args = KeywordsArgs {
        input: Some(ctx.citations_output.to_string_lossy().to_string()),
        files_dir: None,
        keywords: Some(args.keywords.clone()),
        output: ctx.keywords_output.to_string_lossy().to_string(),
        text_column: CITATION_TEXT.to_string(),
        manipulation: args.manipulation,
        write_template: None,
        threads: args.threads,
        log_level: "OFF".to_string(),
    };
    let keyword_stats = keywords::run_keywords(keywords_args).context("Keywords step failed")?;

    setup_logging(&args.log_level)?;
    info!(
        "Keywords complete: {} of {} records mention a keyword",
        keyword_stats.rows_with_keywords, keyword_stats.rows_counted
    );

    info!("");
    info!("=== STEP 3/3: Selecting sample ===");
    info!("");

    let select_args = SelectArgs {
        input: ctx.keywords_output.to_string_lossy().to_string(),
        output: args.output.clone(),
        target: Some(args.target),
        min_limit: None,
        keywords: Some(args.keywords.clone()),
        scan: None,
        log_level: "OFF".to_string(),
    };
    let select_stats = select::run_select(select_args).context("Select step failed")?;

    setup_logging(&args.log_level)?;
    info!(
        "Select complete: {} records at min_limit {}",
        select_stats.selected_records,
        select_stats.min_limit.unwrap_or(0)
    );

    ctx.cleanup()?;

    info!("");
    info!("==================== PIPELINE COMPLETE ====================");
    info!("Total execution time: {}", format_elapsed(start_time.elapsed()));
    info!("");
    info!("Citations step:");
    info!("  Records loaded: {}", citations_stats.records_loaded);
    info!("  Duplicates removed: {}", citations_stats.duplicates_removed);
    info!("");
    info!("Keywords step:");
    info!("  Keyword groups: {}", keyword_stats.keyword_groups);
    info!("  Unique keywords: {}", keyword_stats.unique_keywords);
    info!("  Total keyword occurrences: {}", keyword_stats.total_occurrences);
    info!("");
    info!("Select step:");
    info!("  Exact target hit: {}", select_stats.exact_hit);
    info!("  Selected records: {}", select_stats.selected_records);
    info!("");
    info!("Output: {}", args.output);
    info!("===========================================================");

    Ok((citations_stats, keyword_stats, select_stats))
}
