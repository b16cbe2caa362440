use clap::{Parser, Subcommand};

use crate::extract::PageScope;
use crate::matching::{MatchConfig, DEFAULT_THRESHOLD, DEFAULT_WRONG_WORD_LIMIT};
use crate::text::ManipulationKind;

#[derive(Parser)]
#[command(name = "slr-screening")]
#[command(about = "Systematic literature review screening: deduplicate citations, count keywords, select a sample, and validate downloaded full texts")]
#[command(version = "2.0.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Merge citation exports from a directory and drop duplicates
    Citations(CitationsArgs),

    /// Count keyword groups in records (or in downloaded files)
    Keywords(KeywordsArgs),

    /// Search for a keyword min-limit that yields a target sample, then filter and sort
    Select(SelectArgs),

    /// Check downloaded files against citation titles
    Validate(ValidateArgs),

    /// Match a single title against a single file
    Match(MatchArgs),

    /// Run citations -> keywords -> select in one go
    Pipeline(PipelineArgs),
}

/// Matcher thresholds shared by validate and match
#[derive(Parser, Clone, Debug)]
pub struct MatchingArgs {
    /// Percentage the ordered matcher must exceed
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    pub ordered_threshold: f64,

    /// Percentage the jumbled matcher must exceed
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    pub jumbled_threshold: f64,

    /// Consecutive stray words that break a jumbled window
    #[arg(long, default_value_t = DEFAULT_WRONG_WORD_LIMIT)]
    pub wrong_word_limit: usize,

    /// PDF pages to read: first, all, or a page number
    #[arg(long, default_value = "first")]
    pub pages: PageScope,
}

impl MatchingArgs {
    pub fn match_config(&self) -> MatchConfig {
        MatchConfig {
            ordered_threshold: self.ordered_threshold,
            jumbled_threshold: self.jumbled_threshold,
            wrong_word_limit: self.wrong_word_limit,
        }
    }
}

#[derive(Parser, Clone)]
pub struct CitationsArgs {
    /// Directory containing .csv / .jsonl citation exports
    #[arg(short, long, required = true)]
    pub input: String,

    /// Output records file (.csv, .jsonl, .parquet; .gz allowed for csv/jsonl)
    #[arg(short, long, default_value = "citations.csv")]
    pub output: String,

    /// Column holding the article title
    #[arg(long, default_value = "title")]
    pub title_column: String,

    /// How titles are cleaned into lookup keys
    #[arg(short, long, value_enum, default_value_t = ManipulationKind::SpaceSeparatedWords)]
    pub manipulation: ManipulationKind,

    /// Logging level (TRACE, DEBUG, INFO, WARN, ERROR, OFF)
    #[arg(short, long, default_value = "INFO")]
    pub log_level: String,
}

#[derive(Parser, Clone)]
pub struct KeywordsArgs {
    /// Records file to annotate with keyword counts
    #[arg(short, long, required_unless_present_any = ["files_dir", "write_template"])]
    pub input: Option<String>,

    /// Count keywords in every readable file under this directory instead
    #[arg(long, conflicts_with = "input")]
    pub files_dir: Option<String>,

    /// Keyword groups JSON: object of name -> "space separated keywords", or a list
    #[arg(short, long, required_unless_present = "write_template")]
    pub keywords: Option<String>,

    /// Output file
    #[arg(short, long, default_value = "keyword_counts.csv")]
    pub output: String,

    /// Column holding the text to count in
    #[arg(long, default_value = "citation_text")]
    pub text_column: String,

    /// How file names are cleaned into article keys (files mode)
    #[arg(short, long, value_enum, default_value_t = ManipulationKind::SpaceSeparatedWords)]
    pub manipulation: ManipulationKind,

    /// Write a sample keywords JSON to this path and exit
    #[arg(long)]
    pub write_template: Option<String>,

    /// Number of threads to use (0 = auto-detect)
    #[arg(short, long, default_value = "0")]
    pub threads: usize,

    /// Logging level (TRACE, DEBUG, INFO, WARN, ERROR, OFF)
    #[arg(short, long, default_value = "INFO")]
    pub log_level: String,
}

#[derive(Parser, Clone)]
pub struct SelectArgs {
    /// Keyword-counted records file
    #[arg(short, long, required = true)]
    pub input: String,

    /// Output file with the selected, sorted records
    #[arg(short, long, default_value = "selected.csv")]
    pub output: String,

    /// Number of records to aim for
    #[arg(long, required_unless_present = "min_limit")]
    pub target: Option<usize>,

    /// Use this min-limit directly instead of searching
    #[arg(long)]
    pub min_limit: Option<u64>,

    /// Keywords JSON, used to add per-keyword columns to the sort order
    #[arg(short, long)]
    pub keywords: Option<String>,

    /// Also log a linear scan of min-limits, given as "start,step,iterations"
    #[arg(long)]
    pub scan: Option<String>,

    /// Logging level (TRACE, DEBUG, INFO, WARN, ERROR, OFF)
    #[arg(short, long, default_value = "INFO")]
    pub log_level: String,
}

#[derive(Parser, Clone)]
pub struct ValidateArgs {
    /// Records file to validate
    #[arg(short, long, required = true)]
    pub input: String,

    /// Directory holding downloaded full texts
    #[arg(short, long, required = true)]
    pub files_dir: String,

    /// Text file of titles known to be inaccessible, one per line
    #[arg(long)]
    pub inaccessible: Option<String>,

    /// Output records file; funnel and manual-check lists are written beside it
    #[arg(short, long, default_value = "validated.csv")]
    pub output: String,

    #[command(flatten)]
    pub matching: MatchingArgs,

    /// Column holding the cleaned title
    #[arg(long, default_value = "cleaned_title")]
    pub cleaned_title_column: String,

    /// Column holding the raw title, used when the cleaned title is blank
    #[arg(long, default_value = "title")]
    pub title_column: String,

    /// How titles and file names are cleaned into lookup keys
    #[arg(short, long, value_enum, default_value_t = ManipulationKind::SpaceSeparatedWords)]
    pub manipulation: ManipulationKind,

    /// Number of threads to use (0 = auto-detect)
    #[arg(short, long, default_value = "0")]
    pub threads: usize,

    /// Logging level (TRACE, DEBUG, INFO, WARN, ERROR, OFF)
    #[arg(short, long, default_value = "INFO")]
    pub log_level: String,
}

#[derive(Parser, Clone)]
pub struct MatchArgs {
    /// Title to look for
    #[arg(long, required = true)]
    pub title: String,

    /// File to search in
    #[arg(short, long, required = true)]
    pub file: String,

    #[command(flatten)]
    pub matching: MatchingArgs,

    /// Print the result as JSON
    #[arg(long, default_value = "false")]
    pub json: bool,

    /// Logging level (TRACE, DEBUG, INFO, WARN, ERROR, OFF)
    #[arg(short, long, default_value = "WARN")]
    pub log_level: String,
}

#[derive(Parser, Clone)]
pub struct PipelineArgs {
    /// Directory containing .csv / .jsonl citation exports
    #[arg(short, long, required = true)]
    pub input: String,

    /// Keyword groups JSON
    #[arg(short, long, required = true)]
    pub keywords: String,

    /// Number of records to aim for
    #[arg(long, required = true)]
    pub target: usize,

    /// Output file with the selected, sorted records
    #[arg(short, long, default_value = "selected.csv")]
    pub output: String,

    /// How titles are cleaned into lookup keys
    #[arg(short, long, value_enum, default_value_t = ManipulationKind::SpaceSeparatedWords)]
    pub manipulation: ManipulationKind,

    /// Keep intermediate files instead of deleting them
    #[arg(long, default_value = "false")]
    pub keep_intermediates: bool,

    /// Directory for intermediate files (default: system temp)
    #[arg(long)]
    pub temp_dir: Option<String>,

    /// Number of threads to use (0 = auto-detect)
    #[arg(short, long, default_value = "0")]
    pub threads: usize,

    /// Logging level (TRACE, DEBUG, INFO, WARN, ERROR, OFF)
    #[arg(short, long, default_value = "INFO")]
    pub log_level: String,
}
