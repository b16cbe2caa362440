use anyhow::Result;
use clap::Parser;

use slr_screening::cli::{Cli, Commands};
use slr_screening::commands::{
    run_citations, run_keywords, run_match, run_pipeline, run_select, run_validate,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Citations(args) => {
            run_citations(args)?;
        }
        Commands::Keywords(args) => {
            run_keywords(args)?;
        }
        Commands::Select(args) => {
            run_select(args)?;
        }
        Commands::Validate(args) => {
            run_validate(args)?;
        }
        Commands::Match(args) => {
            run_match(args)?;
        }
        Commands::Pipeline(args) => {
            run_pipeline(args)?;
        }
    }

    Ok(())
}
