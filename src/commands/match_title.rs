use anyhow::{bail, Context, Result};
use log::{debug, info};
use std::path::Path;

use crate::cli::MatchArgs;
use crate::common::{setup_logging, MatchReport};
use crate::extract::{
    is_pdf, DocumentReader, FileReader, LopdfBackend, PageScope, PdfExtractBackend, TextExtractor,
};
use crate::matching::TitleMatcher;

/// PDF text from the first backend that yields any, else the generic reader
fn read_text(path: &Path, scope: PageScope) -> Result<String> {
    if !is_pdf(path) {
        return FileReader.read(path);
    }
    let backends: [&dyn TextExtractor; 2] = [&PdfExtractBackend, &LopdfBackend];
    for backend in backends {
        match backend.extract(path, scope) {
            Ok(text) if !text.trim().is_empty() => return Ok(text),
            Ok(_) => debug!("{} returned no text for {}", backend.name(), path.display()),
            Err(e) => debug!("{} failed: {:#}", backend.name(), e),
        }
    }
    bail!("No text could be extracted from {}", path.display())
}

/// Match one title against one file and print the outcome
pub fn run_match(args: MatchArgs) -> Result<MatchReport> {
    setup_logging(&args.log_level)?;

    let path = Path::new(&args.file);
    if !path.is_file() {
        bail!("File does not exist: {}", args.file);
    }

    let text = read_text(path, args.matching.pages)
        .with_context(|| format!("Failed to read {}", args.file))?;
    info!("Read {} characters from {}", text.len(), args.file);

    let result = TitleMatcher::new(args.matching.match_config()).validate(&args.title, &text);
    let report = MatchReport {
        title: args.title.clone(),
        file: args.file.clone(),
        matched: result.matched,
        score: result.score,
        strategy: result.strategy.to_string(),
    };

    if args.json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        println!(
            "matched={} score={:.2} strategy={}",
            report.matched, report.score, report.strategy
        );
    }

    Ok(report)
}
