use anyhow::{anyhow, Context, Result};
use lopdf::Document;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use super::{PageScope, TextExtractor};

/// Primary backend built on the `pdf-extract` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractBackend;

impl TextExtractor for PdfExtractBackend {
    fn name(&self) -> &str {
        "pdf-extract"
    }

    fn extract(&self, path: &Path, scope: PageScope) -> Result<String> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read PDF {}", path.display()))?;

        // pdf-extract panics on some malformed documents
        let pages = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(&bytes)
        }))
        .map_err(|_| anyhow!("pdf-extract panicked on {}", path.display()))?
        .map_err(|e| anyhow!("pdf-extract failed on {}: {}", path.display(), e))?;

        let selected = scope.select(pages.len() as u32);
        Ok(selected
            .iter()
            .filter_map(|n| pages.get(*n as usize - 1))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

/// Secondary backend built on `lopdf`
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfBackend;

impl TextExtractor for LopdfBackend {
    fn name(&self) -> &str {
        "lopdf"
    }

    fn extract(&self, path: &Path, scope: PageScope) -> Result<String> {
        let document = Document::load(path)
            .map_err(|e| anyhow!("lopdf failed to open {}: {}", path.display(), e))?;

        let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
        let wanted: Vec<u32> = scope
            .select(page_numbers.len() as u32)
            .into_iter()
            .filter_map(|n| page_numbers.get(n as usize - 1).copied())
            .collect();
        if wanted.is_empty() {
            return Ok(String::new());
        }

        document
            .extract_text(&wanted)
            .map_err(|e| anyhow!("lopdf failed to extract text from {}: {}", path.display(), e))
    }
}
