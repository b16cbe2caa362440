pub mod pdf;
pub mod reader;
pub mod walk;

pub use pdf::{LopdfBackend, PdfExtractBackend};
pub use reader::FileReader;
pub use walk::list_all_files;

use anyhow::{bail, Result};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Which pages of a PDF to extract text from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageScope {
    #[default]
    First,
    All,
    /// 1-based page number
    Page(u32),
}

impl PageScope {
    /// Select page numbers (1-based) out of `total` pages
    pub fn select(&self, total: u32) -> Vec<u32> {
        match *self {
            PageScope::First if total > 0 => vec![1],
            PageScope::First => Vec::new(),
            PageScope::All => (1..=total).collect(),
            PageScope::Page(n) if n >= 1 && n <= total => vec![n],
            PageScope::Page(_) => Vec::new(),
        }
    }
}

impl FromStr for PageScope {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "first" => Ok(PageScope::First),
            "all" => Ok(PageScope::All),
            other => match other.parse::<u32>() {
                Ok(n) if n >= 1 => Ok(PageScope::Page(n)),
                _ => bail!("Invalid page scope '{}': expected 'first', 'all', or a page number", s),
            },
        }
    }
}

impl fmt::Display for PageScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageScope::First => write!(f, "first"),
            PageScope::All => write!(f, "all"),
            PageScope::Page(n) => write!(f, "{}", n),
        }
    }
}

/// A PDF text extraction backend
pub trait TextExtractor: Send + Sync {
    fn name(&self) -> &str;

    fn extract(&self, path: &Path, scope: PageScope) -> Result<String>;
}

/// Reads text out of non-PDF documents
pub trait DocumentReader: Send + Sync {
    fn read(&self, path: &Path) -> Result<String>;
}

/// Lowercased extension without the dot
pub fn file_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

pub fn is_pdf(path: &Path) -> bool {
    file_extension(path).as_deref() == Some("pdf")
}
