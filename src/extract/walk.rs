use anyhow::{bail, Result};
use log::debug;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// List every regular file under `root`, recursively, in sorted order
pub fn list_all_files(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        bail!("Directory not found: {}", root.display());
    }

    let mut paths: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .collect();
    paths.sort();

    debug!("Found {} files under {}", paths.len(), root.display());
    Ok(paths)
}
