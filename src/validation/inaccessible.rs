use anyhow::{Context, Result};
use log::info;
use std::collections::HashSet;
use std::path::Path;

use crate::text::TextManipulation;

/// Load the newline-separated list of titles that could not be obtained,
/// keyed the same way record titles are.
pub fn load_inaccessible(path: &Path, manipulation: &TextManipulation) -> Result<HashSet<String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read inaccessible list: {}", path.display()))?;
    let keys = inaccessible_keys(raw.lines(), manipulation);
    info!("Loaded {} inaccessible titles from {}", keys.len(), path.display());
    Ok(keys)
}

pub fn inaccessible_keys<'a, I>(titles: I, manipulation: &TextManipulation) -> HashSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    titles
        .into_iter()
        .map(|title| manipulation.apply(title))
        .filter(|key| !key.is_empty())
        .collect()
}
