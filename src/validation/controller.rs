use anyhow::Result;
use indicatif::ProgressBar;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{FunnelCounts, ValidationState};
use crate::extract::{
    is_pdf, list_all_files, DocumentReader, FileReader, LopdfBackend, PageScope,
    PdfExtractBackend, TextExtractor,
};
use crate::matching::{MatchConfig, MatchResult, TitleMatcher};
use crate::records::{
    CitationRecord, RecordTable, CLEANED_TITLE, DOWNLOADED, FILE_LOCATION, TITLE,
    VALIDATION_METHOD,
};
use crate::text::TextManipulation;

/// Settings for a validation pass
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    pub matching: MatchConfig,
    pub page_scope: PageScope,
    /// Column holding the pre-cleaned title used as lookup key
    pub cleaned_title_column: String,
    /// Fallback column when the cleaned title is missing
    pub title_column: String,
    pub manipulation: TextManipulation,
    pub parallel: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            matching: MatchConfig::default(),
            page_scope: PageScope::default(),
            cleaned_title_column: CLEANED_TITLE.to_string(),
            title_column: TITLE.to_string(),
            manipulation: TextManipulation::default(),
            parallel: true,
        }
    }
}

/// The extraction collaborators used by the check pass
pub struct Extractors {
    pub primary: Box<dyn TextExtractor>,
    pub secondary: Box<dyn TextExtractor>,
    pub reader: Box<dyn DocumentReader>,
}

impl Default for Extractors {
    fn default() -> Self {
        Self {
            primary: Box::new(PdfExtractBackend),
            secondary: Box::new(LopdfBackend),
            reader: Box::new(FileReader),
        }
    }
}

/// A record with its validation progress
#[derive(Debug, Clone)]
pub struct TrackedRecord {
    pub record: CitationRecord,
    pub key: String,
    pub state: ValidationState,
    pub location: Option<PathBuf>,
    pub outcome: Option<MatchResult>,
}

impl TrackedRecord {
    fn settle(&mut self, state: ValidationState, path: &Path, outcome: Option<MatchResult>) {
        self.state = state;
        self.location = state.records_location().then(|| path.to_path_buf());
        self.outcome = outcome;
    }
}

/// Map each file's manipulated stem to its path. The first path in sorted
/// order wins when two files share a key.
pub fn build_file_index(
    files: &[PathBuf],
    manipulation: &TextManipulation,
) -> HashMap<String, PathBuf> {
    let mut index: HashMap<String, PathBuf> = HashMap::new();
    for path in files {
        let stem = match path.file_stem().and_then(|s| s.to_str()) {
            Some(stem) => stem,
            None => continue,
        };
        let key = manipulation.apply(stem);
        if key.is_empty() {
            continue;
        }
        if let Some(existing) = index.get(&key) {
            warn!(
                "Duplicate file key '{}': keeping {}, ignoring {}",
                key,
                existing.display(),
                path.display()
            );
            continue;
        }
        index.insert(key, path.clone());
    }
    index
}

/// Lookup key for a record: its cleaned title as stored, or the manipulated
/// raw title when no cleaned title is present
pub fn record_key(record: &CitationRecord, config: &ValidationConfig) -> String {
    match record
        .get(&config.cleaned_title_column)
        .filter(|value| !value.trim().is_empty())
    {
        Some(cleaned) => cleaned.to_string(),
        None => config
            .manipulation
            .apply(record.get_or_empty(&config.title_column)),
    }
}

/// Drives citation records through the validation state machine
pub struct ValidationController {
    config: ValidationConfig,
    extractors: Extractors,
    matcher: TitleMatcher,
    file_index: HashMap<String, PathBuf>,
    columns: Vec<String>,
    records: Vec<TrackedRecord>,
    extraction_failures: AtomicUsize,
}

impl ValidationController {
    /// Initialize states and index the files under `files_dir`
    pub fn new(
        table: RecordTable,
        files_dir: &Path,
        inaccessible: &HashSet<String>,
        config: ValidationConfig,
    ) -> Result<Self> {
        let files = list_all_files(files_dir)?;
        let file_index = build_file_index(&files, &config.manipulation);
        info!(
            "Indexed {} files ({} distinct titles) under {}",
            files.len(),
            file_index.len(),
            files_dir.display()
        );
        Ok(Self::with_file_index(table, file_index, inaccessible, config))
    }

    pub fn with_file_index(
        table: RecordTable,
        file_index: HashMap<String, PathBuf>,
        inaccessible: &HashSet<String>,
        config: ValidationConfig,
    ) -> Self {
        let columns = table.columns().to_vec();
        let records = table
            .into_records()
            .into_iter()
            .map(|record| {
                let key = record_key(&record, &config);
                let state = if inaccessible.contains(&key) {
                    ValidationState::NoAccess
                } else {
                    ValidationState::NotDownloaded
                };
                TrackedRecord {
                    record,
                    key,
                    state,
                    location: None,
                    outcome: None,
                }
            })
            .collect();

        Self {
            matcher: TitleMatcher::new(config.matching),
            config,
            extractors: Extractors::default(),
            file_index,
            columns,
            records,
            extraction_failures: AtomicUsize::new(0),
        }
    }

    pub fn with_extractors(mut self, extractors: Extractors) -> Self {
        self.extractors = extractors;
        self
    }

    pub fn check(&mut self) -> FunnelCounts {
        self.check_with_progress(None)
    }

    /// Run the check pass over every record still `not_downloaded`
    pub fn check_with_progress(&mut self, progress: Option<&ProgressBar>) -> FunnelCounts {
        let pass = CheckPass {
            config: &self.config,
            extractors: &self.extractors,
            matcher: &self.matcher,
            file_index: &self.file_index,
            extraction_failures: &self.extraction_failures,
        };

        let step = |tracked: &mut TrackedRecord| {
            pass.check_record(tracked);
            if let Some(pb) = progress {
                pb.inc(1);
            }
        };

        if self.config.parallel {
            self.records.par_iter_mut().for_each(step);
        } else {
            self.records.iter_mut().for_each(step);
        }

        self.funnel()
    }

    pub fn records(&self) -> &[TrackedRecord] {
        &self.records
    }

    /// Distinct file keys available for lookup
    pub fn indexed_files(&self) -> usize {
        self.file_index.len()
    }

    pub fn funnel(&self) -> FunnelCounts {
        FunnelCounts::from_states(self.records.iter().map(|r| r.state))
    }

    /// Extraction attempts that errored or panicked
    pub fn extraction_failures(&self) -> usize {
        self.extraction_failures.load(Ordering::Relaxed)
    }

    /// Records with `downloaded`, `file_location`, and `validation_method` filled in
    pub fn into_table(self) -> RecordTable {
        let mut table = RecordTable::new(self.columns);
        for column in [DOWNLOADED, FILE_LOCATION, VALIDATION_METHOD] {
            table.ensure_column(column);
        }
        for tracked in self.records {
            let mut record = tracked.record;
            record.set(DOWNLOADED, tracked.state.as_str());
            record.set(
                FILE_LOCATION,
                tracked
                    .location
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            );
            record.set(
                VALIDATION_METHOD,
                tracked
                    .outcome
                    .map(|o| o.strategy.as_str())
                    .unwrap_or_default(),
            );
            table.push(record);
        }
        table
    }
}

struct CheckPass<'a> {
    config: &'a ValidationConfig,
    extractors: &'a Extractors,
    matcher: &'a TitleMatcher,
    file_index: &'a HashMap<String, PathBuf>,
    extraction_failures: &'a AtomicUsize,
}

impl CheckPass<'_> {
    fn check_record(&self, tracked: &mut TrackedRecord) {
        if tracked.state != ValidationState::NotDownloaded {
            return;
        }
        let path = match self.file_index.get(&tracked.key) {
            Some(path) => path,
            None => return,
        };

        if is_pdf(path) {
            self.check_pdf(tracked, path);
        } else {
            self.check_document(tracked, path);
        }
        debug!("{} -> {}", path.display(), tracked.state);
    }

    fn check_pdf(&self, tracked: &mut TrackedRecord, path: &Path) {
        let scope = self.config.page_scope;
        let primary = self.extractors.primary.as_ref();
        if let Some(text) = self.text_from(primary.name(), path, || primary.extract(path, scope)) {
            let result = self.matcher.validate(&tracked.key, &text);
            if result.matched {
                tracked.settle(ValidationState::Validated, path, Some(result));
                return;
            }
        }

        let secondary = self.extractors.secondary.as_ref();
        match self.text_from(secondary.name(), path, || secondary.extract(path, scope)) {
            Some(text) => self.settle_with_text(tracked, path, &text),
            None => tracked.settle(ValidationState::ManualCheckRequired, path, None),
        }
    }

    fn check_document(&self, tracked: &mut TrackedRecord, path: &Path) {
        let reader = self.extractors.reader.as_ref();
        match self.text_from("reader", path, || reader.read(path)) {
            Some(text) => self.settle_with_text(tracked, path, &text),
            None => tracked.settle(ValidationState::ManualCheckRequired, path, None),
        }
    }

    fn settle_with_text(&self, tracked: &mut TrackedRecord, path: &Path, text: &str) {
        let result = self.matcher.validate(&tracked.key, text);
        let state = if result.matched {
            ValidationState::Validated
        } else {
            ValidationState::Invalidated
        };
        tracked.settle(state, path, Some(result));
    }

    /// Run one extraction, folding errors, panics, and blank output into `None`
    fn text_from<F>(&self, backend: &str, path: &Path, extract: F) -> Option<String>
    where
        F: FnOnce() -> Result<String>,
    {
        match panic::catch_unwind(AssertUnwindSafe(extract)) {
            Ok(Ok(text)) if !text.trim().is_empty() => Some(text),
            Ok(Ok(_)) => {
                debug!("{} returned no text for {}", backend, path.display());
                None
            }
            Ok(Err(e)) => {
                self.extraction_failures.fetch_add(1, Ordering::Relaxed);
                debug!("{} failed: {:#}", backend, e);
                None
            }
            Err(_) => {
                self.extraction_failures.fetch_add(1, Ordering::Relaxed);
                warn!("{} panicked on {}", backend, path.display());
                None
            }
        }
    }
}
