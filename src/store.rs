use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::category::Category;
use crate::correlation::{analyze_with_timeframe, CorrelationResult, Timeframe, TargetSelector};
use crate::derive::{derive_items_with, DeriveOptions, SkippedEntry};
use crate::entry::RawEntry;
use crate::report::CorrelationReport;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("json parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Read-only view of the persistence layer. Each call returns a snapshot the
/// caller owns; the analysis never sees concurrent writes.
pub trait Snapshot {
    fn get_all_entries(&self) -> Result<Vec<RawEntry>, StoreError>;
    fn get_all_categories(&self) -> Result<Vec<Category>, StoreError>;
}

/// In-memory snapshot, mostly for callers that already hold the data.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshot {
    pub entries: Vec<RawEntry>,
    pub categories: Vec<Category>,
}

impl Snapshot for MemorySnapshot {
    fn get_all_entries(&self) -> Result<Vec<RawEntry>, StoreError> {
        Ok(self.entries.clone())
    }

    fn get_all_categories(&self) -> Result<Vec<Category>, StoreError> {
        Ok(self.categories.clone())
    }
}

/// Export files: a JSON array of entries and an optional JSON array of categories.
#[derive(Debug, Clone)]
pub struct JsonSnapshot {
    entries_path: PathBuf,
    categories_path: Option<PathBuf>,
}

impl JsonSnapshot {
    pub fn new(entries_path: impl Into<PathBuf>, categories_path: Option<PathBuf>) -> Self {
        Self { entries_path: entries_path.into(), categories_path }
    }
}

fn read_to_string(path: &Path) -> Result<String, StoreError> {
    fs::read_to_string(path).map_err(|source| StoreError::Io { path: path.to_path_buf(), source })
}

impl Snapshot for JsonSnapshot {
    fn get_all_entries(&self) -> Result<Vec<RawEntry>, StoreError> {
        let text = read_to_string(&self.entries_path)?;
        let entries: Vec<RawEntry> = serde_json::from_str(&text)?;
        debug!(path = %self.entries_path.display(), count = entries.len(), "loaded entries");
        Ok(entries)
    }

    fn get_all_categories(&self) -> Result<Vec<Category>, StoreError> {
        let Some(path) = self.categories_path.as_deref() else {
            return Ok(Vec::new());
        };
        let categories: Vec<Category> = serde_json::from_str(&read_to_string(path)?)?;
        debug!(path = %path.display(), count = categories.len(), "loaded categories");
        Ok(categories)
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub result: CorrelationResult,
    /// `None` when the selector named a category that no longer exists
    pub report: Option<CorrelationReport>,
    pub skipped: Vec<SkippedEntry>,
}

/// Snapshot, derive, resolve the target, analyze and format in one pass.
pub fn run_pipeline<S: Snapshot + ?Sized>(
    source: &S,
    selector: &TargetSelector,
    timeframe: Timeframe,
    opts: DeriveOptions,
) -> Result<PipelineOutput, StoreError> {
    let entries = source.get_all_entries()?;
    let categories = source.get_all_categories()?;
    let derivation = derive_items_with(&entries, opts);
    if !derivation.skipped.is_empty() {
        info!(skipped = derivation.skipped.len(), "entries without a usable time were left out");
    }

    let (result, report) = match selector.resolve(&categories) {
        Some(target) => {
            let result = analyze_with_timeframe(&derivation.items, &target, timeframe);
            let report = CorrelationReport::build(&result, &target);
            (result, Some(report))
        }
        None => (CorrelationResult::empty(timeframe), None),
    };
    Ok(PipelineOutput { result, report, skipped: derivation.skipped })
}
