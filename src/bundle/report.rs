use crate::bundle::writer::BundleProgress;
use crate::config::Config;
use crate::scanner::TreeScan;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Summary of one aggregation run, printed after the bundle is written and
/// emitted as pretty JSON in json output mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleReport {
    pub root: String,
    pub output: String,
    pub generated_at: DateTime<Utc>,
    pub summary: BundleSummary,
    pub filters: FilterSnapshot,
    /// Non-fatal walk problems (unreadable subdirectories etc.).
    pub warnings: Vec<String>,
    /// Files that degraded to an inline `[Could not read file: ...]` marker.
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleSummary {
    pub total_records: usize,
    pub readable_records: usize,
    pub unreadable_records: usize,
    pub bytes_written: u64,
    pub duration_ms: u128,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterSnapshot {
    pub exclude_files: Vec<String>,
    pub exclude_dirs: Vec<String>,
    pub exclude_patterns: Vec<String>,
}

impl BundleReport {
    pub fn new(
        root: &Path,
        output: &Path,
        scan: &TreeScan,
        progress: &BundleProgress,
        config: &Config,
    ) -> Self {
        Self {
            root: root.display().to_string(),
            output: output.display().to_string(),
            generated_at: Utc::now(),
            summary: BundleSummary {
                total_records: progress.records_written,
                readable_records: progress.records_written - progress.unreadable.len(),
                unreadable_records: progress.unreadable.len(),
                bytes_written: progress.bytes_written,
                duration_ms: progress.elapsed().as_millis(),
            },
            filters: FilterSnapshot {
                exclude_files: config.filters.exclude_files.clone(),
                exclude_dirs: config.filters.exclude_dirs.clone(),
                exclude_patterns: config.filters.exclude_patterns.clone(),
            },
            warnings: scan.warnings.clone(),
            errors: progress.unreadable.clone(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}
