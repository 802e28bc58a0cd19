//! Record of everything a run did, or would do in a dry run.
//!
//! The report is the run's log sink: every stage records its actions here and
//! the matching `tracing` event is emitted at the same time. At the end it is
//! printed as a summary or serialized to JSON.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::file_category::Category;

/// A file moved into a category folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveRecord {
    pub from: PathBuf,
    pub to: PathBuf,
    pub category: Category,
    /// True when the destination name differs from the original name.
    pub renamed: bool,
}

/// An archive unpacked into its own folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractRecord {
    pub archive: PathBuf,
    pub into: PathBuf,
    pub entries: usize,
}

/// The stage a recoverable failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Move,
    Extract,
    Clean,
}

/// A recoverable failure. The run went on without this path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub path: PathBuf,
    pub stage: Stage,
    pub reason: String,
}

/// A file deliberately left where it was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Everything one run did.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub root: PathBuf,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub moves: Vec<MoveRecord>,
    pub extractions: Vec<ExtractRecord>,
    pub unknown: Vec<PathBuf>,
    pub skipped: Vec<SkippedFile>,
    pub failures: Vec<Failure>,
    pub removed_dirs: Vec<PathBuf>,
    /// Extensions seen per category, lower-cased.
    pub extensions: BTreeMap<Category, BTreeSet<String>>,
}

impl RunReport {
    /// Starts an empty report for `root`.
    pub fn new(root: PathBuf, dry_run: bool) -> Self {
        Self {
            root,
            dry_run,
            started_at: Utc::now(),
            finished_at: None,
            moves: Vec::new(),
            extractions: Vec::new(),
            unknown: Vec::new(),
            skipped: Vec::new(),
            failures: Vec::new(),
            removed_dirs: Vec::new(),
            extensions: BTreeMap::new(),
        }
    }

    /// Notes the extension of a classified file.
    pub fn observe(&mut self, category: Category, extension: &str) {
        let seen = self.extensions.entry(category).or_default();
        if !extension.is_empty() {
            seen.insert(extension.to_string());
        }
    }

    pub fn record_move(&mut self, record: MoveRecord) {
        if record.renamed {
            info!(from = %record.from.display(), to = %record.to.display(), "Moved and renamed");
        } else {
            info!(from = %record.from.display(), to = %record.to.display(), "Moved");
        }
        self.moves.push(record);
    }

    pub fn record_extraction(&mut self, record: ExtractRecord) {
        info!(
            archive = %record.archive.display(),
            into = %record.into.display(),
            entries = record.entries,
            "Unpacked archive"
        );
        self.extractions.push(record);
    }

    pub fn record_unknown(&mut self, path: &Path) {
        debug!(path = %path.display(), "Unknown file type, left in place");
        self.unknown.push(path.to_path_buf());
    }

    pub fn record_skip(&mut self, path: &Path, reason: impl Into<String>) {
        let reason = reason.into();
        info!(path = %path.display(), %reason, "Skipped");
        self.skipped.push(SkippedFile {
            path: path.to_path_buf(),
            reason,
        });
    }

    pub fn record_failure(&mut self, path: &Path, stage: Stage, reason: impl ToString) {
        let reason = reason.to_string();
        warn!(path = %path.display(), ?stage, %reason, "Recoverable failure");
        self.failures.push(Failure {
            path: path.to_path_buf(),
            stage,
            reason,
        });
    }

    pub fn record_removed_dir(&mut self, path: &Path) {
        info!(dir = %path.display(), "Removed empty folder");
        self.removed_dirs.push(path.to_path_buf());
    }

    /// Stamps the finish time.
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Number of files moved or unpacked per category.
    pub fn counts_by_category(&self) -> BTreeMap<Category, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.moves {
            *counts.entry(record.category).or_insert(0) += 1;
        }
        if !self.extractions.is_empty() {
            *counts.entry(Category::Archive).or_insert(0) += self.extractions.len();
        }
        counts
    }

    /// Files that were sorted: moved plus unpacked.
    pub fn sorted_files(&self) -> usize {
        self.moves.len() + self.extractions.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Pretty JSON rendering of the whole report.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
