//! State threaded through every stage of a run.

use std::path::{Path, PathBuf};

use crate::config::{CompiledFilters, ConflictPolicy, SortRules};
use crate::error::Result;
use crate::file_category::Category;
use crate::report::RunReport;
use crate::traverser::{ExclusionSet, validate_root};

/// Run settings after merging the config file with command-line flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSettings {
    pub exclude_dirs: Vec<String>,
    pub sort_unknown: bool,
    pub unpack_archives: bool,
    pub on_conflict: ConflictPolicy,
    pub dry_run: bool,
}

impl Default for SortSettings {
    fn default() -> Self {
        Self::from_rules(&SortRules::default())
    }
}

impl SortSettings {
    pub fn from_rules(rules: &SortRules) -> Self {
        Self {
            exclude_dirs: rules.exclude_dirs.clone(),
            sort_unknown: rules.sort_unknown,
            unpack_archives: rules.unpack_archives,
            on_conflict: rules.on_conflict,
            dry_run: false,
        }
    }
}

/// The root, exclusions, settings, filters and log sink of one run.
#[derive(Debug)]
pub struct SortContext {
    pub root: PathBuf,
    pub exclusions: ExclusionSet,
    pub settings: SortSettings,
    pub filters: CompiledFilters,
    pub report: RunReport,
}

impl SortContext {
    /// Validates `root` and prepares an empty report.
    pub fn new(root: &Path, settings: SortSettings, filters: CompiledFilters) -> Result<Self> {
        let root = validate_root(root)?;
        Ok(Self {
            exclusions: ExclusionSet::new(settings.exclude_dirs.iter().cloned()),
            report: RunReport::new(root.clone(), settings.dry_run),
            root,
            settings,
            filters,
        })
    }

    /// Destination folder of `category` below the root.
    pub fn category_dir(&self, category: Category) -> PathBuf {
        self.root.join(category.dir_name())
    }

    pub fn dry_run(&self) -> bool {
        self.settings.dry_run
    }

    /// Path of `path` relative to the root, for filters and display.
    pub fn relative<'p>(&self, path: &'p Path) -> &'p Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }
}
