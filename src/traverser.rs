//! Recursive discovery of the files a run will sort.
//!
//! The walk is lazy and prunes excluded folders before entering them, so
//! nothing below an excluded folder is ever read.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

use crate::error::{CleanError, Result};
use crate::file_category::is_category_dir_name;

/// A regular file found during traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// Lower-cased extension without the dot, empty when there is none.
    pub extension: String,
    /// Directory that contains the file.
    pub parent: PathBuf,
}

impl FileEntry {
    /// Builds an entry from an absolute file path.
    pub fn new(path: PathBuf) -> Self {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self {
            path,
            extension,
            parent,
        }
    }

    /// The file name as a (lossy) string.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Folder names a run must neither enter nor delete.
///
/// Besides the configured names, the category destination folders directly
/// below the root are always excluded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    names: BTreeSet<String>,
}

impl ExclusionSet {
    /// Creates a set from folder names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names
                .into_iter()
                .map(Into::into)
                .filter(|name: &String| !name.is_empty())
                .collect(),
        }
    }

    /// Returns true if `name` was configured as excluded.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Configured names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Returns true if the directory `dir` below `root` is off limits.
    pub fn excludes(&self, root: &Path, dir: &Path) -> bool {
        let Some(name) = dir.file_name().map(|n| n.to_string_lossy()) else {
            return false;
        };
        if self.contains(&name) {
            return true;
        }
        dir.parent() == Some(root) && is_category_dir_name(&name)
    }
}

/// Walks a root folder and yields its files.
#[derive(Debug)]
pub struct Traverser<'a> {
    root: PathBuf,
    exclusions: &'a ExclusionSet,
}

impl<'a> Traverser<'a> {
    /// Prepares a walk of `root`.
    ///
    /// Fails if the root does not exist or is not a directory.
    pub fn new(root: &Path, exclusions: &'a ExclusionSet) -> Result<Self> {
        let root = validate_root(root)?;
        Ok(Self { root, exclusions })
    }

    /// Lazily yields every regular file under the root, in file name order.
    ///
    /// Symlinks are not followed. Entries that cannot be read are skipped.
    pub fn files(&self) -> impl Iterator<Item = FileEntry> + '_ {
        info!(root = %self.root.display(), "Scanning folder");
        WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| !self.is_pruned(entry))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    debug!("Skipping unreadable entry: {}", err);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| FileEntry::new(entry.into_path()))
    }

    fn is_pruned(&self, entry: &DirEntry) -> bool {
        let pruned = entry.depth() > 0
            && entry.file_type().is_dir()
            && self.exclusions.excludes(&self.root, entry.path());
        if pruned {
            debug!(dir = %entry.path().display(), "Skipping excluded folder");
        }
        pruned
    }
}

/// Resolves `root` to an absolute directory path.
pub fn validate_root(root: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(root).map_err(|source| CleanError::FileSystem {
        path: root.to_path_buf(),
        source,
    })?;
    let metadata = std::fs::metadata(&absolute).map_err(|source| CleanError::FileSystem {
        path: absolute.clone(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(CleanError::NotADirectory { path: absolute });
    }
    Ok(absolute)
}
