//! Moving files into category folders and unpacking archives.
//!
//! Destinations always get normalized names. A name that is already taken
//! (on disk, or earlier in the same run) is resolved by the configured
//! [`ConflictPolicy`]; nothing is ever overwritten.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::archive::{self, ArchiveKind};
use crate::config::ConflictPolicy;
use crate::context::SortContext;
use crate::error::{CleanError, Result};
use crate::file_category::Category;
use crate::normalizer::{normalize, normalize_stem, split_extension};
use crate::report::{ExtractRecord, MoveRecord, Stage};
use crate::traverser::FileEntry;

/// Returns the next candidate name after a collision.
///
/// A trailing `_<number>` is incremented, otherwise `_1` is appended; the
/// extension stays put.
///
/// ```
/// use clean_folder::file_organizer::next_suffix_name;
///
/// assert_eq!(next_suffix_name("report.pdf"), "report_1.pdf");
/// assert_eq!(next_suffix_name("report_1.pdf"), "report_2.pdf");
/// assert_eq!(next_suffix_name("photos"), "photos_1");
/// ```
pub fn next_suffix_name(name: &str) -> String {
    let (stem, ext) = match split_extension(name) {
        Some((stem, ext)) => (stem, Some(ext)),
        None => (name, None),
    };

    let bumped = match stem.rsplit_once('_') {
        Some((base, num)) if !num.is_empty() && num.bytes().all(|b| b.is_ascii_digit()) => {
            match num.parse::<u64>().ok().and_then(|n| n.checked_add(1)) {
                Some(next) => format!("{base}_{next}"),
                None => format!("{stem}_1"),
            }
        }
        _ => format!("{stem}_1"),
    };

    match ext {
        Some(ext) => format!("{bumped}.{ext}"),
        None => bumped,
    }
}

/// Moves a file, falling back to copy and delete across filesystems.
pub fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::CrossesDevices => {
            debug!(from = %from.display(), "Rename crosses devices, copying instead");
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
        Err(err) => Err(err),
    }
}

fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|source| CleanError::DirectoryCreation {
        path: path.to_path_buf(),
        source,
    })
}

/// Moves classified files into their category folders.
///
/// One organizer serves a whole run so that it can remember the names it has
/// already handed out.
#[derive(Debug, Default)]
pub struct FileOrganizer {
    claimed: HashSet<PathBuf>,
}

impl FileOrganizer {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_taken(&self, path: &Path) -> bool {
        self.claimed.contains(path) || path.symlink_metadata().is_ok()
    }

    /// Picks a free destination for `name` inside `dir`.
    ///
    /// Returns `None` when the name is taken and the policy is to skip.
    pub fn resolve_destination(
        &self,
        dir: &Path,
        name: &str,
        policy: ConflictPolicy,
    ) -> Option<PathBuf> {
        let mut name = name.to_string();
        let mut candidate = dir.join(&name);
        while self.is_taken(&candidate) {
            match policy {
                ConflictPolicy::Skip => return None,
                ConflictPolicy::Rename => {
                    name = next_suffix_name(&name);
                    candidate = dir.join(&name);
                }
            }
        }
        Some(candidate)
    }

    /// Moves `entry` into the folder of `category` under a normalized name.
    ///
    /// Returns `Ok(false)` when the file was skipped because of a name
    /// collision. In a dry run nothing is touched but the move is still
    /// recorded.
    pub fn move_to_category(
        &mut self,
        ctx: &mut SortContext,
        entry: &FileEntry,
        category: Category,
    ) -> Result<bool> {
        let category_dir = ctx.category_dir(category);
        let original_name = entry.file_name();
        let name = normalize(&original_name);

        let Some(destination) =
            self.resolve_destination(&category_dir, &name, ctx.settings.on_conflict)
        else {
            ctx.report.record_skip(
                &entry.path,
                format!("{}/{} already exists", category.dir_name(), name),
            );
            return Ok(false);
        };

        if !ctx.dry_run() {
            ensure_dir(&category_dir)?;
            move_file(&entry.path, &destination).map_err(|source| CleanError::FileMove {
                from: entry.path.clone(),
                to: destination.clone(),
                source,
            })?;
        }

        let renamed = destination
            .file_name()
            .is_some_and(|n| n.to_string_lossy() != original_name);
        self.claimed.insert(destination.clone());
        ctx.report.record_move(MoveRecord {
            from: entry.path.clone(),
            to: destination,
            category,
            renamed,
        });
        Ok(true)
    }

    /// Unpacks an archive into `archives/<name>/` and deletes the archive.
    ///
    /// On failure the partially filled folder is removed and the archive is
    /// left where it was. A dry run reads the whole archive to validate it but
    /// writes nothing.
    pub fn unpack_archive(&mut self, ctx: &mut SortContext, entry: &FileEntry) -> Result<bool> {
        let archives_dir = ctx.category_dir(Category::Archive);
        let file_name = entry.file_name();
        let folder = normalize_stem(archive::archive_stem(&file_name));

        let Some(target) =
            self.resolve_destination(&archives_dir, &folder, ctx.settings.on_conflict)
        else {
            ctx.report.record_skip(
                &entry.path,
                format!("{}/{} already exists", Category::Archive.dir_name(), folder),
            );
            return Ok(false);
        };

        let kind = ArchiveKind::detect(&entry.path)?;

        let entries = if ctx.dry_run() {
            archive::inspect(kind, &entry.path)?
        } else {
            ensure_dir(&target)?;
            match archive::extract(kind, &entry.path, &target) {
                Ok(written) => written,
                Err(err) => {
                    if let Err(cleanup) = fs::remove_dir_all(&target) {
                        debug!(dir = %target.display(), "Could not remove partial extraction: {}", cleanup);
                    }
                    return Err(err);
                }
            }
        };

        self.claimed.insert(target.clone());
        ctx.report.record_extraction(ExtractRecord {
            archive: entry.path.clone(),
            into: target,
            entries,
        });

        if !ctx.dry_run()
            && let Err(source) = fs::remove_file(&entry.path)
        {
            ctx.report.record_failure(
                &entry.path,
                Stage::Extract,
                CleanError::Removal {
                    path: entry.path.clone(),
                    source,
                },
            );
        }
        Ok(true)
    }
}
