//! Removal of folders a run left empty.
//!
//! The sweep is post-order, so a folder whose only content was emptied
//! sub-folders is removed as well. Excluded folders and the category folders
//! below the root are neither entered nor removed, and the root itself always
//! stays.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::context::SortContext;
use crate::report::Stage;

/// Removes every empty folder below the root and returns how many went.
///
/// In a dry run nothing is deleted: files listed in `vacated` count as
/// already gone, and folders that would be removed are only recorded.
pub fn clean_empty_dirs(ctx: &mut SortContext, vacated: &HashSet<PathBuf>) -> usize {
    let before = ctx.report.removed_dirs.len();
    let root = ctx.root.clone();
    sweep(ctx, &root, vacated);
    ctx.report.removed_dirs.len() - before
}

/// Returns true when `dir` is (or in a dry run would be) empty.
fn sweep(ctx: &mut SortContext, dir: &Path, vacated: &HashSet<PathBuf>) -> bool {
    let mut entries = match fs::read_dir(dir) {
        Ok(entries) => entries.filter_map(|entry| entry.ok()).collect::<Vec<_>>(),
        Err(err) => {
            ctx.report.record_failure(dir, Stage::Clean, err);
            return false;
        }
    };
    entries.sort_by_key(|entry| entry.file_name());

    let mut empty = true;
    for entry in entries {
        let path = entry.path();
        let is_dir = entry.file_type().is_ok_and(|t| t.is_dir());

        if !is_dir {
            if !(ctx.dry_run() && vacated.contains(&path)) {
                empty = false;
            }
            continue;
        }

        if ctx.exclusions.excludes(&ctx.root, &path) {
            empty = false;
            continue;
        }

        if !(sweep(ctx, &path, vacated) && remove_dir(ctx, &path)) {
            empty = false;
        }
    }
    empty
}

fn remove_dir(ctx: &mut SortContext, dir: &Path) -> bool {
    if !ctx.dry_run()
        && let Err(err) = fs::remove_dir(dir)
    {
        ctx.report.record_failure(dir, Stage::Clean, err);
        return false;
    }
    ctx.report.record_removed_dir(dir);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompiledFilters;
    use crate::context::SortSettings;
    use tempfile::TempDir;

    fn context(root: &Path, settings: SortSettings) -> SortContext {
        SortContext::new(root, settings, CompiledFilters::default()).unwrap()
    }

    #[test]
    fn test_removes_nested_empty_dirs() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("a/b/c")).unwrap();
        fs::create_dir_all(temp.path().join("keep")).unwrap();
        fs::write(temp.path().join("keep/file.txt"), "x").unwrap();

        let mut ctx = context(temp.path(), SortSettings::default());
        let removed = clean_empty_dirs(&mut ctx, &HashSet::new());

        assert_eq!(removed, 3);
        assert!(!temp.path().join("a").exists());
        assert!(temp.path().join("keep/file.txt").exists());
        assert!(temp.path().exists());
    }

    #[test]
    fn test_keeps_excluded_and_category_dirs() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("images")).unwrap();
        fs::create_dir_all(temp.path().join("projects/node_modules")).unwrap();
        fs::create_dir_all(temp.path().join("node_modules")).unwrap();

        let settings = SortSettings {
            exclude_dirs: vec!["node_modules".to_string()],
            ..SortSettings::default()
        };
        let mut ctx = context(temp.path(), settings);
        let removed = clean_empty_dirs(&mut ctx, &HashSet::new());

        assert_eq!(removed, 0);
        assert!(temp.path().join("images").is_dir());
        assert!(temp.path().join("node_modules").is_dir());
        assert!(temp.path().join("projects/node_modules").is_dir());
    }

    #[test]
    fn test_dry_run_treats_vacated_files_as_gone() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("sub/inner")).unwrap();
        let moved = temp.path().join("sub/inner/photo.png");
        fs::write(&moved, "x").unwrap();

        let settings = SortSettings {
            dry_run: true,
            ..SortSettings::default()
        };
        let mut ctx = context(temp.path(), settings);
        let vacated = HashSet::from([ctx.root.join("sub/inner/photo.png")]);
        let removed = clean_empty_dirs(&mut ctx, &vacated);

        assert_eq!(removed, 2);
        assert!(moved.exists());
        assert!(temp.path().join("sub/inner").is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn test_removal_failure_recorded_and_sweep_continues() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let locked = temp.path().join("locked");
        fs::create_dir_all(locked.join("inner")).unwrap();
        fs::create_dir_all(temp.path().join("other/empty")).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        // Permission bits do not bind a privileged user.
        if fs::write(locked.join("write_check"), "x").is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let mut ctx = context(temp.path(), SortSettings::default());
        let removed = clean_empty_dirs(&mut ctx, &HashSet::new());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(ctx.report.failures.len(), 1);
        assert_eq!(ctx.report.failures[0].stage, Stage::Clean);
        assert_eq!(ctx.report.failures[0].path, ctx.root.join("locked/inner"));
        assert!(locked.join("inner").is_dir());
        assert_eq!(removed, 2);
        assert!(!temp.path().join("other").exists());
    }

    #[test]
    fn test_vacated_ignored_outside_dry_run() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("sub")).unwrap();
        fs::write(temp.path().join("sub/stuck.zip"), "x").unwrap();

        let mut ctx = context(temp.path(), SortSettings::default());
        let vacated = HashSet::from([ctx.root.join("sub/stuck.zip")]);
        let removed = clean_empty_dirs(&mut ctx, &vacated);

        assert_eq!(removed, 0);
        assert!(temp.path().join("sub/stuck.zip").exists());
        assert!(!ctx.report.has_failures());
    }
}
