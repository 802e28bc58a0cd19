//! One full sorting run: traverse, classify, move or unpack, then clean.

use std::collections::HashSet;
use std::path::PathBuf;

use indicatif::ProgressBar;
use tracing::info;

use crate::cleaner::clean_empty_dirs;
use crate::context::SortContext;
use crate::error::Result;
use crate::file_category::{Category, classify};
use crate::file_organizer::FileOrganizer;
use crate::report::Stage;
use crate::traverser::{FileEntry, Traverser};

/// Collects the files a run will handle, after filters.
///
/// The list is gathered before anything moves, so files that land in a
/// category folder are never seen twice.
pub fn collect_files(ctx: &SortContext) -> Result<Vec<FileEntry>> {
    let traverser = Traverser::new(&ctx.root, &ctx.exclusions)?;
    let files = traverser
        .files()
        .filter(|entry| ctx.filters.should_include(ctx.relative(&entry.path)))
        .collect();
    Ok(files)
}

/// Sorts the root of `ctx`, recording every action in `ctx.report`.
///
/// Only an invalid root is fatal. Per-file failures are recorded and the run
/// goes on.
pub fn sort_folder(ctx: &mut SortContext, progress: Option<&ProgressBar>) -> Result<()> {
    let files = collect_files(ctx)?;
    info!(files = files.len(), dry_run = ctx.dry_run(), "Sorting");
    if let Some(pb) = progress {
        pb.set_length(files.len() as u64);
    }

    let mut organizer = FileOrganizer::new();
    let mut vacated: HashSet<PathBuf> = HashSet::new();

    for entry in &files {
        if let Some(pb) = progress {
            pb.set_message(entry.file_name());
        }

        let category = classify(&entry.extension);
        ctx.report.observe(category, &entry.extension);

        let outcome = match category {
            Category::Unknown if !ctx.settings.sort_unknown => {
                ctx.report.record_unknown(&entry.path);
                Ok(false)
            }
            Category::Archive if ctx.settings.unpack_archives => organizer
                .unpack_archive(ctx, entry)
                .map_err(|err| (Stage::Extract, err)),
            _ => organizer
                .move_to_category(ctx, entry, category)
                .map_err(|err| (Stage::Move, err)),
        };

        match outcome {
            Ok(true) => {
                vacated.insert(entry.path.clone());
            }
            Ok(false) => {}
            Err((stage, err)) => ctx.report.record_failure(&entry.path, stage, err),
        }

        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    clean_empty_dirs(ctx, &vacated);
    ctx.report.finish();
    Ok(())
}
