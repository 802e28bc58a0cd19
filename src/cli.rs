//! Command-line orchestration.
//!
//! Turns parsed options into a [`SortContext`]. It then runs the sort and
//! prints the outcome, either as a human summary or as JSON.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::{CompiledFilters, ConflictPolicy, SortConfig};
use crate::context::{SortContext, SortSettings};
use crate::error::Result;
use crate::output::OutputFormatter;
use crate::report::RunReport;
use crate::sorter::sort_folder;

/// Options taken from the command line. They override the config file.
#[derive(Debug, Clone, Default)]
pub struct CliOptions {
    /// Folder names added to the exclusion set.
    pub exclude: Vec<String>,
    pub dry_run: bool,
    pub config: Option<PathBuf>,
    pub sort_unknown: bool,
    pub no_unpack: bool,
    pub on_conflict: Option<ConflictPolicy>,
    /// Print the report as JSON instead of the summary.
    pub json: bool,
}

/// Merges config file settings with command-line overrides.
pub fn merge_settings(config: &SortConfig, options: &CliOptions) -> SortSettings {
    let mut settings = SortSettings::from_rules(&config.sort);
    for name in &options.exclude {
        if !settings.exclude_dirs.contains(name) {
            settings.exclude_dirs.push(name.clone());
        }
    }
    settings.sort_unknown |= options.sort_unknown;
    if options.no_unpack {
        settings.unpack_archives = false;
    }
    if let Some(policy) = options.on_conflict {
        settings.on_conflict = policy;
    }
    settings.dry_run = options.dry_run;
    settings
}

/// Builds the run context for `root` without touching anything.
pub fn prepare(root: &Path, options: &CliOptions) -> Result<SortContext> {
    let config = SortConfig::load(options.config.as_deref())?;
    let filters = CompiledFilters::new(&config.filters)?;
    let settings = merge_settings(&config, options);
    debug!(?settings, "Effective settings");
    SortContext::new(root, settings, filters)
}

/// Sorts `root` and prints the outcome.
///
/// Fails only on an invalid root or configuration; everything else ends up
/// in the returned report.
///
/// ```no_run
/// use clean_folder::cli::{run_cli, CliOptions};
/// use std::path::Path;
///
/// let options = CliOptions { dry_run: true, ..CliOptions::default() };
/// let report = run_cli(Path::new("/home/user/Downloads"), &options).unwrap();
/// println!("{} files sorted", report.sorted_files());
/// ```
pub fn run_cli(root: &Path, options: &CliOptions) -> Result<RunReport> {
    let mut ctx = prepare(root, options)?;

    if options.json {
        sort_folder(&mut ctx, None)?;
        println!("{}", ctx.report.to_json()?);
        return Ok(ctx.report);
    }

    if ctx.dry_run() {
        OutputFormatter::dry_run_notice(&format!("Planning sort of {}", ctx.root.display()));
    } else {
        OutputFormatter::info(&format!("Sorting {}", ctx.root.display()));
    }

    let pb = OutputFormatter::create_progress_bar(0);
    sort_folder(&mut ctx, Some(&pb))?;
    pb.finish_and_clear();

    OutputFormatter::report(&ctx.report);
    Ok(ctx.report)
}
