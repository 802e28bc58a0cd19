//! Output formatting and styling module.
//!
//! All user-facing output of the command-line tool goes through here: colored
//! status lines, the progress bar and the end-of-run summary.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::file_category::Category;
use crate::report::RunReport;

/// Manages CLI output with consistent styling.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// ```no_run
    /// use clean_folder::output::OutputFormatter;
    /// OutputFormatter::success("Folder sorted");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red to stderr.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Creates a progress bar over `total` files.
    ///
    /// The bar draws to stderr and stays hidden when stderr is not a terminal.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )
        .map(|style| style.progress_chars("█▓░"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb
    }

    /// Prints the per-category table: label, folder and file count.
    pub fn summary_table(report: &RunReport) {
        Self::header("SUMMARY");

        let counts = report.counts_by_category();
        let rows: Vec<(String, usize)> = Category::ALL
            .iter()
            .filter_map(|category| {
                counts
                    .get(category)
                    .map(|count| (format!("{} ({}/)", category.label(), category.dir_name()), *count))
            })
            .collect();

        let width = rows
            .iter()
            .map(|(name, _)| name.chars().count())
            .max()
            .unwrap_or(0)
            .max(8);

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Files".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 10));

        for (name, count) in &rows {
            println!(
                "{:<width$} | {} {}",
                name,
                count.to_string().green(),
                plural(*count),
                width = width
            );
        }

        let total = report.sorted_files();
        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total.to_string().green().bold(),
            plural(total),
            width = width
        );
    }

    /// Prints every moved or unpacked file under its category label.
    pub fn moved_files(report: &RunReport) {
        for (category, lines) in category_listing(report) {
            Self::header(&format!("{} ({}/)", category.label(), category.dir_name()));
            for line in lines {
                println!("  {}", line);
            }
        }
    }

    /// Prints the extensions seen, split into known and unknown.
    pub fn extensions(report: &RunReport) {
        let mut known: Vec<&str> = Vec::new();
        let mut unknown: Vec<&str> = Vec::new();
        for (category, exts) in &report.extensions {
            let bucket = if *category == Category::Unknown {
                &mut unknown
            } else {
                &mut known
            };
            bucket.extend(exts.iter().map(String::as_str));
        }
        known.sort_unstable();

        if !known.is_empty() {
            println!("{} {}", "Known extensions:".bold(), known.join(", "));
        }
        if !unknown.is_empty() {
            println!("{} {}", "Unknown extensions:".bold(), unknown.join(", "));
        }
    }

    /// Prints the full end-of-run summary.
    pub fn report(report: &RunReport) {
        if report.dry_run {
            Self::dry_run_notice("Nothing was changed on disk.");
        }

        Self::moved_files(report);
        Self::summary_table(report);
        println!();
        Self::extensions(report);

        if !report.unknown.is_empty() {
            Self::header("Left in place (unknown type)");
            for path in &report.unknown {
                println!("  {}", display_relative(report, path));
            }
        }

        if !report.skipped.is_empty() {
            Self::header("Skipped");
            for skipped in &report.skipped {
                println!(
                    "  {}: {}",
                    display_relative(report, &skipped.path),
                    skipped.reason
                );
            }
        }

        if !report.removed_dirs.is_empty() {
            Self::header(if report.dry_run {
                "Empty folders to remove"
            } else {
                "Removed empty folders"
            });
            for dir in &report.removed_dirs {
                println!("  {}", display_relative(report, dir));
            }
        }

        if report.has_failures() {
            Self::header("Failures");
            for failure in &report.failures {
                Self::error(&format!(
                    "{} ({:?}): {}",
                    display_relative(report, &failure.path),
                    failure.stage,
                    failure.reason
                ));
            }
            Self::warning(&format!(
                "{} item{} could not be processed",
                report.failures.len(),
                if report.failures.len() == 1 { "" } else { "s" }
            ));
        } else if report.dry_run {
            Self::success("Dry run complete.");
        } else {
            Self::success("Folder sorted.");
        }
    }

    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}

/// Per-category lines for moved files and unpacked archives, in
/// [`Category::ALL`] order. Categories without files are left out.
fn category_listing(report: &RunReport) -> Vec<(Category, Vec<String>)> {
    Category::ALL
        .iter()
        .filter_map(|&category| {
            let mut lines: Vec<String> = report
                .moves
                .iter()
                .filter(|record| record.category == category)
                .map(|record| {
                    let from = display_relative(report, &record.from);
                    let to = display_relative(report, &record.to);
                    if record.renamed {
                        format!("Renamed {} --> {}", from, to)
                    } else {
                        format!("{} --> {}", from, to)
                    }
                })
                .collect();
            if category == Category::Archive {
                lines.extend(report.extractions.iter().map(|record| {
                    format!(
                        "Unpacked {} --> {} ({} {})",
                        display_relative(report, &record.archive),
                        display_relative(report, &record.into),
                        record.entries,
                        plural(record.entries)
                    )
                }));
            }
            (!lines.is_empty()).then_some((category, lines))
        })
        .collect()
}

fn display_relative(report: &RunReport, path: &std::path::Path) -> String {
    path.strip_prefix(&report.root)
        .unwrap_or(path)
        .display()
        .to_string()
}
