use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use clean_folder::cli::{CliOptions, run_cli};
use clean_folder::config::ConflictPolicy;
use clean_folder::logging;

#[derive(Parser, Debug)]
#[command(name = "clean-folder")]
#[command(version)]
#[command(about = "Sort a folder into images, video, documents, audio and archives", long_about = None)]
struct Cli {
    /// Folder to sort
    #[arg(value_name = "FOLDER")]
    folder: PathBuf,

    /// Folder name to leave alone (repeatable)
    #[arg(short, long, value_name = "NAME")]
    exclude: Vec<String>,

    /// Show what would happen without changing anything
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Move files of unknown type into unknown/
    #[arg(long)]
    sort_unknown: bool,

    /// Move archives instead of unpacking them
    #[arg(long)]
    no_unpack: bool,

    /// What to do when a destination name is taken
    #[arg(long, value_enum, value_name = "POLICY")]
    on_conflict: Option<ConflictPolicy>,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

fn run(cli: Cli) -> Result<()> {
    let options = CliOptions {
        exclude: cli.exclude,
        dry_run: cli.dry_run,
        config: cli.config,
        sort_unknown: cli.sort_unknown,
        no_unpack: cli.no_unpack,
        on_conflict: cli.on_conflict,
        json: cli.json,
    };

    run_cli(&cli.folder, &options)
        .with_context(|| format!("Cannot sort {}", cli.folder.display()))?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    let _ = logging::init(cli.verbose, !cli.no_color);

    run(cli)
}
