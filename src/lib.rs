//! clean-folder - sort a messy folder tree into category folders
//!
//! A run walks a root folder and classifies every file by extension. Names are
//! normalized to a safe Latin alphabet, files are moved into `images/`,
//! `video/`, `documents/`, `audio/` or `archives/`, and archives are unpacked.
//! Folders left empty are removed at the end. Every action is recorded in a
//! [`RunReport`].

pub mod archive;
pub mod cleaner;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod file_category;
pub mod file_organizer;
pub mod logging;
pub mod normalizer;
pub mod output;
pub mod report;
pub mod sorter;
pub mod traverser;

pub use config::{CompiledFilters, ConfigError, ConflictPolicy, SortConfig};
pub use context::{SortContext, SortSettings};
pub use error::{CleanError, Result};
pub use file_category::{Category, classify};
pub use file_organizer::FileOrganizer;
pub use normalizer::normalize;
pub use report::RunReport;
pub use sorter::sort_folder;
pub use traverser::{ExclusionSet, FileEntry, Traverser};

pub use cli::{CliOptions, run_cli};
