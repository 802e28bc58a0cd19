//! Run configuration and file filters.
//!
//! Settings come from an optional TOML file. Command-line flags are applied
//! on top afterwards. Two tables are recognized:
//! - `[sort]` controls the run itself: extra excluded folder names, what to do
//!   with unknown files and archives, and how name collisions are resolved.
//! - `[filters]` decides which files a run may touch at all. Filtered files
//!   stay exactly where they are.
//!
//! # Configuration File Format
//!
//! ```toml
//! [sort]
//! exclude_dirs = [".git"]
//! sort_unknown = false
//! unpack_archives = true
//! on_conflict = "rename"
//!
//! [filters]
//! enable_hidden_files = true
//!
//! [filters.exclude]
//! filenames = ["Thumbs.db"]
//! patterns = ["*.part"]
//! extensions = ["tmp"]
//! regex = []
//!
//! [filters.include]
//! patterns = []
//! ```

use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_FILE: &str = ".clean-folder.toml";

/// Errors that can occur during configuration loading and filter compilation.
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),
    /// Invalid glob pattern provided.
    #[error("Invalid glob pattern '{0}': expected *.ext or dir/**")]
    InvalidGlobPattern(String),
    /// Invalid regex pattern provided with the actual error reason.
    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidRegexPattern {
        /// The regex pattern that failed to compile.
        pattern: String,
        /// The reason why the pattern is invalid.
        reason: String,
    },
    /// IO error while reading configuration.
    #[error("IO error reading configuration: {0}")]
    IoError(String),
}

/// How to resolve a destination name that is already taken.
///
/// Overwriting is deliberately not an option.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Append or bump a numeric suffix until the name is free.
    #[default]
    Rename,
    /// Leave the source file where it is.
    Skip,
}

/// Top-level configuration file contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SortConfig {
    #[serde(default)]
    pub sort: SortRules,
    #[serde(default)]
    pub filters: FilterRules,
}

/// The `[sort]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortRules {
    /// Folder names that are never entered nor removed, wherever they appear.
    #[serde(default)]
    pub exclude_dirs: Vec<String>,

    /// Move files of unknown type into `unknown/` instead of leaving them.
    #[serde(default)]
    pub sort_unknown: bool,

    /// Unpack recognized archives instead of moving them.
    #[serde(default = "default_unpack_archives")]
    pub unpack_archives: bool,

    /// Collision handling for destination names.
    #[serde(default)]
    pub on_conflict: ConflictPolicy,
}

fn default_unpack_archives() -> bool {
    true
}

impl Default for SortRules {
    fn default() -> Self {
        Self {
            exclude_dirs: Vec::new(),
            sort_unknown: false,
            unpack_archives: default_unpack_archives(),
            on_conflict: ConflictPolicy::default(),
        }
    }
}

/// The `[filters]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRules {
    /// Whether hidden files (starting with ".") are sorted. Defaults to true.
    #[serde(default = "default_enable_hidden_files")]
    pub enable_hidden_files: bool,

    /// Rules for leaving files alone.
    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Whitelist that overrides exclude rules.
    #[serde(default)]
    pub include: IncludeRules,
}

fn default_enable_hidden_files() -> bool {
    true
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            enable_hidden_files: default_enable_hidden_files(),
            exclude: ExcludeRules::default(),
            include: IncludeRules::default(),
        }
    }
}

/// Rules for leaving files out of a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact filenames (e.g. "Thumbs.db", "desktop.ini").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns matched against the path relative to the root.
    #[serde(default)]
    pub patterns: Vec<String>,

    /// File extensions, case-insensitive, without the dot.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regex patterns matched against the file name.
    #[serde(default)]
    pub regex: Vec<String>,
}

/// Rules that bring files back in despite exclude rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeRules {
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl SortConfig {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Lookup order:
    /// 1. `config_path`, if provided (must exist)
    /// 2. `.clean-folder.toml` in the current directory
    /// 3. `~/.config/clean-folder/config.toml`
    /// 4. Built-in defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("clean-folder")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        debug!(path = %path.display(), "Loading configuration");
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }
}

/// Filter rules compiled once per run.
///
/// The default lets every file through.
#[derive(Debug)]
pub struct CompiledFilters {
    enable_hidden_files: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
}

impl Default for CompiledFilters {
    fn default() -> Self {
        Self {
            enable_hidden_files: default_enable_hidden_files(),
            exclude_filenames: HashSet::new(),
            exclude_extensions: HashSet::new(),
            exclude_patterns: Vec::new(),
            exclude_regexes: Vec::new(),
            include_patterns: Vec::new(),
        }
    }
}

fn compile_globs(patterns: &[String]) -> Result<Vec<Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
        })
        .collect()
}

impl CompiledFilters {
    /// Compile filter rules, validating every glob and regex.
    pub fn new(rules: &FilterRules) -> Result<Self, ConfigError> {
        let exclude_regexes = rules
            .exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            enable_hidden_files: rules.enable_hidden_files,
            exclude_filenames: rules.exclude.filenames.iter().cloned().collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            exclude_patterns: compile_globs(&rules.exclude.patterns)?,
            exclude_regexes,
            include_patterns: compile_globs(&rules.include.patterns)?,
        })
    }

    /// Check whether a file may be sorted.
    ///
    /// `relative_path` is the path below the sorted root. Include patterns win
    /// over everything; otherwise hidden files, exact names, extensions, globs
    /// and regexes each exclude.
    pub fn should_include(&self, relative_path: &Path) -> bool {
        let file_name = relative_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if self
            .include_patterns
            .iter()
            .any(|pattern| pattern.matches_path(relative_path))
        {
            return true;
        }

        if !self.enable_hidden_files && file_name.starts_with('.') {
            return false;
        }

        if self.exclude_filenames.contains(file_name.as_ref()) {
            return false;
        }

        if let Some(ext) = relative_path.extension()
            && self
                .exclude_extensions
                .contains(&ext.to_string_lossy().to_lowercase())
        {
            return false;
        }

        if self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches_path(relative_path))
        {
            return false;
        }

        !self
            .exclude_regexes
            .iter()
            .any(|regex| regex.is_match(&file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(rules: FilterRules) -> CompiledFilters {
        CompiledFilters::new(&rules).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = SortConfig::default();
        assert!(config.sort.exclude_dirs.is_empty());
        assert!(!config.sort.sort_unknown);
        assert!(config.sort.unpack_archives);
        assert_eq!(config.sort.on_conflict, ConflictPolicy::Rename);
        assert!(config.filters.enable_hidden_files);
    }

    #[test]
    fn test_parse_full_config() {
        let config = SortConfig::from_toml(
            r#"
            [sort]
            exclude_dirs = [".git", "keep"]
            sort_unknown = true
            unpack_archives = false
            on_conflict = "skip"

            [filters]
            enable_hidden_files = false

            [filters.exclude]
            extensions = ["tmp"]
            "#,
        )
        .unwrap();

        assert_eq!(config.sort.exclude_dirs, vec![".git", "keep"]);
        assert!(config.sort.sort_unknown);
        assert!(!config.sort.unpack_archives);
        assert_eq!(config.sort.on_conflict, ConflictPolicy::Skip);
        assert!(!config.filters.enable_hidden_files);
        assert_eq!(config.filters.exclude.extensions, vec!["tmp"]);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = SortConfig::from_toml("[sort]\nsort_unknown = true\n").unwrap();
        assert!(config.sort.unpack_archives);
        assert_eq!(config.sort.on_conflict, ConflictPolicy::Rename);
        assert!(config.filters.enable_hidden_files);

        let config = SortConfig::from_toml("[filters.exclude]\nextensions = [\"tmp\"]\n").unwrap();
        assert!(config.filters.enable_hidden_files);
    }

    #[test]
    fn test_invalid_toml() {
        let result = SortConfig::from_toml("[sort\nexclude_dirs = 1");
        assert!(matches!(result, Err(ConfigError::ConfigInvalid(_))));
    }

    #[test]
    fn test_unknown_conflict_policy_rejected() {
        let result = SortConfig::from_toml("[sort]\non_conflict = \"overwrite\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_explicit_missing_file() {
        let result = SortConfig::load(Some(Path::new("/non/existent/config.toml")));
        assert!(matches!(result, Err(ConfigError::ConfigNotFound(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[sort]\nexclude_dirs = [\"photos\"]\n").unwrap();

        let config = SortConfig::load(Some(&path)).unwrap();
        assert_eq!(config.sort.exclude_dirs, vec!["photos"]);
    }

    #[test]
    fn test_hidden_files_included_by_default() {
        let filters = CompiledFilters::default();
        assert!(filters.should_include(Path::new(".photo.jpg")));
        assert!(filters.should_include(Path::new("sub/.notes.txt")));

        let filters = compile(FilterRules::default());
        assert!(filters.should_include(Path::new("sub/.notes.txt")));
    }

    #[test]
    fn test_hidden_files_can_be_excluded() {
        let filters = compile(FilterRules {
            enable_hidden_files: false,
            ..Default::default()
        });
        assert!(!filters.should_include(Path::new(".DS_Store")));
        assert!(!filters.should_include(Path::new("sub/.hidden.txt")));
        assert!(filters.should_include(Path::new("visible.txt")));
    }

    #[test]
    fn test_exclude_filename_and_extension() {
        let filters = compile(FilterRules {
            enable_hidden_files: true,
            exclude: ExcludeRules {
                filenames: vec!["Thumbs.db".to_string()],
                extensions: vec![".TMP".to_string()],
                ..Default::default()
            },
            include: IncludeRules::default(),
        });

        assert!(!filters.should_include(Path::new("Thumbs.db")));
        assert!(!filters.should_include(Path::new("a/b/draft.tmp")));
        assert!(!filters.should_include(Path::new("draft.Tmp")));
        assert!(filters.should_include(Path::new("draft.txt")));
    }

    #[test]
    fn test_exclude_glob_respects_directory_boundaries() {
        let filters = compile(FilterRules {
            exclude: ExcludeRules {
                patterns: vec!["**/downloads/**".to_string(), "*.part".to_string()],
                ..Default::default()
            },
            ..Default::default()
        });

        assert!(!filters.should_include(Path::new("downloads/movie.mkv")));
        assert!(!filters.should_include(Path::new("a/downloads/movie.mkv")));
        assert!(filters.should_include(Path::new("my_downloads/movie.mkv")));
        assert!(!filters.should_include(Path::new("movie.part")));
    }

    #[test]
    fn test_exclude_regex() {
        let filters = compile(FilterRules {
            exclude: ExcludeRules {
                regex: vec![r"^~\$".to_string()],
                ..Default::default()
            },
            ..Default::default()
        });

        assert!(!filters.should_include(Path::new("~$report.docx")));
        assert!(filters.should_include(Path::new("report.docx")));
    }

    #[test]
    fn test_include_overrides_exclude() {
        let filters = compile(FilterRules {
            enable_hidden_files: false,
            include: IncludeRules {
                patterns: vec![".important".to_string()],
            },
            ..Default::default()
        });

        assert!(filters.should_include(Path::new(".important")));
        assert!(!filters.should_include(Path::new(".other")));
    }

    #[test]
    fn test_invalid_patterns_return_errors() {
        let bad_regex = FilterRules {
            exclude: ExcludeRules {
                regex: vec!["[invalid(".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            CompiledFilters::new(&bad_regex),
            Err(ConfigError::InvalidRegexPattern { .. })
        ));

        let bad_glob = FilterRules {
            exclude: ExcludeRules {
                patterns: vec!["[invalid".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            CompiledFilters::new(&bad_glob),
            Err(ConfigError::InvalidGlobPattern(_))
        ));
    }
}
