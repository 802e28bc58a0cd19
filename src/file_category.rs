//! File categorization by extension.
//!
//! Every file extension maps to exactly one [`Category`] through a fixed
//! table. Anything the table does not list lands in [`Category::Unknown`].
//!
//! # Examples
//!
//! ```
//! use clean_folder::file_category::{Category, classify};
//!
//! assert_eq!(classify("png"), Category::Image);
//! assert_eq!(classify("MP3"), Category::Audio);
//! assert_eq!(classify("xyz"), Category::Unknown);
//! ```

use serde::Serialize;

/// Represents a broad file category.
///
/// Each category owns a destination folder directly under the sorted root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Image files (PNG, JPG, SVG, etc.)
    Image,
    /// Video files (MP4, MKV, AVI, etc.)
    Video,
    /// Document files (PDF, DOCX, TXT, etc.)
    Document,
    /// Audio files (MP3, OGG, FLAC, etc.)
    Audio,
    /// Archive files (ZIP, TAR, GZ)
    Archive,
    /// Files whose extension is not in the table
    Unknown,
}

impl Category {
    /// All categories, in the order summaries list them.
    pub const ALL: [Category; 6] = [
        Category::Image,
        Category::Video,
        Category::Document,
        Category::Audio,
        Category::Archive,
        Category::Unknown,
    ];

    /// Returns the destination folder name for this category.
    ///
    /// # Examples
    ///
    /// ```
    /// use clean_folder::file_category::Category;
    ///
    /// assert_eq!(Category::Image.dir_name(), "images");
    /// assert_eq!(Category::Audio.dir_name(), "audio");
    /// assert_eq!(Category::Unknown.dir_name(), "unknown");
    /// ```
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Image => "images",
            Category::Video => "video",
            Category::Document => "documents",
            Category::Audio => "audio",
            Category::Archive => "archives",
            Category::Unknown => "unknown",
        }
    }

    /// Returns the label used when printing the contents of this category.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Image => "Photo",
            Category::Video => "Video",
            Category::Document => "Documents",
            Category::Audio => "Music",
            Category::Archive => "Archives",
            Category::Unknown => "Unknown",
        }
    }
}

/// Maps a file extension to its category.
///
/// The lookup ignores ASCII case and a leading dot, and never fails:
/// extensions outside the table (including the empty one) are
/// [`Category::Unknown`].
pub fn classify(extension: &str) -> Category {
    let ext = extension.trim_start_matches('.').to_ascii_lowercase();
    match ext.as_str() {
        "jpeg" | "png" | "jpg" | "svg" | "gif" | "bmp" | "webp" | "heic" => Category::Image,
        "avi" | "mp4" | "mov" | "mkv" | "webm" | "wmv" => Category::Video,
        "doc" | "docx" | "txt" | "pdf" | "xlsx" | "pptx" | "ppt" | "djvu" | "odt" | "rtf"
        | "csv" | "md" => Category::Document,
        "mp3" | "ogg" | "wav" | "amr" | "flac" | "m4a" => Category::Audio,
        "zip" | "gz" | "tar" | "tgz" => Category::Archive,
        _ => Category::Unknown,
    }
}

/// Returns true if `name` is one of the category destination folder names.
pub fn is_category_dir_name(name: &str) -> bool {
    Category::ALL.iter().any(|c| c.dir_name() == name)
}
