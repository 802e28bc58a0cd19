//! Archive detection and extraction.
//!
//! The format is taken from the file content, not the extension, so a
//! renamed or truncated archive is reported instead of half-extracted.
//! Entries whose paths would land outside the target folder are skipped.

use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use tracing::{debug, warn};
use zip::ZipArchive;

use crate::error::{CleanError, Result};
use crate::normalizer::normalize;

/// Bytes read from the start of a file to sniff its format.
const SNIFF_LEN: u64 = 1024;

/// Supported archive formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    Tar,
    TarGz,
    /// A single gzip-compressed file.
    Gzip,
}

fn read_head(reader: impl Read, archive: &Path) -> Result<Vec<u8>> {
    let mut head = Vec::with_capacity(SNIFF_LEN as usize);
    reader
        .take(SNIFF_LEN)
        .read_to_end(&mut head)
        .map_err(|e| CleanError::extraction(archive, e))?;
    Ok(head)
}

fn open(archive: &Path) -> Result<File> {
    File::open(archive).map_err(|e| CleanError::extraction(archive, e))
}

impl ArchiveKind {
    /// Sniffs the archive format of `archive`.
    pub fn detect(archive: &Path) -> Result<Self> {
        let head = read_head(open(archive)?, archive)?;

        if infer::archive::is_zip(&head) {
            return Ok(Self::Zip);
        }
        if infer::archive::is_gz(&head) {
            let inner = read_head(GzDecoder::new(open(archive)?), archive)?;
            return Ok(if infer::archive::is_tar(&inner) {
                Self::TarGz
            } else {
                Self::Gzip
            });
        }
        if infer::archive::is_tar(&head) {
            return Ok(Self::Tar);
        }

        Err(CleanError::extraction(archive, "not a recognized archive"))
    }
}

/// Strips archive extensions from a file name: `photos.tar.gz` → `photos`.
pub fn archive_stem(file_name: &str) -> &str {
    let lower = file_name.to_ascii_lowercase();
    for suffix in [".tar.gz", ".tgz", ".tar", ".zip", ".gz"] {
        if lower.ends_with(suffix) && lower.len() > suffix.len() {
            return &file_name[..file_name.len() - suffix.len()];
        }
    }
    file_name
}

/// Extracts `archive` into the existing folder `dest`.
///
/// Returns the number of files written.
pub fn extract(kind: ArchiveKind, archive: &Path, dest: &Path) -> Result<usize> {
    debug!(archive = %archive.display(), ?kind, "Extracting");
    match kind {
        ArchiveKind::Zip => extract_zip(archive, dest),
        ArchiveKind::Tar => unpack_tar(BufReader::new(open(archive)?), archive, dest),
        ArchiveKind::TarGz => unpack_tar(
            GzDecoder::new(BufReader::new(open(archive)?)),
            archive,
            dest,
        ),
        ArchiveKind::Gzip => extract_gzip(archive, dest),
    }
}

/// Reads `archive` end to end without writing anything.
///
/// Returns the number of files it holds.
pub fn inspect(kind: ArchiveKind, archive: &Path) -> Result<usize> {
    let fail = |e: &dyn std::fmt::Display| CleanError::extraction(archive, e);
    match kind {
        ArchiveKind::Zip => {
            let zip = ZipArchive::new(BufReader::new(open(archive)?)).map_err(|e| fail(&e))?;
            Ok(zip.file_names().filter(|name| !name.ends_with('/')).count())
        }
        ArchiveKind::Tar => count_tar(BufReader::new(open(archive)?), archive),
        ArchiveKind::TarGz => count_tar(GzDecoder::new(BufReader::new(open(archive)?)), archive),
        ArchiveKind::Gzip => {
            io::copy(&mut GzDecoder::new(BufReader::new(open(archive)?)), &mut io::sink())
                .map_err(|e| fail(&e))?;
            Ok(1)
        }
    }
}

fn extract_zip(archive: &Path, dest: &Path) -> Result<usize> {
    let fail = |e: &dyn std::fmt::Display| CleanError::extraction(archive, e);
    let mut zip = ZipArchive::new(BufReader::new(open(archive)?)).map_err(|e| fail(&e))?;
    let mut written = 0;

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).map_err(|e| fail(&e))?;
        let Some(relative) = entry.enclosed_name() else {
            warn!(entry = entry.name(), "Skipping archive entry outside the target folder");
            continue;
        };
        let out = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out).map_err(|e| fail(&e))?;
            continue;
        }
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent).map_err(|e| fail(&e))?;
        }
        let mut file = File::create(&out).map_err(|e| fail(&e))?;
        io::copy(&mut entry, &mut file).map_err(|e| fail(&e))?;
        written += 1;
    }

    Ok(written)
}

fn unpack_tar(reader: impl Read, archive: &Path, dest: &Path) -> Result<usize> {
    let fail = |e: &dyn std::fmt::Display| CleanError::extraction(archive, e);
    let mut tar = tar::Archive::new(reader);
    let mut written = 0;

    for entry in tar.entries().map_err(|e| fail(&e))? {
        let mut entry = entry.map_err(|e| fail(&e))?;
        let is_file = entry.header().entry_type().is_file();
        if !entry.unpack_in(dest).map_err(|e| fail(&e))? {
            warn!(
                entry = %entry.path().map(|p| p.display().to_string()).unwrap_or_default(),
                "Skipping archive entry outside the target folder"
            );
        } else if is_file {
            written += 1;
        }
    }

    Ok(written)
}

fn count_tar(reader: impl Read, archive: &Path) -> Result<usize> {
    let fail = |e: &dyn std::fmt::Display| CleanError::extraction(archive, e);
    let mut tar = tar::Archive::new(reader);
    let mut files = 0;

    for entry in tar.entries().map_err(|e| fail(&e))? {
        let mut entry = entry.map_err(|e| fail(&e))?;
        if entry.header().entry_type().is_file() {
            files += 1;
        }
        io::copy(&mut entry, &mut io::sink()).map_err(|e| fail(&e))?;
    }

    Ok(files)
}

fn extract_gzip(archive: &Path, dest: &Path) -> Result<usize> {
    let fail = |e: &dyn std::fmt::Display| CleanError::extraction(archive, e);
    let file_name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = archive_stem(&file_name);
    let inner_name = if stem.is_empty() || stem == file_name {
        "data".to_string()
    } else {
        normalize(stem)
    };

    let mut decoder = GzDecoder::new(BufReader::new(open(archive)?));
    let mut out = File::create(dest.join(inner_name)).map_err(|e| fail(&e))?;
    io::copy(&mut decoder, &mut out).map_err(|e| fail(&e))?;
    Ok(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, files: &[(&str, &str)]) {
        let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
        for (name, content) in files {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    fn tar_bytes(files: &[(&str, &str)]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (name, content) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, name, content.as_bytes())
                .unwrap();
        }
        builder.into_inner().unwrap()
    }

    fn gzip(bytes: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(bytes).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_archive_stem() {
        assert_eq!(archive_stem("photos.tar.gz"), "photos");
        assert_eq!(archive_stem("photos.TGZ"), "photos");
        assert_eq!(archive_stem("notes.txt.gz"), "notes.txt");
        assert_eq!(archive_stem("backup.zip"), "backup");
        assert_eq!(archive_stem(".zip"), ".zip");
    }

    #[test]
    fn test_detect_formats() {
        let temp = TempDir::new().unwrap();

        let zip_path = temp.path().join("a.zip");
        write_zip(&zip_path, &[("a.txt", "hello")]);
        assert_eq!(ArchiveKind::detect(&zip_path).unwrap(), ArchiveKind::Zip);

        let tar_path = temp.path().join("b.tar");
        fs::write(&tar_path, tar_bytes(&[("b.txt", "hello")])).unwrap();
        assert_eq!(ArchiveKind::detect(&tar_path).unwrap(), ArchiveKind::Tar);

        let tgz_path = temp.path().join("c.gz");
        fs::write(&tgz_path, gzip(&tar_bytes(&[("c.txt", "hello")]))).unwrap();
        assert_eq!(ArchiveKind::detect(&tgz_path).unwrap(), ArchiveKind::TarGz);

        let gz_path = temp.path().join("d.txt.gz");
        fs::write(&gz_path, gzip(b"plain text")).unwrap();
        assert_eq!(ArchiveKind::detect(&gz_path).unwrap(), ArchiveKind::Gzip);
    }

    #[test]
    fn test_detect_rejects_non_archive() {
        let temp = TempDir::new().unwrap();
        let fake = temp.path().join("fake.zip");
        fs::write(&fake, "definitely not a zip").unwrap();

        assert!(matches!(
            ArchiveKind::detect(&fake),
            Err(CleanError::Extraction { .. })
        ));
    }

    #[test]
    fn test_extract_zip_with_nested_folder() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("docs.zip");
        write_zip(&archive, &[("readme.txt", "top"), ("inner/notes.md", "nested")]);
        let dest = temp.path().join("out");
        fs::create_dir(&dest).unwrap();

        let written = extract(ArchiveKind::Zip, &archive, &dest).unwrap();

        assert_eq!(written, 2);
        assert_eq!(fs::read_to_string(dest.join("readme.txt")).unwrap(), "top");
        assert_eq!(
            fs::read_to_string(dest.join("inner/notes.md")).unwrap(),
            "nested"
        );
    }

    #[test]
    fn test_zip_entries_cannot_escape() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("evil.zip");
        write_zip(&archive, &[("../escaped.txt", "bad"), ("ok.txt", "good")]);
        let dest = temp.path().join("out");
        fs::create_dir(&dest).unwrap();

        let written = extract(ArchiveKind::Zip, &archive, &dest).unwrap();

        assert_eq!(written, 1);
        assert!(dest.join("ok.txt").exists());
        assert!(!temp.path().join("escaped.txt").exists());
    }

    #[test]
    fn test_extract_tar_gz() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("music.tar.gz");
        fs::write(
            &archive,
            gzip(&tar_bytes(&[("a.mp3", "one"), ("album/b.mp3", "two")])),
        )
        .unwrap();
        let dest = temp.path().join("out");
        fs::create_dir(&dest).unwrap();

        let kind = ArchiveKind::detect(&archive).unwrap();
        assert_eq!(inspect(kind, &archive).unwrap(), 2);
        let written = extract(kind, &archive, &dest).unwrap();

        assert_eq!(written, 2);
        assert_eq!(fs::read_to_string(dest.join("album/b.mp3")).unwrap(), "two");
    }

    #[test]
    fn test_extract_plain_gzip() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("log.txt.gz");
        fs::write(&archive, gzip(b"line one\n")).unwrap();
        let dest = temp.path().join("out");
        fs::create_dir(&dest).unwrap();

        assert_eq!(extract(ArchiveKind::Gzip, &archive, &dest).unwrap(), 1);
        assert_eq!(fs::read_to_string(dest.join("log.txt")).unwrap(), "line one\n");
    }

    #[test]
    fn test_plain_gzip_inner_name_is_normalized() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("Фото мітинг.gz");
        fs::write(&archive, gzip(b"raw")).unwrap();
        let dest = temp.path().join("out");
        fs::create_dir(&dest).unwrap();

        extract(ArchiveKind::Gzip, &archive, &dest).unwrap();

        assert_eq!(fs::read_to_string(dest.join("Foto_miting")).unwrap(), "raw");
        assert!(!dest.join("Фото мітинг").exists());
    }

    #[test]
    fn test_truncated_zip_fails() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("broken.zip");
        fs::write(&archive, b"PK\x03\x04 truncated local header").unwrap();

        let kind = ArchiveKind::detect(&archive).unwrap();
        assert_eq!(kind, ArchiveKind::Zip);
        assert!(inspect(kind, &archive).is_err());
    }
}
