//! ePub archive validation, extraction and repackaging

use crate::error::{RepairError, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Root-level marker file declaring the archive's content type
pub const TYPE_MARKER: &str = "mimetype";

/// Expected marker content for an ePub container (byte-exact)
pub const EPUB_MIMETYPE: &str = "application/epub+zip";

/// One archive file plus its exclusively-owned extraction directory.
///
/// The extraction directory lives for exactly as long as the handle; it is
/// removed on drop, on every exit path of the pipeline.
#[derive(Debug)]
pub struct ArchiveHandle {
    archive_path: PathBuf,
    root: TempDir,
}

impl ArchiveHandle {
    fn create(archive_path: &Path) -> Result<Self> {
        Ok(Self {
            archive_path: archive_path.to_path_buf(),
            root: TempDir::new()?,
        })
    }

    /// Path of the archive file on disk
    #[must_use]
    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    /// Extraction root holding the archive's unpacked contents
    #[must_use]
    pub fn root(&self) -> &Path {
        self.root.path()
    }
}

/// Structural validation of candidate archives
pub struct ArchiveValidator;

impl ArchiveValidator {
    /// Validate `archive_path` and extract it to a fresh temporary root.
    ///
    /// Two checks run in order, short-circuiting on the first failure:
    /// 1. the file is a readable zip container;
    /// 2. the extracted root carries a byte-exact
    ///    `application/epub+zip` marker in its `mimetype` file.
    ///
    /// No further structural validation (OPF manifest, spine, ...) is
    /// performed.
    ///
    /// # Errors
    ///
    /// [`RepairError::NotAnArchive`], [`RepairError::MissingTypeMarker`]
    /// or [`RepairError::TypeMismatch`] for validation failures (these skip
    /// the archive without failing a batch); [`RepairError::Io`] for plain
    /// I/O failures.
    pub fn validate_and_extract(archive_path: &Path) -> Result<ArchiveHandle> {
        let file = File::open(archive_path)?;
        let mut archive = ZipArchive::new(BufReader::new(file))
            .map_err(|e| RepairError::not_an_archive(archive_path, &e))?;

        let handle = ArchiveHandle::create(archive_path)?;
        Self::extract_entries(&mut archive, archive_path, handle.root())?;
        Self::check_type_marker(archive_path, handle.root())?;

        Ok(handle)
    }

    fn extract_entries<R: Read + std::io::Seek>(
        archive: &mut ZipArchive<R>,
        archive_path: &Path,
        root: &Path,
    ) -> Result<()> {
        for index in 0..archive.len() {
            let mut entry = archive
                .by_index(index)
                .map_err(|e| RepairError::not_an_archive(archive_path, &e))?;

            // reject entries escaping the extraction root (zip slip)
            let Some(rel_path) = entry.enclosed_name() else {
                return Err(RepairError::NotAnArchive {
                    path: archive_path.to_path_buf(),
                    reason: format!("unsafe entry path '{}'", entry.name()),
                });
            };
            let dest = root.join(rel_path);

            if entry.is_dir() {
                std::fs::create_dir_all(&dest)?;
            } else {
                if let Some(parent) = dest.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                let mut out = File::create(&dest)?;
                std::io::copy(&mut entry, &mut out)?;
            }
        }
        Ok(())
    }

    fn check_type_marker(archive_path: &Path, root: &Path) -> Result<()> {
        let marker = root.join(TYPE_MARKER);
        let content = match std::fs::read(&marker) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RepairError::MissingTypeMarker {
                    path: archive_path.to_path_buf(),
                });
            },
            Err(e) => return Err(e.into()),
        };

        if content != EPUB_MIMETYPE.as_bytes() {
            return Err(RepairError::TypeMismatch {
                path: archive_path.to_path_buf(),
                found: String::from_utf8_lossy(&content).into_owned(),
            });
        }
        Ok(())
    }
}

/// Conditional full rewrite of an archive from its extraction root
pub struct ArchiveRepacker;

impl ArchiveRepacker {
    /// Rebuild the archive at `archive_path` from every file under `root`.
    ///
    /// The rebuilt archive is staged as a sibling temporary file and
    /// atomically renamed over the original only after the full rewrite
    /// succeeds, so a mid-write failure never leaves a partially written
    /// archive behind.
    ///
    /// Entries are written in deterministic (lexicographic) order with
    /// deflate compression, except the `mimetype` marker which is written
    /// first and stored uncompressed per the ePub container convention.
    ///
    /// Callers decide *whether* to repack; this function always rewrites.
    ///
    /// # Errors
    ///
    /// Returns [`RepairError::Repack`] on any failure; the original
    /// archive is left untouched.
    pub fn repack(root: &Path, archive_path: &Path) -> Result<()> {
        let parent = archive_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let staged = NamedTempFile::new_in(parent)
            .map_err(|e| RepairError::repack(archive_path, format!("cannot stage rewrite: {e}")))?;

        Self::write_archive(root, archive_path, staged.as_file())?;

        staged
            .persist(archive_path)
            .map_err(|e| RepairError::repack(archive_path, e.to_string()))?;
        Ok(())
    }

    fn write_archive(root: &Path, archive_path: &Path, out: &File) -> Result<()> {
        let zip_err = |e: zip::result::ZipError| RepairError::repack(archive_path, e.to_string());
        let io_err = |e: std::io::Error| RepairError::repack(archive_path, e.to_string());

        let mut writer = ZipWriter::new(out);
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let deflated =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let marker = root.join(TYPE_MARKER);
        if marker.is_file() {
            writer.start_file(TYPE_MARKER, stored).map_err(zip_err)?;
            let mut file = File::open(&marker).map_err(io_err)?;
            std::io::copy(&mut file, &mut writer).map_err(io_err)?;
        }

        for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| RepairError::repack(archive_path, e.to_string()))?;
            let rel_path = entry
                .path()
                .strip_prefix(root)
                .map_err(|e| RepairError::repack(archive_path, e.to_string()))?;
            let name = entry_name(rel_path);
            if name == TYPE_MARKER {
                continue;
            }

            if entry.file_type().is_dir() {
                writer.add_directory(name, deflated).map_err(zip_err)?;
            } else {
                writer.start_file(name, deflated).map_err(zip_err)?;
                let mut file = File::open(entry.path()).map_err(io_err)?;
                std::io::copy(&mut file, &mut writer).map_err(io_err)?;
            }
        }

        let inner = writer.finish().map_err(zip_err)?;
        inner.sync_all().map_err(io_err)?;
        Ok(())
    }
}

/// Zip entry name for a relative filesystem path (forward slashes)
fn entry_name(rel_path: &Path) -> String {
    rel_path
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
