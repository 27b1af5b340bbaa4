//! ZIP archive extraction for the downloaded release.
//!
//! Unpacks every entry under a destination directory, keeping relative
//! paths and recorded file modes, with path traversal protection to prevent
//! zip-slip attacks.

use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};

/// Trait for extracting archives, enabling test mocking.
///
/// # Examples
///
/// ```
/// use wintundll_installer::artefact::extraction::ZipExtractor;
///
/// let extractor = ZipExtractor;
/// // Use extractor.extract(archive_path, dest_dir) in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ArchiveExtractor {
    /// Extract the archive at `archive_path` into `dest_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::PathTraversal`] if any entry attempts to
    /// escape the destination directory, [`ExtractionError::Zip`] if the
    /// archive is unreadable, and [`ExtractionError::Io`] on I/O failures.
    fn extract(&self, archive_path: &Path, dest_dir: &Path) -> Result<(), ExtractionError>;
}

/// Errors arising from archive extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// I/O error during extraction.
    #[error("extraction I/O error: {0}")]
    Io(#[from] io::Error),

    /// The archive could not be opened or an entry could not be read.
    #[error("invalid zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A path in the archive attempts to traverse outside the destination.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending path from the archive entry.
        path: String,
    },
}

/// Default extractor using the `zip` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipExtractor;

impl ArchiveExtractor for ZipExtractor {
    fn extract(&self, archive_path: &Path, dest_dir: &Path) -> Result<(), ExtractionError> {
        unzip(archive_path, dest_dir)
    }
}

/// Unpack `archive_path` into `dest_dir`.
///
/// Directory entries are created with their parents. File entries get their
/// parent directories created, their decompressed bytes written to a new
/// file, and (on Unix) their recorded mode applied. A failure part way
/// through leaves the entries written so far in place.
///
/// # Errors
///
/// See [`ArchiveExtractor::extract`].
pub fn unzip(archive_path: &Path, dest_dir: &Path) -> Result<(), ExtractionError> {
    let mut archive = zip::ZipArchive::new(File::open(archive_path)?)?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let entry_path = validate_entry_path(entry.name())?;
        let dest_path = dest_dir.join(&entry_path);

        if entry.is_dir() {
            fs::create_dir_all(&dest_path)?;
            continue;
        }

        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut out = File::create(&dest_path)?;
        io::copy(&mut entry, &mut out)?;
        drop(out);

        if let Some(mode) = entry.unix_mode() {
            apply_mode(&dest_path, mode)?;
        }
    }

    Ok(())
}

#[cfg(unix)]
fn apply_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o7777))
}

#[cfg(not(unix))]
fn apply_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}

/// Validate that an entry name stays inside the destination directory,
/// rejecting absolute paths and `..` components.
fn validate_entry_path(name: &str) -> Result<PathBuf, ExtractionError> {
    let path = Path::new(name);
    let escapes = path.components().any(|component| {
        matches!(
            component,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes {
        return Err(ExtractionError::PathTraversal {
            path: name.to_owned(),
        });
    }
    Ok(path.to_path_buf())
}
