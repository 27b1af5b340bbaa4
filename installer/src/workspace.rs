//! Temporary staging workspace for one ensure call.
//!
//! The workspace is a uniquely named directory holding a `download/`
//! subdirectory for the fetched archive and an `unzip/` subdirectory for its
//! contents. Dropping the workspace removes the whole tree, so it never
//! outlives the call that created it, including when that call unwinds.

use camino::Utf8Path;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Prefix for workspace directory names.
pub const WORKSPACE_PREFIX: &str = "wintundll-download-";

/// File name of the downloaded archive inside `download/`.
const ARCHIVE_FILE_NAME: &str = "wintun.zip";

/// A self-cleaning staging directory.
#[derive(Debug)]
pub struct Workspace {
    root: TempDir,
    download_dir: PathBuf,
    unzip_dir: PathBuf,
}

impl Workspace {
    /// Create a workspace under `parent`, or the system temp directory when
    /// `parent` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or either subdirectory cannot be
    /// created. Anything created before the failure is removed.
    pub fn create(parent: Option<&Utf8Path>) -> io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKSPACE_PREFIX);
        let root = match parent {
            Some(dir) => builder.tempdir_in(dir)?,
            None => builder.tempdir()?,
        };

        let download_dir = root.path().join("download");
        std::fs::create_dir(&download_dir)?;
        let unzip_dir = root.path().join("unzip");
        std::fs::create_dir(&unzip_dir)?;

        log::debug!("created workspace at {}", root.path().display());
        Ok(Self {
            root,
            download_dir,
            unzip_dir,
        })
    }

    /// Root of the workspace tree.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Path the archive is downloaded to.
    #[must_use]
    pub fn archive_path(&self) -> PathBuf {
        self.download_dir.join(ARCHIVE_FILE_NAME)
    }

    /// Directory the archive is extracted into.
    #[must_use]
    pub fn unzip_dir(&self) -> &Path {
        &self.unzip_dir
    }

    /// Remove the workspace now, logging rather than failing if removal
    /// does not succeed.
    pub fn close(self) {
        let path = self.root.path().to_path_buf();
        if let Err(err) = self.root.close() {
            log::warn!("failed to remove workspace {}: {err}", path.display());
        }
    }
}
