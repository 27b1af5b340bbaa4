//! Relocation of the extracted library onto its destination.
//!
//! The destination is only ever replaced by a single rename, so readers of
//! the destination see either the previous file or the complete new one.

use camino::{Utf8Path, Utf8PathBuf};
use std::path::Path;
use thiserror::Error;

/// Errors arising from moving the library into place.
#[derive(Debug, Error)]
pub enum InstallError {
    /// The requested member does not exist in the extracted tree.
    #[error("{relative} not found in unzipped archive (wrong architecture?)")]
    SourceMissing {
        /// Member path relative to the extraction root.
        relative: Utf8PathBuf,
    },

    /// The OS refused the rename.
    #[error("failed to move file from ${{UNZIPPED_ROOT}}/{relative} to {destination}: {source}")]
    MoveRejected {
        /// Member path relative to the extraction root.
        relative: Utf8PathBuf,
        /// Destination path.
        destination: Utf8PathBuf,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },
}

/// Move `source_root/relative` onto `destination`, replacing any existing
/// file there.
///
/// The move is a plain rename; it fails across volumes rather than falling
/// back to a copy.
///
/// # Errors
///
/// Returns [`InstallError::SourceMissing`] if the member is absent and
/// [`InstallError::MoveRejected`] if the rename fails.
pub fn move_into(
    source_root: &Path,
    relative: &Utf8Path,
    destination: &Utf8Path,
) -> Result<(), InstallError> {
    let source = source_root.join(relative.as_std_path());
    if !source.is_file() {
        return Err(InstallError::SourceMissing {
            relative: relative.to_owned(),
        });
    }

    std::fs::rename(&source, destination.as_std_path()).map_err(|source_err| {
        InstallError::MoveRejected {
            relative: relative.to_owned(),
            destination: destination.to_owned(),
            source: source_err,
        }
    })?;

    log::info!("installed {relative} to {destination}");
    Ok(())
}
