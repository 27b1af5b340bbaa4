//! Shared library load probe.
//!
//! Loading the library is the only reliable signal that the installed file
//! is usable: presence alone says nothing about architecture or integrity.

use camino::Utf8Path;
use thiserror::Error;

/// Trait for probing whether a library loads, enabling test mocking.
#[cfg_attr(test, mockall::automock)]
pub trait LibraryLoader {
    /// Try to load the library at `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the OS loader rejects the file or the file
    /// does not exist.
    fn load(&self, path: &Utf8Path) -> Result<(), LoadError>;
}

/// The OS loader rejected a library.
#[derive(Debug, Error)]
#[error("failed to load library: {reason}")]
pub struct LoadError {
    reason: String,
}

impl LoadError {
    /// Build a load error from a description.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Description of why the load failed.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl From<libloading::Error> for LoadError {
    fn from(err: libloading::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Production loader backed by `libloading`.
///
/// The handle is released as soon as the probe succeeds; dependents load
/// the library themselves.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLibraryLoader;

impl LibraryLoader for SystemLibraryLoader {
    fn load(&self, path: &Utf8Path) -> Result<(), LoadError> {
        // SAFETY: loading runs the library's initialisation routines. The
        // target is the library this crate exists to install, and it is
        // unloaded immediately without resolving any symbols.
        let library = unsafe { libloading::Library::new(path.as_std_path()) }?;
        library.close()?;
        Ok(())
    }
}
