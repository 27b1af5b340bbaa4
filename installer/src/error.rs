//! Error types for the ensure pipeline.
//!
//! Each variant names the phase that failed and carries the underlying cause
//! as its error source, so callers can report both the step and the reason.

use crate::artefact::download::DownloadError;
use crate::artefact::extraction::ExtractionError;
use crate::install::InstallError;
use crate::loader::LoadError;
use crate::privilege::PrivilegeError;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that terminate an `ensure` call.
#[derive(Debug, Error)]
pub enum EnsureError {
    /// The host operating system is not supported.
    #[error("this software is only compatible with windows (not {os})")]
    PlatformUnsupported {
        /// Name of the detected operating system.
        os: String,
    },

    /// The administrator membership query itself failed.
    #[error("failed to determine if the process is running as administrator: {source}")]
    PrivilegeCheckFailed {
        /// The underlying query failure.
        #[source]
        source: PrivilegeError,
    },

    /// The process does not hold administrator rights.
    #[error("executable is not running as administrator")]
    NotAdministrator,

    /// The temporary workspace could not be allocated.
    #[error("failed to create temporary workspace: {source}")]
    WorkspaceCreationFailed {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The archive could not be fetched.
    #[error("failed to download archive: {source}")]
    DownloadFailed {
        /// The underlying transport or status failure.
        #[source]
        source: DownloadError,
    },

    /// The downloaded archive could not be unpacked.
    #[error("failed to unzip the downloaded archive: {source}")]
    ExtractionFailed {
        /// The underlying extraction failure.
        #[source]
        source: ExtractionError,
    },

    /// The extracted library could not be moved into place.
    #[error("failed to install library: {source}")]
    InstallMoveFailed {
        /// The underlying move failure.
        #[source]
        source: InstallError,
    },

    /// The library still fails to load after a fresh install.
    #[error("still failed to load {path} after fresh download: {source}")]
    PostInstallLoadFailed {
        /// Destination path that was installed.
        path: Utf8PathBuf,
        /// The loader failure.
        #[source]
        source: LoadError,
    },
}

impl EnsureError {
    /// Short name of the phase that produced this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use wintundll_installer::error::EnsureError;
    ///
    /// assert_eq!(EnsureError::NotAdministrator.phase(), "privilege");
    /// ```
    #[must_use]
    pub const fn phase(&self) -> &'static str {
        match self {
            Self::PlatformUnsupported { .. } => "platform",
            Self::PrivilegeCheckFailed { .. } | Self::NotAdministrator => "privilege",
            Self::WorkspaceCreationFailed { .. } => "workspace",
            Self::DownloadFailed { .. } => "download",
            Self::ExtractionFailed { .. } => "extraction",
            Self::InstallMoveFailed { .. } => "install",
            Self::PostInstallLoadFailed { .. } => "load",
        }
    }
}

/// Result type alias using [`EnsureError`].
pub type Result<T> = std::result::Result<T, EnsureError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn platform_unsupported_names_the_os() {
        let err = EnsureError::PlatformUnsupported {
            os: "linux".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("windows"));
        assert!(msg.contains("linux"));
    }

    #[test]
    fn download_failed_preserves_source() {
        let err = EnsureError::DownloadFailed {
            source: DownloadError::Status {
                url: "https://example.test/wintun.zip".to_owned(),
                status: 404,
            },
        };
        assert!(err.to_string().contains("404"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn post_install_load_failure_names_destination() {
        let err = EnsureError::PostInstallLoadFailed {
            path: Utf8PathBuf::from(r"C:\Windows\System32\wintun.dll"),
            source: LoadError::new("bad image format"),
        };
        let msg = err.to_string();
        assert!(msg.contains("wintun.dll"));
        assert!(msg.contains("fresh download"));
        assert!(msg.contains("bad image format"));
    }

    #[rstest]
    #[case::not_admin(EnsureError::NotAdministrator, "privilege")]
    #[case::workspace(
        EnsureError::WorkspaceCreationFailed { source: std::io::Error::other("disk full") },
        "workspace"
    )]
    #[case::extraction(
        EnsureError::ExtractionFailed { source: ExtractionError::Io(std::io::Error::other("eof")) },
        "extraction"
    )]
    fn phase_identifies_failing_step(#[case] err: EnsureError, #[case] expected: &str) {
        assert_eq!(err.phase(), expected);
    }
}
