//! Resolved settings for one ensure call.
//!
//! [`EnsureConfig`] is built once from defaults plus an ordered list of
//! [`EnsureOption`] overrides and is never mutated afterwards.

use crate::platform::{host_arch, normalize_arch};
use camino::{Utf8Path, Utf8PathBuf};
use std::time::Duration;

/// Pinned wintun release archive.
pub const DEFAULT_DOWNLOAD_URL: &str = "https://www.wintun.net/builds/wintun-0.14.1.zip";

/// Network timeout applied to the archive download.
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(5);

/// Location where dependents expect the library to be loadable.
pub const DEFAULT_DLL_PATH_TO_ENSURE: &str = r"C:\Windows\System32\wintun.dll";

/// One override applied on top of the default configuration.
///
/// Options are applied in the order supplied; a later option replaces an
/// earlier one for the same field. Values are not validated here; an empty
/// URL or zero timeout simply fails at download time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnsureOption {
    /// Replace the archive URL.
    DownloadUrl(String),
    /// Replace the download timeout.
    DownloadTimeout(Duration),
    /// Replace the library path relative to the unpacked archive root.
    DllPathInUnzippedDir(Utf8PathBuf),
    /// Replace the absolute path the library is installed to.
    DllPathToEnsure(Utf8PathBuf),
    /// Create the temporary workspace under this directory instead of the
    /// system temp directory.
    WorkspaceDir(Utf8PathBuf),
}

/// Override the download URL.
#[must_use]
pub fn with_download_url(url: impl Into<String>) -> EnsureOption {
    EnsureOption::DownloadUrl(url.into())
}

/// Override the download timeout.
#[must_use]
pub const fn with_download_timeout(timeout: Duration) -> EnsureOption {
    EnsureOption::DownloadTimeout(timeout)
}

/// Override the location of the library inside the unpacked archive.
#[must_use]
pub fn with_dll_path_in_unzipped_dir(path: impl Into<Utf8PathBuf>) -> EnsureOption {
    EnsureOption::DllPathInUnzippedDir(path.into())
}

/// Override the location where the library is ensured.
#[must_use]
pub fn with_dll_path_to_ensure(path: impl Into<Utf8PathBuf>) -> EnsureOption {
    EnsureOption::DllPathToEnsure(path.into())
}

/// Override the parent directory of the temporary workspace.
#[must_use]
pub fn with_workspace_dir(path: impl Into<Utf8PathBuf>) -> EnsureOption {
    EnsureOption::WorkspaceDir(path.into())
}

/// Immutable settings for one ensure call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsureConfig {
    download_url: String,
    download_timeout: Duration,
    dll_path_in_unzipped_dir: Utf8PathBuf,
    dll_path_to_ensure: Utf8PathBuf,
    workspace_dir: Option<Utf8PathBuf>,
}

impl EnsureConfig {
    /// Resolve configuration for the host architecture.
    #[must_use]
    pub fn resolve<I>(options: I) -> Self
    where
        I: IntoIterator<Item = EnsureOption>,
    {
        Self::resolve_for_arch(host_arch(), options)
    }

    /// Resolve configuration for an explicit architecture identifier.
    ///
    /// # Examples
    ///
    /// ```
    /// use wintundll_installer::config::{EnsureConfig, with_download_url};
    ///
    /// let config = EnsureConfig::resolve_for_arch(
    ///     "386",
    ///     [with_download_url("https://mirror.example/wintun.zip")],
    /// );
    /// assert_eq!(config.dll_path_in_unzipped_dir(), "wintun/bin/x86/wintun.dll");
    /// assert_eq!(config.download_url(), "https://mirror.example/wintun.zip");
    /// ```
    #[must_use]
    pub fn resolve_for_arch<I>(arch: &str, options: I) -> Self
    where
        I: IntoIterator<Item = EnsureOption>,
    {
        options
            .into_iter()
            .fold(Self::defaults_for_arch(arch), Self::apply)
    }

    /// Default configuration for an architecture identifier.
    #[must_use]
    pub fn defaults_for_arch(arch: &str) -> Self {
        Self {
            download_url: DEFAULT_DOWNLOAD_URL.to_owned(),
            download_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
            dll_path_in_unzipped_dir: default_dll_path_in_unzipped_dir(arch),
            dll_path_to_ensure: Utf8PathBuf::from(DEFAULT_DLL_PATH_TO_ENSURE),
            workspace_dir: None,
        }
    }

    fn apply(self, option: EnsureOption) -> Self {
        match option {
            EnsureOption::DownloadUrl(download_url) => Self {
                download_url,
                ..self
            },
            EnsureOption::DownloadTimeout(download_timeout) => Self {
                download_timeout,
                ..self
            },
            EnsureOption::DllPathInUnzippedDir(dll_path_in_unzipped_dir) => Self {
                dll_path_in_unzipped_dir,
                ..self
            },
            EnsureOption::DllPathToEnsure(dll_path_to_ensure) => Self {
                dll_path_to_ensure,
                ..self
            },
            EnsureOption::WorkspaceDir(dir) => Self {
                workspace_dir: Some(dir),
                ..self
            },
        }
    }

    /// URL of the release archive.
    #[must_use]
    pub fn download_url(&self) -> &str {
        &self.download_url
    }

    /// Timeout applied to the archive download.
    #[must_use]
    pub const fn download_timeout(&self) -> Duration {
        self.download_timeout
    }

    /// Library path relative to the unpacked archive root.
    #[must_use]
    pub fn dll_path_in_unzipped_dir(&self) -> &Utf8Path {
        &self.dll_path_in_unzipped_dir
    }

    /// Absolute path where the library must be loadable.
    #[must_use]
    pub fn dll_path_to_ensure(&self) -> &Utf8Path {
        &self.dll_path_to_ensure
    }

    /// Parent directory for the temporary workspace, if overridden.
    #[must_use]
    pub fn workspace_dir(&self) -> Option<&Utf8Path> {
        self.workspace_dir.as_deref()
    }
}

/// Archive-relative library path for an architecture identifier.
fn default_dll_path_in_unzipped_dir(arch: &str) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("wintun/bin/{}/wintun.dll", normalize_arch(arch)))
}
