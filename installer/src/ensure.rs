//! Ensure orchestrator.
//!
//! Runs the ensure sequence: check administrator privilege, try to load the
//! installed library, and only if that fails download the release archive,
//! unzip it, move the library into place and load it again.
//!
//! The download, extraction and move run as one unit inside a
//! [`Workspace`] that is removed before the call returns, whatever the
//! outcome.

use crate::artefact::download::{ArchiveDownloader, HttpDownloader};
use crate::artefact::extraction::{ArchiveExtractor, ZipExtractor};
use crate::config::{EnsureConfig, EnsureOption};
use crate::error::{EnsureError, Result};
use crate::install::move_into;
use crate::loader::{LibraryLoader, SystemLibraryLoader};
use crate::platform::Platform;
use crate::privilege::{PrivilegeChecker, TokenPrivilegeChecker};
use crate::workspace::Workspace;

/// How a successful ensure call was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    /// The library already loaded; nothing was downloaded.
    AlreadyLoadable,
    /// The library was downloaded, installed and verified.
    Installed,
}

/// Ensure the library is installed and loadable, using the production
/// privilege check, loader, HTTP client and extractor.
///
/// # Errors
///
/// Returns [`EnsureError::PlatformUnsupported`] on any host other than
/// Windows, without doing anything else. Otherwise see [`ensure_with`].
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use wintundll_installer::config::with_download_timeout;
/// use wintundll_installer::ensure::ensure;
///
/// ensure([with_download_timeout(Duration::from_secs(30))])?;
/// # Ok::<(), wintundll_installer::error::EnsureError>(())
/// ```
pub fn ensure<I>(options: I) -> Result<EnsureOutcome>
where
    I: IntoIterator<Item = EnsureOption>,
{
    ensure_on(Platform::current(), options)
}

/// Dispatch on an explicit platform.
///
/// # Errors
///
/// See [`ensure`].
pub fn ensure_on<I>(platform: Platform, options: I) -> Result<EnsureOutcome>
where
    I: IntoIterator<Item = EnsureOption>,
{
    match platform {
        Platform::Unsupported { os } => Err(EnsureError::PlatformUnsupported { os: os.to_owned() }),
        Platform::Supported => {
            let config = EnsureConfig::resolve(options);
            ensure_with(
                &config,
                &TokenPrivilegeChecker,
                &SystemLibraryLoader,
                &HttpDownloader::new(),
                &ZipExtractor,
            )
        }
    }
}

/// Testable ensure sequence with injected collaborators.
///
/// The production entry point [`ensure`] delegates here with real
/// implementations; tests inject mocks.
///
/// # Errors
///
/// - [`EnsureError::PrivilegeCheckFailed`] if the privilege query fails.
/// - [`EnsureError::NotAdministrator`] if the process is not elevated.
/// - [`EnsureError::WorkspaceCreationFailed`],
///   [`EnsureError::DownloadFailed`], [`EnsureError::ExtractionFailed`] or
///   [`EnsureError::InstallMoveFailed`] if the corresponding step fails.
/// - [`EnsureError::PostInstallLoadFailed`] if the fresh install still does
///   not load.
pub fn ensure_with(
    config: &EnsureConfig,
    privilege: &dyn PrivilegeChecker,
    loader: &dyn LibraryLoader,
    downloader: &dyn ArchiveDownloader,
    extractor: &dyn ArchiveExtractor,
) -> Result<EnsureOutcome> {
    let admin = privilege
        .is_administrator()
        .map_err(|source| EnsureError::PrivilegeCheckFailed { source })?;
    if !admin {
        return Err(EnsureError::NotAdministrator);
    }

    let destination = config.dll_path_to_ensure();
    match loader.load(destination) {
        Ok(()) => {
            log::debug!("{destination} already loads; nothing to do");
            return Ok(EnsureOutcome::AlreadyLoadable);
        }
        Err(err) => log::debug!("{destination} does not load yet: {err}"),
    }

    fetch_and_install(config, downloader, extractor)?;

    loader
        .load(destination)
        .map_err(|source| EnsureError::PostInstallLoadFailed {
            path: destination.to_owned(),
            source,
        })?;
    Ok(EnsureOutcome::Installed)
}

/// Download, unzip and move the library inside a fresh workspace.
fn fetch_and_install(
    config: &EnsureConfig,
    downloader: &dyn ArchiveDownloader,
    extractor: &dyn ArchiveExtractor,
) -> Result<()> {
    let workspace = Workspace::create(config.workspace_dir())
        .map_err(|source| EnsureError::WorkspaceCreationFailed { source })?;
    let outcome = run_steps(config, &workspace, downloader, extractor);
    workspace.close();
    outcome
}

fn run_steps(
    config: &EnsureConfig,
    workspace: &Workspace,
    downloader: &dyn ArchiveDownloader,
    extractor: &dyn ArchiveExtractor,
) -> Result<()> {
    let archive_path = workspace.archive_path();

    log::info!("downloading {}", config.download_url());
    downloader
        .download_archive(
            config.download_url(),
            &archive_path,
            config.download_timeout(),
        )
        .map_err(|source| EnsureError::DownloadFailed { source })?;

    log::debug!("unzipping {}", archive_path.display());
    extractor
        .extract(&archive_path, workspace.unzip_dir())
        .map_err(|source| EnsureError::ExtractionFailed { source })?;

    move_into(
        workspace.unzip_dir(),
        config.dll_path_in_unzipped_dir(),
        config.dll_path_to_ensure(),
    )
    .map_err(|source| EnsureError::InstallMoveFailed { source })
}

#[cfg(test)]
#[path = "ensure_tests.rs"]
mod tests;
