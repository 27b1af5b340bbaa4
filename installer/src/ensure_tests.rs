//! Unit tests for the ensure orchestrator.

use super::*;
use crate::artefact::download::{DownloadError, MockArchiveDownloader};
use crate::artefact::extraction::{ExtractionError, MockArchiveExtractor};
use crate::config::{with_dll_path_to_ensure, with_download_url, with_workspace_dir};
use crate::loader::{LoadError, MockLibraryLoader};
use crate::privilege::{MockPrivilegeChecker, PrivilegeError};
use camino::{Utf8Path, Utf8PathBuf};
use rstest::{fixture, rstest};
use std::path::Path;

const MEMBER: &str = "wintun/bin/amd64/wintun.dll";
const DLL_BYTES: &[u8] = b"fresh wintun dll";

struct Sandbox {
    _temp: tempfile::TempDir,
    workspace_parent: Utf8PathBuf,
    destination: Utf8PathBuf,
}

impl Sandbox {
    fn config(&self) -> EnsureConfig {
        EnsureConfig::resolve_for_arch(
            "amd64",
            [
                with_download_url("https://example.test/wintun.zip"),
                with_dll_path_to_ensure(self.destination.clone()),
                with_workspace_dir(self.workspace_parent.clone()),
            ],
        )
    }

    fn workspace_parent_is_empty(&self) -> bool {
        std::fs::read_dir(&self.workspace_parent)
            .expect("read workspace parent")
            .next()
            .is_none()
    }
}

#[fixture]
fn sandbox() -> Sandbox {
    let temp = tempfile::tempdir().expect("temp dir");
    let root = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("UTF-8 path");
    let workspace_parent = root.join("tmp");
    std::fs::create_dir(&workspace_parent).expect("create workspace parent");
    Sandbox {
        _temp: temp,
        workspace_parent,
        destination: root.join("wintun.dll"),
    }
}

fn admin() -> MockPrivilegeChecker {
    let mut privilege = MockPrivilegeChecker::new();
    privilege.expect_is_administrator().returning(|| Ok(true));
    privilege
}

/// Loader that succeeds once the destination holds the expected bytes.
fn content_loader() -> MockLibraryLoader {
    let mut loader = MockLibraryLoader::new();
    loader
        .expect_load()
        .returning(|path: &Utf8Path| match std::fs::read(path) {
            Ok(bytes) if bytes == DLL_BYTES => Ok(()),
            Ok(_) => Err(LoadError::new("bad image format")),
            Err(err) => Err(LoadError::new(err.to_string())),
        });
    loader
}

fn writing_downloader() -> MockArchiveDownloader {
    let mut downloader = MockArchiveDownloader::new();
    downloader
        .expect_download_archive()
        .times(1)
        .returning(|_url, dest, _timeout| std::fs::write(dest, b"zip").map_err(DownloadError::Io));
    downloader
}

fn member_extractor(contents: &'static [u8]) -> MockArchiveExtractor {
    let mut extractor = MockArchiveExtractor::new();
    extractor.expect_extract().times(1).returning(move |archive, dest| {
        assert!(archive.exists(), "archive should be downloaded before extraction");
        let member = dest.join(MEMBER);
        std::fs::create_dir_all(member.parent().expect("member has parent"))
            .map_err(ExtractionError::Io)?;
        std::fs::write(member, contents).map_err(ExtractionError::Io)
    });
    extractor
}

#[test]
fn unsupported_platform_returns_incompatibility_error() {
    let err = ensure_on(Platform::Unsupported { os: "linux" }, [])
        .expect_err("linux is unsupported");
    assert!(matches!(err, EnsureError::PlatformUnsupported { ref os } if os == "linux"));
}

#[rstest]
fn non_administrator_fails_before_any_side_effect(sandbox: Sandbox) {
    let mut privilege = MockPrivilegeChecker::new();
    privilege.expect_is_administrator().returning(|| Ok(false));
    let mut loader = MockLibraryLoader::new();
    loader.expect_load().never();
    let mut downloader = MockArchiveDownloader::new();
    downloader.expect_download_archive().never();
    let extractor = MockArchiveExtractor::new();

    let err = ensure_with(&sandbox.config(), &privilege, &loader, &downloader, &extractor)
        .expect_err("non-admin must fail");

    assert!(matches!(err, EnsureError::NotAdministrator));
    assert!(sandbox.workspace_parent_is_empty());
    assert!(!sandbox.destination.exists());
}

#[rstest]
fn privilege_query_failure_is_fatal(sandbox: Sandbox) {
    let mut privilege = MockPrivilegeChecker::new();
    privilege.expect_is_administrator().returning(|| {
        Err(PrivilegeError::TokenMembership {
            reason: "access denied".to_owned(),
        })
    });
    let mut loader = MockLibraryLoader::new();
    loader.expect_load().never();
    let downloader = MockArchiveDownloader::new();
    let extractor = MockArchiveExtractor::new();

    let err = ensure_with(&sandbox.config(), &privilege, &loader, &downloader, &extractor)
        .expect_err("query failure must fail");

    assert!(matches!(err, EnsureError::PrivilegeCheckFailed { .. }));
    assert!(err.to_string().contains("access denied"));
    assert!(sandbox.workspace_parent_is_empty());
}

#[rstest]
fn loadable_library_skips_download(sandbox: Sandbox) {
    let mut loader = MockLibraryLoader::new();
    loader.expect_load().times(1).returning(|_| Ok(()));
    let mut downloader = MockArchiveDownloader::new();
    downloader.expect_download_archive().never();
    let mut extractor = MockArchiveExtractor::new();
    extractor.expect_extract().never();

    let outcome = ensure_with(&sandbox.config(), &admin(), &loader, &downloader, &extractor)
        .expect("already loadable");

    assert_eq!(outcome, EnsureOutcome::AlreadyLoadable);
    assert!(sandbox.workspace_parent_is_empty());
}

#[rstest]
fn missing_library_is_downloaded_and_installed(sandbox: Sandbox) {
    let outcome = ensure_with(
        &sandbox.config(),
        &admin(),
        &content_loader(),
        &writing_downloader(),
        &member_extractor(DLL_BYTES),
    )
    .expect("install succeeds");

    assert_eq!(outcome, EnsureOutcome::Installed);
    assert_eq!(
        std::fs::read(&sandbox.destination).expect("read destination"),
        DLL_BYTES
    );
    assert!(sandbox.workspace_parent_is_empty());
}

#[rstest]
fn download_uses_configured_url_and_timeout(sandbox: Sandbox) {
    let config = EnsureConfig::resolve_for_arch(
        "amd64",
        [
            with_download_url("https://mirror.example/wintun.zip"),
            crate::config::with_download_timeout(std::time::Duration::from_secs(42)),
            with_dll_path_to_ensure(sandbox.destination.clone()),
            with_workspace_dir(sandbox.workspace_parent.clone()),
        ],
    );
    let mut downloader = MockArchiveDownloader::new();
    downloader
        .expect_download_archive()
        .withf(|url, dest, timeout| {
            url == "https://mirror.example/wintun.zip"
                && dest.extension().is_some_and(|ext| ext == "zip")
                && timeout.as_secs() == 42
        })
        .times(1)
        .returning(|_, dest, _| std::fs::write(dest, b"zip").map_err(DownloadError::Io));

    ensure_with(
        &config,
        &admin(),
        &content_loader(),
        &downloader,
        &member_extractor(DLL_BYTES),
    )
    .expect("install succeeds");
}

#[rstest]
fn second_call_after_success_does_not_download(sandbox: Sandbox) {
    let config = sandbox.config();
    let privilege = admin();
    let loader = content_loader();
    let downloader = writing_downloader();
    let extractor = member_extractor(DLL_BYTES);

    let first = ensure_with(&config, &privilege, &loader, &downloader, &extractor)
        .expect("first call installs");
    let second = ensure_with(&config, &privilege, &loader, &downloader, &extractor)
        .expect("second call succeeds");

    assert_eq!(first, EnsureOutcome::Installed);
    assert_eq!(second, EnsureOutcome::AlreadyLoadable);
}

#[rstest]
fn download_failure_leaves_destination_untouched(sandbox: Sandbox) {
    std::fs::write(&sandbox.destination, b"previous install").expect("write previous");
    let mut loader = MockLibraryLoader::new();
    loader
        .expect_load()
        .times(1)
        .returning(|_| Err(LoadError::new("wrong architecture")));
    let mut downloader = MockArchiveDownloader::new();
    downloader.expect_download_archive().returning(|url, _, _| {
        Err(DownloadError::Status {
            url: url.to_owned(),
            status: 404,
        })
    });
    let mut extractor = MockArchiveExtractor::new();
    extractor.expect_extract().never();

    let err = ensure_with(&sandbox.config(), &admin(), &loader, &downloader, &extractor)
        .expect_err("404 must fail");

    assert!(matches!(
        err,
        EnsureError::DownloadFailed {
            source: DownloadError::Status { status: 404, .. }
        }
    ));
    assert_eq!(
        std::fs::read(&sandbox.destination).expect("read destination"),
        b"previous install"
    );
    assert!(sandbox.workspace_parent_is_empty());
}

#[rstest]
fn extraction_failure_cleans_workspace(sandbox: Sandbox) {
    let mut extractor = MockArchiveExtractor::new();
    extractor.expect_extract().returning(|_, _| {
        Err(ExtractionError::PathTraversal {
            path: "../evil.dll".to_owned(),
        })
    });

    let err = ensure_with(
        &sandbox.config(),
        &admin(),
        &content_loader(),
        &writing_downloader(),
        &extractor,
    )
    .expect_err("extraction must fail");

    assert!(matches!(err, EnsureError::ExtractionFailed { .. }));
    assert!(!sandbox.destination.exists());
    assert!(sandbox.workspace_parent_is_empty());
}

#[rstest]
fn missing_member_reports_install_failure(sandbox: Sandbox) {
    let mut extractor = MockArchiveExtractor::new();
    extractor.expect_extract().returning(|_, _| Ok(()));

    let err = ensure_with(
        &sandbox.config(),
        &admin(),
        &content_loader(),
        &writing_downloader(),
        &extractor,
    )
    .expect_err("absent member must fail");

    assert!(matches!(err, EnsureError::InstallMoveFailed { .. }));
    assert!(err.to_string().contains(MEMBER));
    assert!(sandbox.workspace_parent_is_empty());
}

#[rstest]
fn unloadable_fresh_install_is_reported(sandbox: Sandbox) {
    let err = ensure_with(
        &sandbox.config(),
        &admin(),
        &content_loader(),
        &writing_downloader(),
        &member_extractor(b"corrupt member"),
    )
    .expect_err("corrupt member must fail");

    match err {
        EnsureError::PostInstallLoadFailed { path, source } => {
            assert_eq!(path, sandbox.destination);
            assert!(source.reason().contains("bad image format"));
        }
        other => panic!("expected PostInstallLoadFailed, got {other:?}"),
    }
    assert!(sandbox.workspace_parent_is_empty());
}

#[rstest]
fn workspace_creation_failure_stops_before_download(sandbox: Sandbox) {
    let config = EnsureConfig::resolve_for_arch(
        "amd64",
        [
            with_dll_path_to_ensure(sandbox.destination.clone()),
            with_workspace_dir(sandbox.workspace_parent.join("missing")),
        ],
    );
    let mut loader = MockLibraryLoader::new();
    loader
        .expect_load()
        .returning(|_| Err(LoadError::new("not found")));
    let mut downloader = MockArchiveDownloader::new();
    downloader.expect_download_archive().never();
    let extractor = MockArchiveExtractor::new();

    let err = ensure_with(&config, &admin(), &loader, &downloader, &extractor)
        .expect_err("workspace creation must fail");

    assert!(matches!(err, EnsureError::WorkspaceCreationFailed { .. }));
}

/// Extractor that panics mid-extraction.
struct PanickingExtractor;

impl ArchiveExtractor for PanickingExtractor {
    #[expect(
        clippy::panic_in_result_fn,
        reason = "simulates an extractor that unwinds"
    )]
    fn extract(
        &self,
        _archive_path: &Path,
        dest_dir: &Path,
    ) -> std::result::Result<(), ExtractionError> {
        std::fs::write(dest_dir.join("partial"), b"half").map_err(ExtractionError::Io)?;
        panic!("extractor blew up");
    }
}

#[rstest]
fn workspace_is_removed_when_a_step_panics(sandbox: Sandbox) {
    let config = sandbox.config();
    let privilege = admin();
    let loader = content_loader();
    let downloader = writing_downloader();

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        ensure_with(&config, &privilege, &loader, &downloader, &PanickingExtractor)
    }));

    assert!(result.is_err());
    assert!(sandbox.workspace_parent_is_empty());
}
