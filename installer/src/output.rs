//! Output formatting for the installer CLI.
//!
//! User-facing progress goes to stderr through [`write_stderr_line`]; the
//! dry-run summary is built by [`DryRunInfo`].

use crate::config::EnsureConfig;
use crate::ensure::EnsureOutcome;
use crate::platform::Platform;
use std::io::Write;

/// Write one line to `stderr`, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort reporting; ignore write failures.
    }
}

/// Format the message shown after a successful run.
///
/// # Example
///
/// ```
/// use camino::Utf8Path;
/// use wintundll_installer::ensure::EnsureOutcome;
/// use wintundll_installer::output::success_message;
///
/// let msg = success_message(EnsureOutcome::Installed, Utf8Path::new("C:/wintun.dll"));
/// assert!(msg.contains("Installed"));
/// ```
#[must_use]
pub fn success_message(outcome: EnsureOutcome, destination: &camino::Utf8Path) -> String {
    match outcome {
        EnsureOutcome::AlreadyLoadable => format!("{destination} is already installed and loads"),
        EnsureOutcome::Installed => format!("Installed wintun.dll to {destination}"),
    }
}

/// Configuration information for dry-run output.
#[derive(Debug)]
pub struct DryRunInfo<'a> {
    /// The resolved configuration.
    pub config: &'a EnsureConfig,
    /// The detected host platform.
    pub platform: Platform,
}

impl DryRunInfo<'_> {
    /// Format the dry-run information for display.
    #[must_use]
    pub fn display_text(&self) -> String {
        let workspace = self
            .config
            .workspace_dir()
            .map_or_else(|| "system temp directory".to_owned(), ToString::to_string);
        [
            "Dry run - no files will be modified".to_owned(),
            String::new(),
            format!("Platform: {}", self.platform),
            format!("Download URL: {}", self.config.download_url()),
            format!(
                "Download timeout: {}s",
                self.config.download_timeout().as_secs()
            ),
            format!(
                "Library in archive: {}",
                self.config.dll_path_in_unzipped_dir()
            ),
            format!("Destination: {}", self.config.dll_path_to_ensure()),
            format!("Workspace parent: {workspace}"),
        ]
        .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::with_workspace_dir;
    use camino::Utf8Path;
    use rstest::{fixture, rstest};

    #[fixture]
    fn config() -> EnsureConfig {
        EnsureConfig::resolve_for_arch("386", [])
    }

    #[rstest]
    fn dry_run_lists_resolved_values(config: EnsureConfig) {
        let info = DryRunInfo {
            config: &config,
            platform: Platform::from_os("linux"),
        };
        let text = info.display_text();

        assert!(text.starts_with("Dry run"));
        assert!(text.contains("wintun-0.14.1.zip"));
        assert!(text.contains("5s"));
        assert!(text.contains("wintun/bin/x86/wintun.dll"));
        assert!(text.contains("linux (unsupported)"));
        assert!(text.contains("system temp directory"));
    }

    #[test]
    fn dry_run_shows_workspace_override() {
        let config = EnsureConfig::resolve_for_arch("amd64", [with_workspace_dir("/var/tmp")]);
        let info = DryRunInfo {
            config: &config,
            platform: Platform::Supported,
        };
        assert!(info.display_text().contains("Workspace parent: /var/tmp"));
    }

    #[rstest]
    #[case::already(EnsureOutcome::AlreadyLoadable, "already installed")]
    #[case::installed(EnsureOutcome::Installed, "Installed wintun.dll")]
    fn success_message_describes_outcome(#[case] outcome: EnsureOutcome, #[case] expected: &str) {
        let msg = success_message(outcome, Utf8Path::new("/opt/wintun.dll"));
        assert!(msg.contains(expected));
        assert!(msg.contains("/opt/wintun.dll"));
    }

    #[test]
    fn write_stderr_line_appends_newline() {
        let mut buffer = Vec::new();
        write_stderr_line(&mut buffer, "hello");
        assert_eq!(buffer, b"hello\n");
    }
}
