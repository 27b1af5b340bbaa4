//! CLI argument definitions for the wintun installer.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use crate::config::{
    EnsureOption, with_dll_path_in_unzipped_dir, with_dll_path_to_ensure, with_download_timeout,
    with_download_url, with_workspace_dir,
};
use camino::Utf8PathBuf;
use clap::Parser;
use std::time::Duration;

/// Ensure wintun.dll is installed and loadable.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "wintundll-installer")]
#[command(version, about)]
#[command(long_about = concat!(
    "Ensure wintun.dll is installed and loadable.\n\n",
    "If the library already loads from the destination path nothing is ",
    "downloaded. Otherwise the pinned wintun release archive is fetched, ",
    "unzipped into a temporary directory, and the library for this ",
    "architecture is moved into place. Must be run as administrator.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Install to the default location:\n",
    "    > wintundll-installer\n\n",
    "  Install next to an application:\n",
    "    > wintundll-installer --destination C:\\apps\\vpn\\wintun.dll\n\n",
    "  Show the resolved configuration:\n",
    "    > wintundll-installer --dry-run",
))]
pub struct Cli {
    /// URL of the wintun release archive.
    #[arg(long, value_name = "URL")]
    pub download_url: Option<String>,

    /// Download timeout in seconds [default: 5].
    #[arg(long = "timeout", value_name = "SECONDS")]
    pub timeout_secs: Option<u64>,

    /// Library path inside the unpacked archive [default: wintun/bin/<arch>/wintun.dll].
    #[arg(long, value_name = "PATH")]
    pub dll_path_in_archive: Option<Utf8PathBuf>,

    /// Absolute path where the library must be loadable.
    #[arg(short, long, value_name = "PATH")]
    pub destination: Option<Utf8PathBuf>,

    /// Directory to create the temporary workspace in [default: system temp].
    #[arg(long, value_name = "DIR")]
    pub workspace_dir: Option<Utf8PathBuf>,

    /// Show the resolved configuration and exit without changing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

impl Cli {
    /// Translate the supplied flags into ensure options, in a fixed order.
    ///
    /// Flags that were not given produce no option, so the library defaults
    /// apply.
    ///
    /// # Examples
    ///
    /// ```
    /// use clap::Parser;
    /// use wintundll_installer::cli::Cli;
    ///
    /// let cli = Cli::parse_from(["wintundll-installer", "--timeout", "30"]);
    /// assert_eq!(cli.ensure_options().len(), 1);
    /// ```
    #[must_use]
    pub fn ensure_options(&self) -> Vec<EnsureOption> {
        let mut options = Vec::new();
        if let Some(url) = &self.download_url {
            options.push(with_download_url(url.clone()));
        }
        if let Some(secs) = self.timeout_secs {
            options.push(with_download_timeout(Duration::from_secs(secs)));
        }
        if let Some(path) = &self.dll_path_in_archive {
            options.push(with_dll_path_in_unzipped_dir(path.clone()));
        }
        if let Some(path) = &self.destination {
            options.push(with_dll_path_to_ensure(path.clone()));
        }
        if let Some(dir) = &self.workspace_dir {
            options.push(with_workspace_dir(dir.clone()));
        }
        options
    }

    /// Log level filter implied by `-q` and `-v`.
    #[must_use]
    pub const fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            return log::LevelFilter::Error;
        }
        match self.verbosity {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
