//! Wintun installer CLI entrypoint.
//!
//! This binary ensures `wintun.dll` is installed and loadable, downloading it
//! on demand. Progress is reported through the `log` facade and the final
//! result is written to stderr.

use clap::Parser;
use std::error::Error;
use std::io::Write;
use wintundll_installer::cli::Cli;
use wintundll_installer::config::EnsureConfig;
use wintundll_installer::ensure::ensure;
use wintundll_installer::error::Result;
use wintundll_installer::output::{DryRunInfo, success_message, write_stderr_line};
use wintundll_installer::platform::Platform;

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

/// Install `env_logger`, letting `RUST_LOG` override the flag-derived level.
fn init_logging(cli: &Cli) {
    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn run(cli: &Cli, stderr: &mut dyn Write) -> Result<()> {
    let config = EnsureConfig::resolve(cli.ensure_options());
    if cli.dry_run {
        let info = DryRunInfo {
            config: &config,
            platform: Platform::current(),
        };
        write_stderr_line(stderr, info.display_text());
        return Ok(());
    }

    let outcome = ensure(cli.ensure_options())?;
    if !cli.quiet {
        write_stderr_line(
            stderr,
            success_message(outcome, config.dll_path_to_ensure()),
        );
    }
    Ok(())
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, format!("error: {err}"));
            let mut cause = err.source();
            while let Some(inner) = cause {
                log::debug!("caused by: {inner}");
                cause = inner.source();
            }
            1
        }
    }
}
