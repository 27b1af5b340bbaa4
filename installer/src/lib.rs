//! Wintun DLL installer library.
//!
//! This crate guarantees that `wintun.dll` is present and loadable at a known
//! location before a dependent application starts, downloading and installing
//! it on demand. It is used by the `wintundll-installer` CLI binary and can be
//! called directly from applications that need the library at startup.
//!
//! # Modules
//!
//! - [`artefact`] - Release archive download and extraction
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - Resolved settings and option overrides
//! - [`ensure`] - The ensure orchestrator and its entry points
//! - [`error`] - Error types naming the failing phase
//! - [`install`] - Atomic relocation of the library onto its destination
//! - [`loader`] - Shared library load probe
//! - [`output`] - Stderr reporting and dry-run formatting
//! - [`platform`] - Host platform and architecture identification
//! - [`privilege`] - Administrator privilege detection
//! - [`workspace`] - Self-cleaning temporary staging directory

pub mod artefact;
pub mod cli;
pub mod config;
pub mod ensure;
pub mod error;
pub mod install;
pub mod loader;
pub mod output;
pub mod platform;
pub mod privilege;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod workspace;
