//! Release archive retrieval.
//!
//! # Sub-modules
//!
//! - [`download`] - Archive download trait and HTTP implementation.
//! - [`extraction`] - ZIP extraction with path traversal protection.

pub mod download;
pub mod extraction;
