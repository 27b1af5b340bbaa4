//! Host platform identification.
//!
//! Decides at runtime whether the ensure pipeline can run on this host, and
//! maps processor architecture identifiers onto the directory names used
//! inside the wintun release archive.

use std::fmt;

/// Whether the ensure pipeline can run on the current host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// The host is Windows.
    Supported,
    /// Any other host; carries the detected OS name.
    Unsupported {
        /// Operating system name as reported by the standard library.
        os: &'static str,
    },
}

impl Platform {
    /// Detect the platform of the running process.
    #[must_use]
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Classify an operating system name.
    ///
    /// # Examples
    ///
    /// ```
    /// use wintundll_installer::platform::Platform;
    ///
    /// assert_eq!(Platform::from_os("windows"), Platform::Supported);
    /// assert!(!Platform::from_os("linux").is_supported());
    /// ```
    #[must_use]
    pub fn from_os(os: &'static str) -> Self {
        if os == "windows" {
            Self::Supported
        } else {
            Self::Unsupported { os }
        }
    }

    /// Return true for [`Platform::Supported`].
    #[must_use]
    pub const fn is_supported(self) -> bool {
        matches!(self, Self::Supported)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Supported => f.write_str("windows (supported)"),
            Self::Unsupported { os } => write!(f, "{os} (unsupported)"),
        }
    }
}

/// Return the vendor architecture name for the running process.
#[must_use]
pub fn host_arch() -> &'static str {
    normalize_arch(std::env::consts::ARCH)
}

/// Map an architecture identifier to the name wintun uses in its archive.
///
/// Wintun bundles 32-bit x86 under `x86`, so the Go-style `386` identifier
/// (and Rust's `x86`/`i686`) become `x86`. 64-bit identifiers follow the
/// vendor's `amd64`/`arm64` naming. Unknown identifiers pass through.
///
/// # Examples
///
/// ```
/// use wintundll_installer::platform::normalize_arch;
///
/// assert_eq!(normalize_arch("386"), "x86");
/// assert_eq!(normalize_arch("x86_64"), "amd64");
/// assert_eq!(normalize_arch("arm"), "arm");
/// ```
#[must_use]
pub fn normalize_arch(arch: &str) -> &str {
    match arch {
        "386" | "x86" | "i586" | "i686" => "x86",
        "x86_64" | "amd64" => "amd64",
        "aarch64" | "arm64" => "arm64",
        other => other,
    }
}
