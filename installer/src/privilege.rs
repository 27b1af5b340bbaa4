//! Administrator privilege detection.
//!
//! The check asks the Windows security subsystem whether the calling
//! thread's token is a member of the built-in Administrators group. Lack of
//! membership is a normal `Ok(false)`; only a failing query is an error.

use thiserror::Error;

/// Trait for querying administrator membership, enabling test mocking.
#[cfg_attr(test, mockall::automock)]
pub trait PrivilegeChecker {
    /// Return whether the current process runs as administrator.
    ///
    /// # Errors
    ///
    /// Returns a [`PrivilegeError`] if the security query itself fails.
    fn is_administrator(&self) -> Result<bool, PrivilegeError>;
}

/// Errors arising from the administrator membership query.
#[derive(Debug, Error)]
pub enum PrivilegeError {
    /// The well-known Administrators SID could not be allocated.
    #[error("failed to initialize admin SID: {reason}")]
    SidAllocation {
        /// OS-provided description of the failure.
        reason: String,
    },

    /// Token membership could not be queried.
    #[error("token membership error: {reason}")]
    TokenMembership {
        /// OS-provided description of the failure.
        reason: String,
    },

    /// The host has no Windows security subsystem to query.
    #[error("administrator check is unavailable on {os}")]
    Unavailable {
        /// Name of the host operating system.
        os: &'static str,
    },
}

/// Production checker backed by the Windows token APIs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokenPrivilegeChecker;

impl PrivilegeChecker for TokenPrivilegeChecker {
    fn is_administrator(&self) -> Result<bool, PrivilegeError> {
        #[cfg(windows)]
        {
            token::is_administrator()
        }
        #[cfg(not(windows))]
        {
            Err(PrivilegeError::Unavailable {
                os: std::env::consts::OS,
            })
        }
    }
}

#[cfg(windows)]
mod token {
    use super::PrivilegeError;
    use windows::Win32::Security::{
        AllocateAndInitializeSid, CheckTokenMembership, FreeSid, PSID, SECURITY_NT_AUTHORITY,
    };
    use windows::Win32::System::SystemServices::{
        DOMAIN_ALIAS_RID_ADMINS, SECURITY_BUILTIN_DOMAIN_RID,
    };
    use windows::core::BOOL;

    /// Owns the Administrators group SID and frees it on drop.
    struct AdminGroupSid(PSID);

    impl AdminGroupSid {
        fn allocate() -> Result<Self, PrivilegeError> {
            let mut sid = PSID::default();
            // SAFETY: the authority is a valid static and `sid` is a valid
            // out-pointer; ownership of the allocation passes to the guard.
            unsafe {
                AllocateAndInitializeSid(
                    &SECURITY_NT_AUTHORITY,
                    2,
                    SECURITY_BUILTIN_DOMAIN_RID,
                    DOMAIN_ALIAS_RID_ADMINS,
                    0,
                    0,
                    0,
                    0,
                    0,
                    0,
                    &mut sid,
                )
            }
            .map_err(|e| PrivilegeError::SidAllocation {
                reason: e.to_string(),
            })?;
            Ok(Self(sid))
        }
    }

    impl Drop for AdminGroupSid {
        fn drop(&mut self) {
            // SAFETY: the SID was allocated by `AllocateAndInitializeSid` and
            // is freed exactly once here.
            unsafe {
                FreeSid(self.0);
            }
        }
    }

    pub(super) fn is_administrator() -> Result<bool, PrivilegeError> {
        let sid = AdminGroupSid::allocate()?;
        let mut is_member = BOOL::default();
        // SAFETY: `None` selects the calling thread's effective token; the
        // SID stays alive for the duration of the call.
        unsafe { CheckTokenMembership(None, sid.0, &mut is_member) }.map_err(|e| {
            PrivilegeError::TokenMembership {
                reason: e.to_string(),
            }
        })?;
        Ok(is_member.as_bool())
    }
}
