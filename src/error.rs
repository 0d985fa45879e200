//! Error taxonomy. Two tiers, matching the walk-fatal / per-entry split:
//! see `WalkError` (synchronous, can only happen at `enumerate` time) and
//! `EntryError` (captured inline in a `FileSystemEntry`, never aborts a walk).

use std::io;

/// Raised synchronously from [`crate::enumerate`] / [`crate::enumerate_paths`].
/// Nothing in this enum can occur mid-walk.
#[derive(Debug, thiserror::Error)]
pub enum WalkError {
    #[error("root path is empty or whitespace")]
    EmptyRoot,
    #[error("root path does not exist: {0}")]
    RootNotFound(String),
    #[error("root path is not a directory: {0}")]
    RootNotADirectory(String),
    #[error("failed to start traversal: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = core::result::Result<T, WalkError>;

/// Per-entry failure classification (spec.md section 4.2). Carried inline in
/// `FileSystemEntry::error`; never propagated as a `Result::Err` mid-walk.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EntryError {
    #[error("access denied")]
    Unauthorized,
    #[error("path exceeds the operating system's maximum length")]
    PathTooLong,
    #[error("file or directory not found")]
    NotFound,
    #[error("I/O error: {0}")]
    IoError(String),
    #[error("security descriptor call failed")]
    SecurityError,
    #[error("unclassified OS error (code {0})")]
    Unknown(u32),
}

impl EntryError {
    /// Centralizes the mapping from a raw `GetLastError()` value to a
    /// classified kind. This is the single place that decides what an OS
    /// error code *means*; nothing else in the crate matches on raw codes.
    #[must_use]
    pub fn from_win32(code: u32) -> Self {
        // Values from winerror.h; kept as plain u32 literals so this module
        // has no dependency on the `windows` crate and can be unit tested
        // on any host.
        const ERROR_FILE_NOT_FOUND: u32 = 2;
        const ERROR_PATH_NOT_FOUND: u32 = 3;
        const ERROR_ACCESS_DENIED: u32 = 5;
        const ERROR_INVALID_HANDLE: u32 = 6;
        const ERROR_SHARING_VIOLATION: u32 = 32;
        const ERROR_FILENAME_EXCED_RANGE: u32 = 206;
        const ERROR_BUFFER_OVERFLOW: u32 = 111;
        const ERROR_INSUFFICIENT_BUFFER: u32 = 122;
        const ERROR_NO_MORE_FILES: u32 = 18;

        match code {
            ERROR_ACCESS_DENIED => Self::Unauthorized,
            ERROR_FILENAME_EXCED_RANGE | ERROR_BUFFER_OVERFLOW => Self::PathTooLong,
            ERROR_FILE_NOT_FOUND | ERROR_PATH_NOT_FOUND | ERROR_NO_MORE_FILES => Self::NotFound,
            ERROR_INVALID_HANDLE | ERROR_SHARING_VIOLATION | ERROR_INSUFFICIENT_BUFFER => {
                Self::IoError(format!("win32 error {code}"))
            }
            _ => Self::Unknown(code),
        }
    }

    /// True for the classifications the resolver is allowed to retry via the
    /// managed fallback path exactly once (spec.md section 4.2 recovery policy).
    #[must_use]
    pub const fn allows_managed_fallback(&self) -> bool {
        matches!(self, Self::SecurityError)
    }
}

impl From<io::Error> for EntryError {
    fn from(err: io::Error) -> Self {
        err.raw_os_error().map_or_else(
            || Self::IoError(err.to_string()),
            |code| {
                let classified = Self::from_win32(code as u32);
                if matches!(classified, Self::Unknown(_)) {
                    Self::IoError(err.to_string())
                } else {
                    classified
                }
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_denied_maps_to_unauthorized() {
        assert!(matches!(EntryError::from_win32(5), EntryError::Unauthorized));
    }

    #[test]
    fn unknown_code_is_preserved_for_diagnostics() {
        match EntryError::from_win32(1234) {
            EntryError::Unknown(code) => assert_eq!(code, 1234),
            other => panic!("expected Unknown, got {other:?}"),
        }
    }

    #[test]
    fn security_error_is_the_only_retryable_kind() {
        assert!(EntryError::SecurityError.allows_managed_fallback());
        assert!(!EntryError::Unauthorized.allows_managed_fallback());
    }
}
