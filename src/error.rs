//! Error types for fsprims.
//!
//! Uses thiserror for derive macros. I/O-backed variants keep the originating
//! `std::io::Error` so callers can inspect the OS error code.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for fsprims operations.
#[derive(Error, Debug)]
pub enum FsError {
    /// A file could not be opened or created.
    #[error("failed to open '{}': {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A seek, read, write, stat or unlink failed.
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The kernel refused an advisory lock operation.
    #[error("lock operation failed on '{}': {source}", .path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An empty path was supplied where a file path is required.
    #[error("path must not be empty")]
    PathMissing,

    /// A counter slot index outside `0..limit`.
    #[error("slot index {index} is out of range (expected 0..{limit})")]
    OutOfRange { index: i64, limit: i64 },

    /// Incrementing the slot would exceed `u128::MAX`.
    #[error("counter slot {index} in '{}' is exhausted", .path.display())]
    CounterOverflow { path: PathBuf, index: i64 },

    /// The special-file policy forbids touching this entry.
    #[error("refusing to remove special file '{}'", .0.display())]
    PermissionDenied(PathBuf),

    /// `lstat` reported a file type fsprims does not know how to remove.
    #[error("unknown file type at '{}'", .0.display())]
    UnknownFileType(PathBuf),

    /// The glob pattern could not be compiled.
    #[error("invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// The glob matched nothing and empty results were not allowed.
    #[error("glob pattern '{0}' matched nothing")]
    NoMatch(String),

    /// Configuration could not be read, parsed or validated.
    #[error("{0}")]
    Config(String),
}

impl FsError {
    /// Returns the OS error code behind an I/O-backed error, if any.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            FsError::File { source, .. }
            | FsError::Io { source, .. }
            | FsError::Lock { source, .. } => source.raw_os_error(),
            _ => None,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        FsError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for fsprims operations.
pub type Result<T> = std::result::Result<T, FsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_backed_errors_expose_os_code() {
        let err = FsError::io("/tmp/x", io::Error::from_raw_os_error(libc::ENOENT));
        assert_eq!(err.raw_os_error(), Some(libc::ENOENT));

        let err = FsError::Lock {
            path: PathBuf::from("/tmp/x.lock"),
            source: io::Error::from_raw_os_error(libc::ENOLCK),
        };
        assert_eq!(err.raw_os_error(), Some(libc::ENOLCK));
    }

    #[test]
    fn contract_errors_have_no_os_code() {
        assert_eq!(FsError::PathMissing.raw_os_error(), None);
        assert_eq!(
            FsError::OutOfRange {
                index: -1,
                limit: 65536
            }
            .raw_os_error(),
            None
        );
    }

    #[test]
    fn error_messages_are_descriptive() {
        let err = FsError::OutOfRange {
            index: 65536,
            limit: 65536,
        };
        assert_eq!(
            err.to_string(),
            "slot index 65536 is out of range (expected 0..65536)"
        );

        let err = FsError::PermissionDenied(PathBuf::from("/tmp/t/fifo"));
        assert_eq!(err.to_string(), "refusing to remove special file '/tmp/t/fifo'");
    }
}
