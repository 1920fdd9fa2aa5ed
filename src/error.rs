//! Error family for the gitlet data plane
//!
//! All fallible operations return [`Result`]. Errors carry a kind a caller
//! can match on: staging rejections (`NotReadable`, `PathspecNoMatch`,
//! `HasLocalModifications`), object store failures (`NotFound`, `Corrupt`),
//! codec and serialization failures (`Format`), and plain I/O (`Io`).

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GitletError>;

/// Errors raised by repository operations.
#[derive(Debug, Error)]
pub enum GitletError {
    /// File missing, not a regular file, or unreadable.
    #[error("not a readable regular file: {}", .0.display())]
    NotReadable(PathBuf),

    /// `remove` called on a path that is neither tracked nor staged.
    #[error("pathspec '{0}' did not match any files")]
    PathspecNoMatch(String),

    /// `remove` without force on a tracked file whose working-tree content
    /// differs from HEAD.
    #[error("'{0}' has local modifications")]
    HasLocalModifications(String),

    /// Object store read for an identifier with no stored object.
    #[error("object not found: {0}")]
    NotFound(String),

    /// Stored object failed decompression, header parsing, the declared
    /// size check, or hash verification.
    #[error("corrupt object {uid}: {reason}")]
    Corrupt { uid: String, reason: String },

    /// Malformed input rejected by the compression codec or a serialized
    /// on-disk structure.
    #[error("malformed data: {0}")]
    Format(String),

    /// Any other underlying filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::pathspec(
        GitletError::PathspecNoMatch(String::from("nope.txt")),
        "pathspec 'nope.txt' did not match any files"
    )]
    #[case::modified(
        GitletError::HasLocalModifications(String::from("e.txt")),
        "'e.txt' has local modifications"
    )]
    #[case::not_found(
        GitletError::NotFound(String::from("da39a3ee5e6b4b0d3255bfef95601890afd80709")),
        "object not found: da39a3ee5e6b4b0d3255bfef95601890afd80709"
    )]
    fn test_error_messages(#[case] err: GitletError, #[case] expected: &str) {
        pretty_assertions::assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn test_io_errors_convert_transparently() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "locked");
        let err = GitletError::from(io_err);
        assert!(matches!(err, GitletError::Io(_)));
    }
}
