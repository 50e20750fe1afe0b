//! Storage error types
//!
//! Defines the error cases for filesystem operations and their mapping onto
//! HTTP status codes.

use hyper::StatusCode;
use std::fmt;
use std::io;

/// Errors produced by storage operations
#[derive(Debug)]
pub enum StorageError {
    /// The request path resolves outside the root directory
    InvalidPath(String),
    /// The file or directory does not exist
    NotFound(String),
    /// The operation is not valid for a directory
    IsADirectory(String),
    /// Any other OS-level failure (permissions, disk full)
    Io(io::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPath(p) => {
                write!(f, "Cannot access paths outside of the root directory: {p}")
            }
            Self::NotFound(p) => write!(f, "Could not find file path {p}"),
            Self::IsADirectory(p) => write!(f, "Path is a directory: {p}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> Self {
        Self::Io(error)
    }
}

impl StorageError {
    /// HTTP status code for this error
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidPath(_) | Self::IsADirectory(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to the client
    ///
    /// OS-level failures are reported generically so internal detail never
    /// reaches the client.
    pub fn client_message(&self) -> String {
        match self {
            Self::Io(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            StorageError::InvalidPath("../x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            StorageError::NotFound("missing.txt".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            StorageError::IsADirectory("dir".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            StorageError::Io(io::Error::new(io::ErrorKind::PermissionDenied, "denied")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_io_errors_are_not_leaked() {
        let error = StorageError::Io(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "/etc/shadow: permission denied",
        ));
        assert_eq!(error.client_message(), "Internal server error");
    }
}
