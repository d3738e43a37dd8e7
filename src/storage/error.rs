//! The error type returned by storage back-ends.

use crate::BoxError;
use derive_more::Display;
use thiserror::Error;

/// The error returned by [`StorageBackend`](crate::storage::StorageBackend)
/// implementations.
#[derive(Debug, Error)]
#[error("storage error: {kind}")]
pub struct Error {
    kind: ErrorKind,
    #[source]
    source: Option<BoxError>,
}

impl Error {
    /// Creates a new storage error wrapping an underlying cause.
    pub fn new<E>(kind: ErrorKind, error: E) -> Error
    where
        E: Into<BoxError>,
    {
        Error {
            kind,
            source: Some(error.into()),
        }
    }

    /// The category of this error, which decides the FTP reply code.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error { kind, source: None }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::PermanentFileNotAvailable,
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
            _ => ErrorKind::LocalError,
        };
        Error::new(kind, err)
    }
}

/// The `ErrorKind` variants that storage back-ends can produce.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display)]
pub enum ErrorKind {
    /// 450 Requested file action not taken (e.g. file busy).
    #[display("450 Transient file not available")]
    TransientFileNotAvailable,
    /// 550 Requested action not taken (e.g. file not found).
    #[display("550 Permanent file not available")]
    PermanentFileNotAvailable,
    /// 550 Requested action not taken, no access.
    #[display("550 Permission denied")]
    PermissionDenied,
    /// 451 Requested action aborted, local error in processing.
    #[display("451 Local error")]
    LocalError,
}
