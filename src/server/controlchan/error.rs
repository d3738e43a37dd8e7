//! The error type of the control channel and the session loop built on it.

use crate::BoxError;
use derive_more::Display;
use thiserror::Error;

// Anything that ends a session: transport failures, parse failures, the
// inactivity timeout and the supervisor's stop request. Protocol-level
// problems are not errors; they travel back to the client as reply codes.
#[derive(Debug, Error)]
#[error("control channel error: {kind}")]
pub(crate) struct ControlChanError {
    kind: ControlChanErrorKind,
    #[source]
    source: Option<BoxError>,
}

#[derive(Eq, PartialEq, Debug, Display, Clone, Copy)]
pub(crate) enum ControlChanErrorKind {
    /// IO failure on the control connection.
    #[display("failed to perform IO on the control connection")]
    IoError,
    /// A command contained bytes that are not valid UTF-8.
    #[display("non-UTF8 character in command")]
    Utf8Error,
    /// The command line exceeded the parameter buffer.
    #[display("command line too long")]
    LineTooLong,
    /// Nothing was received for the whole inactivity allowance.
    #[display("inactivity timeout on the control channel")]
    InactivityTimeout,
    /// A reply could not be written out within the write timeout.
    #[display("write timeout on the control channel")]
    WriteTimeout,
    /// The supervisor asked this session to stop.
    #[display("stop requested by the supervisor")]
    StopRequested,
    /// The client closed the control connection.
    #[display("control connection closed by peer")]
    ConnectionClosed,
    /// The data channel could not be brought up or went away.
    #[display("data channel failed")]
    DataChannelFailed,
}

impl ControlChanError {
    pub fn new(kind: ControlChanErrorKind) -> Self {
        ControlChanError { kind, source: None }
    }

    pub fn with_source<E>(kind: ControlChanErrorKind, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        ControlChanError {
            kind,
            source: Some(source.into()),
        }
    }

    #[allow(unused)]
    pub fn kind(&self) -> ControlChanErrorKind {
        self.kind
    }
}

impl From<ControlChanErrorKind> for ControlChanError {
    fn from(kind: ControlChanErrorKind) -> ControlChanError {
        ControlChanError::new(kind)
    }
}

impl From<std::io::Error> for ControlChanError {
    fn from(err: std::io::Error) -> ControlChanError {
        ControlChanError::with_source(ControlChanErrorKind::IoError, err)
    }
}

impl From<std::str::Utf8Error> for ControlChanError {
    fn from(err: std::str::Utf8Error) -> ControlChanError {
        ControlChanError::with_source(ControlChanErrorKind::Utf8Error, err)
    }
}
