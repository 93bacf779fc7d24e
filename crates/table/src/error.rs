//! Error model for remote tables.

use thiserror::Error;

use crate::controller::MutationKind;

/// Failure talking to the REST backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The request never produced an HTTP response (DNS, connect, reset...).
    #[error("network failure: {0}")]
    Network(String),

    /// The backend answered with a non-success status.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// A caller-imposed timeout elapsed.
    #[error("request timed out")]
    Timeout,

    /// The backend answered successfully but the body was not what we expect.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl RemoteError {
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Error surfaced by [`crate::TableController`] operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// A mutation of the same kind is still in flight on this controller.
    #[error("a {0} is already in progress")]
    Busy(MutationKind),

    /// The id cannot address a single record (empty, `.` or `..`).
    #[error("invalid record id: {0:?}")]
    InvalidId(String),

    /// The resource accepts reads only.
    #[error("{resource} is read-only; {kind} refused")]
    ReadOnly {
        resource: String,
        kind: MutationKind,
    },
}

/// Invalid client configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}
