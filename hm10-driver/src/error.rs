//! Driver error taxonomy
//!
//! Transport errors may be retried as is. Validation, protocol and decode
//! errors will repeat until the argument (or the module) changes.

use std::time::Duration;

use hm10_proto::{DecodeError, Field, ParseError, ValidationError};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to write {command:?}")]
    WriteFailed {
        command: String,
        #[source]
        source: Option<BoxError>,
    },
    #[error("no response to {command:?} within {timeout:?}")]
    ReadTimeout {
        command: String,
        timeout: Duration,
        #[source]
        source: Option<BoxError>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The module answered, but not with the acknowledgement for this command
    #[error("module rejected {command:?}: expected {expected:?}, got {received:?}")]
    Rejected {
        command: String,
        expected: String,
        received: String,
    },
    #[error("malformed response to {command:?}")]
    MalformedResponse {
        command: String,
        #[source]
        source: ParseError,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("reading the {0} is not implemented by the module firmware binding")]
    NotImplemented(Field),
    #[error("session is not bound, the self-test has not passed")]
    Unbound,
}

impl Error {
    /// Whether retrying the same call unchanged may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
