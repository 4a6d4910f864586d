//! Contains the `Error` and `Result` types that `mongodb-bulkwrite` uses.

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{bson::Document, results::BulkWriteResult};

/// The error label attached to faults that an external retry wrapper may
/// safely re-attempt against another server.
pub const RETRYABLE_WRITE_ERROR: &str = "RetryableWriteError";

/// The result type for all fallible methods in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// An error that can occur while executing a bulk write. The inner [`ErrorKind`] is wrapped in an
/// `Arc` to allow errors to be cloned.
#[derive(Clone, Debug, Error)]
#[error("{kind}")]
#[non_exhaustive]
pub struct Error {
    /// The type of error that occurred.
    pub kind: Arc<ErrorKind>,
    labels: Vec<String>,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, labels: Option<Vec<String>>) -> Self {
        Self {
            kind: Arc::new(kind),
            labels: labels.unwrap_or_default(),
        }
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        ErrorKind::InvalidArgument {
            message: message.into(),
        }
        .into()
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        ErrorKind::Internal {
            message: message.into(),
        }
        .into()
    }

    /// Creates the fault a [`Connection`](crate::cmap::Connection) implementation should return
    /// when an encoded batch exceeds a server size limit. This is the only fault kind that
    /// triggers the split-and-redispatch path.
    pub fn size_exceeded(message: impl Into<String>) -> Self {
        ErrorKind::SizeExceeded {
            message: message.into(),
        }
        .into()
    }

    /// Whether this error indicates that a dispatched batch exceeded a server size limit.
    pub fn is_size_exceeded(&self) -> bool {
        matches!(self.kind.as_ref(), ErrorKind::SizeExceeded { .. })
    }

    pub(crate) fn is_invalid_argument(&self) -> bool {
        matches!(self.kind.as_ref(), ErrorKind::InvalidArgument { .. })
    }

    /// Whether this error originated from a failure to send or receive a message.
    pub fn is_network_error(&self) -> bool {
        matches!(
            self.kind.as_ref(),
            ErrorKind::Io(..) | ErrorKind::ServerSelection { .. }
        )
    }

    /// The labels attached to this error.
    pub fn labels(&self) -> &[String] {
        match self.kind.as_ref() {
            ErrorKind::Command(err) => &err.labels,
            _ => &self.labels,
        }
    }

    /// Whether this error contains the specified label.
    pub fn contains_label<T: AsRef<str>>(&self, label: T) -> bool {
        self.labels()
            .iter()
            .any(|actual| actual.as_str() == label.as_ref())
    }

    /// Returns a copy of this error with the specified label added.
    pub fn with_label<T: AsRef<str>>(mut self, label: T) -> Self {
        self.labels.push(label.as_ref().to_string());
        self
    }
}

impl<E> From<E> for Error
where
    ErrorKind: From<E>,
{
    fn from(err: E) -> Self {
        Self {
            kind: Arc::new(err.into()),
            labels: Vec::new(),
        }
    }
}

impl std::ops::Deref for Error {
    type Target = Arc<ErrorKind>;

    fn deref(&self) -> &Self::Target {
        &self.kind
    }
}

/// The types of errors that can occur.
#[allow(missing_docs)]
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// An invalid argument was provided to a bulk write.
    #[error("An invalid argument was provided: {message}")]
    #[non_exhaustive]
    InvalidArgument { message: String },

    /// Wrapper around `bson::de::Error`.
    #[error("{0}")]
    BsonDeserialization(#[from] bson::de::Error),

    /// Wrapper around `bson::ser::Error`.
    #[error("{0}")]
    BsonSerialization(#[from] bson::ser::Error),

    /// An error occurred when executing a write operation consisting of multiple writes.
    #[error("An error occurred when executing a bulk write: {0:?}")]
    BulkWrite(BulkWriteFailure),

    /// The server returned an error in response to a dispatched command.
    #[error("Command failed: {0}")]
    Command(CommandError),

    /// Wrapper around [`std::io::Error`].
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// A dispatched batch exceeded a server size limit. Unlike other transport faults, this one
    /// is resolved internally by splitting the batch in half and redispatching, unless the batch
    /// contains a single write.
    #[error("A batch exceeded the server's size limits: {message}")]
    #[non_exhaustive]
    SizeExceeded { message: String },

    /// A connection could not be checked out for an operation.
    #[error("{message}")]
    #[non_exhaustive]
    ServerSelection { message: String },

    #[error("Internal error: {message}")]
    #[non_exhaustive]
    Internal { message: String },
}

/// An error that occurred due to a database command failing.
#[derive(Clone, Debug, Deserialize)]
#[non_exhaustive]
pub struct CommandError {
    /// Identifies the type of error.
    pub code: i32,

    /// The name associated with the error code.
    #[serde(rename = "codeName", default)]
    pub code_name: String,

    /// A description of the error that occurred.
    #[serde(rename = "errmsg")]
    pub message: String,

    /// The error labels that the server returned.
    #[serde(rename = "errorLabels", default)]
    pub labels: Vec<String>,
}

impl fmt::Display for CommandError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "({}): {}", self.code_name, self.message)
    }
}

/// An error that occurred due to not being able to satisfy a write concern. The underlying write
/// itself applied, so this error never blocks subsequent batches.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[non_exhaustive]
pub struct WriteConcernError {
    /// Identifies the type of write concern error.
    pub code: i32,

    /// The name associated with the error code.
    #[serde(rename = "codeName", default)]
    pub code_name: String,

    /// A description of the error that occurred.
    #[serde(rename = "errmsg")]
    pub message: String,

    /// A document identifying the write concern setting related to the error.
    #[serde(rename = "errInfo", skip_serializing_if = "Option::is_none", default)]
    pub details: Option<Document>,

    /// The error labels that the server returned.
    #[serde(rename = "errorLabels", default)]
    pub labels: Vec<String>,
}

/// An error that occurred for a single write during a bulk write that wasn't due to being unable
/// to satisfy a write concern.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[non_exhaustive]
pub struct BulkWriteError {
    /// Index into the original list of write models that this error corresponds to. Raw server
    /// replies report indexes local to the dispatched batch; by the time an error surfaces to the
    /// caller it has been remapped.
    pub index: usize,

    /// Identifies the type of write error.
    pub code: i32,

    /// The name associated with the error code.
    ///
    /// Note that the server will not return this in some cases, hence `code_name` being an
    /// `Option`.
    #[serde(rename = "codeName", default)]
    pub code_name: Option<String>,

    /// A description of the error that occurred.
    #[serde(rename = "errmsg")]
    pub message: String,
}

/// The set of errors that occurred during a bulk write, along with the partial result accumulated
/// before the call ended.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct BulkWriteFailure {
    /// The error(s) that occurred on account of a non write concern failure. Indexes refer to the
    /// original list of write models.
    pub write_errors: Vec<BulkWriteError>,

    /// The error(s) that occurred on account of write concern failure.
    pub write_concern_errors: Vec<WriteConcernError>,

    /// The result of the writes that did complete before the call ended.
    pub partial_result: Option<BulkWriteResult>,

    /// The transport-level fault that ended the call early, if any.
    pub source: Option<Box<Error>>,
}
