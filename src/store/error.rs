use crate::digest::Oid;
use crate::error::ParseError;
use crate::storable::ObjectKind;

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested object was not found.
    #[error("object not found: {0}")]
    NotFound(Oid),

    /// The object exists but is not of the kind the caller asked for.
    #[error("{oid} is a {found}, not a {expected}")]
    UnexpectedKind {
        oid: Oid,
        expected: ObjectKind,
        found: ObjectKind,
    },

    /// The object exists but is of a kind outside blob, tree and commit, e.g. an annotated tag.
    #[error("{oid} is a {found}, which is not a blob, tree or commit")]
    UnsupportedKind { oid: Oid, found: String },

    /// The store cannot perform this operation at all.
    #[error("{operation} is not supported by this store: {requirement}")]
    Unsupported {
        operation: &'static str,
        requirement: &'static str,
    },

    /// An external command exited unsuccessfully.
    #[error("`{command}` failed ({status}): {stderr}")]
    Command {
        command: String,
        status: String,
        stderr: String,
    },

    /// The store produced output that could not be understood.
    #[error("unexpected output from `{command}`: {reason}")]
    Output { command: String, reason: String },

    /// A body handed to the store could not be decoded.
    #[error("invalid object: {0}")]
    InvalidObject(#[from] ParseError),

    /// The store has no way to sign commits.
    #[error("commit signing is not available")]
    SigningUnavailable,

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
