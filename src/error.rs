use hex::FromHexError;
use thiserror::Error;

use crate::digest::Oid;
use crate::storable::ObjectKind;
use crate::store::StoreError;

/// An object body could not be decoded.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unknown object kind: {0:?}")]
    UnknownKind(String),

    #[error("missing `{0}` header")]
    MissingHeader(&'static str),

    #[error("invalid object id: {0}")]
    InvalidOid(#[from] FromHexError),

    #[error("invalid utf-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("invalid signature line: {0:?}")]
    InvalidSignature(String),

    #[error("invalid tree entry at byte {offset}: {reason}")]
    InvalidTreeEntry { offset: usize, reason: &'static str },

    #[error("{0}")]
    Malformed(&'static str),
}

/// Errors raised by [`crate::repo::ObjectRepository`] and [`crate::chain::ChainBuilder`].
#[derive(Debug, Error)]
pub enum RepoError {
    /// A lookup resolved to nothing, or to a kind other than the one requested. `found` is the
    /// kind name the store reported, which may be one the object model doesn't cover (`tag`).
    #[error("expected {expected} {oid}, found {}", .found.as_deref().unwrap_or("nothing"))]
    NotFoundOrWrongType {
        oid: Oid,
        expected: ObjectKind,
        found: Option<String>,
    },

    /// The store computed a different id for an object's content than the object states.
    #[error("integrity mismatch for {kind}: expected {expected}, store computed {actual}")]
    IntegrityMismatch {
        kind: ObjectKind,
        expected: Oid,
        actual: Oid,
    },

    /// A range walk met a root or merge commit before reaching its target.
    #[error("commit {commit} has {parents} parents, expected exactly 1")]
    UnsupportedHistoryShape { commit: Oid, parents: usize },

    /// An object referenced by a commit or merge is only known in memory.
    #[error("{0} has not been persisted")]
    NotPersisted(Oid),

    #[error("malformed {kind} {oid}: {source}")]
    Malformed {
        oid: Oid,
        kind: ObjectKind,
        #[source]
        source: ParseError,
    },

    #[error("object store failure: {0}")]
    Store(#[from] StoreError),

    #[error("operation cancelled")]
    Cancelled,
}

pub type RepoResult<T> = std::result::Result<T, RepoError>;
