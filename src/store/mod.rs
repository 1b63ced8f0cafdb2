//! The external object store: everything that hashes, writes, reads, commits, or merges on
//! behalf of the repository goes through [`ObjectStore`].
//!
//! - [`GitCliStore`] drives a real repository through the `git` executable.
//! - [`InMemoryStore`] is a self-contained git-format store for tests and embedding.

mod error;
mod git;
mod memory;

pub use error::{StoreError, StoreResult};
pub use git::GitCliStore;
pub use memory::InMemoryStore;

use crate::commit::Signature;
use crate::digest::Oid;
use crate::storable::ObjectKind;

/// An object as the store returns it: resolved kind plus unframed body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawObject {
    pub kind: ObjectKind,
    pub body: Vec<u8>,
}

/// Input to [`ObjectStore::commit_tree`].
#[derive(Debug, Clone)]
pub struct CommitRequest<'a> {
    /// Must already be durable in the store.
    pub tree: Oid,
    pub parents: &'a [Oid],
    /// Already cleaned up; written verbatim.
    pub message: &'a [u8],
    /// Replaces the store's configured author identity and date when set.
    pub author: Option<&'a Signature>,
    pub sign: bool,
}

/// Result of a three-way tree merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeMerge {
    Merged(Oid),
    /// Human-readable description of every conflict.
    Conflict(String),
}

/// Content-addressed object store.
///
/// Implementations must keep these promises:
/// - `hash_object(k, b)` equals what `write_object(k, b)` later returns, and that id reads back
///   as `(k, b)`.
/// - Writing content that is already present is a no-op that returns the same id.
/// - Reads fail with [`StoreError::NotFound`] for ids the store has never seen.
pub trait ObjectStore {
    /// Compute the id `body` would get as a `kind`, without writing anything.
    fn hash_object(&self, kind: ObjectKind, body: &[u8]) -> StoreResult<Oid>;

    /// Durably write `body` as a `kind` and return the id the store computed for it.
    fn write_object(&mut self, kind: ObjectKind, body: &[u8]) -> StoreResult<Oid>;

    /// Read an object. When `expected` is set, a store may reject other kinds with
    /// [`StoreError::UnexpectedKind`] instead of returning them.
    fn read_object(&self, oid: &Oid, expected: Option<ObjectKind>) -> StoreResult<RawObject>;

    fn object_kind(&self, oid: &Oid) -> StoreResult<ObjectKind>;

    /// Write a commit for an already durable tree and return its id.
    fn commit_tree(&mut self, request: &CommitRequest<'_>) -> StoreResult<Oid>;

    /// Merge `ours` and `theirs` against `base`. All three must already be durable.
    fn merge_trees(&mut self, ours: &Oid, theirs: &Oid, base: &Oid) -> StoreResult<TreeMerge>;
}

impl<S: ObjectStore + ?Sized> ObjectStore for Box<S> {
    fn hash_object(&self, kind: ObjectKind, body: &[u8]) -> StoreResult<Oid> {
        (**self).hash_object(kind, body)
    }

    fn write_object(&mut self, kind: ObjectKind, body: &[u8]) -> StoreResult<Oid> {
        (**self).write_object(kind, body)
    }

    fn read_object(&self, oid: &Oid, expected: Option<ObjectKind>) -> StoreResult<RawObject> {
        (**self).read_object(oid, expected)
    }

    fn object_kind(&self, oid: &Oid) -> StoreResult<ObjectKind> {
        (**self).object_kind(oid)
    }

    fn commit_tree(&mut self, request: &CommitRequest<'_>) -> StoreResult<Oid> {
        (**self).commit_tree(request)
    }

    fn merge_trees(&mut self, ours: &Oid, theirs: &Oid, base: &Oid) -> StoreResult<TreeMerge> {
        (**self).merge_trees(ours, theirs, base)
    }
}
