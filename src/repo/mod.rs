//! [`ObjectRepository`]: the cache and the object store, behind one handle.
//!
//! Every object handed out by a repository is cached, so the same id always yields the same
//! `Rc`. Objects built through the factories exist only in memory until [`persist_object`] writes
//! them, dependencies first.
//!
//! A repository is meant to live for one logical operation (one replay, one merge) on one thread.
//!
//! [`persist_object`]: ObjectRepository::persist_object

mod cache;
mod commit;
mod lookup;
mod merge;
mod persist;

pub use cache::ObjectCache;
pub use commit::CommitOverrides;
pub use merge::MergeOutcome;

use std::rc::Rc;

use bstr::BString;
use tracing::*;

use crate::blob::Blob;
use crate::commit::{Commit, Signature};
use crate::digest::Oid;
use crate::error::{RepoError, RepoResult};
use crate::storable::{GitObject, ObjectKind};
use crate::store::{ObjectStore, StoreError};
use crate::tree::{Tree, TreeEntry};

pub struct ObjectRepository<S> {
    store: S,
    cache: ObjectCache,
    sign_commits: bool,
}

impl<S: ObjectStore> ObjectRepository<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            cache: ObjectCache::new(),
            sign_commits: false,
        }
    }

    /// Sign every commit this repository writes.
    pub fn with_signing(mut self, sign: bool) -> Self {
        self.sign_commits = sign;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &ObjectCache {
        &self.cache
    }

    #[cfg(test)]
    pub(crate) fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// The id the store would give `body` as a `kind`. Nothing is written.
    pub fn fetch_oid(&self, kind: ObjectKind, body: &[u8]) -> RepoResult<Oid> {
        self.store
            .hash_object(kind, body)
            .map_err(|e| store_failure("hash_object", e))
    }

    pub fn create_blob(&mut self, data: impl Into<Vec<u8>>) -> Rc<Blob> {
        let blob = Rc::new(Blob::new(data.into()));
        match self.cache.insert_if_absent(blob.clone().into()) {
            GitObject::Blob(cached) => cached,
            _ => blob,
        }
    }

    pub fn create_tree(&mut self, entries: impl IntoIterator<Item = TreeEntry>) -> Rc<Tree> {
        let tree = Rc::new(Tree::new(entries));
        match self.cache.insert_if_absent(tree.clone().into()) {
            GitObject::Tree(cached) => cached,
            _ => tree,
        }
    }

    pub fn create_commit(
        &mut self,
        tree_id: Oid,
        parents: Vec<Oid>,
        author: Signature,
        committer: Signature,
        message: impl Into<BString>,
    ) -> Rc<Commit> {
        let commit = Rc::new(Commit::new(
            tree_id, parents, author, committer, message, None,
        ));
        match self.cache.insert_if_absent(commit.clone().into()) {
            GitObject::Commit(cached) => cached,
            _ => commit,
        }
    }

    /// Mark the cached object with this id persisted, if there is one. Used after the store
    /// wrote something on its own, e.g. a commit or a merged tree.
    fn note_persisted(&self, oid: &Oid) {
        if let Some(object) = self.cache.get(oid) {
            object.mark_persisted();
        }
    }

    /// Fail with [`RepoError::NotPersisted`] if `oid` is cached but only in memory.
    fn require_durable(&self, oid: &Oid) -> RepoResult<()> {
        match self.cache.get(oid) {
            Some(object) if !object.is_persisted() => {
                warn!(%oid, kind = %object.kind(), "Referenced object has not been persisted");
                Err(RepoError::NotPersisted(*oid))
            }
            _ => Ok(()),
        }
    }
}

/// Log a store failure with the operation that hit it, then wrap it.
fn store_failure(op: &'static str, source: StoreError) -> RepoError {
    error!(op, error = %source, "Object store operation failed");
    RepoError::Store(source)
}
