use std::rc::Rc;

use tracing::*;

use crate::blob::Blob;
use crate::commit::Commit;
use crate::digest::Oid;
use crate::error::{RepoError, RepoResult};
use crate::storable::{object_id, GitObject, ObjectKind};
use crate::store::{ObjectStore, StoreError};
use crate::tree::Tree;

use super::{store_failure, ObjectRepository};

impl<S: ObjectStore> ObjectRepository<S> {
    pub fn find_blob(&mut self, oid: &Oid) -> RepoResult<Rc<Blob>> {
        match self.lookup(oid, Some(ObjectKind::Blob))? {
            GitObject::Blob(blob) => Ok(blob),
            other => Err(wrong_type(oid, ObjectKind::Blob, Some(other.kind().as_str()))),
        }
    }

    pub fn find_tree(&mut self, oid: &Oid) -> RepoResult<Rc<Tree>> {
        match self.lookup(oid, Some(ObjectKind::Tree))? {
            GitObject::Tree(tree) => Ok(tree),
            other => Err(wrong_type(oid, ObjectKind::Tree, Some(other.kind().as_str()))),
        }
    }

    pub fn find_commit(&mut self, oid: &Oid) -> RepoResult<Rc<Commit>> {
        match self.lookup(oid, Some(ObjectKind::Commit))? {
            GitObject::Commit(commit) => Ok(commit),
            other => Err(wrong_type(oid, ObjectKind::Commit, Some(other.kind().as_str()))),
        }
    }

    /// Look up an object of any kind.
    pub fn find_object(&mut self, oid: &Oid) -> RepoResult<GitObject> {
        self.lookup(oid, None)
    }

    /// Cache first, then the store. Whatever the store returns is checked against `oid` before it
    /// is parsed and cached as persisted.
    fn lookup(&mut self, oid: &Oid, expected: Option<ObjectKind>) -> RepoResult<GitObject> {
        if let Some(object) = self.cache.get(oid) {
            return match expected {
                Some(expected) if expected != object.kind() => {
                    Err(wrong_type(oid, expected, Some(object.kind().as_str())))
                }
                _ => Ok(object.clone()),
            };
        }

        trace!(%oid, ?expected, "Cache miss, reading from store");
        let raw = self
            .store
            .read_object(oid, expected)
            .map_err(|e| match (e, expected) {
                (StoreError::NotFound(_), Some(expected)) => wrong_type(oid, expected, None),
                (StoreError::UnexpectedKind { expected, found, .. }, _) => {
                    wrong_type(oid, expected, Some(found.as_str()))
                }
                (StoreError::UnsupportedKind { found, .. }, Some(expected)) => {
                    wrong_type(oid, expected, Some(found.as_str()))
                }
                (e, _) => store_failure("read_object", e),
            })?;

        if let Some(expected) = expected {
            if raw.kind != expected {
                return Err(wrong_type(oid, expected, Some(raw.kind.as_str())));
            }
        }

        let actual = object_id(raw.kind, &raw.body);
        if actual != *oid {
            error!(%oid, %actual, kind = %raw.kind, "Store returned content with another id");
            return Err(RepoError::IntegrityMismatch {
                kind: raw.kind,
                expected: *oid,
                actual,
            });
        }

        let kind = raw.kind;
        let object = GitObject::parse(*oid, kind, raw.body).map_err(|source| {
            error!(%oid, %kind, error = %source, "Could not parse object");
            RepoError::Malformed {
                oid: *oid,
                kind,
                source,
            }
        })?;

        Ok(self.cache.insert_if_absent(object))
    }
}

fn wrong_type(oid: &Oid, expected: ObjectKind, found: Option<&str>) -> RepoError {
    warn!(
        %oid,
        %expected,
        found = found.unwrap_or("nothing"),
        "Lookup did not find the requested kind"
    );
    RepoError::NotFoundOrWrongType {
        oid: *oid,
        expected,
        found: found.map(str::to_owned),
    }
}
