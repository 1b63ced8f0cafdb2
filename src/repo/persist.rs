use std::collections::HashSet;

use tracing::*;

use crate::digest::Oid;
use crate::error::{RepoError, RepoResult};
use crate::storable::GitObject;
use crate::store::ObjectStore;

use super::{store_failure, ObjectRepository};

impl<S: ObjectStore> ObjectRepository<S> {
    /// Durably write `object` and every cached, unpersisted object it depends on, dependencies
    /// first.
    ///
    /// Already persisted objects are skipped, so persisting twice writes once. Dependencies the
    /// cache doesn't know about are assumed to be in the store already.
    ///
    /// Fails with [`RepoError::IntegrityMismatch`] if the store files any object under an id other
    /// than the one it states. Objects written before a failure stay written.
    pub fn persist_object(&mut self, object: &GitObject) -> RepoResult<()> {
        if object.is_persisted() {
            trace!(oid = %object.oid(), "Already persisted");
            return Ok(());
        }

        // Post-order walk: a node is written once all of its dependencies have been.
        let mut stack: Vec<(GitObject, bool)> = vec![(object.clone(), false)];
        let mut visited: HashSet<Oid> = HashSet::new();

        while let Some((node, expanded)) = stack.pop() {
            if expanded {
                self.write_one(&node)?;
                continue;
            }
            if node.is_persisted() || !visited.insert(*node.oid()) {
                continue;
            }

            stack.push((node.clone(), true));
            for dep in node.dependencies().iter().rev() {
                if let Some(cached) = self.cache.get(dep) {
                    if !cached.is_persisted() && !visited.contains(dep) {
                        stack.push((cached.clone(), false));
                    }
                }
            }
        }

        Ok(())
    }

    fn write_one(&mut self, object: &GitObject) -> RepoResult<()> {
        if object.is_persisted() {
            return Ok(());
        }
        let kind = object.kind();
        let expected = *object.oid();
        trace!(oid = %expected, %kind, "Writing object to store");

        let actual = self
            .store
            .write_object(kind, object.body())
            .map_err(|e| store_failure("write_object", e))?;

        if actual != expected {
            error!(%expected, %actual, %kind, "Store filed object under a different id");
            return Err(RepoError::IntegrityMismatch {
                kind,
                expected,
                actual,
            });
        }

        object.mark_persisted();
        Ok(())
    }
}
