use std::rc::Rc;

use tracing::*;

use crate::digest::Oid;
use crate::error::RepoResult;
use crate::store::{ObjectStore, TreeMerge};
use crate::tree::Tree;

use super::{store_failure, ObjectRepository};

/// Result of [`ObjectRepository::merge_trees`].
///
/// A conflict is an ordinary outcome for the caller to present or resolve, not an error.
#[derive(Debug, Clone)]
pub enum MergeOutcome {
    Merged(Rc<Tree>),
    Conflict(String),
}

impl MergeOutcome {
    pub fn is_conflict(&self) -> bool {
        matches!(self, MergeOutcome::Conflict(_))
    }

    pub fn merged(&self) -> Option<&Rc<Tree>> {
        match self {
            MergeOutcome::Merged(tree) => Some(tree),
            MergeOutcome::Conflict(_) => None,
        }
    }
}

impl<S: ObjectStore> ObjectRepository<S> {
    /// Three-way merge `ours` and `theirs` against `base` in the store. All three must be
    /// durable. A clean merge is loaded back through [`ObjectRepository::find_tree`].
    pub fn merge_trees(
        &mut self,
        ours: &Oid,
        theirs: &Oid,
        base: &Oid,
    ) -> RepoResult<MergeOutcome> {
        for oid in [ours, theirs, base] {
            self.require_durable(oid)?;
        }

        let merge = self
            .store
            .merge_trees(ours, theirs, base)
            .map_err(|e| store_failure("merge_trees", e))?;

        match merge {
            TreeMerge::Merged(oid) => {
                debug!(%oid, %ours, %theirs, %base, "Merged trees");
                self.note_persisted(&oid);
                Ok(MergeOutcome::Merged(self.find_tree(&oid)?))
            }
            TreeMerge::Conflict(text) => {
                debug!(%ours, %theirs, %base, conflicts = %text, "Tree merge conflicted");
                Ok(MergeOutcome::Conflict(text))
            }
        }
    }
}
