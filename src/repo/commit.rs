use bstr::BString;
use tracing::*;

use crate::commit::{Commit, Signature};
use crate::digest::Oid;
use crate::error::RepoResult;
use crate::store::{CommitRequest, ObjectStore};

use super::{store_failure, ObjectRepository};

/// Fields to replace when rewriting a commit with
/// [`ObjectRepository::commit_tree_with_overrides`]. Anything left `None` is copied from the
/// original.
#[derive(Debug, Clone, Default)]
pub struct CommitOverrides {
    pub tree: Option<Oid>,
    pub parents: Option<Vec<Oid>>,
    pub message: Option<BString>,
    pub author: Option<Signature>,
}

impl CommitOverrides {
    /// Only the parents change.
    pub fn reparent(parents: Vec<Oid>) -> Self {
        Self {
            parents: Some(parents),
            ..Self::default()
        }
    }
}

impl<S: ObjectStore> ObjectRepository<S> {
    /// Write a commit for `tree` straight through the store and return its id.
    ///
    /// `tree` and `parents` must be durable. `message` is written as is, so it should already
    /// have been through [`crate::message::cleanup_message`]. The new commit is not loaded into
    /// the cache; use [`ObjectRepository::find_commit`] for that.
    pub fn commit_tree(
        &mut self,
        tree: &Oid,
        parents: &[Oid],
        message: &[u8],
        author: Option<&Signature>,
        sign: bool,
    ) -> RepoResult<Oid> {
        self.require_durable(tree)?;
        for parent in parents {
            self.require_durable(parent)?;
        }

        let request = CommitRequest {
            tree: *tree,
            parents,
            message,
            author,
            sign,
        };
        let oid = self
            .store
            .commit_tree(&request)
            .map_err(|e| store_failure("commit_tree", e))?;

        debug!(%oid, %tree, ?parents, "Committed tree");
        self.note_persisted(&oid);
        Ok(oid)
    }

    /// Write a copy of `commit` with some fields replaced. The author, including their date, is
    /// kept unless overridden.
    pub fn commit_tree_with_overrides(
        &mut self,
        commit: &Commit,
        overrides: CommitOverrides,
    ) -> RepoResult<Oid> {
        let tree = overrides.tree.unwrap_or(*commit.tree_id());
        let parents = overrides
            .parents
            .unwrap_or_else(|| commit.parents().to_vec());
        let message: &[u8] = match &overrides.message {
            Some(message) => message,
            None => commit.message(),
        };
        let author = overrides.author.as_ref().unwrap_or(commit.author());

        let sign = self.sign_commits;
        self.commit_tree(&tree, &parents, message, Some(author), sign)
    }
}
