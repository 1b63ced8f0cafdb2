//! Replaying a linear run of commits onto a new base.

use std::rc::Rc;

use tracing::*;

use crate::commit::Commit;
use crate::digest::Oid;
use crate::error::{RepoError, RepoResult};
use crate::progress::{CancelToken, Progress};
use crate::repo::{CommitOverrides, ObjectRepository};
use crate::storable::Storable;
use crate::store::ObjectStore;

pub struct ChainBuilder<'r, S> {
    repo: &'r mut ObjectRepository<S>,
    cancel: CancelToken,
}

impl<'r, S: ObjectStore> ChainBuilder<'r, S> {
    pub fn new(repo: &'r mut ObjectRepository<S>) -> Self {
        Self {
            repo,
            cancel: CancelToken::new(),
        }
    }

    /// Stop at the next step once `cancel` is cancelled.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Collect the commits from `target` to `head`, both included, oldest first.
    ///
    /// Walks first parents back from `head`. Every commit met before `target` must have exactly
    /// one parent; a root or merge commit fails with [`RepoError::UnsupportedHistoryShape`].
    pub fn find_commits_range(
        &mut self,
        target: &Commit,
        head: &Oid,
    ) -> RepoResult<Vec<Rc<Commit>>> {
        let mut commits = Vec::new();
        let mut cursor = *head;

        loop {
            self.cancel.check()?;
            let commit = self.repo.find_commit(&cursor)?;
            if commit.oid() == target.oid() {
                commits.push(commit);
                break;
            }

            let next = match commit.parents() {
                [parent] => *parent,
                parents => {
                    warn!(
                        commit = %cursor,
                        parents = parents.len(),
                        "Range walk hit a non-linear commit"
                    );
                    return Err(RepoError::UnsupportedHistoryShape {
                        commit: cursor,
                        parents: parents.len(),
                    });
                }
            };
            commits.push(commit);
            cursor = next;
        }

        commits.reverse();
        trace!(count = commits.len(), from = %target.oid(), to = %head, "Found commit range");
        Ok(commits)
    }

    /// Re-parent each of `commits` in turn onto the previous result, starting at `base`, and
    /// return the new tip.
    ///
    /// Trees, messages and authors are kept. Progress is reported after every commit. When
    /// cancelled, the commits already written stay in the store; no ref is touched either way.
    pub fn chain_commits(
        &mut self,
        base: &Oid,
        commits: &[Rc<Commit>],
        progress: &mut impl Progress,
    ) -> RepoResult<Oid> {
        let total = commits.len();
        let mut tip = *base;

        for (i, commit) in commits.iter().enumerate() {
            if let Err(e) = self.cancel.check() {
                debug!(done = i, total, "Replay cancelled");
                return Err(e);
            }

            let new = self
                .repo
                .commit_tree_with_overrides(commit, CommitOverrides::reparent(vec![tip]))?;
            trace!(old = %commit.oid(), %new, "Replayed commit");
            tip = new;

            progress.report((i + 1) as f64 / total as f64);
        }

        debug!(%base, %tip, count = total, "Replayed commits");
        Ok(tip)
    }
}
