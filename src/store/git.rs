use std::io::Write;
use std::process::{Command, Output, Stdio};
use std::str::{self, FromStr};

use bstr::ByteSlice;
use camino::{Utf8Path, Utf8PathBuf};
use once_cell::unsync::OnceCell;
use tracing::*;

use crate::commit::Signature;
use crate::digest::Oid;
use crate::storable::ObjectKind;

use super::{CommitRequest, ObjectStore, RawObject, StoreError, StoreResult, TreeMerge};

/// An object store backed by a real repository, driven through the `git` executable.
///
/// Nothing here touches refs, the index, or a worktree: only objects are read and written.
///
/// Tree merges need `git merge-tree --write-tree` to accept plain trees for `--merge-base` and
/// both sides, which git 2.44 and later do. Older gits are detected on first use and reported as
/// [`StoreError::Unsupported`].
#[derive(Debug, Clone)]
pub struct GitCliStore {
    git_dir: Utf8PathBuf,
    committer: Option<Signature>,
    tree_merge: OnceCell<bool>,
}

impl GitCliStore {
    /// Open the repository whose git directory (usually `.git`) is `git_dir`.
    pub fn open(git_dir: impl AsRef<Utf8Path>) -> Self {
        let git_dir = git_dir.as_ref().to_owned();
        trace!(path=%git_dir, "Opened git store");
        Self {
            git_dir,
            committer: None,
            tree_merge: OnceCell::new(),
        }
    }

    /// Commit as `committer` instead of the identity git is configured with.
    pub fn with_committer(mut self, committer: Signature) -> Self {
        self.committer = Some(committer);
        self
    }

    pub fn git_dir(&self) -> &Utf8Path {
        &self.git_dir
    }

    /// Resolve `rev` to the id of a commit.
    pub fn rev_parse(&self, rev: &str) -> StoreResult<Oid> {
        let spec = format!("{rev}^{{commit}}");
        let args = ["rev-parse", "--verify", "--quiet", spec.as_str()];
        let output = self.run(&args, None, &[])?;
        let output = check(&args, output)?;
        parse_oid_line("rev-parse", &output.stdout)
    }

    /// Read a single configuration value. Unset keys are `None`.
    pub fn config_get(&self, key: &str) -> StoreResult<Option<String>> {
        let args = ["config", "--get", key];
        let output = self.run(&args, None, &[])?;
        if output.status.code() == Some(1) {
            return Ok(None);
        }
        let output = check(&args, output)?;
        let value = output.stdout.to_str().map_err(|e| StoreError::Output {
            command: format!("git config --get {key}"),
            reason: e.to_string(),
        })?;
        Ok(Some(value.trim_end_matches('\n').to_owned()))
    }

    /// Whether this git can merge bare trees, checked once by merging the empty tree with
    /// itself.
    pub fn supports_tree_merge(&self) -> StoreResult<bool> {
        self.tree_merge
            .get_or_try_init(|| -> StoreResult<bool> {
                let empty = self.hash(ObjectKind::Tree, b"", true)?.to_hex();
                let base = format!("--merge-base={empty}");
                let args = [
                    "merge-tree",
                    "--write-tree",
                    base.as_str(),
                    empty.as_str(),
                    empty.as_str(),
                ];
                let output = self.run(&args, None, &[])?;
                let supported = output.status.success();
                if !supported {
                    warn!(
                        status = ?output.status.code(),
                        stderr = %output.stderr.trim().as_bstr(),
                        "git cannot merge trees"
                    );
                }
                Ok(supported)
            })
            .copied()
    }

    fn run(
        &self,
        args: &[&str],
        stdin: Option<&[u8]>,
        env: &[(String, String)],
    ) -> StoreResult<Output> {
        let mut command = Command::new("git");
        command
            .arg("--git-dir")
            .arg(self.git_dir.as_std_path())
            .args(args)
            .envs(env.iter().cloned())
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        trace!(?args, "Running git");
        let mut child = command.spawn()?;
        if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
            pipe.write_all(input)?;
        }
        Ok(child.wait_with_output()?)
    }

    fn hash(&self, kind: ObjectKind, body: &[u8], write: bool) -> StoreResult<Oid> {
        let mut args = vec!["hash-object", "-t", kind.as_str(), "--stdin"];
        if write {
            args.push("-w");
        }
        let output = self.run(&args, Some(body), &[])?;
        let output = check(&args, output)?;
        parse_oid_line("hash-object", &output.stdout)
    }
}

impl ObjectStore for GitCliStore {
    fn hash_object(&self, kind: ObjectKind, body: &[u8]) -> StoreResult<Oid> {
        self.hash(kind, body, false)
    }

    fn write_object(&mut self, kind: ObjectKind, body: &[u8]) -> StoreResult<Oid> {
        trace!(%kind, len = body.len(), "Writing object to git");
        self.hash(kind, body, true)
    }

    /// Reads through `git cat-file --batch`, which answers `<oid> <kind> <size>\n<body>\n`, or
    /// `<oid> missing\n`.
    fn read_object(&self, oid: &Oid, expected: Option<ObjectKind>) -> StoreResult<RawObject> {
        trace!(object=%oid, "Reading object from git");
        let request = format!("{oid}\n");
        let output = self.run(&["cat-file", "--batch"], Some(request.as_bytes()), &[])?;
        let output = check(&["cat-file", "--batch"], output)?;

        let malformed = |reason: &str| StoreError::Output {
            command: "git cat-file --batch".to_owned(),
            reason: reason.to_owned(),
        };

        let stdout = output.stdout;
        let header_end = memchr::memchr(b'\n', &stdout).ok_or_else(|| malformed("no header"))?;
        let header = str::from_utf8(&stdout[..header_end]).map_err(|e| malformed(&e.to_string()))?;

        let mut fields = header.split(' ');
        let _ = fields.next();
        let kind = match fields.next() {
            Some("missing") | Some("ambiguous") => return Err(StoreError::NotFound(*oid)),
            Some(kind) => known_kind(oid, kind)?,
            None => return Err(malformed("no object kind")),
        };
        let size: usize = fields
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| malformed("no object size"))?;

        let body = stdout
            .get(header_end + 1..header_end + 1 + size)
            .ok_or_else(|| malformed("truncated body"))?
            .to_vec();

        match expected {
            Some(expected) if expected != kind => Err(StoreError::UnexpectedKind {
                oid: *oid,
                expected,
                found: kind,
            }),
            _ => Ok(RawObject { kind, body }),
        }
    }

    fn object_kind(&self, oid: &Oid) -> StoreResult<ObjectKind> {
        let hex = oid.to_hex();
        let output = self.run(&["cat-file", "-t", hex.as_str()], None, &[])?;
        if !output.status.success() {
            return Err(StoreError::NotFound(*oid));
        }
        known_kind(oid, &output.stdout.trim().to_str_lossy())
    }

    fn commit_tree(&mut self, request: &CommitRequest<'_>) -> StoreResult<Oid> {
        let tree = request.tree.to_hex();
        let parents: Vec<String> = request.parents.iter().map(Oid::to_hex).collect();

        let mut args = vec!["commit-tree", tree.as_str()];
        for parent in &parents {
            args.extend(["-p", parent.as_str()]);
        }
        args.push(if request.sign { "-S" } else { "--no-gpg-sign" });
        args.extend(["-F", "-"]);

        let mut env = Vec::new();
        if let Some(author) = request.author {
            env.extend(identity_env("AUTHOR", author));
        }
        if let Some(committer) = &self.committer {
            env.extend(identity_env("COMMITTER", committer));
        }

        debug!(%tree, ?parents, sign = request.sign, "Committing tree");
        let output = self.run(&args, Some(request.message), &env)?;
        let output = check(&args, output)?;
        parse_oid_line("commit-tree", &output.stdout)
    }

    /// Uses `git merge-tree --write-tree`, which exits 0 on a clean merge and 1 on conflicts.
    /// The first line of output is the merged tree; conflict messages follow a blank line.
    fn merge_trees(&mut self, ours: &Oid, theirs: &Oid, base: &Oid) -> StoreResult<TreeMerge> {
        if !self.supports_tree_merge()? {
            return Err(StoreError::Unsupported {
                operation: "merge_trees",
                requirement: "git 2.44 or newer is needed to merge bare trees",
            });
        }

        let base = format!("--merge-base={base}");
        let (ours, theirs) = (ours.to_hex(), theirs.to_hex());
        let args = [
            "merge-tree",
            "--write-tree",
            base.as_str(),
            ours.as_str(),
            theirs.as_str(),
        ];
        let output = self.run(&args, None, &[])?;

        match output.status.code() {
            Some(0) => Ok(TreeMerge::Merged(parse_oid_line(
                "merge-tree",
                &output.stdout,
            )?)),
            Some(1) => {
                let text = output.stdout.to_str_lossy();
                let messages = match text.split_once("\n\n") {
                    Some((_, messages)) => messages,
                    None => text.as_ref(),
                };
                Ok(TreeMerge::Conflict(messages.trim_end().to_owned()))
            }
            _ => Err(command_error(&args, &output)),
        }
    }
}

/// Kinds outside the object model, like `tag`, are reported as such rather than as bad output.
fn known_kind(oid: &Oid, kind: &str) -> StoreResult<ObjectKind> {
    ObjectKind::from_str(kind).map_err(|_| StoreError::UnsupportedKind {
        oid: *oid,
        found: kind.to_owned(),
    })
}

/// `GIT_<ROLE>_NAME`, `GIT_<ROLE>_EMAIL` and `GIT_<ROLE>_DATE` for a signature.
fn identity_env(role: &str, signature: &Signature) -> [(String, String); 3] {
    [
        (format!("GIT_{role}_NAME"), signature.name.to_string()),
        (format!("GIT_{role}_EMAIL"), signature.email.to_string()),
        (format!("GIT_{role}_DATE"), format!("@{}", signature.when)),
    ]
}

fn check(args: &[&str], output: Output) -> StoreResult<Output> {
    if output.status.success() {
        Ok(output)
    } else {
        Err(command_error(args, &output))
    }
}

fn command_error(args: &[&str], output: &Output) -> StoreError {
    StoreError::Command {
        command: format!("git {}", args.join(" ")),
        status: output
            .status
            .code()
            .map_or_else(|| "killed".to_owned(), |code| format!("exit {code}")),
        stderr: output.stderr.trim().to_str_lossy().into_owned(),
    }
}

fn parse_oid_line(command: &str, stdout: &[u8]) -> StoreResult<Oid> {
    let line = stdout.lines().next().unwrap_or_default();
    str::from_utf8(line)
        .ok()
        .and_then(|hex| Oid::from_str(hex.trim()).ok())
        .ok_or_else(|| StoreError::Output {
            command: format!("git {command}"),
            reason: format!("expected an object id, got {:?}", line.as_bstr()),
        })
}
