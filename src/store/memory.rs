use std::collections::{BTreeSet, HashMap};

use bstr::{BString, ByteSlice};
use tracing::*;

use crate::commit::{format_body, Signature};
use crate::digest::Oid;
use crate::filemode::FileMode;
use crate::storable::{object_id, ObjectKind, Storable};
use crate::tree::{Tree, TreeEntry};

use super::{CommitRequest, ObjectStore, RawObject, StoreError, StoreResult, TreeMerge};

/// A git-format object store held entirely in memory.
///
/// Ids are computed exactly as git computes them, so objects written here hash the same as they
/// would in a real repository. Every call to [`ObjectStore::write_object`] is recorded, including
/// ones that found the object already present.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    objects: HashMap<Oid, (ObjectKind, Vec<u8>)>,
    writes: Vec<Oid>,
    identity: Signature,
}

impl InMemoryStore {
    /// `identity` is used as the committer of every commit, and as the author unless a commit
    /// request names one.
    pub fn new(identity: Signature) -> Self {
        Self {
            objects: HashMap::new(),
            writes: Vec::new(),
            identity,
        }
    }

    pub fn contains(&self, oid: &Oid) -> bool {
        self.objects.contains_key(oid)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Ids passed through `write_object`, oldest first.
    pub fn writes(&self) -> &[Oid] {
        &self.writes
    }

    fn load_tree(&self, oid: &Oid) -> StoreResult<Tree> {
        let raw = self.read_object(oid, Some(ObjectKind::Tree))?;
        Ok(Tree::parse(*oid, raw.body)?)
    }

    fn require(&self, oid: &Oid, expected: ObjectKind) -> StoreResult<()> {
        match self.objects.get(oid) {
            Some((kind, _)) if *kind == expected => Ok(()),
            Some((kind, _)) => Err(StoreError::UnexpectedKind {
                oid: *oid,
                expected,
                found: *kind,
            }),
            None => Err(StoreError::NotFound(*oid)),
        }
    }

    /// Merge one directory level, recursing into subtrees changed on both sides. Conflicting
    /// entries keep our side and add a line to `conflicts`.
    fn merge_level(
        &mut self,
        prefix: &str,
        base: Option<&Oid>,
        ours: &Oid,
        theirs: &Oid,
        conflicts: &mut Vec<String>,
    ) -> StoreResult<Oid> {
        let base = base.map(|oid| self.load_tree(oid)).transpose()?;
        let ours = self.load_tree(ours)?;
        let theirs = self.load_tree(theirs)?;

        let names: BTreeSet<BString> = base
            .iter()
            .chain([&ours, &theirs])
            .flat_map(|tree| tree.entries().iter().map(|e| BString::from(e.name().as_bytes())))
            .collect();

        let mut merged = Vec::with_capacity(names.len());
        for name in names {
            let b = base.as_ref().and_then(|t| t.get(&name));
            let o = ours.get(&name);
            let t = theirs.get(&name);

            let path = if prefix.is_empty() {
                name.to_string()
            } else {
                format!("{prefix}/{name}")
            };

            let resolved = if o == t || t == b {
                o.cloned()
            } else if o == b {
                t.cloned()
            } else {
                match (o, t) {
                    (Some(o), Some(t)) if o.mode().is_directory() && t.mode().is_directory() => {
                        let sub_base = b.filter(|b| b.mode().is_directory()).map(|b| *b.oid());
                        trace!(%path, "Merging subtree");
                        let oid = self.merge_level(
                            &path,
                            sub_base.as_ref(),
                            o.oid(),
                            t.oid(),
                            conflicts,
                        )?;
                        Some(TreeEntry::new(name.clone(), FileMode::DIRECTORY, oid))
                    }
                    (Some(o), Some(_)) => {
                        let reason = if b.is_some() { "content" } else { "add/add" };
                        conflicts.push(format!("CONFLICT ({reason}): Merge conflict in {path}"));
                        Some(o.clone())
                    }
                    (Some(kept), None) | (None, Some(kept)) => {
                        conflicts.push(format!(
                            "CONFLICT (modify/delete): {path} deleted in one side and modified \
                             in the other"
                        ));
                        Some(kept.clone())
                    }
                    (None, None) => None,
                }
            };

            merged.extend(resolved);
        }

        let tree = Tree::new(merged);
        self.write_object(ObjectKind::Tree, tree.body())
    }
}

impl ObjectStore for InMemoryStore {
    fn hash_object(&self, kind: ObjectKind, body: &[u8]) -> StoreResult<Oid> {
        Ok(object_id(kind, body))
    }

    fn write_object(&mut self, kind: ObjectKind, body: &[u8]) -> StoreResult<Oid> {
        let oid = object_id(kind, body);
        trace!(%oid, %kind, "Writing object to memory store");
        self.objects
            .entry(oid)
            .or_insert_with(|| (kind, body.to_vec()));
        self.writes.push(oid);
        Ok(oid)
    }

    fn read_object(&self, oid: &Oid, expected: Option<ObjectKind>) -> StoreResult<RawObject> {
        let (kind, body) = self.objects.get(oid).ok_or(StoreError::NotFound(*oid))?;
        match expected {
            Some(expected) if expected != *kind => Err(StoreError::UnexpectedKind {
                oid: *oid,
                expected,
                found: *kind,
            }),
            _ => Ok(RawObject {
                kind: *kind,
                body: body.clone(),
            }),
        }
    }

    fn object_kind(&self, oid: &Oid) -> StoreResult<ObjectKind> {
        self.objects
            .get(oid)
            .map(|(kind, _)| *kind)
            .ok_or(StoreError::NotFound(*oid))
    }

    fn commit_tree(&mut self, request: &CommitRequest<'_>) -> StoreResult<Oid> {
        if request.sign {
            return Err(StoreError::SigningUnavailable);
        }
        self.require(&request.tree, ObjectKind::Tree)?;
        for parent in request.parents {
            self.require(parent, ObjectKind::Commit)?;
        }

        let author = request.author.unwrap_or(&self.identity);
        let body = format_body(
            &request.tree,
            request.parents,
            author,
            &self.identity,
            None,
            request.message,
        );
        self.write_object(ObjectKind::Commit, &body)
    }

    fn merge_trees(&mut self, ours: &Oid, theirs: &Oid, base: &Oid) -> StoreResult<TreeMerge> {
        let mut conflicts = Vec::new();
        let oid = self.merge_level("", Some(base), ours, theirs, &mut conflicts)?;
        if conflicts.is_empty() {
            Ok(TreeMerge::Merged(oid))
        } else {
            Ok(TreeMerge::Conflict(conflicts.join("\n")))
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::timestamp::Timestamp;

    fn store() -> InMemoryStore {
        InMemoryStore::new(Signature::new(
            "C O Mitter",
            "committer@example.com",
            Timestamp::from_git("1658312300 +0000").unwrap(),
        ))
    }

    fn blob(store: &mut InMemoryStore, data: &[u8]) -> Oid {
        store.write_object(ObjectKind::Blob, data).unwrap()
    }

    fn tree(store: &mut InMemoryStore, entries: &[(&str, FileMode, Oid)]) -> Oid {
        let tree = Tree::new(
            entries
                .iter()
                .map(|(name, mode, oid)| TreeEntry::new(*name, *mode, *oid)),
        );
        store.write_object(ObjectKind::Tree, tree.body()).unwrap()
    }

    #[test]
    fn test_write_then_read() {
        let mut store = store();
        let oid = blob(&mut store, b"hello\n");
        assert_eq!(oid, store.hash_object(ObjectKind::Blob, b"hello\n").unwrap());
        assert_eq!(
            store.read_object(&oid, None).unwrap(),
            RawObject {
                kind: ObjectKind::Blob,
                body: b"hello\n".to_vec()
            }
        );
        assert_eq!(store.object_kind(&oid).unwrap(), ObjectKind::Blob);
    }

    #[test]
    fn test_rewrite_is_logged_but_stored_once() {
        let mut store = store();
        let first = blob(&mut store, b"x");
        let second = blob(&mut store, b"x");
        assert_eq!(first, second);
        assert_eq!(store.len(), 1);
        assert_eq!(store.writes(), [first, first]);
    }

    #[test]
    fn test_read_missing_and_wrong_kind() {
        let mut store = store();
        let oid = blob(&mut store, b"x");
        assert!(matches!(
            store.read_object(&Oid::hash(b"nope"), None),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.read_object(&oid, Some(ObjectKind::Tree)),
            Err(StoreError::UnexpectedKind {
                found: ObjectKind::Blob,
                ..
            })
        ));
    }

    #[test]
    fn test_commit_tree_uses_identity() {
        let mut store = store();
        let a = blob(&mut store, b"a");
        let root = tree(&mut store, &[("a", FileMode::REGULAR, a)]);
        let oid = store
            .commit_tree(&CommitRequest {
                tree: root,
                parents: &[],
                message: b"initial\n",
                author: None,
                sign: false,
            })
            .unwrap();

        let body = store.read_object(&oid, Some(ObjectKind::Commit)).unwrap().body;
        let expected = format!(
            "tree {root}\n\
             author C O Mitter <committer@example.com> 1658312300 +0000\n\
             committer C O Mitter <committer@example.com> 1658312300 +0000\n\
             \n\
             initial\n"
        );
        assert_eq!(body.as_bstr(), expected.as_bytes().as_bstr());
    }

    #[test]
    fn test_commit_tree_rejects_missing_tree_and_signing() {
        let mut store = store();
        let request = CommitRequest {
            tree: Oid::hash(b"missing"),
            parents: &[],
            message: b"m\n",
            author: None,
            sign: false,
        };
        assert!(matches!(
            store.commit_tree(&request),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.commit_tree(&CommitRequest {
                sign: true,
                ..request
            }),
            Err(StoreError::SigningUnavailable)
        ));
    }

    #[test]
    fn test_merge_disjoint_changes() {
        let mut store = store();
        let one = blob(&mut store, b"1");
        let two = blob(&mut store, b"2");
        let three = blob(&mut store, b"3");

        let base = tree(&mut store, &[("a", FileMode::REGULAR, one)]);
        let ours = tree(
            &mut store,
            &[("a", FileMode::REGULAR, one), ("b", FileMode::REGULAR, two)],
        );
        let theirs = tree(&mut store, &[("a", FileMode::REGULAR, three)]);

        let expected = tree(
            &mut store,
            &[("a", FileMode::REGULAR, three), ("b", FileMode::REGULAR, two)],
        );
        assert_eq!(
            store.merge_trees(&ours, &theirs, &base).unwrap(),
            TreeMerge::Merged(expected)
        );
    }

    #[test]
    fn test_merge_recurses_into_subtrees() {
        let mut store = store();
        let one = blob(&mut store, b"1");
        let two = blob(&mut store, b"2");

        let base_sub = tree(&mut store, &[("x", FileMode::REGULAR, one)]);
        let our_sub = tree(
            &mut store,
            &[("x", FileMode::REGULAR, one), ("y", FileMode::REGULAR, two)],
        );
        let their_sub = tree(
            &mut store,
            &[("x", FileMode::REGULAR, one), ("z", FileMode::REGULAR, two)],
        );

        let base = tree(&mut store, &[("d", FileMode::DIRECTORY, base_sub)]);
        let ours = tree(&mut store, &[("d", FileMode::DIRECTORY, our_sub)]);
        let theirs = tree(&mut store, &[("d", FileMode::DIRECTORY, their_sub)]);

        let merged_sub = tree(
            &mut store,
            &[
                ("x", FileMode::REGULAR, one),
                ("y", FileMode::REGULAR, two),
                ("z", FileMode::REGULAR, two),
            ],
        );
        let expected = tree(&mut store, &[("d", FileMode::DIRECTORY, merged_sub)]);
        assert_eq!(
            store.merge_trees(&ours, &theirs, &base).unwrap(),
            TreeMerge::Merged(expected)
        );
    }

    #[test]
    fn test_merge_conflicts_are_described() {
        let mut store = store();
        let one = blob(&mut store, b"1");
        let two = blob(&mut store, b"2");
        let three = blob(&mut store, b"3");

        let base_sub = tree(&mut store, &[("f", FileMode::REGULAR, one)]);
        let our_sub = tree(&mut store, &[("f", FileMode::REGULAR, two)]);
        let their_sub = tree(&mut store, &[("f", FileMode::REGULAR, three)]);

        let base = tree(
            &mut store,
            &[
                ("d", FileMode::DIRECTORY, base_sub),
                ("gone", FileMode::REGULAR, one),
            ],
        );
        let ours = tree(
            &mut store,
            &[
                ("d", FileMode::DIRECTORY, our_sub),
                ("gone", FileMode::REGULAR, two),
            ],
        );
        let theirs = tree(&mut store, &[("d", FileMode::DIRECTORY, their_sub)]);

        assert_eq!(
            store.merge_trees(&ours, &theirs, &base).unwrap(),
            TreeMerge::Conflict(
                "CONFLICT (content): Merge conflict in d/f\n\
                 CONFLICT (modify/delete): gone deleted in one side and modified in the other"
                    .to_owned()
            )
        );
    }
}
