mod parse;
mod write;

use std::cmp::Ordering;
use std::collections::BTreeMap;

use bstr::{BStr, BString, ByteSlice};

use crate::digest::Oid;
use crate::filemode::FileMode;
use crate::storable::{object_id, ObjectKind, PersistFlag, Storable};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    name: BString,
    mode: FileMode,
    oid: Oid,
}

impl TreeEntry {
    pub fn new(name: impl Into<BString>, mode: FileMode, oid: Oid) -> Self {
        Self {
            name: name.into(),
            mode,
            oid,
        }
    }

    pub fn name(&self) -> &BStr {
        self.name.as_bstr()
    }

    pub fn mode(&self) -> FileMode {
        self.mode
    }

    pub fn oid(&self) -> &Oid {
        &self.oid
    }

    /// The kind of object this entry points at, implied by its mode.
    pub fn kind(&self) -> ObjectKind {
        self.mode.entry_kind()
    }

    /// Git orders tree entries by name, with subtrees compared as if their name ended in `/`.
    fn git_cmp(&self, other: &Self) -> Ordering {
        let key = |e: &Self| {
            e.name
                .iter()
                .copied()
                .chain(e.mode.is_directory().then_some(b'/'))
                .collect::<Vec<u8>>()
        };
        key(self).cmp(&key(other))
    }
}

/// A directory listing: filename -> `{mode, oid}`.
#[derive(Debug)]
pub struct Tree {
    oid: Oid,
    body: Vec<u8>,
    entries: Vec<TreeEntry>,
    pub(crate) persisted: PersistFlag,
}

impl Tree {
    /// Build a tree in memory from entries in any order.
    ///
    /// When two entries share a name the later one wins.
    pub(crate) fn new(entries: impl IntoIterator<Item = TreeEntry>) -> Self {
        let by_name: BTreeMap<BString, TreeEntry> = entries
            .into_iter()
            .map(|entry| (entry.name.clone(), entry))
            .collect();
        let mut entries: Vec<TreeEntry> = by_name.into_values().collect();
        entries.sort_by(TreeEntry::git_cmp);

        let body = write::body(&entries);

        Self {
            oid: object_id(ObjectKind::Tree, &body),
            body,
            entries,
            persisted: PersistFlag::new(false),
        }
    }

    /// Entries in git order.
    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    pub fn get(&self, name: impl AsRef<[u8]>) -> Option<&TreeEntry> {
        let name = name.as_ref();
        self.entries.iter().find(|e| e.name.as_bytes() == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Storable for Tree {
    const KIND: ObjectKind = ObjectKind::Tree;

    fn oid(&self) -> &Oid {
        &self.oid
    }

    fn body(&self) -> &[u8] {
        &self.body
    }

    fn dependencies(&self) -> Vec<Oid> {
        let mut deps: Vec<Oid> = self.entries.iter().map(|e| e.oid).collect();
        deps.sort_unstable();
        deps.dedup();
        deps
    }

    fn is_persisted(&self) -> bool {
        self.persisted.get()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn blob_oid(data: &[u8]) -> Oid {
        object_id(ObjectKind::Blob, data)
    }

    #[test]
    /// `a.txt` sorts before the subtree `a` because the subtree compares as `a/`, and `.` < `/`.
    fn test_git_order() {
        let tree = Tree::new([
            TreeEntry::new("b", FileMode::REGULAR, blob_oid(b"b")),
            TreeEntry::new("a", FileMode::DIRECTORY, Oid::hash(b"sub")),
            TreeEntry::new("a.txt", FileMode::REGULAR, blob_oid(b"a")),
            TreeEntry::new("a-b", FileMode::REGULAR, blob_oid(b"ab")),
        ]);
        let names: Vec<_> = tree.entries().iter().map(|e| e.name().to_string()).collect();
        assert_eq!(names, ["a-b", "a.txt", "a", "b"]);
    }

    #[test]
    fn test_duplicate_names_keep_last() {
        let first = blob_oid(b"first");
        let second = blob_oid(b"second");
        let tree = Tree::new([
            TreeEntry::new("f", FileMode::REGULAR, first),
            TreeEntry::new("f", FileMode::EXECUTABLE, second),
        ]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get("f").map(|e| *e.oid()), Some(second));
        assert_eq!(tree.get("f").map(|e| e.mode()), Some(FileMode::EXECUTABLE));
    }

    #[test]
    /// `mkdir t && cd t && git init -q && printf 'x' > a.txt && git add a.txt && git write-tree`
    /// => 9375a50d54bf5374615a3378349e298761a4b116
    fn test_known_tree_id() {
        let tree = Tree::new([TreeEntry::new("a.txt", FileMode::REGULAR, blob_oid(b"x"))]);
        assert_eq!(
            tree.oid().to_hex(),
            "9375a50d54bf5374615a3378349e298761a4b116"
        );
    }

    #[test]
    fn test_dependencies_are_entry_oids() {
        let shared = blob_oid(b"same");
        let sub = Oid::hash(b"subtree");
        let tree = Tree::new([
            TreeEntry::new("one", FileMode::REGULAR, shared),
            TreeEntry::new("two", FileMode::REGULAR, shared),
            TreeEntry::new("dir", FileMode::DIRECTORY, sub),
        ]);
        let mut expected = vec![shared, sub];
        expected.sort_unstable();
        assert_eq!(tree.dependencies(), expected);
        assert_eq!(tree.get("dir").map(TreeEntry::kind), Some(ObjectKind::Tree));
    }
}
