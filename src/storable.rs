use std::cell::Cell;
use std::fmt::Display;
use std::rc::Rc;
use std::str::FromStr;

use crate::blob::Blob;
use crate::commit::Commit;
use crate::digest::Oid;
use crate::error::ParseError;
use crate::tree::Tree;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Blob,
    Tree,
    Commit,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Blob => "blob",
            ObjectKind::Tree => "tree",
            ObjectKind::Commit => "commit",
        }
    }
}

impl Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blob" => Ok(ObjectKind::Blob),
            "tree" => Ok(ObjectKind::Tree),
            "commit" => Ok(ObjectKind::Commit),
            other => Err(ParseError::UnknownKind(other.to_owned())),
        }
    }
}

/// Returns the body framed `"{kind} {len}\0{body}"`, which is what an object id hashes.
///
/// e.g. a blob `"hello\n"` becomes `"blob 6\0hello\n"`
pub fn framed(kind: ObjectKind, body: &[u8]) -> Vec<u8> {
    let header = format!("{} {}\0", kind, body.len());
    let mut out = Vec::with_capacity(header.len() + body.len());
    out.extend_from_slice(header.as_bytes());
    out.extend_from_slice(body);
    out
}

/// The id the object store assigns to `body` stored as `kind`.
pub fn object_id(kind: ObjectKind, body: &[u8]) -> Oid {
    Oid::hash(&framed(kind, body))
}

pub trait Storable {
    const KIND: ObjectKind;

    fn oid(&self) -> &Oid;

    /// The unframed object body, exactly as the store holds it.
    fn body(&self) -> &[u8];

    /// Ids this object references. Blobs reference nothing.
    fn dependencies(&self) -> Vec<Oid>;

    /// Whether the object is known to be durable in the store.
    fn is_persisted(&self) -> bool;

    fn formatted(&self) -> Vec<u8> {
        framed(Self::KIND, self.body())
    }
}

/// Durability flag shared by every object variant.
///
/// Starts `false` for objects built in memory and `true` for objects read back from the store,
/// and only ever moves from `false` to `true`.
#[derive(Debug, Default)]
pub(crate) struct PersistFlag(Cell<bool>);

impl PersistFlag {
    pub(crate) fn new(persisted: bool) -> Self {
        Self(Cell::new(persisted))
    }

    pub(crate) fn get(&self) -> bool {
        self.0.get()
    }

    pub(crate) fn set(&self) {
        self.0.set(true);
    }
}

/// Any object held by the repository cache.
///
/// Cloning is cheap and preserves identity: every clone refers to the same in-memory object.
#[derive(Debug, Clone)]
pub enum GitObject {
    Blob(Rc<Blob>),
    Tree(Rc<Tree>),
    Commit(Rc<Commit>),
}

impl GitObject {
    /// Decode a body read from the store. The result is marked persisted.
    pub(crate) fn parse(oid: Oid, kind: ObjectKind, body: Vec<u8>) -> Result<Self, ParseError> {
        Ok(match kind {
            ObjectKind::Blob => GitObject::Blob(Rc::new(Blob::loaded(oid, body))),
            ObjectKind::Tree => GitObject::Tree(Rc::new(Tree::parse(oid, body)?)),
            ObjectKind::Commit => GitObject::Commit(Rc::new(Commit::parse(oid, body)?)),
        })
    }

    pub fn kind(&self) -> ObjectKind {
        match self {
            GitObject::Blob(_) => ObjectKind::Blob,
            GitObject::Tree(_) => ObjectKind::Tree,
            GitObject::Commit(_) => ObjectKind::Commit,
        }
    }

    pub fn oid(&self) -> &Oid {
        match self {
            GitObject::Blob(b) => b.oid(),
            GitObject::Tree(t) => t.oid(),
            GitObject::Commit(c) => c.oid(),
        }
    }

    pub fn body(&self) -> &[u8] {
        match self {
            GitObject::Blob(b) => b.body(),
            GitObject::Tree(t) => t.body(),
            GitObject::Commit(c) => c.body(),
        }
    }

    pub fn dependencies(&self) -> Vec<Oid> {
        match self {
            GitObject::Blob(b) => b.dependencies(),
            GitObject::Tree(t) => t.dependencies(),
            GitObject::Commit(c) => c.dependencies(),
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.flag().get()
    }

    pub(crate) fn mark_persisted(&self) {
        self.flag().set()
    }

    fn flag(&self) -> &PersistFlag {
        match self {
            GitObject::Blob(b) => &b.persisted,
            GitObject::Tree(t) => &t.persisted,
            GitObject::Commit(c) => &c.persisted,
        }
    }

    pub fn as_blob(&self) -> Option<&Rc<Blob>> {
        if let Self::Blob(v) = self {
            Some(v)
        } else {
            None
        }
    }

    pub fn as_tree(&self) -> Option<&Rc<Tree>> {
        if let Self::Tree(v) = self {
            Some(v)
        } else {
            None
        }
    }

    pub fn as_commit(&self) -> Option<&Rc<Commit>> {
        if let Self::Commit(v) = self {
            Some(v)
        } else {
            None
        }
    }
}

impl From<Rc<Blob>> for GitObject {
    fn from(blob: Rc<Blob>) -> Self {
        GitObject::Blob(blob)
    }
}

impl From<Rc<Tree>> for GitObject {
    fn from(tree: Rc<Tree>) -> Self {
        GitObject::Tree(tree)
    }
}

impl From<Rc<Commit>> for GitObject {
    fn from(commit: Rc<Commit>) -> Self {
        GitObject::Commit(commit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framing() {
        assert_eq!(framed(ObjectKind::Blob, b"hello\n"), b"blob 6\0hello\n");
        assert_eq!(framed(ObjectKind::Tree, b""), b"tree 0\0");
    }

    #[test]
    /// `printf 'hello\n' | git hash-object --stdin` => ce013625030ba8dba906f756967f9e9ca394464a
    fn test_known_blob_id() {
        let expected: Oid = "ce013625030ba8dba906f756967f9e9ca394464a".parse().unwrap();
        assert_eq!(object_id(ObjectKind::Blob, b"hello\n"), expected);
    }

    #[test]
    /// The empty tree has a well known id.
    fn test_empty_tree_id() {
        let expected: Oid = "4b825dc642cb6eb9a060e54bf8d69288fbee4904".parse().unwrap();
        assert_eq!(object_id(ObjectKind::Tree, b""), expected);
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("commit".parse::<ObjectKind>().unwrap(), ObjectKind::Commit);
        assert!(matches!(
            "tag".parse::<ObjectKind>(),
            Err(ParseError::UnknownKind(k)) if k == "tag"
        ));
    }
}
