mod parse;
mod write;

pub(crate) use write::body as format_body;

use bstr::{BStr, BString, ByteSlice};

use crate::digest::Oid;
use crate::storable::{object_id, ObjectKind, PersistFlag, Storable};
use crate::timestamp::Timestamp;

/// An identity line of a commit: `Name <email> 1658312219 +0100`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: BString,
    pub email: BString,
    pub when: Timestamp,
}

impl Signature {
    pub fn new(name: impl Into<BString>, email: impl Into<BString>, when: Timestamp) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            when,
        }
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}> {}", self.name, self.email, self.when)
    }
}

#[derive(Debug)]
pub struct Commit {
    oid: Oid,
    body: Vec<u8>,
    tree_id: Oid,
    parents: Vec<Oid>,
    author: Signature,
    committer: Signature,
    gpgsig: Option<BString>,
    message: BString,
    pub(crate) persisted: PersistFlag,
}

impl Commit {
    /// Build a commit in memory. It is not persisted until the repository writes it.
    pub(crate) fn new(
        tree_id: Oid,
        parents: Vec<Oid>,
        author: Signature,
        committer: Signature,
        message: impl Into<BString>,
        gpgsig: Option<BString>,
    ) -> Self {
        let message = message.into();
        let body = write::body(
            &tree_id,
            &parents,
            &author,
            &committer,
            gpgsig.as_ref().map(|s| s.as_bytes()),
            &message,
        );

        Self {
            oid: object_id(ObjectKind::Commit, &body),
            body,
            tree_id,
            parents,
            author,
            committer,
            gpgsig,
            message,
            persisted: PersistFlag::new(false),
        }
    }

    pub fn tree_id(&self) -> &Oid {
        &self.tree_id
    }

    pub fn parents(&self) -> &[Oid] {
        self.parents.as_ref()
    }

    pub fn author(&self) -> &Signature {
        &self.author
    }

    pub fn committer(&self) -> &Signature {
        &self.committer
    }

    /// The detached signature carried in the `gpgsig` header, if any.
    pub fn gpgsig(&self) -> Option<&BStr> {
        self.gpgsig.as_ref().map(|s| s.as_bstr())
    }

    pub fn message(&self) -> &BStr {
        self.message.as_bstr()
    }

    /// First line of the message.
    pub fn summary(&self) -> &BStr {
        self.message.lines().next().unwrap_or_default().as_bstr()
    }
}

impl Storable for Commit {
    const KIND: ObjectKind = ObjectKind::Commit;

    fn oid(&self) -> &Oid {
        &self.oid
    }

    fn body(&self) -> &[u8] {
        &self.body
    }

    /// Parents first, then the tree.
    fn dependencies(&self) -> Vec<Oid> {
        let mut deps = self.parents.clone();
        deps.push(self.tree_id);
        deps
    }

    fn is_persisted(&self) -> bool {
        self.persisted.get()
    }
}
