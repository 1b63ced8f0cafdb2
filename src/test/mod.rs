
use std::io;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use crate::commit::{Commit, Signature};
use crate::digest::Oid;
use crate::filemode::FileMode;
use crate::repo::ObjectRepository;
use crate::storable::Storable;
use crate::store::InMemoryStore;
use crate::timestamp::Timestamp;
use crate::tree::TreeEntry;

pub const AUTHOR_NAME: &str = "A U Thor";
pub const AUTHOR_EMAIL: &str = "author@example.com";
pub const COMMITTER_NAME: &str = "C O Mitter";
pub const COMMITTER_EMAIL: &str = "committer@example.com";

pub fn author() -> Signature {
    Signature::new(
        AUTHOR_NAME,
        AUTHOR_EMAIL,
        Timestamp::from_git("1658312219 +0100").unwrap(),
    )
}

pub fn committer() -> Signature {
    Signature::new(
        COMMITTER_NAME,
        COMMITTER_EMAIL,
        Timestamp::from_git("1658400000 +0000").unwrap(),
    )
}

pub fn memory_repo() -> ObjectRepository<InMemoryStore> {
    ObjectRepository::new(InMemoryStore::new(committer()))
}

/// A regular file entry.
pub fn file_entry(name: &str, oid: &Oid) -> TreeEntry {
    TreeEntry::new(name, FileMode::REGULAR, *oid)
}

/// Build and persist a linear history of `messages.len()` commits on top of `parent`, each
/// adding one file named after its index. Returns the commits oldest first.
pub fn linear_history(
    repo: &mut ObjectRepository<InMemoryStore>,
    parent: Option<Oid>,
    messages: &[&str],
) -> Vec<Rc<Commit>> {
    let mut entries = Vec::new();
    let mut parents: Vec<Oid> = parent.into_iter().collect();
    let mut commits = Vec::new();

    for (i, message) in messages.iter().enumerate() {
        let blob = repo.create_blob(format!("contents of {i}\n"));
        entries.push(file_entry(&format!("file{i}"), blob.oid()));
        let tree = repo.create_tree(entries.clone());
        let commit = repo.create_commit(*tree.oid(), parents, author(), committer(), *message);
        repo.persist_object(&commit.clone().into()).unwrap();

        parents = vec![*commit.oid()];
        commits.push(commit);
    }

    commits
}

/// A log sink shared between the subscriber and the test that reads it back.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with every event on this thread formatted into a string, without colours.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8_lossy(&buffer.0.lock().unwrap()).into_owned();
    (result, logs)
}
