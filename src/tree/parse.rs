use std::str;

use bstr::BString;

use crate::digest::Oid;
use crate::error::ParseError;
use crate::filemode::FileMode;
use crate::storable::PersistFlag;

use super::TreeEntry;

const OID_LEN: usize = 20;

impl super::Tree {
    /// Parse a tree body read from the store.
    ///
    /// The body is kept verbatim, so the tree keeps the id the store gave it.
    pub(crate) fn parse(oid: Oid, body: Vec<u8>) -> Result<Self, ParseError> {
        let mut entries = Vec::new();
        let mut rest = &body[..];

        while !rest.is_empty() {
            let offset = body.len() - rest.len();
            let (entry, len) = TreeEntry::parse(rest, offset)?;
            entries.push(entry);
            rest = &rest[len..];
        }

        Ok(Self {
            oid,
            body,
            entries,
            persisted: PersistFlag::new(true),
        })
    }
}

impl TreeEntry {
    /// Parses one entry from the front of `bytes`. Entries are of the form
    /// `<mode> <name>\0<oid>`. Returns the entry and the number of bytes consumed.
    fn parse(bytes: &[u8], offset: usize) -> Result<(Self, usize), ParseError> {
        let invalid = |reason| ParseError::InvalidTreeEntry { offset, reason };

        let space_idx = memchr::memchr(b' ', bytes).ok_or_else(|| invalid("missing mode"))?;
        let mode = str::from_utf8(&bytes[..space_idx])?;
        let mode = FileMode::from_octal(mode).ok_or_else(|| invalid("invalid mode"))?;

        let name_start = space_idx + 1;
        let nul_idx = memchr::memchr(b'\0', &bytes[name_start..])
            .map(|i| name_start + i)
            .ok_or_else(|| invalid("unterminated name"))?;
        if nul_idx == name_start {
            return Err(invalid("empty name"));
        }
        let name = BString::from(&bytes[name_start..nul_idx]);

        let oid_start = nul_idx + 1;
        let oid_end = oid_start + OID_LEN;
        let oid = bytes
            .get(oid_start..oid_end)
            .ok_or_else(|| invalid("truncated object id"))?;
        let oid = Oid::try_from(oid)?;

        Ok((Self { name, mode, oid }, oid_end))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::storable::{object_id, ObjectKind, Storable};
    use crate::tree::Tree;

    #[test]
    /// A tree built in memory and the same body parsed back agree on entries and id.
    fn test_parse_written_tree() {
        let blob = object_id(ObjectKind::Blob, b"x");
        let built = Tree::new([
            TreeEntry::new("a.txt", FileMode::REGULAR, blob),
            TreeEntry::new("bin", FileMode::DIRECTORY, Oid::hash(b"bin")),
            TreeEntry::new("run.sh", FileMode::EXECUTABLE, blob),
        ]);

        let parsed = Tree::parse(*built.oid(), built.body().to_vec()).unwrap();
        assert_eq!(parsed.entries(), built.entries());
        assert_eq!(object_id(ObjectKind::Tree, parsed.body()), *built.oid());
        assert!(parsed.is_persisted());
    }

    #[test]
    fn test_parse_empty() {
        let tree = Tree::parse(Oid::NULL, Vec::new()).unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn test_parse_truncated() {
        let mut body = b"100644 a.txt\0".to_vec();
        body.extend_from_slice(&[0xab; 12]);
        let err = Tree::parse(Oid::NULL, body).unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidTreeEntry {
                offset: 0,
                reason: "truncated object id"
            }
        ));
    }

    #[test]
    fn test_parse_bad_mode() {
        let mut body = b"10x644 a.txt\0".to_vec();
        body.extend_from_slice(&[0; 20]);
        assert!(Tree::parse(Oid::NULL, body).is_err());
    }
}
