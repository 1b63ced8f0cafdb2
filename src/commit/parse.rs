use std::str::{self, FromStr};

use bstr::{BString, ByteSlice};
use memchr::memmem;
use once_cell::sync::Lazy;
use regex::bytes::Regex;

use crate::digest::Oid;
use crate::error::ParseError;
use crate::storable::PersistFlag;
use crate::timestamp::Timestamp;

use super::{Commit, Signature};

impl Commit {
    /// Parse a commit body read from the store.
    ///
    /// ## Example
    /// ```text
    /// tree 9375a50d54bf5374615a3378349e298761a4b116
    /// parent 3c1b6b2f0d0e1f4ab3c8a5a1e4a0e4c3b2a19f00
    /// author A U Thor <author@example.com> 1658312219 +0100
    /// committer C O Mitter <committer@example.com> 1658312219 +0100
    /// gpgsig -----BEGIN PGP SIGNATURE-----
    ///
    ///  iQEzBAABCAAdFiEEMLv/P6sLuz4ENfg8jo/2biro2XAFAmLX1h0ACgkQjo/2biro
    ///  =JO5C
    ///  -----END PGP SIGNATURE-----
    ///
    /// Add a.txt
    /// ```
    ///
    /// Headers this type doesn't model (`encoding`, `mergetag`, ...) are skipped. The body is
    /// kept verbatim, so they still count towards the id.
    pub(crate) fn parse(oid: Oid, body: Vec<u8>) -> Result<Self, ParseError> {
        let (headers, message) = match memmem::find(&body, b"\n\n") {
            Some(idx) => (&body[..idx], &body[idx + 2..]),
            None => (body.strip_suffix(b"\n").unwrap_or(&body), &[][..]),
        };

        let mut tree_id = None;
        let mut parents = Vec::new();
        let mut author = None;
        let mut committer = None;
        let mut gpgsig = None;

        for (key, value) in headers_of(headers)? {
            match key {
                b"tree" => tree_id = Some(parse_hex_oid(&value)?),
                b"parent" => parents.push(parse_hex_oid(&value)?),
                b"author" => author = Some(Signature::parse(&value)?),
                b"committer" => committer = Some(Signature::parse(&value)?),
                b"gpgsig" => gpgsig = Some(BString::from(value)),
                _ => {}
            }
        }

        let message = BString::from(message);

        Ok(Self {
            oid,
            tree_id: tree_id.ok_or(ParseError::MissingHeader("tree"))?,
            parents,
            author: author.ok_or(ParseError::MissingHeader("author"))?,
            committer: committer.ok_or(ParseError::MissingHeader("committer"))?,
            gpgsig,
            message,
            body,
            persisted: PersistFlag::new(true),
        })
    }
}

/// Split the header block into `(key, value)` pairs, folding continuation lines (those starting
/// with a space) into the value of the header above them.
fn headers_of(block: &[u8]) -> Result<Vec<(&[u8], Vec<u8>)>, ParseError> {
    let mut headers: Vec<(&[u8], Vec<u8>)> = Vec::new();

    for line in block.split(|b| *b == b'\n') {
        if let Some(continuation) = line.strip_prefix(b" ") {
            let (_, value) = headers
                .last_mut()
                .ok_or(ParseError::Malformed("continuation line before any header"))?;
            value.push(b'\n');
            value.extend_from_slice(continuation);
            continue;
        }
        let (key, value) = line
            .split_once_str(" ")
            .ok_or(ParseError::Malformed("header line without a value"))?;
        headers.push((key, value.to_vec()));
    }

    Ok(headers)
}

fn parse_hex_oid(value: &[u8]) -> Result<Oid, ParseError> {
    Ok(Oid::from_str(str::from_utf8(value)?)?)
}

impl Signature {
    /// Parse the value of a signature header.
    ///
    /// ## Example
    /// `A U Thor <author@example.com> 1658312219 +0100`
    pub(crate) fn parse(bytes: &[u8]) -> Result<Self, ParseError> {
        static REGEX: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"(?-u)^(.*?) ?<([^<>]*)> (-?[0-9]+ [+-][0-9]{4})$").unwrap()
        });

        let invalid = || ParseError::InvalidSignature(bytes.to_str_lossy().into_owned());

        let groups = REGEX.captures(bytes).ok_or_else(invalid)?;

        let when = str::from_utf8(&groups[3])?;
        let when = Timestamp::from_git(when).ok_or_else(invalid)?;

        Ok(Self {
            name: BString::from(&groups[1]),
            email: BString::from(&groups[2]),
            when,
        })
    }
}
