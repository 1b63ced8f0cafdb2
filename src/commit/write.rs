use crate::digest::Oid;

use super::Signature;

/// Serialize a commit body.
///
/// ```text
/// tree <oid>
/// parent <oid>        (zero or more)
/// author <signature>
/// committer <signature>
/// gpgsig <line>       (optional, continuation lines indented by one space)
///
/// <message>
/// ```
///
/// The message is written verbatim; cleaning it up is the caller's business.
pub(crate) fn body(
    tree_id: &Oid,
    parents: &[Oid],
    author: &Signature,
    committer: &Signature,
    gpgsig: Option<&[u8]>,
    message: &[u8],
) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(format!("tree {tree_id:x}\n").as_bytes());
    for parent in parents {
        out.extend_from_slice(format!("parent {parent:x}\n").as_bytes());
    }
    write_signature(&mut out, b"author", author);
    write_signature(&mut out, b"committer", committer);
    if let Some(sig) = gpgsig {
        out.extend_from_slice(b"gpgsig");
        for line in sig.split(|b| *b == b'\n') {
            out.push(b' ');
            out.extend_from_slice(line);
            out.push(b'\n');
        }
    }
    out.push(b'\n');
    out.extend_from_slice(message);
    out
}

fn write_signature(out: &mut Vec<u8>, header: &[u8], sig: &Signature) {
    out.extend_from_slice(header);
    out.push(b' ');
    out.extend_from_slice(&sig.name);
    out.extend_from_slice(b" <");
    out.extend_from_slice(&sig.email);
    out.extend_from_slice(b"> ");
    out.extend_from_slice(sig.when.to_string().as_bytes());
    out.push(b'\n');
}
