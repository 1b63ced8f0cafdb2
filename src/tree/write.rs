use super::TreeEntry;

/// Serialize entries, already in git order, as `<mode> <name>\0<20 byte oid>` records.
pub(super) fn body(entries: &[TreeEntry]) -> Vec<u8> {
    let mut data = Vec::new();
    for entry in entries {
        data.extend_from_slice(format!("{:o}", entry.mode).as_bytes());
        data.push(b' ');
        data.extend_from_slice(&entry.name);
        data.push(b'\0');
        data.extend_from_slice(&*entry.oid);
    }
    data
}
