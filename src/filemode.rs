use crate::storable::ObjectKind;

/// The mode of a tree entry, as written in the tree body in octal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct FileMode(pub u32);

impl std::fmt::Octal for FileMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:o}", self.0)
    }
}

impl FileMode {
    pub const DIRECTORY: FileMode = FileMode(0o040000);
    pub const EXECUTABLE: FileMode = FileMode(0o100755);
    pub const REGULAR: FileMode = FileMode(0o100644);
    pub const SYMLINK: FileMode = FileMode(0o120000);
    pub const GITLINK: FileMode = FileMode(0o160000);

    const TYPE_MASK: u32 = 0o170000;

    pub fn is_executable(self) -> bool {
        self.0 & 0o100 != 0
    }

    pub fn is_directory(self) -> bool {
        self.0 & Self::TYPE_MASK == Self::DIRECTORY.0
    }

    /// The kind of object an entry with this mode points at.
    ///
    /// Submodule entries (gitlinks) name a commit that lives in another repository.
    pub fn entry_kind(self) -> ObjectKind {
        match self.0 & Self::TYPE_MASK {
            m if m == Self::DIRECTORY.0 => ObjectKind::Tree,
            m if m == Self::GITLINK.0 => ObjectKind::Commit,
            _ => ObjectKind::Blob,
        }
    }

    /// Parse the octal mode string found in a tree entry, e.g. `"100644"` or `"40000"`.
    pub fn from_octal(s: &str) -> Option<Self> {
        u32::from_str_radix(s, 8).ok().map(FileMode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_kinds() {
        assert_eq!(FileMode::REGULAR.entry_kind(), ObjectKind::Blob);
        assert_eq!(FileMode::EXECUTABLE.entry_kind(), ObjectKind::Blob);
        assert_eq!(FileMode::SYMLINK.entry_kind(), ObjectKind::Blob);
        assert_eq!(FileMode::DIRECTORY.entry_kind(), ObjectKind::Tree);
        assert_eq!(FileMode::GITLINK.entry_kind(), ObjectKind::Commit);
    }

    #[test]
    fn octal_round_trip() {
        assert_eq!(FileMode::from_octal("40000"), Some(FileMode::DIRECTORY));
        assert_eq!(format!("{:o}", FileMode::DIRECTORY), "40000");
        assert_eq!(format!("{:o}", FileMode::REGULAR), "100644");
        assert!(FileMode::EXECUTABLE.is_executable());
        assert!(!FileMode::REGULAR.is_executable());
        assert_eq!(FileMode::from_octal("10x644"), None);
    }
}
