//! Commit message cleanup, applied before a message is handed to
//! [`crate::repo::ObjectRepository::commit_tree`].

use std::fmt::Display;
use std::str::FromStr;

use bstr::ByteSlice;

/// The comment marker used when none is configured.
pub const DEFAULT_COMMENT: &str = "#";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupMode {
    /// Leave the message untouched.
    None,
    /// Trim trailing whitespace from every line.
    Space,
    /// Drop comment lines, trim trailing whitespace, collapse runs of blank lines, and end with
    /// exactly one newline.
    All,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown cleanup mode {0:?}, expected one of none, space, all")]
pub struct UnknownCleanupMode(String);

impl FromStr for CleanupMode {
    type Err = UnknownCleanupMode;

    /// Accepts git's `commit.cleanup` names as well. `whitespace` is read as
    /// [`CleanupMode::Space`], which only trims line ends. git's `whitespace` also collapses runs
    /// of blank lines and drops leading and trailing ones; here those survive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "verbatim" => Ok(CleanupMode::None),
            "space" | "whitespace" => Ok(CleanupMode::Space),
            "all" | "strip" => Ok(CleanupMode::All),
            _ => Err(UnknownCleanupMode(s.to_owned())),
        }
    }
}

impl Display for CleanupMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            CleanupMode::None => "none",
            CleanupMode::Space => "space",
            CleanupMode::All => "all",
        })
    }
}

/// Clean up `message` according to `mode`. No mode behaves like [`CleanupMode::Space`].
///
/// `comment` is the marker that starts a comment line under [`CleanupMode::All`], defaulting to
/// [`DEFAULT_COMMENT`].
pub fn cleanup_message(
    message: &[u8],
    mode: Option<CleanupMode>,
    comment: Option<&str>,
) -> Vec<u8> {
    match mode.unwrap_or(CleanupMode::Space) {
        CleanupMode::None => message.to_vec(),
        CleanupMode::Space => trim_line_ends(message),
        CleanupMode::All => strip(message, comment.unwrap_or(DEFAULT_COMMENT).as_bytes()),
    }
}

/// Trailing whitespace goes, everything else (blank lines, the final newline or lack of one)
/// stays.
fn trim_line_ends(message: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(message.len());
    for (i, line) in message.split(|b| *b == b'\n').enumerate() {
        if i > 0 {
            out.push(b'\n');
        }
        out.extend_from_slice(line.trim_end());
    }
    out
}

fn strip(message: &[u8], comment: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(message.len());
    let mut pending_blank = false;

    for line in message.lines() {
        if !comment.is_empty() && line.starts_with(comment) {
            continue;
        }
        let line = line.trim_end();
        if line.is_empty() {
            pending_blank = !out.is_empty();
            continue;
        }
        if pending_blank {
            out.push(b'\n');
            pending_blank = false;
        }
        out.extend_from_slice(line);
        out.push(b'\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn clean(message: &str, mode: Option<CleanupMode>) -> String {
        String::from_utf8(cleanup_message(message.as_bytes(), mode, None)).unwrap()
    }

    #[test]
    fn test_all() {
        assert_eq!(
            clean("# note\n\nHello\n\n\nWorld\n\n", Some(CleanupMode::All)),
            "Hello\n\nWorld\n"
        );
    }

    #[test]
    fn test_all_adds_trailing_newline_and_trims() {
        assert_eq!(
            clean("Subject  \n\t\n\nBody\t", Some(CleanupMode::All)),
            "Subject\n\nBody\n"
        );
        assert_eq!(clean("# only a comment\n", Some(CleanupMode::All)), "");
    }

    #[test]
    fn test_all_custom_comment() {
        let out = cleanup_message(b"; drop me\n# keep me\n", Some(CleanupMode::All), Some(";"));
        assert_eq!(out.as_bstr(), "# keep me\n");
    }

    #[test]
    fn test_none_is_verbatim() {
        let message = "# note  \n\n\nx \n\n";
        assert_eq!(clean(message, Some(CleanupMode::None)), message);
    }

    #[test]
    fn test_space_and_absent_only_trim_line_ends() {
        let message = "# note  \n\n\nHello \t\n\n";
        let expected = "# note\n\n\nHello\n\n";
        assert_eq!(clean(message, Some(CleanupMode::Space)), expected);
        assert_eq!(clean(message, None), expected);
        assert_eq!(clean("no newline  ", None), "no newline");
    }

    #[test]
    fn test_mode_names() {
        assert_eq!("verbatim".parse::<CleanupMode>().unwrap(), CleanupMode::None);
        assert_eq!("whitespace".parse::<CleanupMode>().unwrap(), CleanupMode::Space);
        assert_eq!("STRIP".parse::<CleanupMode>().unwrap(), CleanupMode::All);
        assert!("scissors".parse::<CleanupMode>().is_err());
    }

    #[test]
    fn test_whitespace_keeps_blank_lines() {
        let mode = "whitespace".parse::<CleanupMode>().ok();
        assert_eq!(clean("\n# note \n\n\nBody\n\n", mode), "\n# note\n\n\nBody\n\n");
    }
}
