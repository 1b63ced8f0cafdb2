use std::fmt::Display;

use chrono::{DateTime, FixedOffset, TimeZone};

/// A point in time as git records it: unix seconds plus the author's utc offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(pub DateTime<FixedOffset>);

impl Timestamp {
    /// Build a timestamp from unix seconds and an offset east of utc, in minutes.
    pub fn from_unix(secs: i64, offset_minutes: i32) -> Option<Self> {
        let offset = FixedOffset::east_opt(offset_minutes * 60)?;
        offset.timestamp_opt(secs, 0).single().map(Self)
    }

    /// Parse a timestamp from a unix + HH + mm offset, e.g. `1658312219 +0100`.
    pub fn from_git(s: &str) -> Option<Self> {
        let (secs, offset) = s.trim().split_once(' ')?;
        let secs: i64 = secs.parse().ok()?;
        if offset.len() != 5 || !offset.is_ascii() {
            return None;
        }
        let (sign, digits) = offset.split_at(1);
        let sign = match sign {
            "+" => 1,
            "-" => -1,
            _ => return None,
        };
        let hours: i32 = digits[..2].parse().ok()?;
        let minutes: i32 = digits[2..].parse().ok()?;
        Self::from_unix(secs, sign * (hours * 60 + minutes))
    }

    pub fn unix(&self) -> i64 {
        self.0.timestamp()
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.0.timestamp(), self.0.format("%z"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn git_format_round_trip() {
        for input in ["1658312219 +0100", "0 +0000", "1700000000 -0530"] {
            let ts = Timestamp::from_git(input).unwrap();
            assert_eq!(ts.to_string(), input);
        }
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(Timestamp::from_git("yesterday"), None);
        assert_eq!(Timestamp::from_git("1658312219"), None);
        assert_eq!(Timestamp::from_git("1658312219 0100"), None);
    }

    #[test]
    fn from_unix() {
        let ts = Timestamp::from_unix(1658312219, 60).unwrap();
        assert_eq!(ts.unix(), 1658312219);
        assert_eq!(ts.to_string(), "1658312219 +0100");
    }
}
