use std::{
    fmt::{Debug, Display, LowerHex},
    ops::Deref,
    str::FromStr,
};

use hex::FromHexError;
use sha1::{Digest as _, Sha1};
use tap::Tap;

/// A git object id: the sha-1 of an object's framed content.
///
/// Two `Oid`s are equal exactly when their hex representations are equal.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Oid(pub [u8; 20]);

impl Oid {
    /// The null id, 0x00000...
    pub const NULL: Self = Oid([0; 20]);

    /// Hash the input bytes and return the resulting id.
    ///
    /// The caller is responsible for framing: object ids are computed over
    /// `"{kind} {len}\0{body}"`, see [`crate::storable::framed`].
    pub fn hash(bytes: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(bytes);
        let fin = hasher.finalize();
        let mut out = [0; 20];
        out.copy_from_slice(&fin);
        Oid(out)
    }

    /// Format the id as a hex string.
    ///
    /// Identical to `format!("{:x}", self)`.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Shorten an Oid, usually for display purposes.
    ///
    /// Note: This doesn't check for collisions.
    pub fn short(&self) -> String {
        self.to_hex().tap_mut(|x| x.truncate(7))
    }
}

impl Deref for Oid {
    type Target = [u8; 20];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl LowerHex for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Debug for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Oid({})", self.to_hex())
    }
}

impl FromStr for Oid {
    type Err = FromHexError;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        let bytes: [u8; 20] = bytes
            .try_into()
            .map_err(|_| FromHexError::InvalidStringLength)?;
        Ok(Oid(bytes))
    }
}

impl TryFrom<&[u8]> for Oid {
    type Error = FromHexError;

    /// Read a raw (binary, not hex) 20-byte id, as found in tree entries.
    fn try_from(raw: &[u8]) -> Result<Self, Self::Error> {
        let bytes: [u8; 20] = raw
            .try_into()
            .map_err(|_| FromHexError::InvalidStringLength)?;
        Ok(Oid(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha1() {
        const HASH_INPUT: &[u8] = b"Hello, World!";

        // `printf 'Hello, World!' | sha1sum` => 0a0a9f2a6772942557ab5355d76af442f8f65e01
        const HASH_OUTPUT: [u8; 20] = [
            0x0a, 0x0a, 0x9f, 0x2a, 0x67, 0x72, 0x94, 0x25, 0x57, 0xab, 0x53, 0x55, 0xd7, 0x6a,
            0xf4, 0x42, 0xf8, 0xf6, 0x5e, 0x01,
        ];

        let actual = Oid::hash(HASH_INPUT);
        assert_eq!(actual.0, HASH_OUTPUT);
        assert_eq!(actual.short(), "0a0a9f2");
    }

    #[test]
    fn test_from_str() {
        let valid = [
            "0a0a9f2a6772942557ab5355d76af442f8f65e01",
            "0A0A9F2A6772942557AB5355D76AF442F8F65E01",
            "0a0a9f2a6772942557ab5355D76AF442F8F65E01",
        ];

        let parsed = valid.map(|s| Oid::from_str(s).unwrap());
        assert!(parsed.iter().all(|oid| *oid == parsed[0]));
        assert_eq!(parsed[0].to_hex(), valid[0]);

        let invalid = [
            "hello world",
            "0j0a9f2a6772942557ab5355d76af442f8f65e01",
            "0a0a9f2a6772942557ab5355d76af442f8f65e01 ",
            " 0a0a9f2a6772942557ab5355d76af442f8f65e01",
            "0a0a9f2a6772942557ab5355d76af442f8f65e01\n",
            "0a0a9f2a6772942557ab5355d76af442f8f65e",
            "",
        ];

        for string in invalid {
            let _ = Oid::from_str(string).unwrap_err();
        }
    }

    #[test]
    fn test_raw_bytes() {
        let oid = Oid::hash(b"abc");
        assert_eq!(Oid::try_from(&oid[..]).unwrap(), oid);
        assert!(Oid::try_from(&oid[..19]).is_err());
    }
}
