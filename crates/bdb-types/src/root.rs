use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::bytes;
use crate::error::TypeError;

/// Length in bytes of a [`Root`].
pub const ROOT_LEN: usize = 32;

/// 32-byte structural hash identifying a stored object.
///
/// A `Root` is produced by tree-hashing the content-defining part of an
/// entity. Identical content always produces the same `Root`. Because roots
/// are fixed-width, ordering roots byte-wise is the same as ordering the
/// storage keys that embed them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Root([u8; ROOT_LEN]);

impl Root {
    /// Wrap a pre-computed hash.
    pub const fn from_hash(hash: [u8; ROOT_LEN]) -> Self {
        Self(hash)
    }

    /// The all-zero root. Used as padding in merkleization and as the
    /// "no parent" marker for genesis.
    pub const fn zero() -> Self {
        Self([0u8; ROOT_LEN])
    }

    /// Returns `true` if every byte is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ROOT_LEN]
    }

    /// Copy a root out of a slice that must be exactly 32 bytes long.
    pub fn from_slice(data: &[u8]) -> Result<Self, TypeError> {
        let arr: [u8; ROOT_LEN] = data.try_into().map_err(|_| TypeError::InvalidLength {
            expected: ROOT_LEN,
            actual: data.len(),
        })?;
        Ok(Self(arr))
    }

    /// The raw 32 bytes.
    pub fn as_bytes(&self) -> &[u8; ROOT_LEN] {
        &self.0
    }

    /// `0x`-prefixed hex representation.
    pub fn to_hex(&self) -> String {
        bytes::to_hex(&self.0)
    }

    /// Short hex representation (first 8 hex characters, no prefix).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a hex string, with or without the `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        Self::from_slice(&bytes::from_hex(s)?)
    }
}

impl fmt::Debug for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Root({})", self.short_hex())
    }
}

impl fmt::Display for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl AsRef<[u8]> for Root {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; ROOT_LEN]> for Root {
    fn from(bytes: [u8; ROOT_LEN]) -> Self {
        Self(bytes)
    }
}

impl From<Root> for [u8; ROOT_LEN] {
    fn from(root: Root) -> Self {
        root.0
    }
}

impl Serialize for Root {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Root {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
