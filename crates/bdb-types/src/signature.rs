use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::bytes;
use crate::error::TypeError;

/// Length in bytes of a [`Signature`].
pub const SIGNATURE_LEN: usize = 96;

/// Opaque compressed signature.
///
/// Signatures are carried and stored verbatim. Nothing in BeaconDB verifies
/// them; they are excluded from object identifiers.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; SIGNATURE_LEN]);

impl Signature {
    /// Wrap raw signature bytes.
    pub const fn new(bytes: [u8; SIGNATURE_LEN]) -> Self {
        Self(bytes)
    }

    /// The all-zero signature, used for unsigned or test values.
    pub const fn empty() -> Self {
        Self([0u8; SIGNATURE_LEN])
    }

    /// Copy a signature out of a slice that must be exactly 96 bytes long.
    pub fn from_slice(data: &[u8]) -> Result<Self, TypeError> {
        let arr: [u8; SIGNATURE_LEN] =
            data.try_into().map_err(|_| TypeError::InvalidLength {
                expected: SIGNATURE_LEN,
                actual: data.len(),
            })?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        bytes::to_hex(&self.0)
    }
}

impl Default for Signature {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}..)", hex::encode(&self.0[..4]))
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let raw = bytes::from_hex(&s).map_err(serde::de::Error::custom)?;
        Self::from_slice(&raw).map_err(serde::de::Error::custom)
    }
}
