//! Integer and hex helpers used by key encoding and diagnostics.

use crate::error::TypeError;

/// Byte order for [`int_to_bytes`] and [`bytes_to_int`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

/// Encode `value` into exactly `length` bytes.
///
/// The value is zero-padded up to `length`; lengths beyond 16 bytes are
/// padded with zeros on the high-order side. If `length` is too short to hold
/// the value, only the low-order `length` bytes are kept.
pub fn int_to_bytes(value: u128, length: usize, endianness: Endianness) -> Vec<u8> {
    let le = value.to_le_bytes();
    let mut out = vec![0u8; length];
    let n = length.min(le.len());
    out[..n].copy_from_slice(&le[..n]);
    if endianness == Endianness::Big {
        out.reverse();
    }
    out
}

/// Decode an unsigned integer of up to 16 bytes.
pub fn bytes_to_int(data: &[u8], endianness: Endianness) -> Result<u128, TypeError> {
    if data.len() > 16 {
        return Err(TypeError::IntegerOverflow(data.len()));
    }
    let mut le = [0u8; 16];
    match endianness {
        Endianness::Little => le[..data.len()].copy_from_slice(data),
        Endianness::Big => {
            for (i, b) in data.iter().rev().enumerate() {
                le[i] = *b;
            }
        }
    }
    Ok(u128::from_le_bytes(le))
}

/// `0x`-prefixed lowercase hex.
pub fn to_hex(data: &[u8]) -> String {
    format!("0x{}", hex::encode(data))
}

/// Parse hex with an optional `0x` prefix.
pub fn from_hex(s: &str) -> Result<Vec<u8>, TypeError> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(stripped).map_err(|e| TypeError::InvalidHex(e.to_string()))
}
