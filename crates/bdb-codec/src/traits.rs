use bytes::BufMut;

use bdb_types::{Root, Signature};

use crate::container::ContainerEncoder;
use crate::error::{DecodeError, EncodeError};

/// Width of an offset in the fixed part of a container.
pub const BYTES_PER_LENGTH_OFFSET: usize = 4;

/// Serialize into the container layout.
pub trait Encode {
    /// Whether every value of this type encodes to the same length.
    fn is_fixed_len() -> bool;

    /// Encoded length of fixed-size types. Meaningless for variable-size ones.
    fn fixed_len() -> usize {
        BYTES_PER_LENGTH_OFFSET
    }

    /// Exact encoded length of this value.
    fn encoded_len(&self) -> usize;

    /// Append the encoding of `self` to `buf`.
    fn encode_into(&self, buf: &mut Vec<u8>);

    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.encode_into(&mut buf);
        buf
    }
}

/// Deserialize from the container layout.
pub trait Decode: Sized {
    fn is_fixed_len() -> bool;

    fn fixed_len() -> usize {
        BYTES_PER_LENGTH_OFFSET
    }

    /// Decode exactly `bytes`; trailing input is an error.
    fn decode(bytes: &[u8]) -> Result<Self, DecodeError>;
}

/// Bytes a field of type `T` occupies in its container's fixed part.
pub fn fixed_part_len<T: Encode>() -> usize {
    if T::is_fixed_len() {
        T::fixed_len()
    } else {
        BYTES_PER_LENGTH_OFFSET
    }
}

/// Read a little-endian `u64` at `offset`.
pub fn read_u64_at(bytes: &[u8], offset: usize) -> Result<u64, DecodeError> {
    let end = offset + 8;
    let raw = bytes.get(offset..end).ok_or(DecodeError::TooShort {
        expected: end,
        actual: bytes.len(),
    })?;
    let mut arr = [0u8; 8];
    arr.copy_from_slice(raw);
    Ok(u64::from_le_bytes(arr))
}

/// Fail with [`EncodeError::ListTooLong`] if `len > max`.
pub fn check_list_len(field: &'static str, len: usize, max: usize) -> Result<(), EncodeError> {
    if len > max {
        return Err(EncodeError::ListTooLong { field, len, max });
    }
    Ok(())
}

fn expect_len(bytes: &[u8], expected: usize) -> Result<(), DecodeError> {
    if bytes.len() != expected {
        return Err(DecodeError::InvalidLength {
            expected,
            actual: bytes.len(),
        });
    }
    Ok(())
}

/// Element count of an encoded `Vec<T>`, read without decoding any element.
///
/// Fixed-size elements are counted from the byte length, variable-size ones
/// from the first offset. Malformed input is left for [`Decode`] to reject.
pub fn list_len<T: Decode>(bytes: &[u8]) -> Result<usize, DecodeError> {
    if bytes.is_empty() {
        return Ok(0);
    }
    if T::is_fixed_len() {
        Ok(bytes.len() / T::fixed_len().max(1))
    } else {
        Ok(read_offset(bytes, 0)? / BYTES_PER_LENGTH_OFFSET)
    }
}

macro_rules! impl_uint {
    ($ty:ty, $len:expr, $put:ident) => {
        impl Encode for $ty {
            fn is_fixed_len() -> bool {
                true
            }

            fn fixed_len() -> usize {
                $len
            }

            fn encoded_len(&self) -> usize {
                $len
            }

            fn encode_into(&self, buf: &mut Vec<u8>) {
                buf.$put(*self);
            }
        }

        impl Decode for $ty {
            fn is_fixed_len() -> bool {
                true
            }

            fn fixed_len() -> usize {
                $len
            }

            fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
                expect_len(bytes, $len)?;
                let mut arr = [0u8; $len];
                arr.copy_from_slice(bytes);
                Ok(<$ty>::from_le_bytes(arr))
            }
        }
    };
}

impl_uint!(u8, 1, put_u8);
impl_uint!(u32, 4, put_u32_le);
impl_uint!(u64, 8, put_u64_le);

impl Encode for bool {
    fn is_fixed_len() -> bool {
        true
    }

    fn fixed_len() -> usize {
        1
    }

    fn encoded_len(&self) -> usize {
        1
    }

    fn encode_into(&self, buf: &mut Vec<u8>) {
        buf.put_u8(u8::from(*self));
    }
}

impl Decode for bool {
    fn is_fixed_len() -> bool {
        true
    }

    fn fixed_len() -> usize {
        1
    }

    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        expect_len(bytes, 1)?;
        match bytes[0] {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(DecodeError::InvalidValue(format!("bool byte {other:#04x}"))),
        }
    }
}

impl Encode for Root {
    fn is_fixed_len() -> bool {
        true
    }

    fn fixed_len() -> usize {
        32
    }

    fn encoded_len(&self) -> usize {
        32
    }

    fn encode_into(&self, buf: &mut Vec<u8>) {
        buf.put_slice(self.as_bytes());
    }
}

impl Decode for Root {
    fn is_fixed_len() -> bool {
        true
    }

    fn fixed_len() -> usize {
        32
    }

    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        expect_len(bytes, 32)?;
        Root::from_slice(bytes).map_err(|e| DecodeError::InvalidValue(e.to_string()))
    }
}

impl Encode for Signature {
    fn is_fixed_len() -> bool {
        true
    }

    fn fixed_len() -> usize {
        96
    }

    fn encoded_len(&self) -> usize {
        96
    }

    fn encode_into(&self, buf: &mut Vec<u8>) {
        buf.put_slice(self.as_bytes());
    }
}

impl Decode for Signature {
    fn is_fixed_len() -> bool {
        true
    }

    fn fixed_len() -> usize {
        96
    }

    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        expect_len(bytes, 96)?;
        Signature::from_slice(bytes).map_err(|e| DecodeError::InvalidValue(e.to_string()))
    }
}

/// Lists: fixed-size elements are concatenated; variable-size elements are
/// preceded by an offset table.
impl<T: Encode> Encode for Vec<T> {
    fn is_fixed_len() -> bool {
        false
    }

    fn encoded_len(&self) -> usize {
        if T::is_fixed_len() {
            self.len() * T::fixed_len()
        } else {
            self.iter()
                .map(|item| BYTES_PER_LENGTH_OFFSET + item.encoded_len())
                .sum()
        }
    }

    fn encode_into(&self, buf: &mut Vec<u8>) {
        if T::is_fixed_len() {
            for item in self {
                item.encode_into(buf);
            }
        } else {
            let mut encoder = ContainerEncoder::new(buf, self.len() * BYTES_PER_LENGTH_OFFSET);
            for item in self {
                encoder.append(item);
            }
            encoder.finalize();
        }
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn is_fixed_len() -> bool {
        false
    }

    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.is_empty() {
            return Ok(Vec::new());
        }

        if T::is_fixed_len() {
            let width = T::fixed_len();
            if bytes.len() % width != 0 {
                return Err(DecodeError::InvalidLength {
                    expected: bytes.len() - bytes.len() % width,
                    actual: bytes.len(),
                });
            }
            return bytes.chunks(width).map(T::decode).collect();
        }

        let first = read_offset(bytes, 0)?;
        if first % BYTES_PER_LENGTH_OFFSET != 0 || first == 0 {
            return Err(DecodeError::InvalidValue(format!(
                "list offset table length {first} is not a positive multiple of 4"
            )));
        }
        if first > bytes.len() {
            return Err(DecodeError::OffsetOutOfBounds {
                offset: first,
                len: bytes.len(),
            });
        }

        let count = first / BYTES_PER_LENGTH_OFFSET;
        let mut offsets = Vec::with_capacity(count + 1);
        offsets.push(first);
        for i in 1..count {
            let offset = read_offset(bytes, i * BYTES_PER_LENGTH_OFFSET)?;
            let previous = offsets[i - 1];
            if offset < previous {
                return Err(DecodeError::OffsetsDecreasing {
                    previous,
                    next: offset,
                });
            }
            if offset > bytes.len() {
                return Err(DecodeError::OffsetOutOfBounds {
                    offset,
                    len: bytes.len(),
                });
            }
            offsets.push(offset);
        }
        offsets.push(bytes.len());

        offsets
            .windows(2)
            .map(|w| T::decode(&bytes[w[0]..w[1]]))
            .collect()
    }
}

pub(crate) fn read_offset(bytes: &[u8], at: usize) -> Result<usize, DecodeError> {
    let end = at + BYTES_PER_LENGTH_OFFSET;
    let raw = bytes.get(at..end).ok_or(DecodeError::TooShort {
        expected: end,
        actual: bytes.len(),
    })?;
    let mut arr = [0u8; BYTES_PER_LENGTH_OFFSET];
    arr.copy_from_slice(raw);
    Ok(u32::from_le_bytes(arr) as usize)
}
