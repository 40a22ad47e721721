use std::ops::Range;

use bytes::BufMut;

use crate::error::DecodeError;
use crate::traits::{list_len, read_offset, Decode, Encode, BYTES_PER_LENGTH_OFFSET};

/// Writes a container: fixed fields inline, variable fields deferred behind
/// offsets.
///
/// `fixed_len` must equal the sum of [`fixed_part_len`](crate::fixed_part_len)
/// over all fields that will be appended.
pub struct ContainerEncoder<'a> {
    buf: &'a mut Vec<u8>,
    fixed_len: usize,
    variable: Vec<u8>,
}

impl<'a> ContainerEncoder<'a> {
    pub fn new(buf: &'a mut Vec<u8>, fixed_len: usize) -> Self {
        Self {
            buf,
            fixed_len,
            variable: Vec::new(),
        }
    }

    /// Append the next field in declaration order.
    pub fn append<T: Encode + ?Sized>(&mut self, item: &T) {
        if T::is_fixed_len() {
            item.encode_into(self.buf);
        } else {
            let offset = self.fixed_len + self.variable.len();
            self.buf.put_u32_le(offset as u32);
            item.encode_into(&mut self.variable);
        }
    }

    /// Flush deferred variable fields after the fixed part.
    pub fn finalize(self) {
        self.buf.extend_from_slice(&self.variable);
    }
}

enum Field {
    Fixed(Range<usize>),
    Variable(usize),
}

/// Collects the field layout of a container before decoding it.
///
/// Register every field in declaration order, then [`build`](Self::build)
/// validates the offset table and yields a [`ContainerDecoder`].
pub struct ContainerDecoderBuilder<'a> {
    bytes: &'a [u8],
    fields: Vec<Field>,
    cursor: usize,
}

impl<'a> ContainerDecoderBuilder<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            fields: Vec::new(),
            cursor: 0,
        }
    }

    pub fn register<T: Decode>(&mut self) -> Result<(), DecodeError> {
        if T::is_fixed_len() {
            let end = self.cursor + T::fixed_len();
            if end > self.bytes.len() {
                return Err(DecodeError::TooShort {
                    expected: end,
                    actual: self.bytes.len(),
                });
            }
            self.fields.push(Field::Fixed(self.cursor..end));
            self.cursor = end;
        } else {
            self.register_variable()?;
        }
        Ok(())
    }

    /// Register a variable-size field whose type is only known at decode
    /// time. Read it back with [`ContainerDecoder::next_bytes`].
    pub fn register_variable(&mut self) -> Result<(), DecodeError> {
        let offset = read_offset(self.bytes, self.cursor)?;
        self.fields.push(Field::Variable(offset));
        self.cursor += BYTES_PER_LENGTH_OFFSET;
        Ok(())
    }

    pub fn build(self) -> Result<ContainerDecoder<'a>, DecodeError> {
        let len = self.bytes.len();
        let fixed_end = self.cursor;

        let offsets: Vec<usize> = self
            .fields
            .iter()
            .filter_map(|f| match f {
                Field::Variable(offset) => Some(*offset),
                Field::Fixed(_) => None,
            })
            .collect();

        match offsets.first() {
            None if len != fixed_end => {
                return Err(DecodeError::InvalidLength {
                    expected: fixed_end,
                    actual: len,
                });
            }
            Some(&first) if first != fixed_end => {
                return Err(DecodeError::OffsetMismatch {
                    expected: fixed_end,
                    found: first,
                });
            }
            _ => {}
        }
        for pair in offsets.windows(2) {
            if pair[1] < pair[0] {
                return Err(DecodeError::OffsetsDecreasing {
                    previous: pair[0],
                    next: pair[1],
                });
            }
        }
        if let Some(&last) = offsets.last() {
            if last > len {
                return Err(DecodeError::OffsetOutOfBounds { offset: last, len });
            }
        }

        // Each variable field runs until the next variable field's offset,
        // the last one until the end of input.
        let mut ends = offsets.iter().skip(1).copied().chain(std::iter::once(len));
        let ranges = self
            .fields
            .into_iter()
            .map(|f| match f {
                Field::Fixed(range) => range,
                Field::Variable(start) => start..ends.next().unwrap_or(len),
            })
            .collect();

        Ok(ContainerDecoder {
            bytes: self.bytes,
            ranges,
            next: 0,
        })
    }
}

/// Decodes registered fields one at a time, in declaration order.
pub struct ContainerDecoder<'a> {
    bytes: &'a [u8],
    ranges: Vec<Range<usize>>,
    next: usize,
}

impl<'a> ContainerDecoder<'a> {
    pub fn decode_next<T: Decode>(&mut self) -> Result<T, DecodeError> {
        T::decode(self.next_bytes()?)
    }

    /// Decode the next field as a list of at most `max` elements.
    ///
    /// The count is checked before any element is decoded.
    pub fn decode_list_next<T: Decode>(
        &mut self,
        field: &'static str,
        max: usize,
    ) -> Result<Vec<T>, DecodeError> {
        let bytes = self.next_bytes()?;
        let len = list_len::<T>(bytes)?;
        if len > max {
            return Err(DecodeError::ListTooLong { field, len, max });
        }
        Vec::<T>::decode(bytes)
    }

    /// The raw bytes of the next field.
    pub fn next_bytes(&mut self) -> Result<&'a [u8], DecodeError> {
        let range = self
            .ranges
            .get(self.next)
            .cloned()
            .ok_or_else(|| DecodeError::InvalidValue("no more registered fields".into()))?;
        self.next += 1;
        Ok(&self.bytes[range])
    }
}
