/// Errors raised while serializing a value.
///
/// Encoding fails before any bytes reach storage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// The value's own fork differs from the fork its slot resolves to.
    #[error("value built for fork {found} but slot resolves to fork {expected}")]
    ForkMismatch { expected: String, found: String },

    /// No schema is registered for the fork in force at the value's slot.
    #[error("no {entity} schema for fork {fork}")]
    UnsupportedFork { entity: &'static str, fork: String },

    /// A list field exceeds its maximum length.
    #[error("{field} has {len} elements, maximum is {max}")]
    ListTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    /// A fixed-length field has the wrong number of elements.
    #[error("{field} must have exactly {expected} elements, got {actual}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The encoding would not fit the 4-byte offset space.
    #[error("encoding of {0} bytes exceeds the offset range")]
    TooLarge(usize),
}

/// Errors raised while deserializing bytes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Input ends before a required field.
    #[error("input too short: need at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },

    /// Input length is incompatible with the expected layout.
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// The first offset does not point at the end of the fixed part.
    #[error("first offset {found} does not match fixed part length {expected}")]
    OffsetMismatch { expected: usize, found: usize },

    /// An offset points past the end of the input.
    #[error("offset {offset} out of bounds for input of {len} bytes")]
    OffsetOutOfBounds { offset: usize, len: usize },

    /// Offsets must be non-decreasing.
    #[error("offset {next} precedes previous offset {previous}")]
    OffsetsDecreasing { previous: usize, next: usize },

    /// A decoded list exceeds its maximum length.
    #[error("{field} has {len} elements, maximum is {max}")]
    ListTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    /// A byte pattern that no value encodes to.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// The slot embedded in the bytes resolves to a fork with no schema.
    #[error("no {entity} schema for fork {fork} (slot {slot})")]
    UnsupportedFork {
        entity: &'static str,
        fork: String,
        slot: u64,
    },
}
