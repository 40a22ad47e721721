//! Binary container layout for BeaconDB entities.
//!
//! Every container serializes as a fixed part followed by a variable part.
//! Fixed-size fields are written inline; each variable-size field occupies a
//! 4-byte little-endian offset in the fixed part pointing at its bytes in the
//! variable part. Because the fixed part of a container never moves, a field
//! declared before any variable field sits at the same byte offset in every
//! version of a container. Schema inference relies on that property.
//!
//! Decoding is strict: trailing bytes, overlapping or out-of-range offsets,
//! and short input are all errors, never silently tolerated.

pub mod container;
pub mod error;
pub mod traits;

pub use container::{ContainerDecoder, ContainerDecoderBuilder, ContainerEncoder};
pub use error::{DecodeError, EncodeError};
pub use traits::{
    check_list_len, fixed_part_len, list_len, read_u64_at, Decode, Encode, BYTES_PER_LENGTH_OFFSET,
};
