//! Structural hashing for BeaconDB.
//!
//! Object identifiers are tree hashes: every container hashes to the Merkle
//! root of its field roots, lists mix their length into the root, and leaf
//! values are packed into 32-byte chunks. Node hashing is BLAKE3 with a
//! fixed domain tag.
//!
//! All hashing wraps the `blake3` crate. No custom cryptography.

pub mod merkle;
pub mod tree_hash;

pub use merkle::{hash_pair, merkleize, mix_in_length, pack_bytes, zero_hash, BYTES_PER_CHUNK};
pub use tree_hash::{hash_byte_list, hash_byte_vector, hash_fields, TreeHash};
