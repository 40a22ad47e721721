use bdb_types::{Root, Signature};

use crate::merkle::{merkleize, mix_in_length, pack_bytes, BYTES_PER_CHUNK};

/// Structural hash of a value.
///
/// Two values share a tree hash root exactly when their structure and
/// contents are identical (up to the collision resistance of BLAKE3).
/// Containers implement this by hashing their fields with [`hash_fields`].
pub trait TreeHash {
    fn tree_hash_root(&self) -> Root;
}

impl TreeHash for u64 {
    fn tree_hash_root(&self) -> Root {
        let mut chunk = [0u8; BYTES_PER_CHUNK];
        chunk[..8].copy_from_slice(&self.to_le_bytes());
        Root::from_hash(chunk)
    }
}

impl TreeHash for bool {
    fn tree_hash_root(&self) -> Root {
        let mut chunk = [0u8; BYTES_PER_CHUNK];
        chunk[0] = u8::from(*self);
        Root::from_hash(chunk)
    }
}

impl TreeHash for Root {
    fn tree_hash_root(&self) -> Root {
        *self
    }
}

impl TreeHash for Signature {
    fn tree_hash_root(&self) -> Root {
        hash_byte_vector(self.as_bytes())
    }
}

impl<T: TreeHash> TreeHash for [T] {
    fn tree_hash_root(&self) -> Root {
        let roots: Vec<Root> = self.iter().map(TreeHash::tree_hash_root).collect();
        mix_in_length(&merkleize(&roots), self.len())
    }
}

impl<T: TreeHash> TreeHash for Vec<T> {
    fn tree_hash_root(&self) -> Root {
        self.as_slice().tree_hash_root()
    }
}

/// Root of a container given its field roots in declaration order.
pub fn hash_fields(fields: &[Root]) -> Root {
    merkleize(fields)
}

/// Root of a fixed-length byte vector.
pub fn hash_byte_vector(data: &[u8]) -> Root {
    merkleize(&pack_bytes(data))
}

/// Root of a variable-length byte list (length mixed in).
pub fn hash_byte_list(data: &[u8]) -> Root {
    mix_in_length(&hash_byte_vector(data), data.len())
}
