use std::sync::OnceLock;

use bdb_types::Root;

/// Width of a Merkle leaf.
pub const BYTES_PER_CHUNK: usize = 32;

/// Deepest tree supported by the zero-hash cache (2^64 leaves).
const MAX_DEPTH: usize = 64;

/// Hash two sibling nodes into their parent.
pub fn hash_pair(left: &Root, right: &Root) -> Root {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"bdb-merkle-v1:");
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    Root::from_hash(*hasher.finalize().as_bytes())
}

/// Root of a perfect subtree of the given depth whose leaves are all zero.
///
/// `zero_hash(0)` is the zero chunk itself.
pub fn zero_hash(depth: usize) -> Root {
    static ZERO_HASHES: OnceLock<Vec<Root>> = OnceLock::new();
    let hashes = ZERO_HASHES.get_or_init(|| {
        let mut hashes = Vec::with_capacity(MAX_DEPTH + 1);
        hashes.push(Root::zero());
        for d in 0..MAX_DEPTH {
            let next = hash_pair(&hashes[d], &hashes[d]);
            hashes.push(next);
        }
        hashes
    });
    hashes[depth.min(MAX_DEPTH)]
}

/// Merkle root of `chunks`, virtually padded with zero chunks up to the next
/// power of two.
///
/// An empty list produces the zero chunk. A single chunk is its own root.
pub fn merkleize(chunks: &[Root]) -> Root {
    if chunks.is_empty() {
        return Root::zero();
    }

    let mut current = chunks.to_vec();
    let mut depth = 0;
    while current.len() > 1 {
        let mut next = Vec::with_capacity((current.len() + 1) / 2);
        for pair in current.chunks(2) {
            let hash = if pair.len() == 2 {
                hash_pair(&pair[0], &pair[1])
            } else {
                // Odd node: its sibling is an all-zero subtree.
                hash_pair(&pair[0], &zero_hash(depth))
            };
            next.push(hash);
        }
        current = next;
        depth += 1;
    }
    current[0]
}

/// Mix a list length into a Merkle root so that lists differing only in
/// trailing zero elements hash differently.
pub fn mix_in_length(root: &Root, length: usize) -> Root {
    let mut chunk = [0u8; BYTES_PER_CHUNK];
    chunk[..8].copy_from_slice(&(length as u64).to_le_bytes());
    hash_pair(root, &Root::from_hash(chunk))
}

/// Split bytes into 32-byte chunks, right-padding the last one with zeros.
pub fn pack_bytes(data: &[u8]) -> Vec<Root> {
    data.chunks(BYTES_PER_CHUNK)
        .map(|piece| {
            let mut chunk = [0u8; BYTES_PER_CHUNK];
            chunk[..piece.len()].copy_from_slice(piece);
            Root::from_hash(chunk)
        })
        .collect()
}
