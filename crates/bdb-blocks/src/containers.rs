//! Leaf containers shared by several block body versions.

use bdb_codec::{Decode, DecodeError, Encode};
use bdb_crypto::{hash_byte_list, hash_byte_vector, TreeHash};
use bdb_types::{Epoch, Root, Signature};

/// Width of the sync committee participation bitfield, in bytes.
pub const SYNC_COMMITTEE_BITS_LEN: usize = 64;
/// Maximum voluntary exits per block body.
pub const MAX_VOLUNTARY_EXITS: usize = 16;
/// Maximum transactions per execution payload.
pub const MAX_TRANSACTIONS_PER_PAYLOAD: usize = 1024;
/// Maximum length of one opaque transaction.
pub const MAX_BYTES_PER_TRANSACTION: usize = 1 << 20;

/// Vote on the state of the deposit contract.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Eth1Data {
    pub deposit_root: Root,
    pub deposit_count: u64,
    pub block_hash: Root,
}

impl_container!(Eth1Data {
    deposit_root: Root,
    deposit_count: u64,
    block_hash: Root,
});

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VoluntaryExit {
    pub epoch: Epoch,
    pub validator_index: u64,
}

impl_container!(VoluntaryExit {
    epoch: u64,
    validator_index: u64,
});

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignedVoluntaryExit {
    pub message: VoluntaryExit,
    pub signature: Signature,
}

impl_container!(SignedVoluntaryExit {
    message: VoluntaryExit,
    signature: Signature,
});

/// Fixed-width participation bitfield of the sync committee.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncCommitteeBits(pub [u8; SYNC_COMMITTEE_BITS_LEN]);

impl SyncCommitteeBits {
    /// Bitfield with the given participant indices set.
    pub fn with_participants(indices: &[usize]) -> Self {
        let mut bits = [0u8; SYNC_COMMITTEE_BITS_LEN];
        for &i in indices {
            if i < SYNC_COMMITTEE_BITS_LEN * 8 {
                bits[i / 8] |= 1 << (i % 8);
            }
        }
        Self(bits)
    }

    pub fn num_participants(&self) -> usize {
        self.0.iter().map(|b| b.count_ones() as usize).sum()
    }
}

impl Default for SyncCommitteeBits {
    fn default() -> Self {
        Self([0u8; SYNC_COMMITTEE_BITS_LEN])
    }
}

impl Encode for SyncCommitteeBits {
    fn is_fixed_len() -> bool {
        true
    }

    fn fixed_len() -> usize {
        SYNC_COMMITTEE_BITS_LEN
    }

    fn encoded_len(&self) -> usize {
        SYNC_COMMITTEE_BITS_LEN
    }

    fn encode_into(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.0);
    }
}

impl Decode for SyncCommitteeBits {
    fn is_fixed_len() -> bool {
        true
    }

    fn fixed_len() -> usize {
        SYNC_COMMITTEE_BITS_LEN
    }

    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let bits: [u8; SYNC_COMMITTEE_BITS_LEN] =
            bytes.try_into().map_err(|_| DecodeError::InvalidLength {
                expected: SYNC_COMMITTEE_BITS_LEN,
                actual: bytes.len(),
            })?;
        Ok(Self(bits))
    }
}

impl TreeHash for SyncCommitteeBits {
    fn tree_hash_root(&self) -> Root {
        hash_byte_vector(&self.0)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncAggregate {
    pub sync_committee_bits: SyncCommitteeBits,
    pub sync_committee_signature: Signature,
}

impl_container!(SyncAggregate {
    sync_committee_bits: SyncCommitteeBits,
    sync_committee_signature: Signature,
});

/// An opaque execution-layer transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transaction(pub Vec<u8>);

impl Encode for Transaction {
    fn is_fixed_len() -> bool {
        false
    }

    fn encoded_len(&self) -> usize {
        self.0.len()
    }

    fn encode_into(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.0);
    }
}

impl Decode for Transaction {
    fn is_fixed_len() -> bool {
        false
    }

    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() > MAX_BYTES_PER_TRANSACTION {
            return Err(DecodeError::ListTooLong {
                field: "transaction",
                len: bytes.len(),
                max: MAX_BYTES_PER_TRANSACTION,
            });
        }
        Ok(Self(bytes.to_vec()))
    }
}

impl TreeHash for Transaction {
    fn tree_hash_root(&self) -> Root {
        hash_byte_list(&self.0)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExecutionPayload {
    pub parent_hash: Root,
    pub state_root: Root,
    pub block_number: u64,
    pub gas_limit: u64,
    pub timestamp: u64,
    pub block_hash: Root,
    pub transactions: Vec<Transaction>,
}

impl_container!(ExecutionPayload {
    parent_hash: Root,
    state_root: Root,
    block_number: u64,
    gas_limit: u64,
    timestamp: u64,
    block_hash: Root,
    transactions: Vec<Transaction> [max = MAX_TRANSACTIONS_PER_PAYLOAD],
});
