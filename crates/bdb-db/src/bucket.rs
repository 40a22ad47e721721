use std::collections::HashMap;
use std::fmt;

use bdb_config::ConfigError;
use bdb_kv::ScanRange;
use bdb_types::bytes::int_to_bytes;
use bdb_types::root::ROOT_LEN;
use bdb_types::{Endianness, Root};

/// Width of every bucket prefix.
pub const BUCKET_PREFIX_LEN: usize = 1;

/// A logical collection inside the raw store.
///
/// Discriminants are the prefix bytes. They are assigned once and never
/// reused, so gaps in the table are retired buckets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Bucket {
    StateArchive = 0,
    Block = 1,
    BlockArchive = 2,
    BlockArchiveParentRootIndex = 3,
    BlockArchiveRootIndex = 4,
    ChainInfo = 5,
    MainChain = 6,
    Eth1Data = 8,
    DepositData = 12,
    PendingBlock = 25,
    StateRoot = 26,
}

impl Bucket {
    /// Every bucket, in prefix order.
    pub const ALL: [Bucket; 11] = [
        Bucket::StateArchive,
        Bucket::Block,
        Bucket::BlockArchive,
        Bucket::BlockArchiveParentRootIndex,
        Bucket::BlockArchiveRootIndex,
        Bucket::ChainInfo,
        Bucket::MainChain,
        Bucket::Eth1Data,
        Bucket::DepositData,
        Bucket::PendingBlock,
        Bucket::StateRoot,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StateArchive => "state_archive",
            Self::Block => "block",
            Self::BlockArchive => "block_archive",
            Self::BlockArchiveParentRootIndex => "block_archive_parent_root_index",
            Self::BlockArchiveRootIndex => "block_archive_root_index",
            Self::ChainInfo => "chain_info",
            Self::MainChain => "main_chain",
            Self::Eth1Data => "eth1_data",
            Self::DepositData => "deposit_data",
            Self::PendingBlock => "pending_block",
            Self::StateRoot => "state_root",
        }
    }

    /// The key prefix of this bucket.
    pub fn prefix(self) -> [u8; BUCKET_PREFIX_LEN] {
        let bytes = int_to_bytes(self as u8 as u128, BUCKET_PREFIX_LEN, Endianness::Little);
        let mut prefix = [0u8; BUCKET_PREFIX_LEN];
        prefix.copy_from_slice(&bytes);
        prefix
    }

    /// Scan range covering exactly the keys of this bucket.
    pub fn key_range(self) -> ScanRange {
        let prefix = self.prefix().to_vec();
        ScanRange {
            lt: prefix_successor(&prefix),
            gte: Some(prefix),
            limit: None,
            reverse: false,
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Smallest key greater than every key starting with `prefix`, or `None`
/// when `prefix` is all `0xff`.
pub(crate) fn prefix_successor(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut next = prefix.to_vec();
    while let Some(last) = next.pop() {
        if last < u8::MAX {
            next.push(last + 1);
            return Some(next);
        }
    }
    None
}

/// Reject a bucket table in which two buckets share a prefix.
pub fn validate_bucket_table(buckets: &[Bucket]) -> Result<(), ConfigError> {
    let mut seen: HashMap<[u8; BUCKET_PREFIX_LEN], Bucket> = HashMap::new();
    for &bucket in buckets {
        if let Some(first) = seen.insert(bucket.prefix(), bucket) {
            return Err(ConfigError::DuplicateBucketPrefix {
                prefix: bucket.prefix()[0],
                first: first.to_string(),
                second: bucket.to_string(),
            });
        }
    }
    Ok(())
}

/// `prefix ++ id`.
pub fn encode_key(bucket: Bucket, id: &Root) -> Vec<u8> {
    let mut key = Vec::with_capacity(BUCKET_PREFIX_LEN + ROOT_LEN);
    key.extend_from_slice(&bucket.prefix());
    key.extend_from_slice(id.as_bytes());
    key
}

/// Recover the id from a key of `bucket`. `None` if the key belongs to another
/// bucket or is not `prefix ++ 32 bytes`.
pub fn decode_key(bucket: Bucket, key: &[u8]) -> Option<Root> {
    let rest = key.strip_prefix(bucket.prefix().as_slice())?;
    if rest.len() != ROOT_LEN {
        return None;
    }
    Root::from_slice(rest).ok()
}
