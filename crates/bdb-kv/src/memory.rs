use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{KvError, KvResult};
use crate::traits::{BatchOp, KvPair, RawStore, ScanRange};

/// In-memory, `BTreeMap`-based raw store.
///
/// Intended for tests and embedding. Keys are kept sorted so scans come out
/// in lexicographic order. Batches run under a single write lock and are
/// therefore atomic.
pub struct InMemoryRawStore {
    entries: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
    closed: AtomicBool,
}

impl InMemoryRawStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Number of keys currently stored.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns `true` if the store holds no keys.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Remove all keys.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Reject every subsequent operation with [`KvError::Closed`].
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        debug!("in-memory store closed");
    }

    fn ensure_open(&self) -> KvResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(KvError::Closed);
        }
        Ok(())
    }
}

impl Default for InMemoryRawStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RawStore for InMemoryRawStore {
    async fn get(&self, key: &[u8]) -> KvResult<Option<Vec<u8>>> {
        self.ensure_open()?;
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: Vec<u8>, value: Vec<u8>) -> KvResult<()> {
        self.ensure_open()?;
        self.entries.write().await.insert(key, value);
        Ok(())
    }

    async fn delete(&self, key: &[u8]) -> KvResult<()> {
        self.ensure_open()?;
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn batch(&self, ops: Vec<BatchOp>) -> KvResult<()> {
        self.ensure_open()?;
        let mut map = self.entries.write().await;
        for op in ops {
            match op {
                BatchOp::Put { key, value } => {
                    map.insert(key, value);
                }
                BatchOp::Delete { key } => {
                    map.remove(&key);
                }
            }
        }
        Ok(())
    }

    async fn scan(&self, range: ScanRange) -> KvResult<Vec<KvPair>> {
        self.ensure_open()?;
        let map = self.entries.read().await;

        let lower = match range.gte {
            Some(ref k) => Bound::Included(k.clone()),
            None => Bound::Unbounded,
        };
        let upper = match range.lt {
            Some(ref k) => Bound::Excluded(k.clone()),
            None => Bound::Unbounded,
        };
        if let (Bound::Included(lo), Bound::Excluded(hi)) = (&lower, &upper) {
            // BTreeMap::range panics on inverted bounds.
            if lo >= hi {
                return Ok(Vec::new());
            }
        }

        let limit = range.limit.unwrap_or(usize::MAX);
        let iter = map.range::<Vec<u8>, _>((lower, upper));
        let pairs: Vec<KvPair> = if range.reverse {
            iter.rev()
                .take(limit)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        } else {
            iter.take(limit)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        };
        Ok(pairs)
    }

    fn atomic_batches(&self) -> bool {
        true
    }
}

impl std::fmt::Debug for InMemoryRawStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRawStore")
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}
