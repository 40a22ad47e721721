use async_trait::async_trait;

use crate::error::KvResult;

/// A key-value pair returned by [`RawStore::scan`].
pub type KvPair = (Vec<u8>, Vec<u8>);

/// One write inside a [`RawStore::batch`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BatchOp {
    Put { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}

impl BatchOp {
    pub fn key(&self) -> &[u8] {
        match self {
            Self::Put { key, .. } | Self::Delete { key } => key,
        }
    }
}

/// Key bounds and paging for [`RawStore::scan`].
///
/// The range is `gte <= key < lt`. Either bound may be open.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanRange {
    /// Inclusive lower bound.
    pub gte: Option<Vec<u8>>,
    /// Exclusive upper bound.
    pub lt: Option<Vec<u8>>,
    /// Return at most this many pairs.
    pub limit: Option<usize>,
    /// Walk keys in descending order.
    pub reverse: bool,
}

impl ScanRange {
    pub fn new(gte: Vec<u8>, lt: Vec<u8>) -> Self {
        Self {
            gte: Some(gte),
            lt: Some(lt),
            limit: None,
            reverse: false,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn reversed(mut self) -> Self {
        self.reverse = true;
        self
    }

    /// Returns `true` if `key` falls inside the bounds.
    pub fn contains(&self, key: &[u8]) -> bool {
        if let Some(ref gte) = self.gte {
            if key < gte.as_slice() {
                return false;
            }
        }
        if let Some(ref lt) = self.lt {
            if key >= lt.as_slice() {
                return false;
            }
        }
        true
    }
}

/// Ordered byte-key to byte-value storage.
///
/// Implementations must satisfy these invariants:
/// - `scan` yields pairs in lexicographic key order (descending if
///   `reverse`), restricted to the requested range.
/// - A `put` or `delete` of a single key is atomic.
/// - `delete` of an absent key is `Ok(())`.
/// - `batch` applies its operations in order. If [`atomic_batches`] returns
///   `false`, a failure part-way may leave a prefix of the batch applied.
///
/// Operations are async because a backend may suspend on I/O. Callers hold
/// no locks across these calls.
///
/// [`atomic_batches`]: RawStore::atomic_batches
#[async_trait]
pub trait RawStore: Send + Sync {
    /// Read the value at `key`. Returns `Ok(None)` if absent.
    async fn get(&self, key: &[u8]) -> KvResult<Option<Vec<u8>>>;

    /// Insert or overwrite the value at `key`.
    async fn put(&self, key: Vec<u8>, value: Vec<u8>) -> KvResult<()>;

    /// Remove `key`. Absent keys are not an error.
    async fn delete(&self, key: &[u8]) -> KvResult<()>;

    /// Apply several writes.
    ///
    /// Default implementation applies each operation individually and is
    /// therefore not atomic. Backends with native batches should override
    /// this and [`atomic_batches`](RawStore::atomic_batches).
    async fn batch(&self, ops: Vec<BatchOp>) -> KvResult<()> {
        for op in ops {
            match op {
                BatchOp::Put { key, value } => self.put(key, value).await?,
                BatchOp::Delete { key } => self.delete(&key).await?,
            }
        }
        Ok(())
    }

    /// Read one page of pairs inside `range`.
    async fn scan(&self, range: ScanRange) -> KvResult<Vec<KvPair>>;

    /// Whether [`batch`](RawStore::batch) is all-or-nothing.
    fn atomic_batches(&self) -> bool {
        false
    }

    /// Check whether `key` exists.
    async fn contains(&self, key: &[u8]) -> KvResult<bool> {
        Ok(self.get(key).await?.is_some())
    }
}
