use std::collections::VecDeque;
use std::sync::Arc;

use bdb_codec::{DecodeError, EncodeError};
use bdb_crypto::TreeHash;
use bdb_kv::{BatchOp, KvPair, RawStore, ScanRange};
use bdb_types::Root;
use tracing::{debug, warn};

use crate::bucket::{decode_key, encode_key, Bucket};
use crate::entity::Entity;
use crate::error::{DbError, DbResult};
use crate::schema::SchemaRegistry;

/// Default number of records a [`RepositoryCursor`] fetches per scan.
pub const DEFAULT_PAGE_SIZE: usize = 256;

/// Keys fetched per scan while looking for the first or last id.
const EDGE_PAGE_SIZE: usize = 16;

/// Filter over ids for ranged reads.
///
/// The range is `gte <= id < lt`, in byte order of the ids.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IdRange {
    pub gte: Option<Root>,
    pub lt: Option<Root>,
    pub limit: Option<usize>,
    pub reverse: bool,
}

impl IdRange {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn reversed(mut self) -> Self {
        self.reverse = true;
        self
    }

    fn to_scan(&self, bucket: Bucket) -> ScanRange {
        let mut range = bucket.key_range();
        if let Some(ref gte) = self.gte {
            range.gte = Some(encode_key(bucket, gte));
        }
        if let Some(ref lt) = self.lt {
            range.lt = Some(encode_key(bucket, lt));
        }
        range.limit = self.limit;
        range.reverse = self.reverse;
        range
    }
}

/// Content-addressed storage of one entity kind inside one bucket.
///
/// Records live at `bucket prefix ++ id`, where the id is the tree hash root
/// of [`Entity::content`]. Values are encoded with the schema of their own
/// slot and decoded by inspecting the stored bytes, so no version tag is
/// stored.
///
/// The repository holds no cache and no locks; concurrent writers of the
/// same id are ordered by the raw store.
pub struct Repository<T: Entity, S: RawStore> {
    bucket: Bucket,
    registry: SchemaRegistry<T>,
    store: Arc<S>,
}

impl<T: Entity, S: RawStore> Repository<T, S> {
    pub fn new(bucket: Bucket, registry: SchemaRegistry<T>, store: Arc<S>) -> Self {
        Self {
            bucket,
            registry,
            store,
        }
    }

    pub fn bucket(&self) -> Bucket {
        self.bucket
    }

    pub fn registry(&self) -> &SchemaRegistry<T> {
        &self.registry
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Object id of `value`.
    pub fn id_of(&self, value: &T) -> Root {
        value.content().tree_hash_root()
    }

    pub fn encode(&self, value: &T) -> Result<Vec<u8>, EncodeError> {
        self.registry.encode(value)
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<T, DecodeError> {
        self.registry.decode(bytes)
    }

    fn decode_record(&self, id: Root, bytes: &[u8]) -> DbResult<T> {
        self.decode(bytes)
            .map_err(|source| DbError::Decode { id, source })
    }

    // ---- Single-record operations ----

    /// Store `value` under its id, replacing any previous record.
    ///
    /// Nothing is written if encoding fails.
    pub async fn put(&self, value: &T) -> DbResult<Root> {
        let id = self.id_of(value);
        let bytes = self.encode(value)?;
        self.store.put(encode_key(self.bucket, &id), bytes).await?;
        debug!(bucket = %self.bucket, id = %id.short_hex(), slot = value.slot(), "put");
        Ok(id)
    }

    /// Store already-encoded bytes under `id`.
    ///
    /// The caller asserts that `bytes` encode a value whose id is `id`.
    pub async fn put_binary(&self, id: &Root, bytes: Vec<u8>) -> DbResult<()> {
        self.store.put(encode_key(self.bucket, id), bytes).await?;
        Ok(())
    }

    pub async fn get(&self, id: &Root) -> DbResult<Option<T>> {
        match self.store.get(&encode_key(self.bucket, id)).await? {
            Some(bytes) => self.decode_record(*id, &bytes).map(Some),
            None => Ok(None),
        }
    }

    /// The stored bytes under `id`, without decoding.
    pub async fn get_binary(&self, id: &Root) -> DbResult<Option<Vec<u8>>> {
        Ok(self.store.get(&encode_key(self.bucket, id)).await?)
    }

    pub async fn has(&self, id: &Root) -> DbResult<bool> {
        Ok(self.store.contains(&encode_key(self.bucket, id)).await?)
    }

    /// Remove the record under `id`. Absent ids are a no-op.
    pub async fn delete(&self, id: &Root) -> DbResult<()> {
        self.store.delete(&encode_key(self.bucket, id)).await?;
        debug!(bucket = %self.bucket, id = %id.short_hex(), "delete");
        Ok(())
    }

    // ---- Batches ----

    /// Store several values in one raw-store batch.
    ///
    /// Every value is encoded before anything is written. The write itself is
    /// atomic only if the store reports [`RawStore::atomic_batches`].
    pub async fn batch_put(&self, values: &[T]) -> DbResult<Vec<Root>> {
        let mut ids = Vec::with_capacity(values.len());
        let mut ops = Vec::with_capacity(values.len());
        for value in values {
            let id = self.id_of(value);
            ops.push(BatchOp::Put {
                key: encode_key(self.bucket, &id),
                value: self.encode(value)?,
            });
            ids.push(id);
        }
        self.write_batch(ops).await?;
        Ok(ids)
    }

    pub async fn batch_delete(&self, ids: &[Root]) -> DbResult<()> {
        let ops = ids
            .iter()
            .map(|id| BatchOp::Delete {
                key: encode_key(self.bucket, id),
            })
            .collect();
        self.write_batch(ops).await
    }

    async fn write_batch(&self, ops: Vec<BatchOp>) -> DbResult<()> {
        if ops.is_empty() {
            return Ok(());
        }
        if !self.store.atomic_batches() {
            debug!(bucket = %self.bucket, ops = ops.len(), "store batches are not atomic");
        }
        let count = ops.len();
        self.store.batch(ops).await?;
        debug!(bucket = %self.bucket, ops = count, "batch written");
        Ok(())
    }

    // ---- Enumeration ----

    async fn scan(&self, range: &IdRange) -> DbResult<Vec<(Root, Vec<u8>)>> {
        let pairs = self.store.scan(range.to_scan(self.bucket)).await?;
        Ok(self.filter_keys(pairs))
    }

    fn filter_keys(&self, pairs: Vec<KvPair>) -> Vec<(Root, Vec<u8>)> {
        pairs
            .into_iter()
            .filter_map(|(key, value)| match decode_key(self.bucket, &key) {
                Some(id) => Some((id, value)),
                None => {
                    warn!(bucket = %self.bucket, key_len = key.len(), "skipping malformed key");
                    None
                }
            })
            .collect()
    }

    /// Every id in the bucket, ascending.
    pub async fn keys(&self) -> DbResult<Vec<Root>> {
        self.keys_in(&IdRange::all()).await
    }

    /// Every value in the bucket, in id order.
    pub async fn values(&self) -> DbResult<Vec<T>> {
        self.values_in(&IdRange::all()).await
    }

    /// Every `(id, value)` in the bucket, in id order.
    pub async fn entries(&self) -> DbResult<Vec<(Root, T)>> {
        self.scan(&IdRange::all())
            .await?
            .into_iter()
            .map(|(id, bytes)| Ok((id, self.decode_record(id, &bytes)?)))
            .collect()
    }

    pub async fn keys_in(&self, range: &IdRange) -> DbResult<Vec<Root>> {
        Ok(self.scan(range).await?.into_iter().map(|(id, _)| id).collect())
    }

    pub async fn values_in(&self, range: &IdRange) -> DbResult<Vec<T>> {
        self.scan(range)
            .await?
            .into_iter()
            .map(|(id, bytes)| self.decode_record(id, &bytes))
            .collect()
    }

    /// Smallest id in the bucket.
    pub async fn first_key(&self) -> DbResult<Option<Root>> {
        self.edge_key(false).await
    }

    /// Largest id in the bucket.
    pub async fn last_key(&self) -> DbResult<Option<Root>> {
        self.edge_key(true).await
    }

    /// First well-formed id in scan order. Malformed keys are paged past.
    async fn edge_key(&self, reverse: bool) -> DbResult<Option<Root>> {
        let mut range = self.bucket.key_range().with_limit(EDGE_PAGE_SIZE);
        range.reverse = reverse;
        loop {
            let pairs = self.store.scan(range.clone()).await?;
            let full = pairs.len() == EDGE_PAGE_SIZE;
            let boundary = pairs.last().map(|(key, _)| key.clone());
            if let Some((id, _)) = self.filter_keys(pairs).into_iter().next() {
                return Ok(Some(id));
            }
            match boundary {
                Some(key) if full && reverse => range.lt = Some(key),
                Some(key) if full => range.gte = Some(key_successor(key)),
                _ => return Ok(None),
            }
        }
    }

    pub async fn count(&self) -> DbResult<usize> {
        Ok(self.scan(&IdRange::all()).await?.len())
    }

    /// A lazy cursor over the bucket in ascending id order.
    pub fn cursor(&self) -> RepositoryCursor<'_, T, S> {
        RepositoryCursor {
            repo: self,
            page_size: DEFAULT_PAGE_SIZE,
            scanned: None,
            buffer: VecDeque::new(),
            exhausted: false,
        }
    }
}

impl<T: Entity, S: RawStore> std::fmt::Debug for Repository<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("entity", &T::NAME)
            .field("bucket", &self.bucket)
            .finish_non_exhaustive()
    }
}

/// Smallest key strictly greater than `key`.
fn key_successor(mut key: Vec<u8>) -> Vec<u8> {
    key.push(0);
    key
}

/// Pages through a repository's bucket one scan at a time.
///
/// The cursor reads the live store: records written or deleted before the
/// end of the last fetched page are not seen, those after it are.
/// Malformed keys are skipped without ending the walk.
pub struct RepositoryCursor<'a, T: Entity, S: RawStore> {
    repo: &'a Repository<T, S>,
    page_size: usize,
    /// Last raw key fetched, well-formed or not.
    scanned: Option<Vec<u8>>,
    buffer: VecDeque<(Root, Vec<u8>)>,
    exhausted: bool,
}

impl<'a, T: Entity, S: RawStore> RepositoryCursor<'a, T, S> {
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Next `(id, value)`, or `None` at the end of the bucket.
    pub async fn next_entry(&mut self) -> DbResult<Option<(Root, T)>> {
        match self.next_raw().await? {
            Some((id, bytes)) => Ok(Some((id, self.repo.decode_record(id, &bytes)?))),
            None => Ok(None),
        }
    }

    /// Next id, without decoding its value.
    pub async fn next_key(&mut self) -> DbResult<Option<Root>> {
        Ok(self.next_raw().await?.map(|(id, _)| id))
    }

    /// Start again from the smallest id.
    pub fn rewind(&mut self) {
        self.scanned = None;
        self.buffer.clear();
        self.exhausted = false;
    }

    async fn next_raw(&mut self) -> DbResult<Option<(Root, Vec<u8>)>> {
        // A page of only malformed keys leaves the buffer empty.
        while self.buffer.is_empty() && !self.exhausted {
            self.fill().await?;
        }
        Ok(self.buffer.pop_front())
    }

    async fn fill(&mut self) -> DbResult<()> {
        let mut range = self.repo.bucket.key_range().with_limit(self.page_size);
        if let Some(ref scanned) = self.scanned {
            range.gte = Some(key_successor(scanned.clone()));
        }
        let pairs = self.repo.store.scan(range).await?;
        self.exhausted = pairs.len() < self.page_size;
        if let Some((key, _)) = pairs.last() {
            self.scanned = Some(key.clone());
        }
        self.buffer.extend(self.repo.filter_keys(pairs));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bdb_blocks::{BeaconBlock, SignedBeaconBlock};
    use bdb_config::{ChainConfig, ForkName};
    use bdb_kv::{InMemoryRawStore, KvError, KvResult};
    use bdb_types::{Signature, Slot};
    use proptest::prelude::*;

    use super::*;
    use crate::entity::block_schemas;

    type BlockRepo<S> = Repository<SignedBeaconBlock, S>;

    fn config() -> Arc<ChainConfig> {
        let config = ChainConfig::new(8, vec![(0, ForkName::Phase0), (2, ForkName::Altair)]);
        Arc::new(config.unwrap())
    }

    fn repo_on<S: RawStore>(bucket: Bucket, store: Arc<S>) -> BlockRepo<S> {
        let registry = SchemaRegistry::new(config(), block_schemas()).unwrap();
        Repository::new(bucket, registry, store)
    }

    fn repo() -> BlockRepo<InMemoryRawStore> {
        repo_on(Bucket::Block, Arc::new(InMemoryRawStore::new()))
    }

    fn block_at(slot: Slot) -> SignedBeaconBlock {
        let fork = if slot >= 16 { ForkName::Altair } else { ForkName::Phase0 };
        SignedBeaconBlock::new(BeaconBlock::empty(fork, slot), Signature::empty())
    }

    // -----------------------------------------------------------------------
    // Single records
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn put_then_get() {
        let repo = repo();
        let block = block_at(16);
        let id = repo.put(&block).await.unwrap();
        assert_eq!(id, block.block_root());
        assert_eq!(repo.get(&id).await.unwrap(), Some(block));
        assert!(repo.has(&id).await.unwrap());
    }

    #[tokio::test]
    async fn get_absent_is_none() {
        let repo = repo();
        assert_eq!(repo.get(&Root::from_hash([9; 32])).await.unwrap(), None);
        assert_eq!(repo.get_binary(&Root::zero()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn put_is_idempotent_upsert() {
        let repo = repo();
        let first = block_at(3);
        let mut resigned = first.clone();
        resigned.signature = Signature::new([7; 96]);

        let id1 = repo.put(&first).await.unwrap();
        let id2 = repo.put(&resigned).await.unwrap();
        assert_eq!(id1, id2);
        assert_eq!(repo.count().await.unwrap(), 1);
        assert_eq!(repo.get(&id1).await.unwrap(), Some(resigned));
    }

    #[tokio::test]
    async fn delete_then_get_is_none() {
        let repo = repo();
        let id = repo.put(&block_at(1)).await.unwrap();
        repo.delete(&id).await.unwrap();
        repo.delete(&id).await.unwrap();
        assert_eq!(repo.get(&id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn encode_failure_writes_nothing() {
        let repo = repo();
        // Phase0 layout at an altair slot.
        let wrong =
            SignedBeaconBlock::new(BeaconBlock::empty(ForkName::Phase0, 16), Signature::empty());
        let err = repo.put(&wrong).await.unwrap_err();
        assert!(matches!(err, DbError::Encode(EncodeError::ForkMismatch { .. })));
        assert!(repo.store().is_empty().await);
    }

    #[tokio::test]
    async fn corrupt_record_is_decode_error_with_id() {
        let repo = repo();
        let id = Root::from_hash([5; 32]);
        repo.put_binary(&id, vec![0; 50]).await.unwrap();
        match repo.get(&id).await {
            Err(DbError::Decode { id: bad, source }) => {
                assert_eq!(bad, id);
                assert_eq!(source, DecodeError::TooShort { expected: 108, actual: 50 });
            }
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn binary_relay_roundtrip() {
        let source = repo();
        let target = repo();
        let block = block_at(20);
        let id = source.put(&block).await.unwrap();

        let bytes = source.get_binary(&id).await.unwrap().unwrap();
        target.put_binary(&id, bytes).await.unwrap();
        assert_eq!(target.get(&id).await.unwrap(), Some(block));
    }

    // -----------------------------------------------------------------------
    // Buckets
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn buckets_are_isolated() {
        let store = Arc::new(InMemoryRawStore::new());
        let blocks = repo_on(Bucket::Block, Arc::clone(&store));
        let pending = repo_on(Bucket::PendingBlock, Arc::clone(&store));

        let id = blocks.put(&block_at(4)).await.unwrap();
        assert_eq!(pending.get(&id).await.unwrap(), None);
        assert!(pending.keys().await.unwrap().is_empty());
        assert_eq!(blocks.keys().await.unwrap(), vec![id]);

        pending.put(&block_at(4)).await.unwrap();
        pending.delete(&id).await.unwrap();
        assert!(blocks.has(&id).await.unwrap());
    }

    // -----------------------------------------------------------------------
    // Batches
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn batch_put_and_delete() {
        let repo = repo();
        let blocks: Vec<_> = (0..5).map(block_at).collect();
        let ids = repo.batch_put(&blocks).await.unwrap();
        assert_eq!(ids.len(), 5);
        assert_eq!(repo.count().await.unwrap(), 5);

        repo.batch_delete(&ids[..3]).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 2);
        assert!(!repo.has(&ids[0]).await.unwrap());
        assert!(repo.has(&ids[4]).await.unwrap());
    }

    #[tokio::test]
    async fn batch_with_invalid_value_writes_nothing() {
        let repo = repo();
        let bad =
            SignedBeaconBlock::new(BeaconBlock::empty(ForkName::Phase0, 16), Signature::empty());
        let err = repo.batch_put(&[block_at(1), bad]).await.unwrap_err();
        assert!(matches!(err, DbError::Encode(_)));
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    /// Store with sequential batches that fails on the n-th put.
    struct FlakyStore {
        inner: InMemoryRawStore,
        puts_left: std::sync::atomic::AtomicUsize,
    }

    #[async_trait::async_trait]
    impl RawStore for FlakyStore {
        async fn get(&self, key: &[u8]) -> KvResult<Option<Vec<u8>>> {
            self.inner.get(key).await
        }

        async fn put(&self, key: Vec<u8>, value: Vec<u8>) -> KvResult<()> {
            use std::sync::atomic::Ordering;
            if self.puts_left.fetch_sub(1, Ordering::SeqCst) == 0 {
                return Err(KvError::Backend("disk full".into()));
            }
            self.inner.put(key, value).await
        }

        async fn delete(&self, key: &[u8]) -> KvResult<()> {
            self.inner.delete(key).await
        }

        async fn scan(&self, range: ScanRange) -> KvResult<Vec<KvPair>> {
            self.inner.scan(range).await
        }
    }

    #[tokio::test]
    async fn non_atomic_batch_failure_propagates() {
        let store = Arc::new(FlakyStore {
            inner: InMemoryRawStore::new(),
            puts_left: std::sync::atomic::AtomicUsize::new(2),
        });
        assert!(!store.atomic_batches());
        let repo = repo_on(Bucket::Block, Arc::clone(&store));

        let blocks: Vec<_> = (0..4).map(block_at).collect();
        let err = repo.batch_put(&blocks).await.unwrap_err();
        assert!(matches!(err, DbError::Storage(KvError::Backend(_))));
        // The first two puts landed and are not rolled back.
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn storage_error_propagates() {
        let repo = repo();
        let id = repo.put(&block_at(1)).await.unwrap();
        repo.store().close();
        assert!(matches!(repo.get(&id).await, Err(DbError::Storage(KvError::Closed))));
        assert!(matches!(repo.put(&block_at(2)).await, Err(DbError::Storage(KvError::Closed))));
        assert!(matches!(repo.keys().await, Err(DbError::Storage(KvError::Closed))));
    }

    // -----------------------------------------------------------------------
    // Enumeration
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn keys_are_ascending_and_match_values() {
        let repo = repo();
        for slot in 0..10 {
            repo.put(&block_at(slot)).await.unwrap();
        }
        let keys = repo.keys().await.unwrap();
        assert_eq!(keys.len(), 10);
        assert!(keys.windows(2).all(|w| w[0] < w[1]));

        let entries = repo.entries().await.unwrap();
        for ((id, value), key) in entries.iter().zip(&keys) {
            assert_eq!(id, key);
            assert_eq!(value.block_root(), *id);
        }
        assert_eq!(repo.values().await.unwrap().len(), 10);
        assert_eq!(repo.first_key().await.unwrap(), keys.first().copied());
        assert_eq!(repo.last_key().await.unwrap(), keys.last().copied());
    }

    #[tokio::test]
    async fn ranged_reads() {
        let repo = repo();
        for slot in 0..8 {
            repo.put(&block_at(slot)).await.unwrap();
        }
        let keys = repo.keys().await.unwrap();

        let range = IdRange {
            gte: Some(keys[2]),
            lt: Some(keys[6]),
            ..IdRange::default()
        };
        assert_eq!(repo.keys_in(&range).await.unwrap(), keys[2..6].to_vec());

        let reversed = range.clone().reversed().with_limit(2);
        assert_eq!(repo.keys_in(&reversed).await.unwrap(), vec![keys[5], keys[4]]);
        assert_eq!(repo.values_in(&range.with_limit(3)).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn empty_bucket_enumeration() {
        let repo = repo();
        assert_eq!(repo.first_key().await.unwrap(), None);
        assert_eq!(repo.last_key().await.unwrap(), None);
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn cursor_pages_through_bucket() {
        let repo = repo();
        for slot in 0..7 {
            repo.put(&block_at(slot)).await.unwrap();
        }
        let expected = repo.keys().await.unwrap();

        let mut cursor = repo.cursor().with_page_size(3);
        let mut seen = Vec::new();
        while let Some((id, value)) = cursor.next_entry().await.unwrap() {
            assert_eq!(value.block_root(), id);
            seen.push(id);
        }
        assert_eq!(seen, expected);
        assert_eq!(cursor.next_key().await.unwrap(), None);

        cursor.rewind();
        assert_eq!(cursor.next_key().await.unwrap(), expected.first().copied());
    }

    #[tokio::test]
    async fn cursor_sees_writes_ahead_of_position() {
        let repo = repo();
        let low = Root::from_hash([0x00; 32]);
        let high = Root::from_hash([0xff; 32]);
        let bytes = repo.encode(&block_at(1)).unwrap();
        repo.put_binary(&low, bytes.clone()).await.unwrap();

        let mut cursor = repo.cursor().with_page_size(1);
        assert_eq!(cursor.next_key().await.unwrap(), Some(low));
        repo.put_binary(&high, bytes).await.unwrap();
        assert_eq!(cursor.next_key().await.unwrap(), Some(high));
        assert_eq!(cursor.next_key().await.unwrap(), None);
    }

    // -----------------------------------------------------------------------
    // Malformed keys
    // -----------------------------------------------------------------------

    /// A raw key inside `bucket` that is not `prefix ++ 32-byte id`.
    fn malformed_key(bucket: Bucket, tail: &[u8]) -> Vec<u8> {
        [bucket.prefix().as_slice(), tail].concat()
    }

    #[tokio::test]
    async fn cursor_walks_past_malformed_key() {
        let repo = repo();
        let low = Root::from_hash([0x00; 32]);
        let high = Root::from_hash([0xff; 32]);
        let bytes = repo.encode(&block_at(1)).unwrap();
        repo.put_binary(&low, bytes.clone()).await.unwrap();
        repo.put_binary(&high, bytes.clone()).await.unwrap();
        let store = repo.store();
        store.put(malformed_key(Bucket::Block, &[0x80]), bytes).await.unwrap();
        assert_eq!(repo.keys().await.unwrap(), vec![low, high]);

        for page_size in [1, 2, 3, DEFAULT_PAGE_SIZE] {
            let mut cursor = repo.cursor().with_page_size(page_size);
            let mut seen = Vec::new();
            while let Some(id) = cursor.next_key().await.unwrap() {
                seen.push(id);
            }
            assert_eq!(seen, vec![low, high], "page size {page_size}");
        }
    }

    #[tokio::test]
    async fn cursor_over_only_malformed_keys_ends() {
        let repo = repo();
        for tail in 0u8..5 {
            repo.store()
                .put(malformed_key(Bucket::Block, &[tail]), vec![])
                .await
                .unwrap();
        }
        let mut cursor = repo.cursor().with_page_size(2);
        assert_eq!(cursor.next_key().await.unwrap(), None);
    }

    #[tokio::test]
    async fn edge_keys_skip_malformed_keys() {
        let repo = repo();
        let id = repo.put(&block_at(2)).await.unwrap();
        let store = repo.store();
        // Sorts before every well-formed key, then after every one.
        store.put(malformed_key(Bucket::Block, &[0x00]), vec![]).await.unwrap();
        store.put(malformed_key(Bucket::Block, &[0xff; 40]), vec![]).await.unwrap();
        assert_eq!(repo.first_key().await.unwrap(), Some(id));
        assert_eq!(repo.last_key().await.unwrap(), Some(id));
    }

    #[tokio::test]
    async fn edge_keys_page_past_many_malformed_keys() {
        let repo = repo();
        let id = repo.put(&block_at(2)).await.unwrap();
        // More than one edge scan's worth on each side of the id.
        for i in 0..(EDGE_PAGE_SIZE as u8 + 3) {
            let mut high = vec![0xff; 33];
            high.push(i);
            let store = repo.store();
            store.put(malformed_key(Bucket::Block, &[0x00, i]), vec![]).await.unwrap();
            store.put(malformed_key(Bucket::Block, &high), vec![]).await.unwrap();
        }
        assert_eq!(repo.first_key().await.unwrap(), Some(id));
        assert_eq!(repo.last_key().await.unwrap(), Some(id));

        repo.delete(&id).await.unwrap();
        assert_eq!(repo.first_key().await.unwrap(), None);
        assert_eq!(repo.last_key().await.unwrap(), None);
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    proptest! {
        #[test]
        fn id_depends_on_content_only(
            slot in 0u64..64,
            proposer in any::<u64>(),
            sig_a in any::<[u8; 32]>(),
            sig_b in any::<[u8; 32]>(),
        ) {
            let repo = repo();
            let mut a = block_at(slot);
            a.message.proposer_index = proposer;
            let mut b = a.clone();
            a.signature = Signature::new([sig_a, sig_a, sig_a].concat().try_into().unwrap());
            b.signature = Signature::new([sig_b, sig_b, sig_b].concat().try_into().unwrap());
            prop_assert_eq!(repo.id_of(&a), repo.id_of(&b));
            prop_assert_eq!(repo.id_of(&a), a.message.tree_hash_root());
        }

        #[test]
        fn encode_decode_roundtrip(slot in any::<u64>(), proposer in any::<u64>()) {
            let repo = repo();
            let fork = repo.registry().resolve_for_slot(slot).unwrap().fork;
            let mut block =
                SignedBeaconBlock::new(BeaconBlock::empty(fork, slot), Signature::empty());
            block.message.proposer_index = proposer;
            let bytes = repo.encode(&block).unwrap();
            prop_assert_eq!(repo.decode(&bytes).unwrap(), block);
        }
    }
}
