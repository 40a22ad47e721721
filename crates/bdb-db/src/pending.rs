use std::sync::Arc;

use bdb_blocks::SignedBeaconBlock;
use bdb_kv::RawStore;
use bdb_types::Root;
use tracing::debug;

use crate::bucket::Bucket;
use crate::error::DbResult;
use crate::repository::Repository;
use crate::schema::SchemaRegistry;

/// Blocks that arrived before their parent, keyed by block root.
///
/// A block is staged when its parent is unknown and unstaged once it has
/// been imported or discarded. Staging the same block again overwrites the
/// record. The id is the root of the unsigned block, so two signatures over
/// the same block occupy one slot in the pool.
pub struct PendingBlockRepository<S: RawStore> {
    repo: Repository<SignedBeaconBlock, S>,
}

impl<S: RawStore> PendingBlockRepository<S> {
    pub fn new(registry: SchemaRegistry<SignedBeaconBlock>, store: Arc<S>) -> Self {
        Self {
            repo: Repository::new(Bucket::PendingBlock, registry, store),
        }
    }

    /// Add `block` to the pool and return its root.
    pub async fn stage(&self, block: &SignedBeaconBlock) -> DbResult<Root> {
        let id = self.repo.put(block).await?;
        debug!(
            id = %id.short_hex(),
            slot = block.slot(),
            parent = %block.message.parent_root.short_hex(),
            "block staged"
        );
        Ok(id)
    }

    /// The staged block with root `id`, if any.
    pub async fn resolve(&self, id: &Root) -> DbResult<Option<SignedBeaconBlock>> {
        self.repo.get(id).await
    }

    /// Drop `id` from the pool. Unknown ids are ignored.
    pub async fn unstage(&self, id: &Root) -> DbResult<()> {
        self.repo.delete(id).await
    }

    /// Every staged block, in root order.
    pub async fn list_all(&self) -> DbResult<Vec<SignedBeaconBlock>> {
        self.repo.values().await
    }

    pub async fn is_staged(&self, id: &Root) -> DbResult<bool> {
        self.repo.has(id).await
    }

    pub async fn len(&self) -> DbResult<usize> {
        self.repo.count().await
    }

    pub async fn is_empty(&self) -> DbResult<bool> {
        Ok(self.repo.first_key().await?.is_none())
    }

    pub fn repository(&self) -> &Repository<SignedBeaconBlock, S> {
        &self.repo
    }
}

impl<S: RawStore> std::fmt::Debug for PendingBlockRepository<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingBlockRepository")
            .field("repo", &self.repo)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use bdb_blocks::BeaconBlock;
    use bdb_config::{ChainConfig, ForkName};
    use bdb_crypto::TreeHash;
    use bdb_kv::InMemoryRawStore;
    use bdb_types::Signature;

    use super::*;
    use crate::entity::block_schemas;

    fn pool() -> PendingBlockRepository<InMemoryRawStore> {
        let config = Arc::new(ChainConfig::minimal());
        let registry = SchemaRegistry::new(config, block_schemas()).unwrap();
        PendingBlockRepository::new(registry, Arc::new(InMemoryRawStore::new()))
    }

    fn block(slot: u64, parent: u8) -> SignedBeaconBlock {
        let mut message = BeaconBlock::empty(ForkName::Phase0, slot);
        message.parent_root = Root::from_hash([parent; 32]);
        SignedBeaconBlock::new(message, Signature::empty())
    }

    #[tokio::test]
    async fn stage_resolve_unstage() {
        let pool = pool();
        let b = block(5, 0xaa);
        let id = pool.stage(&b).await.unwrap();
        assert_eq!(id, b.message.tree_hash_root());
        assert!(pool.is_staged(&id).await.unwrap());
        assert_eq!(pool.resolve(&id).await.unwrap(), Some(b.clone()));
        assert_eq!(pool.list_all().await.unwrap(), vec![b]);

        pool.unstage(&id).await.unwrap();
        assert_eq!(pool.resolve(&id).await.unwrap(), None);
        assert!(pool.list_all().await.unwrap().is_empty());
        assert!(pool.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn restaging_is_idempotent() {
        let pool = pool();
        let b = block(5, 0xaa);
        let first = pool.stage(&b).await.unwrap();
        let second = pool.stage(&b).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(pool.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn resign_maps_to_same_entry() {
        let pool = pool();
        let b = block(9, 1);
        let mut resigned = b.clone();
        resigned.signature = Signature::new([3; 96]);
        let id = pool.stage(&b).await.unwrap();
        assert_eq!(pool.stage(&resigned).await.unwrap(), id);
        assert_eq!(pool.resolve(&id).await.unwrap(), Some(resigned));
    }

    #[tokio::test]
    async fn unstage_unknown_is_noop() {
        let pool = pool();
        pool.stage(&block(1, 1)).await.unwrap();
        pool.unstage(&Root::from_hash([0x42; 32])).await.unwrap();
        assert_eq!(pool.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn stray_key_does_not_hide_staged_block() {
        let pool = pool();
        pool.stage(&block(3, 0xaa)).await.unwrap();
        let stray = [Bucket::PendingBlock.prefix().as_slice(), &[0x00]].concat();
        pool.repository().store().put(stray, vec![]).await.unwrap();
        assert!(!pool.is_empty().await.unwrap());
        assert_eq!(pool.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn reconciliation_walk() {
        let pool = pool();
        let children: Vec<_> = (10..14).map(|slot| block(slot, 0xbb)).collect();
        for child in &children {
            pool.stage(child).await.unwrap();
        }
        pool.stage(&block(20, 0xcc)).await.unwrap();

        // Parent 0xbb arrives: import and unstage its children.
        let parent = Root::from_hash([0xbb; 32]);
        let ready: Vec<_> = pool
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .filter(|b| b.message.parent_root == parent)
            .collect();
        assert_eq!(ready.len(), 4);
        for b in &ready {
            pool.unstage(&b.block_root()).await.unwrap();
        }
        let left = pool.list_all().await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].slot(), 20);
    }
}
