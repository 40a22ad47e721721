use std::sync::Arc;

use bdb_blocks::SignedBeaconBlock;
use bdb_config::ChainConfig;
use bdb_kv::RawStore;
use tracing::info;

use crate::bucket::{validate_bucket_table, Bucket};
use crate::entity::block_schemas;
use crate::error::DbResult;
use crate::pending::PendingBlockRepository;
use crate::repository::Repository;
use crate::schema::SchemaRegistry;

/// Repository of blocks keyed by block root.
pub type BlockRepository<S> = Repository<SignedBeaconBlock, S>;

/// The repositories of one node, sharing one raw store and one
/// configuration.
pub struct BeaconDb<S: RawStore> {
    config: Arc<ChainConfig>,
    store: Arc<S>,
    block: BlockRepository<S>,
    pending_block: PendingBlockRepository<S>,
}

impl<S: RawStore> BeaconDb<S> {
    /// Validate the bucket table and schema tables, then build every
    /// repository. Any error here is a configuration error and is fatal.
    pub fn open(config: Arc<ChainConfig>, store: Arc<S>) -> DbResult<Self> {
        validate_bucket_table(&Bucket::ALL)?;
        let blocks = SchemaRegistry::new(Arc::clone(&config), block_schemas())?;

        let db = Self {
            block: Repository::new(Bucket::Block, blocks.clone(), Arc::clone(&store)),
            pending_block: PendingBlockRepository::new(blocks, Arc::clone(&store)),
            config,
            store,
        };
        info!(
            slots_per_epoch = db.config.slots_per_epoch(),
            forks = db.config.forks().active_entries().count(),
            atomic_batches = db.store.atomic_batches(),
            "beacon db opened"
        );
        Ok(db)
    }

    pub fn config(&self) -> &Arc<ChainConfig> {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn block(&self) -> &BlockRepository<S> {
        &self.block
    }

    pub fn pending_block(&self) -> &PendingBlockRepository<S> {
        &self.pending_block
    }
}

impl<S: RawStore> std::fmt::Debug for BeaconDb<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BeaconDb")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
