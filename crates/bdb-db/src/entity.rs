use bdb_blocks::{
    decoder_for, encoder_for, BeaconBlock, SignedBeaconBlock, BLOCK_ENTITY,
    SIGNED_BLOCK_SLOT_OFFSET,
};
use bdb_config::ForkName;
use bdb_crypto::TreeHash;
use bdb_types::Slot;

use crate::schema::Schema;

/// A versioned value a [`Repository`](crate::Repository) can store.
///
/// The binary layout of an entity depends on the fork in force at its slot.
/// Every layout must place the little-endian `u64` slot at
/// [`SLOT_OFFSET`](Entity::SLOT_OFFSET) so that untagged bytes can be routed
/// to the right schema.
pub trait Entity: Send + Sync + Sized + 'static {
    /// The substructure whose tree hash is the object id.
    type Content: TreeHash;

    /// Entity kind, used in errors and logs.
    const NAME: &'static str;

    /// Byte offset of the slot in every encoding of this entity.
    const SLOT_OFFSET: usize;

    fn content(&self) -> &Self::Content;

    fn slot(&self) -> Slot;

    /// The fork whose layout this value was built with.
    fn fork(&self) -> ForkName;
}

impl Entity for SignedBeaconBlock {
    type Content = BeaconBlock;

    const NAME: &'static str = BLOCK_ENTITY;
    const SLOT_OFFSET: usize = SIGNED_BLOCK_SLOT_OFFSET;

    fn content(&self) -> &BeaconBlock {
        &self.message
    }

    fn slot(&self) -> Slot {
        self.message.slot
    }

    fn fork(&self) -> ForkName {
        self.message.fork()
    }
}

/// One schema per known fork for signed blocks.
pub fn block_schemas() -> Vec<Schema<SignedBeaconBlock>> {
    ForkName::ALL
        .into_iter()
        .map(|fork| Schema::new(fork, encoder_for(fork), decoder_for(fork)))
        .collect()
}
