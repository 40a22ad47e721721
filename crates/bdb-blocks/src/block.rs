use bdb_codec::{
    fixed_part_len, read_u64_at, ContainerDecoderBuilder, ContainerEncoder, DecodeError, Encode,
};
use bdb_config::ForkName;
use bdb_crypto::{hash_fields, TreeHash};
use bdb_types::{Root, Signature, Slot};

use crate::body::BeaconBlockBody;

/// Byte offset of `message.slot` inside an encoded [`SignedBeaconBlock`].
///
/// The signed envelope's fixed part is the 4-byte message offset followed by
/// the 96-byte signature, and `slot` is the first field of the message. This
/// holds for every fork.
pub const SIGNED_BLOCK_SLOT_OFFSET: usize = 4 + 96;

/// The unsigned block. Its tree hash root is the block id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BeaconBlock {
    pub slot: Slot,
    pub proposer_index: u64,
    pub parent_root: Root,
    pub state_root: Root,
    pub body: BeaconBlockBody,
}

impl BeaconBlock {
    pub fn new(
        slot: Slot,
        proposer_index: u64,
        parent_root: Root,
        state_root: Root,
        body: BeaconBlockBody,
    ) -> Self {
        Self {
            slot,
            proposer_index,
            parent_root,
            state_root,
            body,
        }
    }

    /// An empty block of `fork` at `slot`.
    pub fn empty(fork: ForkName, slot: Slot) -> Self {
        Self::new(slot, 0, Root::zero(), Root::zero(), BeaconBlockBody::empty(fork))
    }

    pub fn fork(&self) -> ForkName {
        self.body.fork()
    }

    /// Decode a block whose body has the `fork` layout.
    pub fn decode_for(fork: ForkName, bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut builder = ContainerDecoderBuilder::new(bytes);
        builder.register::<u64>()?;
        builder.register::<u64>()?;
        builder.register::<Root>()?;
        builder.register::<Root>()?;
        builder.register_variable()?;
        let mut decoder = builder.build()?;
        Ok(Self {
            slot: decoder.decode_next()?,
            proposer_index: decoder.decode_next()?,
            parent_root: decoder.decode_next()?,
            state_root: decoder.decode_next()?,
            body: BeaconBlockBody::decode_for(fork, decoder.next_bytes()?)?,
        })
    }

    fn fixed_part() -> usize {
        fixed_part_len::<u64>() * 2
            + fixed_part_len::<Root>() * 2
            + fixed_part_len::<BeaconBlockBody>()
    }
}

impl Encode for BeaconBlock {
    fn is_fixed_len() -> bool {
        false
    }

    fn encoded_len(&self) -> usize {
        Self::fixed_part() + self.body.encoded_len()
    }

    fn encode_into(&self, buf: &mut Vec<u8>) {
        let mut encoder = ContainerEncoder::new(buf, Self::fixed_part());
        encoder.append(&self.slot);
        encoder.append(&self.proposer_index);
        encoder.append(&self.parent_root);
        encoder.append(&self.state_root);
        encoder.append(&self.body);
        encoder.finalize();
    }
}

impl TreeHash for BeaconBlock {
    fn tree_hash_root(&self) -> Root {
        hash_fields(&[
            self.slot.tree_hash_root(),
            self.proposer_index.tree_hash_root(),
            self.parent_root,
            self.state_root,
            self.body.tree_hash_root(),
        ])
    }
}

/// A block together with its proposer signature. This is what gets stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedBeaconBlock {
    pub message: BeaconBlock,
    pub signature: Signature,
}

impl SignedBeaconBlock {
    pub fn new(message: BeaconBlock, signature: Signature) -> Self {
        Self { message, signature }
    }

    pub fn slot(&self) -> Slot {
        self.message.slot
    }

    pub fn fork(&self) -> ForkName {
        self.message.fork()
    }

    /// Block id: the root of the unsigned message. The signature does not
    /// contribute.
    pub fn block_root(&self) -> Root {
        self.message.tree_hash_root()
    }

    /// Decode a signed block whose body has the `fork` layout.
    pub fn decode_for(fork: ForkName, bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut builder = ContainerDecoderBuilder::new(bytes);
        builder.register_variable()?;
        builder.register::<Signature>()?;
        let mut decoder = builder.build()?;
        let message = BeaconBlock::decode_for(fork, decoder.next_bytes()?)?;
        let signature = decoder.decode_next()?;
        Ok(Self { message, signature })
    }

    /// Read `message.slot` straight from encoded bytes without decoding.
    pub fn read_slot(bytes: &[u8]) -> Result<Slot, DecodeError> {
        read_u64_at(bytes, SIGNED_BLOCK_SLOT_OFFSET)
    }

    fn fixed_part() -> usize {
        fixed_part_len::<BeaconBlock>() + fixed_part_len::<Signature>()
    }
}

impl Encode for SignedBeaconBlock {
    fn is_fixed_len() -> bool {
        false
    }

    fn encoded_len(&self) -> usize {
        Self::fixed_part() + self.message.encoded_len()
    }

    fn encode_into(&self, buf: &mut Vec<u8>) {
        let mut encoder = ContainerEncoder::new(buf, Self::fixed_part());
        encoder.append(&self.message);
        encoder.append(&self.signature);
        encoder.finalize();
    }
}

impl TreeHash for SignedBeaconBlock {
    fn tree_hash_root(&self) -> Root {
        hash_fields(&[self.message.tree_hash_root(), self.signature.tree_hash_root()])
    }
}
