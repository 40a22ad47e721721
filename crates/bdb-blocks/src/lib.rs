//! Versioned beacon block containers.
//!
//! A block's layout depends on the fork in force at its slot. Every fork
//! shares the same signed envelope and the same leading message fields, so
//! the slot of any encoded block can be read at
//! [`SIGNED_BLOCK_SLOT_OFFSET`] before the fork is known.
//!
//! # Modules
//!
//! - [`containers`]: leaf containers and list limits
//! - [`body`]: per-fork bodies and the [`BeaconBlockBody`] enum
//! - [`block`]: [`BeaconBlock`] and [`SignedBeaconBlock`]
//! - [`schema`]: per-fork `encode`/`decode` function pairs

#[macro_use]
mod macros;

pub mod block;
pub mod body;
pub mod containers;
pub mod schema;

pub use block::{BeaconBlock, SignedBeaconBlock, SIGNED_BLOCK_SLOT_OFFSET};
pub use body::{AltairBody, BeaconBlockBody, BellatrixBody, Phase0Body};
pub use containers::{
    Eth1Data, ExecutionPayload, SignedVoluntaryExit, SyncAggregate, SyncCommitteeBits,
    Transaction, VoluntaryExit, MAX_BYTES_PER_TRANSACTION, MAX_TRANSACTIONS_PER_PAYLOAD,
    MAX_VOLUNTARY_EXITS, SYNC_COMMITTEE_BITS_LEN,
};
pub use schema::{decoder_for, encoder_for, BLOCK_ENTITY};
