//! Foundation types for BeaconDB.
//!
//! This crate provides the primitive identity and time types shared by every
//! other BeaconDB crate.
//!
//! # Key Types
//!
//! - [`Root`]: 32-byte structural hash, used as the object identifier
//! - [`Signature`]: opaque 96-byte signature (never verified here)
//! - [`Slot`] / [`Epoch`]: protocol time, with [`compute_epoch_at_slot`]
//!
//! The [`bytes`] module holds the integer/hex helpers used for key encoding.

pub mod bytes;
pub mod error;
pub mod root;
pub mod signature;
pub mod time;

pub use bytes::Endianness;
pub use error::TypeError;
pub use root::Root;
pub use signature::Signature;
pub use time::{compute_epoch_at_slot, compute_start_slot_at_epoch, Epoch, Slot, FAR_FUTURE_EPOCH};
