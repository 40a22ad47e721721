//! Raw key-value storage for BeaconDB.
//!
//! The raw store is an ordered map from byte keys to byte values. It has no
//! notion of buckets, entities, or schemas: everything above bytes lives in
//! `bdb-db`.
//!
//! # Storage Backends
//!
//! All backends implement the [`RawStore`] trait:
//!
//! - [`InMemoryRawStore`] -- `BTreeMap`-based store for tests and embedding
//!
//! # Contract
//!
//! 1. Iteration is ordered lexicographically by key bytes.
//! 2. Writes to a single key are atomic.
//! 3. A batch is atomic only if [`RawStore::atomic_batches`] says so.
//! 4. Deleting an absent key succeeds.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{KvError, KvResult};
pub use memory::InMemoryRawStore;
pub use traits::{BatchOp, KvPair, RawStore, ScanRange};
