//! Content-addressed, fork-aware storage for BeaconDB.
//!
//! A [`Repository`] binds one [`Entity`] kind to one [`Bucket`] of a
//! [`RawStore`](bdb_kv::RawStore). Records are keyed by the tree hash root of
//! the entity's content and encoded with the schema its slot resolves to.
//! Stored bytes carry no version tag; the [`SchemaRegistry`] recovers the
//! schema from the slot at a fixed offset.
//!
//! # Modules
//!
//! - [`bucket`]: the bucket table and key layout
//! - [`entity`]: the [`Entity`] trait and block schemas
//! - [`schema`]: [`Schema`] and [`SchemaRegistry`]
//! - [`repository`]: the generic [`Repository`] and its cursor
//! - [`pending`]: [`PendingBlockRepository`], blocks awaiting their parent
//! - [`db`]: [`BeaconDb`], every repository over one store

pub mod bucket;
pub mod db;
pub mod entity;
pub mod error;
pub mod pending;
pub mod repository;
pub mod schema;

pub use bucket::{decode_key, encode_key, validate_bucket_table, Bucket, BUCKET_PREFIX_LEN};
pub use db::{BeaconDb, BlockRepository};
pub use entity::{block_schemas, Entity};
pub use error::{DbError, DbResult};
pub use pending::PendingBlockRepository;
pub use repository::{IdRange, Repository, RepositoryCursor, DEFAULT_PAGE_SIZE};
pub use schema::{Schema, SchemaRegistry};
