use bdb_codec::{DecodeError, EncodeError};
use bdb_config::ConfigError;
use bdb_kv::KvError;
use bdb_types::Root;

/// Errors surfaced by repositories and the database facade.
///
/// Not-found is never an error: lookups return `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Invalid configuration detected at startup.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A value could not be serialized. Nothing was written.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Stored bytes under `id` could not be decoded.
    #[error("corrupt record {id}: {source}")]
    Decode {
        id: Root,
        #[source]
        source: DecodeError,
    },

    /// The raw store failed. Not retried.
    #[error("storage error: {0}")]
    Storage(#[from] KvError),
}

/// Convenience alias used throughout the db crate.
pub type DbResult<T> = std::result::Result<T, DbError>;
