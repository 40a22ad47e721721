/// Errors from raw store operations.
#[derive(Debug, thiserror::Error)]
pub enum KvError {
    /// I/O error from the underlying storage engine.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Engine-specific failure that is not an I/O error.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// The store has been closed and accepts no further operations.
    #[error("store is closed")]
    Closed,
}

pub type KvResult<T> = Result<T, KvError>;
