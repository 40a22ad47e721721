use std::path::PathBuf;

/// Configuration errors. All of them are detected at startup and are fatal.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The fork schedule has no entries.
    #[error("fork schedule is empty")]
    EmptySchedule,

    /// The first schedule entry does not start at epoch 0.
    #[error("fork schedule must start at epoch 0, first boundary is {0}")]
    MissingGenesis(u64),

    /// Schedule boundaries are not ascending.
    #[error("fork schedule is not sorted: boundary {next} follows {previous}")]
    UnsortedSchedule { previous: u64, next: u64 },

    /// The same version appears twice in a schedule.
    #[error("fork {0} is scheduled more than once")]
    DuplicateFork(String),

    /// `slots_per_epoch` is zero.
    #[error("slots_per_epoch must be non-zero")]
    ZeroSlotsPerEpoch,

    /// Two buckets were assigned the same key prefix.
    #[error("bucket prefix {prefix:#04x} is shared by {first} and {second}")]
    DuplicateBucketPrefix {
        prefix: u8,
        first: String,
        second: String,
    },

    /// A fork that can activate has no schema registered for an entity kind.
    #[error("no {entity} schema registered for fork {fork}")]
    MissingSchema { entity: &'static str, fork: String },

    /// The configuration file could not be parsed.
    #[error("invalid configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the config crate.
pub type Result<T> = std::result::Result<T, ConfigError>;
