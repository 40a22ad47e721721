//! Chain configuration for BeaconDB.
//!
//! A [`ChainConfig`] is built once, validated on construction, and shared
//! read-only (usually behind an `Arc`) by every schema registry. There is no
//! global configuration: several configurations, e.g. a test network and
//! mainnet, can coexist in one process.
//!
//! # Modules
//!
//! - [`error`]: [`ConfigError`], fatal at startup
//! - [`fork`]: [`ForkName`], the known protocol versions
//! - [`schedule`]: [`Schedule`], epoch boundaries mapped to versions
//! - [`chain`]: [`ChainConfig`], presets and TOML loading

pub mod chain;
pub mod error;
pub mod fork;
pub mod schedule;

pub use chain::{ChainConfig, ChainConfigFile, ForkEntry};
pub use error::{ConfigError, Result};
pub use fork::ForkName;
pub use schedule::{Schedule, ScheduleEntry};
