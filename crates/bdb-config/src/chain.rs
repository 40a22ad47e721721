use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use bdb_types::{compute_epoch_at_slot, Epoch, Slot, FAR_FUTURE_EPOCH};

use crate::error::{ConfigError, Result};
use crate::fork::ForkName;
use crate::schedule::Schedule;

/// Immutable protocol configuration consumed by the storage layer.
///
/// Only two facts matter to storage: how slots map to epochs, and which fork
/// is in force at each epoch. Both are validated by [`ChainConfig::new`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainConfig {
    slots_per_epoch: u64,
    forks: Schedule<ForkName>,
}

impl ChainConfig {
    /// Build a validated configuration.
    pub fn new(slots_per_epoch: u64, forks: Vec<(Epoch, ForkName)>) -> Result<Self> {
        if slots_per_epoch == 0 {
            return Err(ConfigError::ZeroSlotsPerEpoch);
        }
        let forks = Schedule::new(forks)?;
        Ok(Self {
            slots_per_epoch,
            forks,
        })
    }

    /// Mainnet preset: 32 slots per epoch, real fork epochs.
    pub fn mainnet() -> Self {
        Self {
            slots_per_epoch: 32,
            forks: Self::preset_schedule(&[
                (0, ForkName::Phase0),
                (74_240, ForkName::Altair),
                (144_896, ForkName::Bellatrix),
            ]),
        }
    }

    /// Minimal preset: 8 slots per epoch, only phase0 scheduled.
    pub fn minimal() -> Self {
        Self {
            slots_per_epoch: 8,
            forks: Self::preset_schedule(&[
                (0, ForkName::Phase0),
                (FAR_FUTURE_EPOCH, ForkName::Altair),
                (FAR_FUTURE_EPOCH, ForkName::Bellatrix),
            ]),
        }
    }

    fn preset_schedule(entries: &[(Epoch, ForkName)]) -> Schedule<ForkName> {
        match Schedule::new(entries.to_vec()) {
            Ok(schedule) => schedule,
            Err(e) => unreachable!("preset schedule is valid: {e}"),
        }
    }

    /// Parse a TOML configuration document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let file: ChainConfigFile = toml::from_str(s)?;
        file.into_config()
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        debug!(path = %path.display(), forks = config.forks.len(), "loaded chain config");
        Ok(config)
    }

    pub fn slots_per_epoch(&self) -> u64 {
        self.slots_per_epoch
    }

    /// The fork schedule.
    pub fn forks(&self) -> &Schedule<ForkName> {
        &self.forks
    }

    pub fn epoch_at_slot(&self, slot: Slot) -> Epoch {
        compute_epoch_at_slot(slot, self.slots_per_epoch)
    }

    pub fn fork_at_epoch(&self, epoch: Epoch) -> ForkName {
        *self.forks.resolve(epoch)
    }

    pub fn fork_at_slot(&self, slot: Slot) -> ForkName {
        self.fork_at_epoch(self.epoch_at_slot(slot))
    }

    /// Activation epoch of `fork`, or `None` if it is not in the schedule.
    pub fn fork_epoch(&self, fork: ForkName) -> Option<Epoch> {
        self.forks.boundary_of(&fork)
    }

    /// The serializable file form of this configuration.
    pub fn to_file(&self) -> ChainConfigFile {
        ChainConfigFile {
            slots_per_epoch: self.slots_per_epoch,
            forks: self
                .forks
                .entries()
                .iter()
                .map(|e| ForkEntry {
                    name: e.version,
                    epoch: (e.epoch != FAR_FUTURE_EPOCH).then_some(e.epoch),
                })
                .collect(),
        }
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self::mainnet()
    }
}

/// On-disk (TOML) form of a [`ChainConfig`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfigFile {
    pub slots_per_epoch: u64,
    pub forks: Vec<ForkEntry>,
}

/// A fork activation in a configuration file.
///
/// An absent `epoch` means the fork is not scheduled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkEntry {
    pub name: ForkName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epoch: Option<Epoch>,
}

impl ChainConfigFile {
    pub fn into_config(self) -> Result<ChainConfig> {
        let forks = self
            .forks
            .into_iter()
            .map(|f| (f.epoch.unwrap_or(FAR_FUTURE_EPOCH), f.name))
            .collect();
        ChainConfig::new(self.slots_per_epoch, forks)
    }
}
