use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use bdb_codec::{read_u64_at, DecodeError, EncodeError};
use bdb_config::{ChainConfig, ConfigError, ForkName};
use bdb_types::{Epoch, Slot};
use tracing::debug;

use crate::entity::Entity;

/// The binary layout of an entity kind for one fork.
pub struct Schema<T> {
    pub fork: ForkName,
    pub encode: fn(&T) -> Result<Vec<u8>, EncodeError>,
    pub decode: fn(&[u8]) -> Result<T, DecodeError>,
}

impl<T> Schema<T> {
    pub fn new(
        fork: ForkName,
        encode: fn(&T) -> Result<Vec<u8>, EncodeError>,
        decode: fn(&[u8]) -> Result<T, DecodeError>,
    ) -> Self {
        Self {
            fork,
            encode,
            decode,
        }
    }
}

impl<T> Clone for Schema<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Schema<T> {}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema").field("fork", &self.fork).finish()
    }
}

/// Maps epochs, slots and untagged bytes of one entity kind to a schema.
///
/// Holds the chain configuration it resolves against; there is no ambient
/// configuration. Construction checks that every fork able to activate has
/// a schema, so resolution of any epoch succeeds afterwards.
pub struct SchemaRegistry<T> {
    config: Arc<ChainConfig>,
    schemas: BTreeMap<ForkName, Schema<T>>,
}

impl<T: Entity> SchemaRegistry<T> {
    /// Build a registry. A later schema for the same fork replaces an
    /// earlier one.
    pub fn new(
        config: Arc<ChainConfig>,
        schemas: impl IntoIterator<Item = Schema<T>>,
    ) -> Result<Self, ConfigError> {
        let schemas: BTreeMap<ForkName, Schema<T>> =
            schemas.into_iter().map(|s| (s.fork, s)).collect();

        for entry in config.forks().active_entries() {
            if !schemas.contains_key(&entry.version) {
                return Err(ConfigError::MissingSchema {
                    entity: T::NAME,
                    fork: entry.version.to_string(),
                });
            }
        }

        debug!(
            entity = T::NAME,
            schemas = schemas.len(),
            slots_per_epoch = config.slots_per_epoch(),
            "schema registry ready"
        );
        Ok(Self { config, schemas })
    }

    pub fn config(&self) -> &Arc<ChainConfig> {
        &self.config
    }

    /// The schema registered for `fork`, regardless of the schedule.
    pub fn schema_for(&self, fork: ForkName) -> Option<&Schema<T>> {
        self.schemas.get(&fork)
    }

    /// Schema in force at `epoch`.
    ///
    /// [`EncodeError::UnsupportedFork`] is only possible on a registry whose
    /// schema table was not checked against its schedule.
    pub fn resolve_for_encode(&self, epoch: Epoch) -> Result<&Schema<T>, EncodeError> {
        let fork = self.config.fork_at_epoch(epoch);
        self.schemas
            .get(&fork)
            .ok_or_else(|| EncodeError::UnsupportedFork {
                entity: T::NAME,
                fork: fork.to_string(),
            })
    }

    /// Schema in force at `slot`.
    pub fn resolve_for_slot(&self, slot: Slot) -> Result<&Schema<T>, EncodeError> {
        self.resolve_for_encode(self.config.epoch_at_slot(slot))
    }

    /// Schema for untagged `bytes`, chosen by the slot stored at
    /// [`Entity::SLOT_OFFSET`].
    ///
    /// After [`SchemaRegistry::new`] only short input fails here;
    /// [`DecodeError::UnsupportedFork`] needs an unchecked schema table.
    pub fn resolve_for_decode(&self, bytes: &[u8]) -> Result<&Schema<T>, DecodeError> {
        let slot = read_u64_at(bytes, T::SLOT_OFFSET)?;
        let fork = self.config.fork_at_slot(slot);
        self.schemas
            .get(&fork)
            .ok_or_else(|| DecodeError::UnsupportedFork {
                entity: T::NAME,
                fork: fork.to_string(),
                slot,
            })
    }

    /// Serialize `value` with the schema of its own slot.
    ///
    /// Fails if the value was built for a different fork than its slot
    /// resolves to.
    pub fn encode(&self, value: &T) -> Result<Vec<u8>, EncodeError> {
        let schema = self.resolve_for_slot(value.slot())?;
        if value.fork() != schema.fork {
            return Err(EncodeError::ForkMismatch {
                expected: schema.fork.to_string(),
                found: value.fork().to_string(),
            });
        }
        (schema.encode)(value)
    }

    /// Deserialize untagged bytes with the schema their slot resolves to.
    pub fn decode(&self, bytes: &[u8]) -> Result<T, DecodeError> {
        let schema = self.resolve_for_decode(bytes)?;
        let value = (schema.decode)(bytes)?;
        if value.fork() != schema.fork {
            return Err(DecodeError::InvalidValue(format!(
                "{} schema produced a {} value",
                schema.fork,
                value.fork()
            )));
        }
        Ok(value)
    }
}

impl<T> Clone for SchemaRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            schemas: self.schemas.clone(),
        }
    }
}

impl<T> fmt::Debug for SchemaRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("slots_per_epoch", &self.config.slots_per_epoch())
            .field("forks", &self.schemas.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use bdb_blocks::{BeaconBlock, SignedBeaconBlock};
    use bdb_codec::Encode;
    use bdb_types::Signature;

    use super::*;
    use crate::entity::block_schemas;

    fn registry(
        slots_per_epoch: u64,
        forks: Vec<(Epoch, ForkName)>,
    ) -> SchemaRegistry<SignedBeaconBlock> {
        let config = ChainConfig::new(slots_per_epoch, forks).unwrap();
        SchemaRegistry::new(Arc::new(config), block_schemas()).unwrap()
    }

    fn block(fork: ForkName, slot: Slot) -> SignedBeaconBlock {
        SignedBeaconBlock::new(BeaconBlock::empty(fork, slot), Signature::empty())
    }

    #[test]
    fn slot_16_with_8_slots_per_epoch_uses_epoch_2_schema() {
        let registry = registry(8, vec![(0, ForkName::Phase0), (2, ForkName::Altair)]);
        assert_eq!(registry.resolve_for_slot(16).unwrap().fork, ForkName::Altair);
        assert_eq!(registry.resolve_for_slot(15).unwrap().fork, ForkName::Phase0);

        let bytes = registry.encode(&block(ForkName::Altair, 16)).unwrap();
        assert_eq!(registry.resolve_for_decode(&bytes).unwrap().fork, ForkName::Altair);
        assert_eq!(registry.decode(&bytes).unwrap(), block(ForkName::Altair, 16));
    }

    #[test]
    fn boundary_epoch_selects_new_schema() {
        let registry = registry(8, vec![(0, ForkName::Phase0), (10, ForkName::Altair)]);
        assert_eq!(registry.resolve_for_encode(10).unwrap().fork, ForkName::Altair);
        assert_eq!(registry.resolve_for_encode(9).unwrap().fork, ForkName::Phase0);

        let at_boundary = block(ForkName::Altair, 80);
        let bytes = registry.encode(&at_boundary).unwrap();
        assert_eq!(registry.decode(&bytes).unwrap(), at_boundary);

        let before = block(ForkName::Phase0, 79);
        let bytes = registry.encode(&before).unwrap();
        assert_eq!(registry.decode(&bytes).unwrap(), before);
    }

    #[test]
    fn value_of_wrong_fork_rejected() {
        let registry = registry(8, vec![(0, ForkName::Phase0), (2, ForkName::Altair)]);
        let err = registry.encode(&block(ForkName::Phase0, 16)).unwrap_err();
        assert_eq!(
            err,
            EncodeError::ForkMismatch {
                expected: "altair".into(),
                found: "phase0".into(),
            }
        );
    }

    #[test]
    fn truncated_below_slot_is_decode_error() {
        let registry = registry(8, vec![(0, ForkName::Phase0)]);
        let bytes = registry.encode(&block(ForkName::Phase0, 3)).unwrap();
        assert_eq!(
            registry.resolve_for_decode(&bytes[..107]).unwrap_err(),
            DecodeError::TooShort { expected: 108, actual: 107 }
        );
        assert!(registry.decode(&bytes[..100]).is_err());
        assert!(registry.decode(&[]).is_err());
    }

    #[test]
    fn bytes_relabelled_to_other_fork_fail() {
        let registry = registry(8, vec![(0, ForkName::Phase0), (2, ForkName::Altair)]);
        let mut bytes = block(ForkName::Phase0, 3).encode();
        // Rewrite the slot so the bytes claim to be altair.
        bytes[100..108].copy_from_slice(&16u64.to_le_bytes());
        assert!(registry.decode(&bytes).is_err());
    }

    #[test]
    fn unchecked_table_reports_unsupported_fork() {
        let config =
            ChainConfig::new(8, vec![(0, ForkName::Phase0), (2, ForkName::Altair)]).unwrap();
        let registry = SchemaRegistry::<SignedBeaconBlock> {
            config: Arc::new(config),
            schemas: block_schemas()
                .into_iter()
                .filter(|s| s.fork == ForkName::Phase0)
                .map(|s| (s.fork, s))
                .collect(),
        };
        let mut bytes = block(ForkName::Phase0, 3).encode();
        bytes[100..108].copy_from_slice(&16u64.to_le_bytes());

        assert_eq!(
            registry.resolve_for_decode(&bytes).unwrap_err(),
            DecodeError::UnsupportedFork {
                entity: "block",
                fork: "altair".into(),
                slot: 16,
            }
        );
        assert!(matches!(
            registry.decode(&bytes),
            Err(DecodeError::UnsupportedFork { slot: 16, .. })
        ));
        assert_eq!(
            registry.resolve_for_encode(2).unwrap_err(),
            EncodeError::UnsupportedFork { entity: "block", fork: "altair".into() }
        );
        assert_eq!(registry.resolve_for_slot(15).unwrap().fork, ForkName::Phase0);
    }

    #[test]
    fn missing_schema_for_active_fork_rejected() {
        let config =
            ChainConfig::new(8, vec![(0, ForkName::Phase0), (2, ForkName::Altair)]).unwrap();
        let config = Arc::new(config);
        let phase0_only = block_schemas().into_iter().filter(|s| s.fork == ForkName::Phase0);
        let err = SchemaRegistry::new(config, phase0_only).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSchema { entity: "block", .. }));
    }

    #[test]
    fn unscheduled_fork_needs_no_schema() {
        let config = Arc::new(ChainConfig::minimal());
        let phase0_only = block_schemas().into_iter().filter(|s| s.fork == ForkName::Phase0);
        let registry = SchemaRegistry::new(config, phase0_only).unwrap();
        assert!(registry.schema_for(ForkName::Altair).is_none());
        assert_eq!(registry.resolve_for_slot(u64::MAX).unwrap().fork, ForkName::Phase0);
    }

    #[test]
    fn registries_with_different_configs_coexist() {
        let early = registry(8, vec![(0, ForkName::Phase0), (1, ForkName::Altair)]);
        let late = registry(8, vec![(0, ForkName::Phase0), (100, ForkName::Altair)]);
        assert_eq!(early.resolve_for_slot(8).unwrap().fork, ForkName::Altair);
        assert_eq!(late.resolve_for_slot(8).unwrap().fork, ForkName::Phase0);
        assert!(format!("{early:?}").contains("SchemaRegistry"));
    }
}
