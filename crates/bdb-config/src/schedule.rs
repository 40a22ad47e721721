use bdb_types::{Epoch, FAR_FUTURE_EPOCH};

use crate::error::{ConfigError, Result};

/// One boundary of a [`Schedule`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduleEntry<V> {
    /// First epoch at which `version` applies.
    pub epoch: Epoch,
    pub version: V,
}

/// Ascending table of epoch boundaries, each mapped to a version.
///
/// Invariants, checked by [`Schedule::new`]:
/// - at least one entry, and the first entry starts at epoch 0;
/// - boundaries are strictly ascending, except that several entries may sit
///   at [`FAR_FUTURE_EPOCH`] (unscheduled versions, which never activate);
/// - no version appears twice.
///
/// For every epoch exactly one version applies: the one with the greatest
/// boundary not exceeding that epoch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schedule<V> {
    entries: Vec<ScheduleEntry<V>>,
}

impl<V: PartialEq + std::fmt::Display> Schedule<V> {
    /// Validate and build a schedule from `(boundary, version)` pairs given in
    /// ascending order.
    pub fn new(entries: Vec<(Epoch, V)>) -> Result<Self> {
        let first = entries.first().ok_or(ConfigError::EmptySchedule)?;
        if first.0 != 0 {
            return Err(ConfigError::MissingGenesis(first.0));
        }
        for pair in entries.windows(2) {
            let (previous, next) = (pair[0].0, pair[1].0);
            let both_unscheduled = previous == FAR_FUTURE_EPOCH && next == FAR_FUTURE_EPOCH;
            if next <= previous && !both_unscheduled {
                return Err(ConfigError::UnsortedSchedule { previous, next });
            }
        }
        for (i, (_, version)) in entries.iter().enumerate() {
            if entries[..i].iter().any(|(_, earlier)| earlier == version) {
                return Err(ConfigError::DuplicateFork(version.to_string()));
            }
        }

        Ok(Self {
            entries: entries
                .into_iter()
                .map(|(epoch, version)| ScheduleEntry { epoch, version })
                .collect(),
        })
    }
}

impl<V> Schedule<V> {
    /// The version in force at `epoch`.
    pub fn resolve(&self, epoch: Epoch) -> &V {
        &self.entry_at(epoch).version
    }

    /// The schedule entry in force at `epoch`.
    pub fn entry_at(&self, epoch: Epoch) -> &ScheduleEntry<V> {
        // Entries at FAR_FUTURE_EPOCH sit at the tail, so this predicate is
        // true for a prefix of the table and the prefix always includes the
        // genesis entry.
        let idx = self
            .entries
            .partition_point(|e| e.epoch <= epoch && e.epoch != FAR_FUTURE_EPOCH);
        &self.entries[idx.saturating_sub(1)]
    }

    /// Boundary epoch of `version`, if scheduled.
    pub fn boundary_of(&self, version: &V) -> Option<Epoch>
    where
        V: PartialEq,
    {
        self.entries
            .iter()
            .find(|e| &e.version == version)
            .map(|e| e.epoch)
    }

    /// Entries in ascending order.
    pub fn entries(&self) -> &[ScheduleEntry<V>] {
        &self.entries
    }

    /// Entries that can activate (boundary is not the far-future epoch).
    pub fn active_entries(&self) -> impl Iterator<Item = &ScheduleEntry<V>> {
        self.entries.iter().filter(|e| e.epoch != FAR_FUTURE_EPOCH)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule(entries: &[(Epoch, &'static str)]) -> Result<Schedule<&'static str>> {
        Schedule::new(entries.to_vec())
    }

    #[test]
    fn boundary_epoch_selects_new_version() {
        let s = schedule(&[(0, "v0"), (10, "v1")]).unwrap();
        assert_eq!(*s.resolve(9), "v0");
        assert_eq!(*s.resolve(10), "v1");
        assert_eq!(*s.resolve(11), "v1");
        assert_eq!(*s.resolve(0), "v0");
    }

    #[test]
    fn resolve_with_many_entries() {
        let s = schedule(&[(0, "a"), (2, "b"), (5, "c"), (100, "d")]).unwrap();
        let expected = [(0, "a"), (1, "a"), (2, "b"), (4, "b"), (5, "c"), (99, "c"), (100, "d")];
        for (epoch, version) in expected {
            assert_eq!(*s.resolve(epoch), version, "epoch {epoch}");
        }
        assert_eq!(*s.resolve(u64::MAX), "d");
    }

    #[test]
    fn far_future_entries_never_activate() {
        let s = schedule(&[(0, "a"), (FAR_FUTURE_EPOCH, "b"), (FAR_FUTURE_EPOCH, "c")]).unwrap();
        assert_eq!(*s.resolve(0), "a");
        assert_eq!(*s.resolve(u64::MAX), "a");
        assert_eq!(s.active_entries().count(), 1);
    }

    #[test]
    fn empty_schedule_rejected() {
        assert!(matches!(schedule(&[]), Err(ConfigError::EmptySchedule)));
    }

    #[test]
    fn schedule_must_start_at_genesis() {
        assert!(matches!(
            schedule(&[(1, "a")]),
            Err(ConfigError::MissingGenesis(1))
        ));
    }

    #[test]
    fn unsorted_schedule_rejected() {
        assert!(matches!(
            schedule(&[(0, "a"), (5, "b"), (3, "c")]),
            Err(ConfigError::UnsortedSchedule { previous: 5, next: 3 })
        ));
        assert!(matches!(
            schedule(&[(0, "a"), (5, "b"), (5, "c")]),
            Err(ConfigError::UnsortedSchedule { .. })
        ));
    }

    #[test]
    fn duplicate_version_rejected() {
        assert!(matches!(
            schedule(&[(0, "a"), (5, "a")]),
            Err(ConfigError::DuplicateFork(name)) if name == "a"
        ));
    }

    #[test]
    fn boundary_lookup() {
        let s = schedule(&[(0, "a"), (7, "b")]).unwrap();
        assert_eq!(s.boundary_of(&"b"), Some(7));
        assert_eq!(s.boundary_of(&"z"), None);
        assert_eq!(s.len(), 2);
        assert!(!s.is_empty());
    }
}
