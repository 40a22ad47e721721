/// Monotonically increasing protocol sequence number embedded in blocks.
pub type Slot = u64;

/// Coarser protocol time unit: `slot / slots_per_epoch`.
pub type Epoch = u64;

/// Epoch value meaning "never". Forks scheduled at this epoch do not activate.
pub const FAR_FUTURE_EPOCH: Epoch = u64::MAX;

/// The epoch containing `slot`.
///
/// `slots_per_epoch` must be non-zero; configuration validation guarantees
/// this for every `ChainConfig`.
pub fn compute_epoch_at_slot(slot: Slot, slots_per_epoch: u64) -> Epoch {
    slot / slots_per_epoch
}

/// The first slot of `epoch`, saturating at `u64::MAX`.
pub fn compute_start_slot_at_epoch(epoch: Epoch, slots_per_epoch: u64) -> Slot {
    epoch.saturating_mul(slots_per_epoch)
}
