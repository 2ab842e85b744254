//! Data structures for counter samples and derived device state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One watched block device: previous cumulative counters plus the state
/// derived from the last tick.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiskCounterState {
    /// Device name as it appears in the block-device table (e.g. "sda")
    pub device: String,
    /// Sectors read at the previous sample
    pub prev_sectors_read: u64,
    /// Sectors written at the previous sample
    pub prev_sectors_written: u64,
    /// Milliseconds spent doing I/O at the previous sample
    pub prev_io_time_ms: u64,
    /// Utilization percentage (0.0 to 100.0)
    pub utilization_percent: f64,
    /// Whether either sector counter moved since the previous sample
    pub is_active: bool,
}

impl DiskCounterState {
    /// Create a zeroed state for `device`.
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            prev_sectors_read: 0,
            prev_sectors_written: 0,
            prev_io_time_ms: 0,
            utilization_percent: 0.0,
            is_active: false,
        }
    }
}

/// Previous byte counters of one interface.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InterfaceTotals {
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

/// Network activity across all non-loopback interfaces.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NetworkCounterState {
    /// Previous byte counters keyed by interface name
    pub previous: BTreeMap<String, InterfaceTotals>,
    /// Last interface seen moving during the latest tick
    pub interface: String,
    /// Whether any interface moved during the latest tick
    pub is_active: bool,
}

impl NetworkCounterState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Every piece of per-device state the daemon keeps between ticks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceStates {
    /// Watched disks, in watch-list order
    pub disks: Vec<DiskCounterState>,
    /// Network summary
    pub network: NetworkCounterState,
}

impl DeviceStates {
    /// Create zeroed state for the given watch list.
    pub fn new<S: AsRef<str>>(watched: &[S]) -> Self {
        Self {
            disks: watched
                .iter()
                .map(|d| DiskCounterState::new(d.as_ref()))
                .collect(),
            network: NetworkCounterState::new(),
        }
    }

    /// Look up a watched disk by name.
    pub fn disk(&self, device: &str) -> Option<&DiskCounterState> {
        self.disks.iter().find(|d| d.device == device)
    }
}

/// Counters taken from one line of the block-device table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiskCounters {
    /// Device name (e.g., "sda", "nvme0n1")
    pub device: String,
    /// Number of sectors read
    pub sectors_read: u64,
    /// Number of sectors written
    pub sectors_written: u64,
    /// Time spent doing I/O (ms)
    pub io_time_ms: u64,
}

/// Counters taken from one line of the network-interface table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterfaceCounters {
    /// Interface name, whitespace trimmed
    pub interface: String,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

/// Derived states stamped with the time they were taken.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// When the second sample was taken
    pub taken_at: chrono::DateTime<chrono::Utc>,
    /// Gap between the two samples in milliseconds
    pub interval_ms: u64,
    pub states: DeviceStates,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_states_are_zeroed() {
        let states = DeviceStates::new(&["sda", "nvme0n1"]);
        assert_eq!(states.disks.len(), 2);

        let sda = states.disk("sda").unwrap();
        assert_eq!(sda.prev_io_time_ms, 0);
        assert_eq!(sda.utilization_percent, 0.0);
        assert!(!sda.is_active);

        assert!(states.disk("sdz").is_none());
        assert!(!states.network.is_active);
        assert!(states.network.previous.is_empty());
    }
}
