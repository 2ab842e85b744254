//! Activity and utilization derived from counter deltas.

use std::collections::BTreeMap;

use crate::config::{DaemonConfig, StaleUtilizationPolicy};
use crate::metrics::data::{
    DiskCounterState, DiskCounters, InterfaceCounters, InterfaceTotals, NetworkCounterState,
};

/// Upper bound of a utilization percentage.
pub const MAX_UTILIZATION: f64 = 100.0;

/// Turns successive counter samples into per-device activity state.
#[derive(Debug, Clone, Copy)]
pub struct ActivityEngine {
    interval_ms: u64,
    stale_policy: StaleUtilizationPolicy,
}

impl ActivityEngine {
    /// Create an engine for the configured tick length and stale policy.
    pub fn new(config: &DaemonConfig) -> Self {
        Self {
            interval_ms: config.interval_ms.max(1),
            stale_policy: config.stale_utilization,
        }
    }

    /// Percentage of the tick the device spent busy, clamped to `[0, 100]`.
    pub fn utilization(&self, busy_delta_ms: u64) -> f64 {
        let hundredths = self.interval_ms as f64 / 100.0;
        (busy_delta_ms as f64 / hundredths).clamp(0.0, MAX_UTILIZATION)
    }

    /// Fold one tick's counters into `state`.
    pub fn update_disk(&self, state: &mut DiskCounterState, counters: &DiskCounters) {
        match counters.io_time_ms.checked_sub(state.prev_io_time_ms) {
            Some(delta) if delta > 0 => state.utilization_percent = self.utilization(delta),
            _ => {
                if self.stale_policy == StaleUtilizationPolicy::ResetToZero {
                    state.utilization_percent = 0.0;
                }
            }
        }

        state.is_active = counters.sectors_read != state.prev_sectors_read
            || counters.sectors_written != state.prev_sectors_written;

        state.prev_sectors_read = counters.sectors_read;
        state.prev_sectors_written = counters.sectors_written;
        state.prev_io_time_ms = counters.io_time_ms;
    }

    /// Update every watched disk. Disks missing from `counters` are idle
    /// this tick.
    pub fn update_disks(&self, states: &mut [DiskCounterState], counters: &[DiskCounters]) {
        for state in states.iter_mut() {
            match counters.iter().find(|c| c.device == state.device) {
                Some(c) => self.update_disk(state, c),
                None => state.is_active = false,
            }
        }
    }

    /// Record baseline counters without deriving anything from them.
    pub fn seed_disks(&self, states: &mut [DiskCounterState], counters: &[DiskCounters]) {
        for state in states.iter_mut() {
            if let Some(c) = counters.iter().find(|c| c.device == state.device) {
                state.prev_sectors_read = c.sectors_read;
                state.prev_sectors_written = c.sectors_written;
                state.prev_io_time_ms = c.io_time_ms;
            }
            state.utilization_percent = 0.0;
            state.is_active = false;
        }
    }

    /// Fold one tick's interface counters into `state`. Loopback entries must
    /// already be filtered out. Interfaces absent from this tick are dropped
    /// from `state.previous`.
    pub fn update_network(
        &self,
        state: &mut NetworkCounterState,
        interfaces: &[InterfaceCounters],
    ) {
        let mut seen = BTreeMap::new();
        state.is_active = false;

        for iface in interfaces {
            let current = totals(iface);
            let previous = state
                .previous
                .get(&iface.interface)
                .copied()
                .unwrap_or_default();

            if current != previous {
                state.is_active = true;
                state.interface.clone_from(&iface.interface);
            }
            seen.insert(iface.interface.clone(), current);
        }

        state.previous = seen;
    }

    /// Record baseline interface counters.
    pub fn seed_network(
        &self,
        state: &mut NetworkCounterState,
        interfaces: &[InterfaceCounters],
    ) {
        state.previous = interfaces
            .iter()
            .map(|iface| (iface.interface.clone(), totals(iface)))
            .collect();
        state.is_active = false;
    }
}

fn totals(iface: &InterfaceCounters) -> InterfaceTotals {
    InterfaceTotals {
        rx_bytes: iface.rx_bytes,
        tx_bytes: iface.tx_bytes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iface(name: &str, rx_bytes: u64, tx_bytes: u64) -> InterfaceCounters {
        InterfaceCounters {
            interface: name.to_string(),
            rx_bytes,
            tx_bytes,
        }
    }

    #[test]
    fn test_utilization_is_clamped() {
        let engine = ActivityEngine::new(&DaemonConfig::default());
        assert_eq!(engine.utilization(500), 50.0);
        assert_eq!(engine.utilization(1500), MAX_UTILIZATION);
    }

    #[test]
    fn test_unchanged_interface_is_idle() {
        let engine = ActivityEngine::new(&DaemonConfig::default());
        let mut state = NetworkCounterState::default();

        engine.seed_network(&mut state, &[iface("eth0", 100, 50)]);
        engine.update_network(&mut state, &[iface("eth0", 100, 50)]);
        assert!(!state.is_active);

        engine.update_network(&mut state, &[iface("eth0", 180, 50)]);
        assert!(state.is_active);
        assert_eq!(state.interface, "eth0");
    }

    #[test]
    fn test_vanished_interfaces_are_forgotten() {
        let engine = ActivityEngine::new(&DaemonConfig::default());
        let mut state = NetworkCounterState::default();
        engine.seed_network(&mut state, &[iface("eth0", 0, 0)]);

        for tick in 0..1000u64 {
            let veth = format!("veth{tick}");
            engine.update_network(
                &mut state,
                &[iface("eth0", tick, tick), iface(&veth, tick, 0)],
            );
            assert!(state.previous.len() <= 2);
        }

        assert!(state.previous.contains_key("eth0"));
        assert!(state.previous.contains_key("veth999"));
    }

    #[test]
    fn test_reseeding_replaces_known_interfaces() {
        let engine = ActivityEngine::new(&DaemonConfig::default());
        let mut state = NetworkCounterState::default();

        engine.seed_network(&mut state, &[iface("eth0", 1, 1), iface("eth1", 2, 2)]);
        engine.seed_network(&mut state, &[iface("eth1", 3, 3)]);

        assert_eq!(state.previous.len(), 1);
        assert!(!state.is_active);
    }
}
