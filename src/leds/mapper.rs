//! Drives the panel LEDs from derived device state.

use crate::bus::RegisterBus;
use crate::leds::channel::{all_channels, disk_channel, LedChannel, LedColor, NETWORK_CHANNEL};
use crate::metrics::data::{DeviceStates, DiskCounterState, NetworkCounterState};
use tracing::{debug, info, trace, warn};

/// Utilization at or above which an active disk shows red.
pub const HIGH_UTILIZATION_THRESHOLD: f64 = 80.0;

/// Utilization at or above which an active disk counts as medium load.
/// Medium and low load both show white.
pub const MEDIUM_UTILIZATION_THRESHOLD: f64 = 50.0;

/// Color for a disk with the given activity and utilization.
pub fn classify(is_active: bool, utilization_percent: f64) -> LedColor {
    if !is_active {
        LedColor::Off
    } else if utilization_percent >= HIGH_UTILIZATION_THRESHOLD {
        LedColor::Red
    } else {
        LedColor::White
    }
}

/// Color for the network LED. Red is never used.
pub fn classify_network(is_active: bool) -> LedColor {
    if is_active {
        LedColor::White
    } else {
        LedColor::Off
    }
}

/// Outcome of one pass over the panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderReport {
    /// Channels whose clear and assert writes all succeeded
    pub channels_updated: usize,
    /// Register writes the bus rejected
    pub failed_writes: usize,
}

impl RenderReport {
    pub fn is_clean(&self) -> bool {
        self.failed_writes == 0
    }
}

/// Translates device state into register writes.
///
/// Every update clears both bits of a channel before asserting at most one,
/// so white and red are never lit together. Write failures are logged and
/// the rest of that channel's update is abandoned; the next tick rewrites it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LedMapper;

impl LedMapper {
    pub fn new() -> Self {
        Self
    }

    /// Update every known disk LED and the network LED.
    pub fn render<B: RegisterBus + ?Sized>(
        &self,
        states: &DeviceStates,
        bus: &mut B,
    ) -> RenderReport {
        let mut report = RenderReport::default();

        for disk in &states.disks {
            self.render_disk(disk, bus, &mut report);
        }
        self.render_network(&states.network, bus, &mut report);

        if !report.is_clean() {
            warn!(
                "LED update incomplete: {} write(s) failed",
                report.failed_writes
            );
        }
        report
    }

    fn render_disk<B: RegisterBus + ?Sized>(
        &self,
        disk: &DiskCounterState,
        bus: &mut B,
        report: &mut RenderReport,
    ) {
        let Some(channel) = disk_channel(&disk.device) else {
            trace!("No LED for disk {}", disk.device);
            return;
        };

        let color = classify(disk.is_active, disk.utilization_percent);
        drive(channel, color, bus, report);

        debug!(
            "Disk {}: {:.1}% utilization, {}",
            disk.device,
            disk.utilization_percent,
            if disk.is_active { "active" } else { "idle" }
        );
    }

    fn render_network<B: RegisterBus + ?Sized>(
        &self,
        network: &NetworkCounterState,
        bus: &mut B,
        report: &mut RenderReport,
    ) {
        drive(&NETWORK_CHANNEL, classify_network(network.is_active), bus, report);

        if network.is_active {
            debug!("Network: active on {}", network.interface);
        } else {
            debug!("Network: idle");
        }
    }

    /// Clear every white and red bit on the panel regardless of current state.
    pub fn turn_off_all<B: RegisterBus + ?Sized>(&self, bus: &mut B) -> RenderReport {
        info!("Turning off all LEDs...");

        let mut report = RenderReport::default();
        for channel in all_channels() {
            drive(channel, LedColor::Off, bus, &mut report);
        }

        if !report.is_clean() {
            warn!(
                "Failed to clear all LEDs: {} write(s) failed",
                report.failed_writes
            );
        }
        report
    }
}

fn drive<B: RegisterBus + ?Sized>(
    channel: &LedChannel,
    color: LedColor,
    bus: &mut B,
    report: &mut RenderReport,
) {
    if let Err(e) = bus.write_register(channel.pair.off(), channel.all_bits()) {
        warn!("Failed to clear {} LED: {}", channel.name, e);
        report.failed_writes += 1;
        return;
    }

    if let Some(mask) = channel.mask(color) {
        if let Err(e) = bus.write_register(channel.pair.on(), mask) {
            warn!("Failed to light {} LED {:?}: {}", channel.name, color, e);
            report.failed_writes += 1;
            return;
        }
    }

    report.channels_updated += 1;
}
