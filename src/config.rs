//! Daemon configuration.
//!
//! There is no config file: [`DaemonConfig::default`] is the shipped
//! configuration. The builder methods exist so tests can point the sampler
//! at fixture files and shorten the tick.

use crate::error::{DaemonError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Block devices that own a front-panel LED, in panel order.
pub const WATCHED_DISKS: [&str; 6] = ["sda", "sdb", "nvme0n1", "nvme1n1", "nvme2n1", "nvme3n1"];

/// What happens to a disk's utilization when its busy-time did not advance.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StaleUtilizationPolicy {
    /// Keep the last computed value
    #[default]
    CarryForward,
    /// Drop back to 0%
    ResetToZero,
}

/// Configuration for the LED daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// 7-bit address of the LED controller
    pub i2c_address: u16,
    /// Number of `/dev/i2c-N` nodes scanned during discovery
    pub max_bus: u8,
    /// Block-device counter table
    pub diskstats_path: PathBuf,
    /// Network-interface counter table
    pub net_dev_path: PathBuf,
    /// Time between ticks in milliseconds
    pub interval_ms: u64,
    /// Device names tracked from the block-device table
    pub watched_disks: Vec<String>,
    /// Interfaces whose name starts with this are ignored
    pub loopback_prefix: String,
    /// Utilization handling when busy-time did not advance
    pub stale_utilization: StaleUtilizationPolicy,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            i2c_address: crate::DEFAULT_I2C_ADDRESS,
            max_bus: crate::MAX_I2C_BUS,
            diskstats_path: PathBuf::from("/proc/diskstats"),
            net_dev_path: PathBuf::from("/proc/net/dev"),
            interval_ms: crate::DEFAULT_INTERVAL_MS,
            watched_disks: WATCHED_DISKS.iter().map(|d| d.to_string()).collect(),
            loopback_prefix: "lo".to_string(),
            stale_utilization: StaleUtilizationPolicy::default(),
        }
    }
}

impl DaemonConfig {
    /// Set the counter table paths.
    pub fn with_sources(
        mut self,
        diskstats: impl Into<PathBuf>,
        net_dev: impl Into<PathBuf>,
    ) -> Self {
        self.diskstats_path = diskstats.into();
        self.net_dev_path = net_dev.into();
        self
    }

    /// Set the tick interval in milliseconds.
    pub fn with_interval_ms(mut self, interval_ms: u64) -> Self {
        self.interval_ms = interval_ms;
        self
    }

    /// Set the controller address.
    pub fn with_i2c_address(mut self, address: u16) -> Self {
        self.i2c_address = address;
        self
    }

    /// Set how many buses discovery scans.
    pub fn with_max_bus(mut self, max_bus: u8) -> Self {
        self.max_bus = max_bus;
        self
    }

    /// Set the stale utilization policy.
    pub fn with_stale_utilization(mut self, policy: StaleUtilizationPolicy) -> Self {
        self.stale_utilization = policy;
        self
    }

    /// Get the tick interval.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Check the configuration for values the daemon cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.interval_ms == 0 {
            return Err(DaemonError::config_error("interval_ms must be > 0"));
        }
        if self.max_bus == 0 {
            return Err(DaemonError::config_error("max_bus must be > 0"));
        }
        if self.i2c_address > 0x7f {
            return Err(DaemonError::config_error(format!(
                "i2c_address 0x{:x} is outside the 7-bit range",
                self.i2c_address
            )));
        }
        if self.watched_disks.is_empty() {
            return Err(DaemonError::config_error("watched_disks must not be empty"));
        }
        Ok(())
    }
}
