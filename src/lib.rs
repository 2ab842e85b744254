//! # LincStation LEDs - disk and network activity on the front panel
//!
//! Polls the kernel's block-device and network-interface counters once a
//! second and drives the bicolor front-panel LEDs of a LincStation NAS
//! through its I2C LED controller.
//!
//! ## Features
//!
//! - **Bus discovery**: scans `/dev/i2c-0` .. `/dev/i2c-19` for the controller
//! - **Disk LEDs**: white while a disk is active, red above 80% utilization
//! - **Network LED**: white while any non-loopback interface moves traffic
//! - **Clean shutdown**: every LED is cleared on SIGINT/SIGTERM
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lincstation_leds::{Daemon, DaemonConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let daemon = Daemon::new(DaemonConfig::default())?;
//!     daemon.run(CancellationToken::new()).await?;
//!     Ok(())
//! }
//! ```

pub mod bus;
pub mod config;
pub mod daemon;
pub mod error;
pub mod leds;
pub mod metrics;

// Re-export public API
pub use bus::{BusLocator, ProbeOutcome, RegisterBus};
pub use config::{DaemonConfig, StaleUtilizationPolicy};
pub use daemon::{Daemon, DaemonState, TickOutcome};
pub use error::{DaemonError, Result};
pub use leds::{LedColor, LedMapper, RenderReport};
pub use metrics::{
    data::{DiskCounterState, NetworkCounterState, StateSnapshot},
    ActivityEngine, CounterSampler, DeviceStates,
};

/// The sampling interval in milliseconds
pub const DEFAULT_INTERVAL_MS: u64 = 1000;

/// The LED controller's 7-bit I2C address
pub const DEFAULT_I2C_ADDRESS: u16 = 0x26;

/// Number of I2C buses scanned during discovery
pub const MAX_I2C_BUS: u8 = 20;
