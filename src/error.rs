//! Error handling for the LincStation LED daemon.

use std::path::PathBuf;

/// A specialized `Result` type for daemon operations.
pub type Result<T> = std::result::Result<T, DaemonError>;

/// The main error type for the LED daemon.
#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    /// No LED controller answered on any candidate bus
    #[error("LED controller at 0x{address:02x} not found on any of {buses} I2C buses")]
    DiscoveryFailure { address: u16, buses: u8 },

    /// The discovered bus could not be opened
    #[error("Failed to open I2C bus {bus}: {reason}")]
    LinkOpen { bus: u8, reason: String },

    /// The controller address could not be bound on an open bus
    #[error("Failed to bind address 0x{address:02x} on I2C bus {bus}: {reason}")]
    AddressBind { bus: u8, address: u16, reason: String },

    /// A single register write was rejected by the bus
    #[error("Failed to write 0x{value:02x} to register 0x{register:02x}: {reason}")]
    RegisterWrite {
        register: u8,
        value: u8,
        reason: String,
    },

    /// A kernel counter table could not be read
    #[error("Failed to read {}: {source}", .path.display())]
    CounterSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The binary was built without I2C support
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl DaemonError {
    /// Create a new configuration error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new register write error
    pub fn register_write(register: u8, value: u8, reason: impl Into<String>) -> Self {
        Self::RegisterWrite {
            register,
            value,
            reason: reason.into(),
        }
    }

    /// Create a new counter source error for `path`
    pub fn counter_source(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CounterSource {
            path: path.into(),
            source,
        }
    }

    /// Whether this error must stop the daemon before it enters the loop.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::DiscoveryFailure { .. }
                | Self::LinkOpen { .. }
                | Self::AddressBind { .. }
                | Self::Unsupported(_)
        )
    }
}
