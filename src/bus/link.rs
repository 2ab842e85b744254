//! Address-bound connection to the LED controller.
//!
//! Feature-gated so the crate builds on machines without `/dev/i2c-*`; the
//! fallback link refuses to open and the fallback probe never finds anything.

use super::{BusIndex, BusProbe, ProbeOutcome, RegisterBus};
use crate::error::{DaemonError, Result};

#[cfg(feature = "i2c")]
mod linux_i2c {
    use super::*;
    use rppal::i2c::{Error as I2cError, I2c};
    use std::io;
    use tracing::{info, trace};

    /// Open I2C adapter with the controller address bound.
    pub struct I2cLink {
        bus: BusIndex,
        i2c: I2c,
    }

    impl I2cLink {
        /// Open `/dev/i2c-<bus>` and bind `address`.
        pub fn open(bus: BusIndex, address: u16) -> Result<Self> {
            let mut i2c = I2c::with_bus(bus).map_err(|e| DaemonError::LinkOpen {
                bus,
                reason: e.to_string(),
            })?;

            i2c.set_slave_address(address)
                .map_err(|e| DaemonError::AddressBind {
                    bus,
                    address,
                    reason: e.to_string(),
                })?;

            info!("I2C initialized successfully on bus {}", bus);
            Ok(Self { bus, i2c })
        }

        /// Bus this link is bound to.
        pub fn bus(&self) -> BusIndex {
            self.bus
        }
    }

    impl RegisterBus for I2cLink {
        fn write_register(&mut self, register: u8, value: u8) -> Result<()> {
            trace!("write 0x{:02x} -> 0x{:02x}", value, register);
            self.i2c
                .smbus_write_byte(register, value)
                .map_err(|e| DaemonError::register_write(register, value, e.to_string()))
        }

        fn close(self) {
            info!("Closing I2C bus {}", self.bus);
        }
    }

    /// Probes buses with an SMBus receive-byte.
    #[derive(Debug, Default)]
    pub struct I2cProbe;

    impl BusProbe for I2cProbe {
        fn probe(&mut self, bus: BusIndex, address: u16) -> ProbeOutcome {
            let mut i2c = match I2c::with_bus(bus) {
                Ok(i2c) => i2c,
                Err(e) => {
                    trace!("bus {}: open failed: {}", bus, e);
                    return ProbeOutcome::Absent;
                }
            };

            if let Err(e) = i2c.set_slave_address(address) {
                trace!("bus {}: bind failed: {}", bus, e);
                return ProbeOutcome::Absent;
            }

            match i2c.smbus_receive_byte() {
                Ok(_) => ProbeOutcome::Present,
                Err(I2cError::Io(e)) if e.kind() == io::ErrorKind::WouldBlock => {
                    ProbeOutcome::Indeterminate
                }
                Err(e) => {
                    trace!("bus {}: probe read failed: {}", bus, e);
                    ProbeOutcome::Absent
                }
            }
        }
    }
}

#[cfg(not(feature = "i2c"))]
mod unsupported {
    use super::*;

    /// Link for builds without I2C support. Never opens.
    #[derive(Debug)]
    pub struct UnsupportedLink;

    impl UnsupportedLink {
        pub fn open(bus: BusIndex, _address: u16) -> Result<Self> {
            Err(DaemonError::Unsupported(format!(
                "I2C support not compiled in (attempted to open bus {})",
                bus
            )))
        }
    }

    impl RegisterBus for UnsupportedLink {
        fn write_register(&mut self, register: u8, value: u8) -> Result<()> {
            Err(DaemonError::register_write(
                register,
                value,
                "I2C support not compiled in",
            ))
        }
    }

    /// Probe for builds without I2C support.
    #[derive(Debug, Default)]
    pub struct UnsupportedProbe;

    impl BusProbe for UnsupportedProbe {
        fn probe(&mut self, _bus: BusIndex, _address: u16) -> ProbeOutcome {
            ProbeOutcome::Absent
        }
    }
}

// Re-export the appropriate bus implementation
#[cfg(feature = "i2c")]
pub use linux_i2c::{I2cLink as DefaultBusLink, I2cProbe as DefaultBusProbe};

#[cfg(not(feature = "i2c"))]
pub use unsupported::{
    UnsupportedLink as DefaultBusLink, UnsupportedProbe as DefaultBusProbe,
};
