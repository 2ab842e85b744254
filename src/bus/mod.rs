//! I2C access to the front-panel LED controller.
//!
//! Discovery ([`locator`]) scans the `/dev/i2c-N` nodes once at startup; the
//! resulting [`link`] is the only writer to the controller for the rest of
//! the process lifetime.

pub mod link;
pub mod locator;

pub use link::{DefaultBusLink, DefaultBusProbe};
pub use locator::BusLocator;

use crate::error::Result;

/// Index of an I2C adapter, as in `/dev/i2c-<index>`.
pub type BusIndex = u8;

/// Single-byte register writes to the bound controller.
pub trait RegisterBus {
    /// Write `value` to `register` at the bound address.
    fn write_register(&mut self, register: u8, value: u8) -> Result<()>;

    /// Release the connection.
    fn close(self)
    where
        Self: Sized,
    {
    }
}

impl<B: RegisterBus + ?Sized> RegisterBus for &mut B {
    fn write_register(&mut self, register: u8, value: u8) -> Result<()> {
        (**self).write_register(register, value)
    }
}

/// Result of probing one bus for the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The probe read returned a byte
    Present,
    /// Node missing, address rejected, or the read failed outright
    Absent,
    /// The read would have blocked; something holds the address
    Indeterminate,
}

impl ProbeOutcome {
    /// Whether discovery should accept the bus.
    pub fn is_responding(self) -> bool {
        !matches!(self, Self::Absent)
    }
}

/// Capability check for one bus index.
pub trait BusProbe {
    /// Open `bus`, bind `address` and issue a minimal read. Everything opened
    /// here is closed before returning.
    fn probe(&mut self, bus: BusIndex, address: u16) -> ProbeOutcome;
}
