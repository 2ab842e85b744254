//! One-shot discovery of the bus the LED controller sits on.

use super::{BusIndex, BusProbe, ProbeOutcome};
use crate::error::{DaemonError, Result};
use tracing::{debug, info, warn};

/// Scans buses `0..max_bus` for a controller answering at `address`.
pub struct BusLocator<P> {
    prober: P,
    address: u16,
    max_bus: u8,
}

impl<P: BusProbe> BusLocator<P> {
    /// Create a locator over the given probe.
    pub fn new(prober: P, address: u16, max_bus: u8) -> Self {
        Self {
            prober,
            address,
            max_bus,
        }
    }

    /// Return the first bus whose probe responds. No retries.
    pub fn locate(&mut self) -> Result<BusIndex> {
        for bus in 0..self.max_bus {
            let outcome = self.prober.probe(bus, self.address);
            debug!("Probe of I2C bus {}: {:?}", bus, outcome);

            if outcome.is_responding() {
                if outcome == ProbeOutcome::Indeterminate {
                    debug!("Bus {} busy at 0x{:02x}, treating as present", bus, self.address);
                }
                info!("Found LED controller on I2C bus {}", bus);
                return Ok(bus);
            }
        }

        warn!("LED controller not found on any I2C bus");
        Err(DaemonError::DiscoveryFailure {
            address: self.address,
            buses: self.max_bus,
        })
    }
}
