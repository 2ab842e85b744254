//! Controller register map and the fixed device-to-LED table.
//!
//! Each bicolor LED has a white bit and a red bit in one register pair.
//! Writing a mask to the pair's ON register lights those bits; writing it to
//! the OFF register (ON + 0x10) clears them.

use serde::{Deserialize, Serialize};

/// Distance from an ON register to its OFF register.
pub const OFF_REGISTER_OFFSET: u8 = 0x10;

/// HDD bays and the network LED.
pub const PAIR_0: RegisterPair = RegisterPair::new(0xa0);
/// NVMe slots.
pub const PAIR_1: RegisterPair = RegisterPair::new(0xa1);

/// ON/OFF register pair on the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegisterPair {
    on: u8,
}

impl RegisterPair {
    pub const fn new(on: u8) -> Self {
        Self { on }
    }

    /// Register that asserts the bits written to it.
    pub const fn on(self) -> u8 {
        self.on
    }

    /// Register that de-asserts the bits written to it.
    pub const fn off(self) -> u8 {
        self.on + OFF_REGISTER_OFFSET
    }
}

/// Color an LED is driven to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedColor {
    Off,
    White,
    Red,
}

/// One physical LED and the device it reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedChannel {
    /// Block device or "network"
    pub name: &'static str,
    pub pair: RegisterPair,
    pub white: u8,
    pub red: u8,
}

impl LedChannel {
    /// Both color bits of this LED.
    pub const fn all_bits(&self) -> u8 {
        self.white | self.red
    }

    /// Bit to assert for `color`, if any.
    pub fn mask(&self, color: LedColor) -> Option<u8> {
        match color {
            LedColor::Off => None,
            LedColor::White => Some(self.white),
            LedColor::Red => Some(self.red),
        }
    }
}

/// Network activity LED.
pub static NETWORK_CHANNEL: LedChannel = LedChannel {
    name: "network",
    pair: PAIR_0,
    white: 0x40,
    red: 0x80,
};

/// Disk LEDs keyed by block device name.
pub static DISK_CHANNELS: [LedChannel; 6] = [
    LedChannel {
        name: "sda",
        pair: PAIR_0,
        white: 0x04,
        red: 0x08,
    },
    LedChannel {
        name: "sdb",
        pair: PAIR_0,
        white: 0x10,
        red: 0x20,
    },
    LedChannel {
        name: "nvme0n1",
        pair: PAIR_1,
        white: 0x01,
        red: 0x02,
    },
    LedChannel {
        name: "nvme1n1",
        pair: PAIR_1,
        white: 0x04,
        red: 0x08,
    },
    LedChannel {
        name: "nvme2n1",
        pair: PAIR_1,
        white: 0x10,
        red: 0x20,
    },
    LedChannel {
        name: "nvme3n1",
        pair: PAIR_1,
        white: 0x40,
        red: 0x80,
    },
];

/// LED wired to `device`. Exact name match only.
pub fn disk_channel(device: &str) -> Option<&'static LedChannel> {
    DISK_CHANNELS.iter().find(|c| c.name == device)
}

/// Every LED on the panel, disks first.
pub fn all_channels() -> impl Iterator<Item = &'static LedChannel> {
    DISK_CHANNELS.iter().chain(std::iter::once(&NETWORK_CHANNEL))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_off_register_offset() {
        assert_eq!(PAIR_0.on(), 0xa0);
        assert_eq!(PAIR_0.off(), 0xb0);
        assert_eq!(PAIR_1.off(), 0xb1);
    }

    #[test]
    fn test_channels_do_not_share_bits() {
        let mut used: HashMap<RegisterPair, u8> = HashMap::new();
        for channel in all_channels() {
            assert_eq!(channel.white & channel.red, 0, "{}", channel.name);
            let bits = used.entry(channel.pair).or_default();
            assert_eq!(*bits & channel.all_bits(), 0, "{} overlaps", channel.name);
            *bits |= channel.all_bits();
        }
    }

    #[test]
    fn test_lookup_is_exact() {
        assert_eq!(disk_channel("nvme2n1").unwrap().white, 0x10);
        assert!(disk_channel("nvme2n1p1").is_none());
        assert!(disk_channel("sd").is_none());
        assert!(disk_channel("network").is_none());
    }
}
