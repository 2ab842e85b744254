//! Counter sampling and activity derivation.
//!
//! This module reads the kernel's block-device and network-interface
//! counter tables and turns successive samples into per-device activity
//! flags and utilization percentages.

pub mod activity;
pub mod collector;
pub mod data;

// Re-export commonly used items
pub use activity::ActivityEngine;
pub use collector::CounterSampler;
pub use data::{DeviceStates, DiskCounterState, NetworkCounterState};
