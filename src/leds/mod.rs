//! Front-panel LED mapping.

pub mod channel;
pub mod mapper;

pub use channel::{LedChannel, LedColor};
pub use mapper::{LedMapper, RenderReport};
