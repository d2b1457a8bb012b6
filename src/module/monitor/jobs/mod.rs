//! Periodic jobs of the monitor module

mod broadcast;
mod sweep;

pub use broadcast::PingBroadcastJob;
pub use sweep::SweepJob;
