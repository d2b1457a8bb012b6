//! Services hosted by the monitor module

mod collector;

pub use collector::PongCollectorService;
