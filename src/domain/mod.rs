//! Domain specific structures, implementations, and logic

mod amount;
mod reservation;

pub mod event;
pub mod topology;
pub mod voting;

pub use amount::Amount;
pub use reservation::*;
