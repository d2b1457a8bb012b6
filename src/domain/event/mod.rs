//! Event notifications travelling between the services

mod health;
mod payment;
mod validation;

pub use health::*;
pub use payment::*;
pub use validation::*;
