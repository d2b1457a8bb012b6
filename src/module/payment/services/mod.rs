//! Services hosted by the payment module

mod execution;

pub use execution::{ExecutionContext, ExecutionService, ExecutionSettings};
