//! Implementations of the communication traits

pub mod amqp;
pub mod json;

#[cfg(test)]
pub mod mock;
