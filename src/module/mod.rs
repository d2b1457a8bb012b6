//! Runnable modules each bundling multiple services and providing a unified configuration

pub mod options;

pub mod booking;
pub mod monitor;
pub mod payment;
pub mod validator;

mod responder;

pub use responder::ResponderService;
