//! Runtime harness to execute services in the context of modules

mod heart;
mod module;
mod service;

pub use heart::*;
pub use module::*;
pub use service::*;
