//! Services hosted by the booking module

mod projection;

pub use projection::ProjectionService;
