//! Expectation-based mock implementation used by unit tests

mod factory;
mod notification_publisher;
mod queue_provider;

pub use factory::*;
pub use notification_publisher::*;
pub use queue_provider::*;

/// How strictly published notifications are matched against expectations
#[derive(Clone, PartialEq, Eq)]
pub enum ExpectationMode {
    /// No validity checks of any sort, just a dummy
    Ignore,
    /// Only allows expected items and requires all of them
    ExpectOnlyProvided,
    /// Allows intermittent noise but still requires all expected
    /// items to eventually be published
    AllowNoise,
}
