//! Atomic claim storage used for idempotent processing
//!
//! A claim is a key that can be acquired exactly once within its time-to-live.
//! Competing processors race for the claim and only the winner carries out the
//! associated side effects, every loser backs off without doing anything.

mod memory;
mod redis;

pub use self::redis::RedisClaimStore;
pub use memory::MemoryClaimStore;

use crate::library::BoxedError;
use async_trait::async_trait;
use std::time::Duration;

/// Store handing out at most one claim per key within its time-to-live
#[async_trait]
pub trait ClaimStore {
    /// Attempts to claim the given key
    ///
    /// Returns `true` if the caller acquired the claim and `false` if somebody
    /// else already holds it.
    async fn claim_once(&self, key: &str, ttl: Duration) -> Result<bool, BoxedError>;
}
