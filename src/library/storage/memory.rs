use super::ClaimStore;
use crate::library::BoxedError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// In-memory [`ClaimStore`] implementation for tests and single-process deployments
#[derive(Default)]
pub struct MemoryClaimStore {
    claims: Mutex<HashMap<String, Instant>>,
}

#[async_trait]
impl ClaimStore for MemoryClaimStore {
    async fn claim_once(&self, key: &str, ttl: Duration) -> Result<bool, BoxedError> {
        let mut claims = self.claims.lock().unwrap();
        let now = Instant::now();

        if let Some(expiry) = claims.get(key) {
            if *expiry > now {
                return Ok(false);
            }
        }

        claims.insert(key.to_owned(), now + ttl);

        Ok(true)
    }
}
