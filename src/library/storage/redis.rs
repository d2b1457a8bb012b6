use super::ClaimStore;
use crate::constants::RECONNECT_INTERVAL;
use crate::library::BoxedError;
use async_trait::async_trait;
use futures::lock::Mutex;
use log::warn;
use redis::aio::MultiplexedConnection;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// [`ClaimStore`] implementation backed by redis
///
/// Claims are taken with a single conditional `SET key 1 NX EX <ttl>` command which is
/// atomic on the server, so any number of competing processes may race for the same key.
/// The connection is established lazily and re-established indefinitely at a fixed
/// interval when lost.
#[derive(Clone)]
pub struct RedisClaimStore {
    client: redis::Client,
    connection: Arc<Mutex<Option<MultiplexedConnection>>>,
}

impl RedisClaimStore {
    /// Creates a new instance connecting to the given redis url
    pub fn new(url: &str) -> Result<Self, BoxedError> {
        Ok(Self {
            client: redis::Client::open(url)?,
            connection: Arc::new(Mutex::new(None)),
        })
    }

    async fn connection(&self) -> MultiplexedConnection {
        loop {
            let mut slot = self.connection.lock().await;

            if let Some(connection) = slot.as_ref() {
                return connection.clone();
            }

            match self.client.get_multiplexed_tokio_connection().await {
                Ok(connection) => return slot.insert(connection).clone(),
                Err(e) => warn!("Failed to connect to redis: {}", e),
            }

            drop(slot);
            sleep(RECONNECT_INTERVAL).await;
        }
    }

    async fn invalidate(&self) {
        *self.connection.lock().await = None;
    }
}

#[async_trait]
impl ClaimStore for RedisClaimStore {
    async fn claim_once(&self, key: &str, ttl: Duration) -> Result<bool, BoxedError> {
        let mut connection = self.connection().await;

        let result: Result<Option<String>, _> = redis::cmd("SET")
            .arg(key)
            .arg("1")
            .arg("NX")
            .arg("EX")
            .arg(ttl.as_secs())
            .query_async(&mut connection)
            .await;

        match result {
            Ok(reply) => Ok(reply.is_some()),
            Err(e) => {
                self.invalidate().await;
                Err(e.into())
            }
        }
    }
}
