use crate::constants::service;
use crate::domain::event::HealthPing;
use crate::library::communication::event::NotificationPublisher;
use crate::library::scheduling::{Job, TaskManager};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::time::Duration;
use tokio::time::sleep;
use uuid::Uuid;

/// Job broadcasting liveness probes at a fixed interval
///
/// Every probe carries a fresh identifier so that echoes can be attributed to
/// the round that triggered them.
pub struct PingBroadcastJob<P> {
    publisher: P,
    interval: Duration,
}

impl<P> PingBroadcastJob<P> {
    /// Creates a new instance from raw parts
    pub fn new(publisher: P, interval: Duration) -> Self {
        Self {
            publisher,
            interval,
        }
    }
}

impl<P: NotificationPublisher> PingBroadcastJob<P> {
    async fn broadcast_once(&self) -> Result<()> {
        let ping = HealthPing {
            ping_id: Uuid::new_v4(),
            source: service::MONITOR.into(),
            timestamp: Utc::now(),
        };

        self.publisher.publish(&ping).await.map_err(|e| anyhow!(e))
    }
}

#[async_trait]
impl<P> Job for PingBroadcastJob<P>
where
    P: NotificationPublisher + Send + Sync,
{
    fn name(&self) -> String {
        "PingBroadcastJob".into()
    }

    fn supports_graceful_termination(&self) -> bool {
        true
    }

    async fn execute(&self, manager: TaskManager) -> Result<()> {
        manager.ready().await;

        loop {
            self.broadcast_once().await?;

            tokio::select! {
                _ = sleep(self.interval) => {}
                _ = manager.termination_signal() => return Ok(()),
            }
        }
    }
}
