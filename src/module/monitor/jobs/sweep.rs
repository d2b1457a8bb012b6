use crate::library::scheduling::{Job, TaskManager};
use crate::module::monitor::HeartbeatRegistry;
use anyhow::Result;
use async_trait::async_trait;
use log::warn;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// Job evaluating echo ages at a fixed interval
///
/// A degraded service is reported on every sweep until it recovers, not just on
/// the sweep that first notices it.
pub struct SweepJob {
    registry: Arc<HeartbeatRegistry>,
    interval: Duration,
}

impl SweepJob {
    /// Creates a new instance from raw parts
    pub fn new(registry: Arc<HeartbeatRegistry>, interval: Duration) -> Self {
        Self { registry, interval }
    }
}

#[async_trait]
impl Job for SweepJob {
    fn name(&self) -> String {
        "SweepJob".into()
    }

    fn supports_graceful_termination(&self) -> bool {
        true
    }

    async fn execute(&self, manager: TaskManager) -> Result<()> {
        manager.ready().await;

        loop {
            tokio::select! {
                _ = sleep(self.interval) => {}
                _ = manager.termination_signal() => return Ok(()),
            }

            for service in self.registry.breaching() {
                warn!("Service {} missed its heartbeat window", service);
            }
        }
    }
}
