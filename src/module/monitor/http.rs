use crate::library::scheduling::{Job, TaskManager};
use crate::module::monitor::HeartbeatRegistry;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use warp::Filter;

/// Job serving the monitor status API
pub struct StatusServerJob {
    port: u16,
    registry: Arc<HeartbeatRegistry>,
}

impl StatusServerJob {
    /// Creates a new instance from raw parts
    pub fn new(port: u16, registry: Arc<HeartbeatRegistry>) -> Self {
        Self { port, registry }
    }
}

#[async_trait]
impl Job for StatusServerJob {
    fn name(&self) -> String {
        "StatusServerJob".into()
    }

    fn supports_graceful_termination(&self) -> bool {
        true
    }

    async fn execute(&self, manager: TaskManager) -> Result<()> {
        let registry = self.registry.clone();

        let status = warp::path!("status").and(warp::get()).map(move || {
            warp::reply::json(&json!({ "services": registry.overview() }))
        });

        let health = warp::path!("health")
            .and(warp::get())
            .map(|| warp::reply::json(&json!({ "status": "ok" })));

        let signal_manager = manager.clone();
        let (_, server) = warp::serve(status.or(health))
            .try_bind_with_graceful_shutdown(([0, 0, 0, 0], self.port), async move {
                signal_manager.termination_signal().await
            })
            .map_err(|e| anyhow!(e))?;

        manager.ready().await;
        server.await;

        Ok(())
    }
}
