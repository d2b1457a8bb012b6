use crate::library::breaker::CircuitBreaker;
use crate::library::scheduling::{Job, TaskManager};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use warp::Filter;

/// Job serving the payment status API
///
/// Exposes the circuit breaker state so that provider outages are visible
/// without digging through logs.
pub struct StatusServerJob {
    port: u16,
    breaker: Arc<CircuitBreaker>,
}

impl StatusServerJob {
    /// Creates a new instance from raw parts
    pub fn new(port: u16, breaker: Arc<CircuitBreaker>) -> Self {
        Self { port, breaker }
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
        let breaker = self.breaker.clone();

        let status = warp::path!("status").and(warp::get()).map(move || {
            warp::reply::json(&json!({
                "breakerState": breaker.state().to_string(),
            }))
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
