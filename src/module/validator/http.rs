use crate::domain::voting::VotingEngine;
use crate::library::scheduling::{Job, TaskManager};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::lock::Mutex;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, Reply};

/// Job serving the validator status API
///
/// Exposes which calculators are still trusted so that fault-injection drills
/// can be observed from the outside.
pub struct StatusServerJob {
    port: u16,
    engine: Arc<Mutex<VotingEngine>>,
}

impl StatusServerJob {
    /// Creates a new instance from raw parts
    pub fn new(port: u16, engine: Arc<Mutex<VotingEngine>>) -> Self {
        Self { port, engine }
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
        let engine = self.engine.clone();

        let status = warp::path!("status")
            .and(warp::get())
            .and(warp::any().map(move || engine.clone()))
            .and_then(roster_status);

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

async fn roster_status(engine: Arc<Mutex<VotingEngine>>) -> Result<impl Reply, Infallible> {
    let engine = engine.lock().await;

    Ok(warp::reply::json(&json!({
        "activeCalculators": engine.active(),
        "retiredCalculators": engine.retired(),
    })))
}

#[cfg(test)]
mod does {
    use super::*;
    use crate::domain::Amount;

    #[tokio::test]
    async fn report_the_current_roster() {
        let engine = Arc::new(Mutex::new(VotingEngine::with_roster(Some((
            "calc_c",
            Amount::from_cents(500),
        )))));

        engine.lock().await.validate(Amount::from_cents(10_000));

        let reply = roster_status(engine).await.unwrap();
        let response = reply.into_response();
        let body = warp::hyper::body::to_bytes(response.into_body())
            .await
            .unwrap();
        let status: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(status["activeCalculators"], json!(["calc_a", "calc_b"]));
        assert_eq!(status["retiredCalculators"], json!(["calc_c"]));
    }
}
