//! Liveness probing of the deployed services

mod http;
mod jobs;
mod options;
mod registry;
mod services;

use crate::constants::{DETECTION_WINDOW, PING_INTERVAL, SWEEP_INTERVAL};
use crate::harness::{Heart, Module, ServiceRunner};
use crate::library::communication::CommunicationFactory;
use crate::library::scheduling::JobScheduler;
use crate::library::BoxedError;
use async_trait::async_trait;
use http::StatusServerJob;
use jobs::{PingBroadcastJob, SweepJob};
use services::PongCollectorService;
use std::sync::Arc;

pub use options::Options;
pub use registry::{HeartbeatRegistry, ServiceHealth};

/// Module implementation
pub struct Monitor {
    options: Options,
}

impl Monitor {
    /// Creates a new instance from raw parts
    pub fn new(options: Options) -> Self {
        Self { options }
    }
}

#[async_trait]
impl Module for Monitor {
    async fn run(&mut self, scheduler: &JobScheduler) -> Result<Option<Heart>, BoxedError> {
        let factory = self.options.amqp.factory();
        let registry = Arc::new(HeartbeatRegistry::new(
            self.options.tracked.clone(),
            DETECTION_WINDOW,
        ));

        let broadcast = PingBroadcastJob::new(factory.notification_publisher(), PING_INTERVAL);
        let collector =
            ServiceRunner::<PongCollectorService>::new(factory.clone(), registry.clone());
        let sweep = SweepJob::new(registry.clone(), SWEEP_INTERVAL);
        let status = StatusServerJob::new(self.options.port, registry);

        scheduler.spawn_job(broadcast);
        scheduler.spawn_job(collector);
        scheduler.spawn_job(sweep);
        scheduler.spawn_job(status);

        Ok(Some(Heart::new()))
    }
}
