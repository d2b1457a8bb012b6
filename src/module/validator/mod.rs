//! Quorum validation of requested payment amounts

mod http;
mod options;
mod services;

use crate::constants::service;
use crate::harness::{Heart, Module, ServiceRunner};
use crate::library::scheduling::JobScheduler;
use crate::library::BoxedError;
use crate::module::ResponderService;
use async_trait::async_trait;
use futures::lock::Mutex;
use http::StatusServerJob;
use services::VotingService;
use std::sync::Arc;

pub use options::Options;

/// Module implementation
pub struct Validator {
    options: Options,
}

impl Validator {
    /// Creates a new instance from raw parts
    pub fn new(options: Options) -> Self {
        Self { options }
    }
}

#[async_trait]
impl Module for Validator {
    async fn run(&mut self, scheduler: &JobScheduler) -> Result<Option<Heart>, BoxedError> {
        let factory = self.options.amqp.factory();
        let engine = Arc::new(Mutex::new(self.options.engine()));

        let voting = ServiceRunner::<VotingService<_>>::new(factory.clone(), engine.clone());
        let responder =
            ServiceRunner::<ResponderService<_>>::new(factory, service::VALIDATOR.into());
        let status = StatusServerJob::new(self.options.port, engine);

        scheduler.spawn_job(voting);
        scheduler.spawn_job(responder);
        scheduler.spawn_job(status);

        Ok(Some(Heart::new()))
    }
}
