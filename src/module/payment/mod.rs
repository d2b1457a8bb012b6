//! Resilient execution of validated payments

mod http;
mod options;
mod provider;
mod services;

use crate::constants::service;
use crate::harness::{Heart, Module, ServiceRunner};
use crate::library::breaker::CircuitBreaker;
use crate::library::scheduling::JobScheduler;
use crate::library::storage::RedisClaimStore;
use crate::library::BoxedError;
use crate::module::ResponderService;
use async_trait::async_trait;
use http::StatusServerJob;
use provider::HttpPaymentProvider;
use services::{ExecutionContext, ExecutionService};
use std::sync::Arc;

pub use options::Options;

/// Module implementation
pub struct Payment {
    options: Options,
}

impl Payment {
    /// Creates a new instance from raw parts
    pub fn new(options: Options) -> Self {
        Self { options }
    }
}

#[async_trait]
impl Module for Payment {
    async fn run(&mut self, scheduler: &JobScheduler) -> Result<Option<Heart>, BoxedError> {
        let factory = self.options.amqp.factory();

        let breaker = Arc::new(CircuitBreaker::new(
            self.options.breaker_threshold,
            self.options.breaker_reset,
        ));

        let context = ExecutionContext {
            claims: Arc::new(RedisClaimStore::new(&self.options.redis)?),
            provider: Arc::new(HttpPaymentProvider::new(
                &self.options.provider,
                self.options.provider_timeout,
            )),
            breaker: breaker.clone(),
            settings: self.options.settings(),
        };

        let execution = ServiceRunner::<ExecutionService<_, _, _>>::new(factory.clone(), context);
        let responder = ServiceRunner::<ResponderService<_>>::new(factory, service::PAYMENT.into());
        let status = StatusServerJob::new(self.options.port, breaker);

        scheduler.spawn_job(execution);
        scheduler.spawn_job(responder);
        scheduler.spawn_job(status);

        Ok(Some(Heart::new()))
    }
}
