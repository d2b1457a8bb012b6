//! Reservation intake and saga state projection

mod http;
mod options;
mod services;
mod storage;

use crate::constants::service;
use crate::harness::{Heart, Module, ServiceRunner};
use crate::library::communication::CommunicationFactory;
use crate::library::scheduling::JobScheduler;
use crate::library::BoxedError;
use crate::module::ResponderService;
use async_trait::async_trait;
use http::ApiServerJob;
use services::ProjectionService;
use std::sync::Arc;
use storage::PostgresReservationStore;

pub use options::Options;
pub use storage::{MemoryReservationStore, ReservationStore};

/// Module implementation
pub struct Booking {
    options: Options,
    store: Option<Arc<PostgresReservationStore>>,
}

impl Booking {
    /// Creates a new instance from raw parts
    pub fn new(options: Options) -> Self {
        Self {
            options,
            store: None,
        }
    }
}

#[async_trait]
impl Module for Booking {
    async fn pre_startup(&mut self) -> Result<(), BoxedError> {
        let store = PostgresReservationStore::connect(&self.options.database).await?;
        self.store = Some(Arc::new(store));
        Ok(())
    }

    async fn run(&mut self, scheduler: &JobScheduler) -> Result<Option<Heart>, BoxedError> {
        let factory = self.options.amqp.factory();
        let store = self.store.take().ok_or("store has not been initialized")?;

        let projection = ServiceRunner::<ProjectionService<PostgresReservationStore>>::new(
            factory.clone(),
            store.clone(),
        );
        let responder =
            ServiceRunner::<ResponderService<_>>::new(factory.clone(), service::BOOKING.into());
        let api = ApiServerJob::new(
            self.options.port,
            store,
            factory.notification_publisher(),
        );

        scheduler.spawn_job(projection);
        scheduler.spawn_job(responder);
        scheduler.spawn_job(api);

        Ok(Some(Heart::new()))
    }
}
