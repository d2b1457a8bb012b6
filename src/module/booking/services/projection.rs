use crate::domain::event::PaymentEvent;
use crate::domain::topology::booking_events;
use crate::harness::Service;
use crate::library::communication::event::{Consumer, QueueDescriptor};
use crate::library::communication::CommunicationFactory;
use crate::library::EmptyResult;
use crate::module::booking::ReservationStore;
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info};
use std::sync::Arc;

/// Projects payment outcomes onto the reservation store
///
/// Consumes:
/// - [`PaymentEvent`]
///
/// Outcome events move pending reservations to their terminal state. Everything
/// else, including events for unknown reservations, is dropped silently.
pub struct ProjectionService<S> {
    store: Arc<S>,
}

impl<F, S> Service<F> for ProjectionService<S>
where
    F: CommunicationFactory + Send + Sync,
    S: ReservationStore + Send + Sync,
{
    const NAME: &'static str = "ProjectionService";
    type Instance = ProjectionService<S>;
    type Config = Arc<S>;

    fn instantiate(_factory: F, config: &Self::Config) -> Self::Instance {
        Self {
            store: config.clone(),
        }
    }
}

#[async_trait]
impl<S> Consumer for ProjectionService<S>
where
    S: ReservationStore + Send + Sync,
{
    type Notification = PaymentEvent;

    fn queue(&self) -> QueueDescriptor {
        booking_events()
    }

    async fn consume(&self, event: Self::Notification) -> EmptyResult {
        let reservation_id = match &event {
            PaymentEvent::PaymentSucceeded { reservation_id, .. }
            | PaymentEvent::PaymentFailed { reservation_id, .. } => *reservation_id,
            _ => return Ok(()),
        };

        let reservation = match self.store.fetch(reservation_id).await? {
            Some(reservation) => reservation,
            None => {
                debug!("Dropping outcome for unknown reservation {}", reservation_id);
                return Ok(());
            }
        };

        if let Some(next) = reservation.status.advance(&event) {
            if self
                .store
                .update_status(reservation_id, next, Utc::now())
                .await?
            {
                info!("Reservation {} moved to {}", reservation_id, next);
            }
        }

        Ok(())
    }
}
