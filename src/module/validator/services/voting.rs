use crate::domain::event::{PaymentEvent, ValidationTelemetry};
use crate::domain::topology::validator_intake;
use crate::domain::voting::VotingEngine;
use crate::harness::Service;
use crate::library::communication::event::{Consumer, NotificationPublisher, QueueDescriptor};
use crate::library::communication::CommunicationFactory;
use crate::library::EmptyResult;
use async_trait::async_trait;
use chrono::Utc;
use futures::lock::Mutex;
use log::info;
use std::sync::Arc;

/// Establishes the authoritative amount for requested payments by quorum
///
/// Consumes:
/// - [`PaymentEvent::PaymentRequested`]
///
/// Publishes:
/// - [`PaymentEvent::PaymentValidated`]
/// - [`ValidationTelemetry`]
///
/// The voting engine is shared so that retirements persist across the lifetime
/// of the module, not just a single consumption.
pub struct VotingService<F: CommunicationFactory> {
    engine: Arc<Mutex<VotingEngine>>,
    publisher: <F as CommunicationFactory>::NotificationPublisher,
}

impl<F> Service<F> for VotingService<F>
where
    F: CommunicationFactory + Send + Sync,
{
    const NAME: &'static str = "VotingService";
    type Instance = VotingService<F>;
    type Config = Arc<Mutex<VotingEngine>>;

    fn instantiate(factory: F, config: &Self::Config) -> Self::Instance {
        Self {
            engine: config.clone(),
            publisher: factory.notification_publisher(),
        }
    }
}

#[async_trait]
impl<F> Consumer for VotingService<F>
where
    F: CommunicationFactory + Send + Sync,
{
    type Notification = PaymentEvent;

    fn queue(&self) -> QueueDescriptor {
        validator_intake()
    }

    async fn consume(&self, event: Self::Notification) -> EmptyResult {
        let (reservation_id, correlation_id, amount) = match event {
            PaymentEvent::PaymentRequested {
                reservation_id,
                correlation_id,
                amount,
                ..
            } => (
                reservation_id,
                correlation_id.unwrap_or(reservation_id),
                amount,
            ),
            _ => return Ok(()),
        };

        let outcome = self.engine.lock().await.validate(amount);
        let timestamp = Utc::now();

        info!(
            "Validated {} for reservation {} ({} voters)",
            outcome.majority_value,
            reservation_id,
            outcome.majority_group.len()
        );

        let validated = PaymentEvent::PaymentValidated {
            reservation_id,
            correlation_id: Some(correlation_id),
            amount: outcome.majority_value,
            original_amount: amount,
            divergence: outcome.divergence,
            retired_calculators: outcome.newly_retired.clone(),
            active_calculators: outcome.active_calculators.clone(),
            timestamp,
        };

        self.publisher.publish(&validated).await?;

        let telemetry = if outcome.divergence {
            ValidationTelemetry::ValidationDivergenceAlert {
                reservation_id,
                correlation_id,
                amount,
                majority_value: outcome.majority_value,
                active_calculators: outcome.active_calculators,
                results_by_calculator: outcome.results,
                retired_calculators: outcome.newly_retired,
                timestamp,
            }
        } else {
            ValidationTelemetry::ValidationSucceeded {
                reservation_id,
                correlation_id,
                amount,
                majority_value: outcome.majority_value,
                active_calculators: outcome.active_calculators,
                results_by_calculator: outcome.results,
                timestamp,
            }
        };

        self.publisher.publish(&telemetry).await
    }
}
