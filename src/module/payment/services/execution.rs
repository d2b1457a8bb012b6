use crate::domain::event::{PaymentEvent, DEAD_LETTER_ADDRESS};
use crate::domain::topology::payment_intake;
use crate::domain::ReservationId;
use crate::harness::Service;
use crate::library::breaker::CircuitBreaker;
use crate::library::communication::event::{Consumer, NotificationPublisher, QueueDescriptor};
use crate::library::communication::CommunicationFactory;
use crate::library::helpers::Backoff;
use crate::library::storage::ClaimStore;
use crate::library::EmptyResult;
use crate::module::payment::provider::PaymentProvider;
use async_trait::async_trait;
use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// Tunables of the payment executor
#[derive(Debug, Clone)]
pub struct ExecutionSettings {
    /// How long a processed payment stays claimed
    pub claim_ttl: Duration,
    /// Backoff schedule, one entry per charge attempt
    ///
    /// The delay of the last attempt is never slept since the executor gives up
    /// right after it.
    pub retry_delays: Vec<Duration>,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            claim_ttl: Duration::from_secs(3600),
            retry_delays: Backoff::default().collect(),
        }
    }
}

/// Shared collaborators of the payment executor
pub struct ExecutionContext<C, P> {
    /// Claim store enforcing exactly-once processing
    pub claims: Arc<C>,
    /// Downstream charging the actual money
    pub provider: Arc<P>,
    /// Breaker guarding the provider
    pub breaker: Arc<CircuitBreaker>,
    /// Retry and claim tunables
    pub settings: ExecutionSettings,
}

impl<C, P> Clone for ExecutionContext<C, P> {
    fn clone(&self) -> Self {
        Self {
            claims: self.claims.clone(),
            provider: self.provider.clone(),
            breaker: self.breaker.clone(),
            settings: self.settings.clone(),
        }
    }
}

fn claim_key(reservation_id: &ReservationId) -> String {
    format!("payments:processed:{}", reservation_id)
}

/// Executes validated payments against the provider
///
/// Consumes:
/// - [`PaymentEvent::PaymentValidated`]
///
/// Publishes:
/// - [`PaymentEvent::PaymentProcessingStarted`]
/// - [`PaymentEvent::PaymentSucceeded`]
/// - [`PaymentEvent::PaymentFailed`], additionally copied to the dead letter exchange
///
/// A payment is claimed before the first charge attempt. Redelivered messages
/// find the claim taken and are dropped without a second charge.
pub struct ExecutionService<F: CommunicationFactory, C, P> {
    context: ExecutionContext<C, P>,
    publisher: <F as CommunicationFactory>::NotificationPublisher,
}

impl<F, C, P> Service<F> for ExecutionService<F, C, P>
where
    F: CommunicationFactory + Send + Sync,
    C: ClaimStore + Send + Sync,
    P: PaymentProvider + Send + Sync,
{
    const NAME: &'static str = "ExecutionService";
    type Instance = ExecutionService<F, C, P>;
    type Config = ExecutionContext<C, P>;

    fn instantiate(factory: F, config: &Self::Config) -> Self::Instance {
        Self {
            context: config.clone(),
            publisher: factory.notification_publisher(),
        }
    }
}

#[async_trait]
impl<F, C, P> Consumer for ExecutionService<F, C, P>
where
    F: CommunicationFactory + Send + Sync,
    C: ClaimStore + Send + Sync,
    P: PaymentProvider + Send + Sync,
{
    type Notification = PaymentEvent;

    fn queue(&self) -> QueueDescriptor {
        payment_intake()
    }

    async fn consume(&self, event: Self::Notification) -> EmptyResult {
        let (reservation_id, correlation_id, amount) = match event {
            PaymentEvent::PaymentValidated {
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

        let context = &self.context;
        let claimed = context
            .claims
            .claim_once(&claim_key(&reservation_id), context.settings.claim_ttl)
            .await?;

        if !claimed {
            info!(
                "Payment for reservation {} was already processed, skipping",
                reservation_id
            );
            return Ok(());
        }

        self.publisher
            .publish(&PaymentEvent::PaymentProcessingStarted {
                reservation_id,
                correlation_id,
                amount,
                timestamp: Utc::now(),
            })
            .await?;

        let attempts = context.settings.retry_delays.len();

        for (index, delay) in context.settings.retry_delays.iter().enumerate() {
            let attempt = index + 1;

            let outcome = match context.breaker.check() {
                Ok(()) => {
                    let outcome = context.provider.charge(amount).await;

                    match &outcome {
                        Ok(()) => context.breaker.record_success(),
                        Err(_) => context.breaker.record_failure(),
                    }

                    outcome.map_err(|e| e.to_string())
                }
                Err(rejection) => Err(rejection.to_string()),
            };

            match outcome {
                Ok(()) => {
                    info!("Charged {} for reservation {}", amount, reservation_id);

                    return self
                        .publisher
                        .publish(&PaymentEvent::PaymentSucceeded {
                            reservation_id,
                            correlation_id,
                            amount,
                            timestamp: Utc::now(),
                        })
                        .await;
                }
                Err(reason) => {
                    warn!(
                        "Charge attempt {}/{} for reservation {} failed: {}",
                        attempt, attempts, reservation_id, reason
                    );

                    if attempt < attempts {
                        sleep(*delay).await;
                    }
                }
            }
        }

        warn!(
            "Abandoning payment for reservation {} after {} attempts",
            reservation_id, attempts
        );

        let failed = PaymentEvent::PaymentFailed {
            reservation_id,
            correlation_id,
            amount,
            reason: "provider_unavailable".into(),
            timestamp: Utc::now(),
        };

        self.publisher.publish(&failed).await?;
        self.publisher.publish_to(DEAD_LETTER_ADDRESS, &failed).await
    }
}

#[cfg(test)]
mod does {
    use super::*;
    use crate::domain::Amount;
    use crate::library::communication::implementation::mock::MockCommunicationFactory;
    use crate::library::storage::MemoryClaimStore;
    use crate::module::payment::provider::ProviderError;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use uuid::Uuid;

    struct ScriptedProvider {
        outcomes: Mutex<VecDeque<bool>>,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn new(outcomes: impl IntoIterator<Item = bool>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into_iter().collect()),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PaymentProvider for ScriptedProvider {
        async fn charge(&self, _amount: Amount) -> Result<(), ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            match self.outcomes.lock().unwrap().pop_front() {
                Some(true) => Ok(()),
                _ => Err(ProviderError::Status(500)),
            }
        }
    }

    fn context(provider: Arc<ScriptedProvider>) -> ExecutionContext<MemoryClaimStore, ScriptedProvider> {
        context_with_breaker(provider, CircuitBreaker::new(3, Duration::from_secs(20)))
    }

    fn context_with_breaker(
        provider: Arc<ScriptedProvider>,
        breaker: CircuitBreaker,
    ) -> ExecutionContext<MemoryClaimStore, ScriptedProvider> {
        ExecutionContext {
            claims: Arc::new(MemoryClaimStore::default()),
            provider,
            breaker: Arc::new(breaker),
            settings: ExecutionSettings {
                claim_ttl: Duration::from_secs(3600),
                retry_delays: vec![
                    Duration::from_millis(1),
                    Duration::from_millis(1),
                    Duration::from_millis(1),
                ],
            },
        }
    }

    fn validated(id: Uuid, amount: Amount) -> PaymentEvent {
        PaymentEvent::PaymentValidated {
            reservation_id: id,
            correlation_id: Some(id),
            amount,
            original_amount: amount,
            divergence: false,
            retired_calculators: vec![],
            active_calculators: vec!["calc_a".into(), "calc_b".into(), "calc_c".into()],
            timestamp: Utc::now(),
        }
    }

    fn started(id: Uuid, amount: Amount) -> PaymentEvent {
        PaymentEvent::PaymentProcessingStarted {
            reservation_id: id,
            correlation_id: id,
            amount,
            timestamp: Utc::now(),
        }
    }

    fn succeeded(id: Uuid, amount: Amount) -> PaymentEvent {
        PaymentEvent::PaymentSucceeded {
            reservation_id: id,
            correlation_id: id,
            amount,
            timestamp: Utc::now(),
        }
    }

    fn failed(id: Uuid, amount: Amount) -> PaymentEvent {
        PaymentEvent::PaymentFailed {
            reservation_id: id,
            correlation_id: id,
            amount,
            reason: "provider_unavailable".into(),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn charge_on_the_first_attempt() {
        let id = Uuid::new_v4();
        let amount = Amount::from_cents(10_000);
        let provider = Arc::new(ScriptedProvider::new([true]));

        let factory = MockCommunicationFactory::default();
        factory
            .expect(&started(id, amount))
            .expect(&succeeded(id, amount));

        let service = ExecutionService::instantiate(factory, &context(provider.clone()));
        service.consume(validated(id, amount)).await.unwrap();

        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn retry_until_the_provider_recovers() {
        let id = Uuid::new_v4();
        let amount = Amount::from_cents(10_000);
        let provider = Arc::new(ScriptedProvider::new([false, false, true]));

        let factory = MockCommunicationFactory::default();
        factory
            .expect(&started(id, amount))
            .expect(&succeeded(id, amount));

        let service = ExecutionService::instantiate(factory, &context(provider.clone()));
        service.consume(validated(id, amount)).await.unwrap();

        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn fall_back_to_the_reservation_id_without_a_correlation() {
        let id = Uuid::new_v4();
        let amount = Amount::from_cents(10_000);
        let provider = Arc::new(ScriptedProvider::new([true]));

        let factory = MockCommunicationFactory::default();
        factory
            .expect(&started(id, amount))
            .expect(&succeeded(id, amount));

        let event = PaymentEvent::PaymentValidated {
            reservation_id: id,
            correlation_id: None,
            amount,
            original_amount: amount,
            divergence: false,
            retired_calculators: vec![],
            active_calculators: vec!["calc_a".into(), "calc_b".into(), "calc_c".into()],
            timestamp: Utc::now(),
        };

        let service = ExecutionService::instantiate(factory, &context(provider.clone()));
        service.consume(event).await.unwrap();
    }

    #[tokio::test]
    async fn give_up_and_dead_letter_after_exhausting_all_attempts() {
        let id = Uuid::new_v4();
        let amount = Amount::from_cents(10_000);
        let provider = Arc::new(ScriptedProvider::new([]));

        let factory = MockCommunicationFactory::default();
        factory
            .expect(&started(id, amount))
            .expect(&failed(id, amount))
            .expect_at(DEAD_LETTER_ADDRESS, &failed(id, amount));

        let service = ExecutionService::instantiate(factory, &context(provider.clone()));
        service.consume(validated(id, amount)).await.unwrap();

        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn charge_each_payment_at_most_once() {
        let id = Uuid::new_v4();
        let amount = Amount::from_cents(10_000);
        let provider = Arc::new(ScriptedProvider::new([true]));

        let factory = MockCommunicationFactory::default();
        factory
            .expect(&started(id, amount))
            .expect(&succeeded(id, amount));

        let service = ExecutionService::instantiate(factory, &context(provider.clone()));
        service.consume(validated(id, amount)).await.unwrap();

        // Redelivery finds the claim taken, no events and no charge
        service.consume(validated(id, amount)).await.unwrap();

        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn spare_the_provider_while_the_breaker_is_open() {
        let id = Uuid::new_v4();
        let amount = Amount::from_cents(10_000);
        let provider = Arc::new(ScriptedProvider::new([true]));

        let breaker = CircuitBreaker::new(1, Duration::from_secs(60));
        breaker.record_failure();

        let factory = MockCommunicationFactory::default();
        factory
            .expect(&started(id, amount))
            .expect(&failed(id, amount))
            .expect_at(DEAD_LETTER_ADDRESS, &failed(id, amount));

        let service = ExecutionService::instantiate(
            factory,
            &context_with_breaker(provider.clone(), breaker),
        );
        service.consume(validated(id, amount)).await.unwrap();

        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn ignore_events_other_than_validations() {
        let id = Uuid::new_v4();
        let provider = Arc::new(ScriptedProvider::new([true]));

        let factory = MockCommunicationFactory::default();
        let service = ExecutionService::instantiate(factory, &context(provider.clone()));

        let event = PaymentEvent::PaymentRequested {
            reservation_id: id,
            user_id: "alice".into(),
            amount: Amount::from_cents(100),
            correlation_id: Some(id),
            timestamp: Utc::now(),
        };

        service.consume(event).await.unwrap();
        assert_eq!(provider.call_count(), 0);
    }

    #[test]
    fn listen_on_the_intake_queue() {
        let provider = Arc::new(ScriptedProvider::new([]));
        let service: ExecutionService<MockCommunicationFactory, _, _> =
            ExecutionService::instantiate(MockCommunicationFactory::default(), &context(provider));

        assert_eq!(service.queue().name(), "payments.validated");
    }
}
