use crate::domain::event::HealthPong;
use crate::domain::topology::monitor_pong;
use crate::harness::Service;
use crate::library::communication::event::{Consumer, QueueDescriptor};
use crate::library::communication::CommunicationFactory;
use crate::library::EmptyResult;
use crate::module::monitor::HeartbeatRegistry;
use async_trait::async_trait;
use log::debug;
use std::sync::Arc;

/// Collects liveness echoes into the heartbeat registry
///
/// Consumes:
/// - [`HealthPong`]
pub struct PongCollectorService {
    registry: Arc<HeartbeatRegistry>,
}

impl<F> Service<F> for PongCollectorService
where
    F: CommunicationFactory + Send + Sync,
{
    const NAME: &'static str = "PongCollectorService";
    type Instance = PongCollectorService;
    type Config = Arc<HeartbeatRegistry>;

    fn instantiate(_factory: F, config: &Self::Config) -> Self::Instance {
        Self {
            registry: config.clone(),
        }
    }
}

#[async_trait]
impl Consumer for PongCollectorService {
    type Notification = HealthPong;

    fn queue(&self) -> QueueDescriptor {
        monitor_pong()
    }

    async fn consume(&self, pong: Self::Notification) -> EmptyResult {
        if !self.registry.record_pong(&pong.service) {
            debug!("Dropping echo from untracked service {}", pong.service);
        }

        Ok(())
    }
}

#[cfg(test)]
mod does {
    use super::*;
    use crate::library::communication::implementation::mock::MockCommunicationFactory;
    use chrono::Utc;
    use std::time::Duration;
    use uuid::Uuid;

    fn pong(service: &str) -> HealthPong {
        HealthPong {
            service: service.into(),
            ping_id: Some(Uuid::new_v4()),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn record_echoes_of_tracked_services() {
        let registry = Arc::new(HeartbeatRegistry::new(
            ["booking".to_string()],
            Duration::from_secs(20),
        ));

        let service = <PongCollectorService as Service<MockCommunicationFactory>>::instantiate(
            MockCommunicationFactory::default(),
            &registry,
        );

        service.consume(pong("booking")).await.unwrap();

        assert!(registry.overview()[0].healthy);
    }

    #[tokio::test]
    async fn tolerate_echoes_of_untracked_services() {
        let registry = Arc::new(HeartbeatRegistry::new(
            ["booking".to_string()],
            Duration::from_secs(20),
        ));

        let service = <PongCollectorService as Service<MockCommunicationFactory>>::instantiate(
            MockCommunicationFactory::default(),
            &registry,
        );

        service.consume(pong("impostor")).await.unwrap();

        assert!(!registry.overview()[0].healthy);
    }
}
