use crate::domain::event::{HealthPing, HealthPong};
use crate::domain::topology::service_monitor;
use crate::harness::Service;
use crate::library::communication::event::{Consumer, NotificationPublisher, QueueDescriptor};
use crate::library::communication::CommunicationFactory;
use crate::library::EmptyResult;
use async_trait::async_trait;
use chrono::Utc;

/// Answers liveness probes on behalf of the embedding module
///
/// Consumes:
/// - [`HealthPing`]
///
/// Publishes:
/// - [`HealthPong`]
pub struct ResponderService<F: CommunicationFactory> {
    service_name: String,
    publisher: <F as CommunicationFactory>::NotificationPublisher,
}

impl<F> Service<F> for ResponderService<F>
where
    F: CommunicationFactory + Send + Sync,
{
    const NAME: &'static str = "ResponderService";
    type Instance = ResponderService<F>;
    type Config = String;

    fn instantiate(factory: F, config: &Self::Config) -> Self::Instance {
        Self {
            service_name: config.clone(),
            publisher: factory.notification_publisher(),
        }
    }
}

#[async_trait]
impl<F> Consumer for ResponderService<F>
where
    F: CommunicationFactory + Send + Sync,
{
    type Notification = HealthPing;

    fn queue(&self) -> QueueDescriptor {
        service_monitor(&self.service_name)
    }

    async fn consume(&self, ping: Self::Notification) -> EmptyResult {
        let pong = HealthPong {
            service: self.service_name.clone(),
            ping_id: Some(ping.ping_id),
            timestamp: Utc::now(),
        };

        self.publisher.publish(&pong).await
    }
}
