use super::AmqpCommunicationFactory;
use crate::constants::RECONNECT_INTERVAL;
use crate::library::communication::event::{Address, RawNotificationPublisher};
use crate::library::communication::implementation::json::JsonNotificationPublisher;
use crate::library::EmptyResult;
use async_trait::async_trait;
use futures::lock::Mutex;
use lapin::options::BasicPublishOptions;
use lapin::BasicProperties;
use log::warn;
use std::sync::Arc;
use tokio::time::sleep;

const DELIVERY_MODE_PERSISTENT: u8 = 2;

/// [`NotificationPublisher`](crate::library::communication::event::NotificationPublisher)
/// implementation publishing persistent JSON messages
///
/// At most one publication is in flight at any time. When the broker is unreachable the
/// publisher stalls its caller and retries indefinitely rather than dropping the event.
#[derive(Clone)]
pub struct AmqpPublisher {
    factory: AmqpCommunicationFactory,
    lock: Arc<Mutex<()>>,
}

impl AmqpPublisher {
    /// Creates a new instance on top of the given factory
    pub(crate) fn new(factory: AmqpCommunicationFactory) -> Self {
        let lock = factory.publish_lock();
        Self { factory, lock }
    }
}

impl JsonNotificationPublisher for AmqpPublisher {}

#[async_trait]
impl RawNotificationPublisher for AmqpPublisher {
    async fn publish_raw(&self, data: &[u8], address: Address) -> EmptyResult {
        let _guard = self.lock.lock().await;

        loop {
            let channel = self.factory.channel().await;
            let properties = BasicProperties::default()
                .with_delivery_mode(DELIVERY_MODE_PERSISTENT)
                .with_content_type("application/json".into());

            let attempt = channel
                .basic_publish(
                    address.exchange(),
                    address.routing_key(),
                    BasicPublishOptions::default(),
                    data,
                    properties,
                )
                .await;

            match attempt {
                Ok(_) => return Ok(()),
                Err(e) => {
                    warn!(
                        "Failed to publish to {}/{}: {}",
                        address.exchange(),
                        address.routing_key(),
                        e
                    );
                }
            }

            self.factory.invalidate().await;
            sleep(RECONNECT_INTERVAL).await;
        }
    }
}
