use super::topology::Topology;
use super::{AmqpPublisher, AmqpQueueProvider};
use crate::constants::RECONNECT_INTERVAL;
use crate::library::communication::CommunicationFactory;
use crate::library::BoxedError;
use futures::lock::Mutex;
use lapin::{Channel, Connection, ConnectionProperties};
use log::{debug, warn};
use std::sync::Arc;
use tokio::time::sleep;

struct Bus {
    // Dropping the connection tears down its channels, keep it alive alongside
    _connection: Connection,
    channel: Channel,
}

/// [`CommunicationFactory`] implementation backed by an AMQP broker
///
/// Lazily establishes a connection on first use and shares one channel between all
/// publishers and providers created from the same instance (clones included). A lost
/// connection is re-established indefinitely at a fixed interval; the configured
/// [`Topology`] is re-asserted on every fresh channel.
#[derive(Clone)]
pub struct AmqpCommunicationFactory {
    url: String,
    topology: Topology,
    bus: Arc<Mutex<Option<Bus>>>,
    publish_lock: Arc<Mutex<()>>,
}

impl AmqpCommunicationFactory {
    /// Creates a new instance connecting to the given broker url
    pub fn new(url: &str, topology: Topology) -> Self {
        Self {
            url: url.to_owned(),
            topology,
            bus: Arc::new(Mutex::new(None)),
            publish_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Returns a healthy channel, blocking until one could be established
    pub(crate) async fn channel(&self) -> Channel {
        loop {
            let mut slot = self.bus.lock().await;

            if let Some(bus) = slot.as_ref() {
                if bus.channel.status().connected() {
                    return bus.channel.clone();
                }

                debug!("Cached AMQP channel is no longer connected, discarding");
                *slot = None;
            }

            match self.connect().await {
                Ok(bus) => return slot.insert(bus).channel.clone(),
                Err(e) => {
                    warn!("Failed to connect to AMQP broker: {}", e);
                }
            }

            drop(slot);
            sleep(RECONNECT_INTERVAL).await;
        }
    }

    /// Discards the cached channel so the next access establishes a fresh one
    pub(crate) async fn invalidate(&self) {
        *self.bus.lock().await = None;
    }

    pub(crate) fn publish_lock(&self) -> Arc<Mutex<()>> {
        self.publish_lock.clone()
    }

    async fn connect(&self) -> Result<Bus, BoxedError> {
        let connection = Connection::connect(&self.url, ConnectionProperties::default()).await?;
        let channel = connection.create_channel().await?;

        self.topology.declare(&channel).await?;

        Ok(Bus {
            _connection: connection,
            channel,
        })
    }
}

impl CommunicationFactory for AmqpCommunicationFactory {
    type QueueProvider = AmqpQueueProvider;
    type NotificationPublisher = AmqpPublisher;

    fn queue_provider(&self) -> Self::QueueProvider {
        AmqpQueueProvider::new(self.clone())
    }

    fn notification_publisher(&self) -> Self::NotificationPublisher {
        AmqpPublisher::new(self.clone())
    }
}
