use super::{MockNotificationPublisher, MockQueueProvider};
use crate::library::communication::event::{Address, Notification};
use crate::library::communication::CommunicationFactory;
use std::sync::Arc;

/// [`CommunicationFactory`] implementation for unit tests
///
/// Hands out an expectation-based [`MockNotificationPublisher`] and a scripted
/// [`MockQueueProvider`].
pub struct MockCommunicationFactory {
    publisher: Arc<MockNotificationPublisher>,
    queue_provider: MockQueueProvider,
}

impl Default for MockCommunicationFactory {
    fn default() -> Self {
        Self {
            publisher: Arc::new(MockNotificationPublisher::default()),
            queue_provider: MockQueueProvider::default(),
        }
    }
}

impl CommunicationFactory for MockCommunicationFactory {
    type QueueProvider = MockQueueProvider;
    type NotificationPublisher = Arc<MockNotificationPublisher>;

    fn queue_provider(&self) -> Self::QueueProvider {
        self.queue_provider.clone()
    }

    fn notification_publisher(&self) -> Self::NotificationPublisher {
        self.publisher.clone()
    }
}

// Provide shorthands for the publisher methods
impl MockCommunicationFactory {
    /// Creates an instance whose publisher tolerates unexpected publications
    pub fn permitting_noise() -> Self {
        Self {
            publisher: Arc::new(MockNotificationPublisher::permitting_noise()),
            queue_provider: MockQueueProvider::default(),
        }
    }

    /// Creates an instance whose publisher validates nothing at all
    pub fn ignoring() -> Self {
        Self {
            publisher: Arc::new(MockNotificationPublisher::ignoring()),
            queue_provider: MockQueueProvider::default(),
        }
    }

    /// Registers an expected publication at its designated address
    pub fn expect<N: Notification + Send + Sync>(&self, notification: &N) -> &Self {
        self.publisher.expect(notification);
        self
    }

    /// Registers an expected publication at an explicit address
    pub fn expect_at<N: Notification + Send + Sync>(
        &self,
        address: Address,
        notification: &N,
    ) -> &Self {
        self.publisher.expect_at(address, notification);
        self
    }
}
