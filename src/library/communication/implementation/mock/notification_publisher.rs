use super::ExpectationMode;
use crate::library::communication::event::{Address, Notification, NotificationPublisher};
use crate::library::EmptyResult;
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug)]
struct ExpectedNotification {
    serialized: String,
    address: Address,
}

/// Strips inherently fresh top-level fields before comparison
///
/// Most events carry a wall-clock timestamp and liveness probes a random identifier,
/// neither of which is reproducible in tests. Equality is evaluated without them.
fn normalized(serialized: &str) -> Value {
    let mut value: Value =
        serde_json::from_str(serialized).expect("published value is not valid JSON");

    if let Some(object) = value.as_object_mut() {
        object.remove("timestamp");
        object.remove("pingId");
    }

    value
}

/// [`NotificationPublisher`] implementation validating publications against expectations
///
/// Unless created in a permissive mode, every publication has to match a previously
/// registered expectation in order and any expectation left unfulfilled when the
/// instance is dropped fails the test.
pub struct MockNotificationPublisher {
    remaining: AtomicUsize,
    expected: Mutex<VecDeque<ExpectedNotification>>,
    mode: ExpectationMode,
}

impl Default for MockNotificationPublisher {
    fn default() -> Self {
        Self {
            remaining: AtomicUsize::new(0),
            expected: Mutex::new(VecDeque::new()),
            mode: ExpectationMode::ExpectOnlyProvided,
        }
    }
}

#[async_trait]
impl NotificationPublisher for Arc<MockNotificationPublisher> {
    async fn publish<N: Notification + Send + Sync>(&self, notification: &N) -> EmptyResult {
        self.handle(notification, notification.address()).await;
        Ok(())
    }

    async fn publish_to<N: Notification + Send + Sync>(
        &self,
        address: Address,
        notification: &N,
    ) -> EmptyResult {
        self.handle(notification, address).await;
        Ok(())
    }
}

impl MockNotificationPublisher {
    /// Creates an instance which tolerates unexpected publications
    #[allow(clippy::field_reassign_with_default)]
    pub fn permitting_noise() -> Self {
        let mut instance = Self::default();
        instance.mode = ExpectationMode::AllowNoise;
        instance
    }

    /// Creates an instance which validates nothing at all
    #[allow(clippy::field_reassign_with_default)]
    pub fn ignoring() -> Self {
        let mut instance = Self::default();
        instance.mode = ExpectationMode::Ignore;
        instance
    }

    /// Registers an expected publication at its designated address
    pub fn expect<N: Notification + Send + Sync>(&self, notification: &N) -> &Self {
        self.add_expectation(notification, notification.address())
            .unwrap();
        self
    }

    /// Registers an expected publication at an explicit address
    pub fn expect_at<N: Notification + Send + Sync>(
        &self,
        address: Address,
        notification: &N,
    ) -> &Self {
        self.add_expectation(notification, address).unwrap();
        self
    }

    fn add_expectation<N: Notification + Send + Sync>(
        &self,
        notification: &N,
        address: Address,
    ) -> EmptyResult {
        let serialized = serde_json::to_string(notification)?;

        println!(
            "EXP {}/{} {}",
            address.exchange(),
            address.routing_key(),
            serialized
        );

        self.expected
            .lock()
            .unwrap()
            .push_back(ExpectedNotification {
                serialized,
                address,
            });

        self.remaining.fetch_add(1, Ordering::SeqCst);

        Ok(())
    }

    async fn handle<N: Notification + Send + Sync>(&self, notification: &N, address: Address) {
        let json = serde_json::to_string(&notification)
            .expect("Published value failed to convert to JSON");
        println!("PUB {}/{} {}", address.exchange(), address.routing_key(), json);

        match self.mode {
            ExpectationMode::Ignore => {}
            ExpectationMode::ExpectOnlyProvided => {
                match self.expected.lock().unwrap().pop_front() {
                    None => panic!(
                        "Unexpected notification was published to {:?}: {:?}",
                        address, json
                    ),
                    Some(expected) => {
                        assert_eq!(
                            expected.address, address,
                            "Notification address (right) did not match expectation (left)"
                        );
                        assert_eq!(normalized(&expected.serialized), normalized(&json));
                    }
                }
            }
            ExpectationMode::AllowNoise => {
                let mut lock = self.expected.lock().unwrap();
                if let Some(expected) = lock.front() {
                    if expected.address == address
                        && normalized(&expected.serialized) == normalized(&json)
                    {
                        lock.pop_front();
                    }
                }
            }
        };

        let new_length = self.expected.lock().unwrap().len();
        self.remaining.store(new_length, Ordering::SeqCst);
    }
}

impl Drop for MockNotificationPublisher {
    fn drop(&mut self) {
        if !std::thread::panicking() {
            let remaining = self.remaining.load(Ordering::SeqCst);

            if self.mode != ExpectationMode::Ignore && remaining > 0 {
                panic!(
                    "MockNotificationPublisher was dropped with {} expected notifications remaining",
                    remaining
                );
            }
        }
    }
}

#[cfg(test)]
mod does {
    use super::*;
    use serde::{Deserialize, Serialize};

    const MOCK_ADDRESS: Address = Address::new("mock.events", "mock.happened");

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct MockNotification(usize);

    impl Notification for MockNotification {
        fn address(&self) -> Address {
            MOCK_ADDRESS
        }
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TimestampedMockNotification {
        answer: usize,
        timestamp: String,
    }

    impl Notification for TimestampedMockNotification {
        fn address(&self) -> Address {
            MOCK_ADDRESS
        }
    }

    #[tokio::test]
    async fn fulfill_expectations() {
        let notification = MockNotification(42);
        let publisher = Arc::new(MockNotificationPublisher::default());

        publisher.expect(&notification);
        publisher.publish(&notification).await.unwrap();
    }

    #[tokio::test]
    async fn disregard_timestamps() {
        let expected = TimestampedMockNotification {
            answer: 42,
            timestamp: "2024-01-01T00:00:00Z".into(),
        };

        let actual = TimestampedMockNotification {
            answer: 42,
            timestamp: "2024-06-15T13:37:00Z".into(),
        };

        let publisher = Arc::new(MockNotificationPublisher::default());

        publisher.expect(&expected);
        publisher.publish(&actual).await.unwrap();
    }

    #[tokio::test]
    async fn allow_noise() {
        let notification = MockNotification(42);
        let noise = MockNotification(1337);
        let publisher = Arc::new(MockNotificationPublisher::permitting_noise());

        publisher.expect(&notification);
        publisher.publish(&noise).await.unwrap();
        publisher.publish(&notification).await.unwrap();
        publisher.publish(&noise).await.unwrap();
    }

    #[tokio::test]
    #[should_panic]
    async fn fail_on_different_content() {
        let publisher = Arc::new(MockNotificationPublisher::default());

        publisher.expect(&MockNotification(42));
        publisher.publish(&MockNotification(1337)).await.unwrap();
    }

    #[tokio::test]
    #[should_panic]
    async fn fail_on_unexpected() {
        let publisher = Arc::new(MockNotificationPublisher::default());
        publisher.publish(&MockNotification(42)).await.unwrap();
    }

    #[tokio::test]
    #[should_panic]
    async fn fail_on_missing() {
        MockNotificationPublisher::default().expect(&MockNotification(42));
    }
}
