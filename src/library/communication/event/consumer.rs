use super::super::super::EmptyResult;
use super::{Notification, QueueDescriptor, QueueEntry, QueueProvider, RawQueueEntry};
use async_trait::async_trait;
use futures::StreamExt;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use std::any::type_name;
use thiserror::Error;

/// Error raised when the notification stream of a consumer terminates
///
/// Streams are expected to be infinite; an ended stream indicates a lost connection
/// and bubbles up as a job failure so the scheduler re-establishes it.
#[derive(Debug, Error)]
#[error("notification stream closed unexpectedly")]
pub struct StreamClosedError;

/// Entity which may consume and process [`Notifications`](Notification)
#[async_trait]
pub trait Consumer {
    /// Notification to consume
    type Notification: Notification;

    /// Queue from which notifications are read
    fn queue(&self) -> QueueDescriptor;

    /// Processes an event notification and returns whether it succeeded or failed
    async fn consume(&self, notification: Self::Notification) -> EmptyResult;
}

/// Helper functions to aid the consumption of messages
#[async_trait]
pub trait ConsumerExt {
    /// Consumes notifications from the consumer's queue, one at a time
    ///
    /// Every entry is acknowledged after processing, whether it parsed and processed
    /// cleanly or not. Malformed payloads are dropped with a debug log, handler errors
    /// are logged as warnings. Only a broken stream terminates the loop.
    async fn consume_queue<Q>(&self, provider: Q) -> EmptyResult
    where
        Q: QueueProvider + Send + Sync;
}

#[async_trait]
impl<C> ConsumerExt for C
where
    C: Consumer + Send + Sync,
    C::Notification: DeserializeOwned + Send + Sync,
{
    async fn consume_queue<Q>(&self, provider: Q) -> EmptyResult
    where
        Q: QueueProvider + Send + Sync,
    {
        let mut stream = provider.consume(self.queue()).await?;

        while let Some(item) = stream.next().await {
            let mut entry = item?;

            match entry.parse_payload::<C::Notification>() {
                Ok(notification) => {
                    if let Err(e) = self.consume(notification).await {
                        warn!("Failed to consume {}: {}", type_name::<C::Notification>(), e);
                    }
                }
                Err(e) => {
                    debug!(
                        "Dropping malformed {}: {}",
                        type_name::<C::Notification>(),
                        e
                    );
                }
            }

            if let Err(e) = entry.acknowledge().await {
                warn!(
                    "Failed to acknowledge {}: {}",
                    type_name::<C::Notification>(),
                    e
                );
            }
        }

        Err(StreamClosedError.into())
    }
}
