use super::super::super::BoxedError;
use super::{QueueDescriptor, QueueEntry};
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Allows consumption of notification queues
#[async_trait]
pub trait QueueProvider {
    /// Type of [`QueueEntry`] returned by the provider
    type Entry: QueueEntry + Send + Sync;

    /// Subscribes to new notifications on a given queue, declaring it if it does not exist
    async fn consume(
        &self,
        queue: QueueDescriptor,
    ) -> Result<BoxStream<'static, Result<Self::Entry, BoxedError>>, BoxedError>;
}
