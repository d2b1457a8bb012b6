use super::topology::declare_queue;
use super::{AmqpCommunicationFactory, AmqpQueueEntry};
use crate::library::communication::event::{QueueDescriptor, QueueProvider};
use crate::library::BoxedError;
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use lapin::options::{BasicConsumeOptions, BasicQosOptions};
use lapin::types::FieldTable;

/// [`QueueProvider`] implementation consuming durable AMQP queues
///
/// The returned stream ends when the underlying channel dies, which the consumption
/// loop translates into a job failure so the scheduler reconnects.
#[derive(Clone)]
pub struct AmqpQueueProvider {
    factory: AmqpCommunicationFactory,
}

impl AmqpQueueProvider {
    /// Creates a new instance on top of the given factory
    pub(crate) fn new(factory: AmqpCommunicationFactory) -> Self {
        Self { factory }
    }
}

#[async_trait]
impl QueueProvider for AmqpQueueProvider {
    type Entry = AmqpQueueEntry;

    async fn consume(
        &self,
        queue: QueueDescriptor,
    ) -> Result<BoxStream<'static, Result<Self::Entry, BoxedError>>, BoxedError> {
        let channel = self.factory.channel().await;

        declare_queue(&channel, &queue).await?;
        channel
            .basic_qos(queue.prefetch(), BasicQosOptions::default())
            .await?;

        let consumer = channel
            .basic_consume(
                queue.name(),
                "",
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await?;

        let stream = consumer
            .map(|delivery| {
                delivery
                    .map(AmqpQueueEntry::new)
                    .map_err(Into::<BoxedError>::into)
            })
            .boxed();

        Ok(stream)
    }
}
