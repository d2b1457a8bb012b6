use crate::library::communication::event::RawQueueEntry;
use crate::library::communication::implementation::json::JsonQueueEntry;
use crate::library::EmptyResult;
use async_trait::async_trait;
use lapin::message::Delivery;
use lapin::options::BasicAckOptions;

/// Single delivery taken from an AMQP queue
pub struct AmqpQueueEntry {
    delivery: Delivery,
}

impl AmqpQueueEntry {
    pub(crate) fn new(delivery: Delivery) -> Self {
        Self { delivery }
    }
}

impl JsonQueueEntry for AmqpQueueEntry {}

#[async_trait]
impl RawQueueEntry for AmqpQueueEntry {
    fn payload(&self) -> &[u8] {
        &self.delivery.data
    }

    async fn acknowledge(&mut self) -> EmptyResult {
        self.delivery
            .acker
            .ack(BasicAckOptions::default())
            .await
            .map_err(Into::into)
    }
}
