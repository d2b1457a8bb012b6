use crate::library::communication::event::QueueDescriptor;
use crate::library::EmptyResult;
use lapin::options::{ExchangeDeclareOptions, QueueBindOptions, QueueDeclareOptions};
use lapin::types::{AMQPValue, FieldTable};
use lapin::{Channel, ExchangeKind};

/// Declarative description of the bus resources a deployment relies on
///
/// Every process asserts the full topology on each fresh channel before publishing or
/// consuming. Since all declarations are durable and carry identical arguments, it does
/// not matter which process comes up first or whether declarations race.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    exchanges: Vec<(String, ExchangeKind)>,
    queues: Vec<QueueDescriptor>,
}

impl Topology {
    /// Creates a new, empty instance
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds a durable topic exchange
    pub fn topic_exchange(mut self, name: &str) -> Self {
        self.exchanges.push((name.to_owned(), ExchangeKind::Topic));
        self
    }

    /// Adds a durable direct exchange
    pub fn direct_exchange(mut self, name: &str) -> Self {
        self.exchanges.push((name.to_owned(), ExchangeKind::Direct));
        self
    }

    /// Adds a durable queue with its binding and retention policy
    pub fn queue(mut self, descriptor: QueueDescriptor) -> Self {
        self.queues.push(descriptor);
        self
    }

    /// Declares all exchanges and queues on the given channel
    pub(crate) async fn declare(&self, channel: &Channel) -> EmptyResult {
        for (name, kind) in &self.exchanges {
            channel
                .exchange_declare(
                    name,
                    kind.clone(),
                    ExchangeDeclareOptions {
                        durable: true,
                        ..Default::default()
                    },
                    FieldTable::default(),
                )
                .await?;
        }

        for descriptor in &self.queues {
            declare_queue(channel, descriptor).await?;
        }

        Ok(())
    }
}

/// Declares a single durable queue and binds it to its exchange
pub(crate) async fn declare_queue(channel: &Channel, descriptor: &QueueDescriptor) -> EmptyResult {
    let mut arguments = FieldTable::default();

    if let Some(policy) = descriptor.policy() {
        arguments.insert(
            "x-message-ttl".into(),
            AMQPValue::LongInt(policy.message_ttl.as_millis() as i32),
        );
        arguments.insert(
            "x-max-length".into(),
            AMQPValue::LongInt(policy.max_length as i32),
        );
        arguments.insert(
            "x-dead-letter-exchange".into(),
            AMQPValue::LongString(policy.dead_letter.exchange().into()),
        );
        arguments.insert(
            "x-dead-letter-routing-key".into(),
            AMQPValue::LongString(policy.dead_letter.routing_key().into()),
        );
    }

    channel
        .queue_declare(
            descriptor.name(),
            QueueDeclareOptions {
                durable: true,
                ..Default::default()
            },
            arguments,
        )
        .await?;

    channel
        .queue_bind(
            descriptor.name(),
            descriptor.binding().exchange(),
            descriptor.binding().routing_key(),
            QueueBindOptions::default(),
            FieldTable::default(),
        )
        .await?;

    Ok(())
}
