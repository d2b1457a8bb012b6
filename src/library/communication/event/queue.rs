use super::super::super::BoxedError;
use super::Address;
use crate::library::EmptyResult;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Retention policy attached to a queue
///
/// Messages that outstay the TTL or overflow the length limit are dead-lettered
/// to the given address instead of being discarded silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuePolicy {
    /// Time a message may remain unprocessed before it is dead-lettered
    pub message_ttl: Duration,
    /// Maximum number of messages the queue may buffer
    pub max_length: u32,
    /// Address to which expired or overflowing messages are routed
    pub dead_letter: Address,
}

/// Describes a durable notification queue and its parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueDescriptor {
    name: String,
    binding: Address,
    policy: Option<QueuePolicy>,
    prefetch: u16,
}

impl QueueDescriptor {
    /// Creates a new instance without a retention policy
    pub fn new(name: String, binding: Address, prefetch: u16) -> Self {
        Self {
            name,
            binding,
            policy: None,
            prefetch,
        }
    }

    /// Attaches a retention policy to the queue
    pub fn with_policy(mut self, policy: QueuePolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Durable name identifying the queue on the bus
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Exchange and routing pattern the queue is bound to
    pub fn binding(&self) -> Address {
        self.binding
    }

    /// Retention policy, if any
    pub fn policy(&self) -> Option<QueuePolicy> {
        self.policy
    }

    /// Number of unacknowledged deliveries the consumer may hold
    pub fn prefetch(&self) -> u16 {
        self.prefetch
    }
}

/// Entry retrieved from a queue providing a raw payload
#[async_trait]
pub trait RawQueueEntry {
    /// Payload of the item
    fn payload(&self) -> &[u8];

    /// Acknowledge the item as processed
    async fn acknowledge(&mut self) -> EmptyResult;
}

/// Useful functions for [`RawQueueEntry`] implementations with default implementations
pub trait QueueEntry: RawQueueEntry {
    /// Attempts to parse the wire-format payload into a given data structure
    fn parse_payload<'a, T>(&'a self) -> Result<T, BoxedError>
    where
        T: Deserialize<'a>;
}
