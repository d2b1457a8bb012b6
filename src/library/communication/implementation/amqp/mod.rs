//! AMQP 0-9-1 based implementation using [`lapin`]
//!
//! Notifications travel through durable exchanges and queues declared by a [`Topology`]
//! that each process asserts on every fresh channel. Declarations are idempotent and use
//! identical arguments everywhere, so concurrently starting processes may race them safely.

mod factory;
mod publisher;
mod queue_entry;
mod queue_provider;
mod topology;

pub use factory::AmqpCommunicationFactory;
pub use publisher::AmqpPublisher;
pub use queue_entry::AmqpQueueEntry;
pub use queue_provider::AmqpQueueProvider;
pub use topology::Topology;
