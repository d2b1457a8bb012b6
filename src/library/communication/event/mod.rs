//! Structures to realise an event-driven service architecture
//!
//! Each [`Notification`] carries an [`Address`], the exchange and routing key under which it is
//! published. Queues are described by a [`QueueDescriptor`] which couples a durable queue name
//! with the binding it receives messages from and an optional retention [`QueuePolicy`].
//!
//! Notifications are consumed sequentially and each [`QueueEntry`] is acknowledged once
//! processing concludes, regardless of the outcome. Redelivery of poisonous messages is
//! deliberately avoided; queues bound the blast radius of a stuck consumer through their
//! retention policy instead.

mod consumer;
mod notification;
mod publisher;
mod queue;
mod queue_provider;

pub use consumer::*;
pub use notification::*;
pub use publisher::*;
pub use queue::*;
pub use queue_provider::*;
