//! Structures for communication between services in a distributed system
//!
//! The services of this project have no knowledge of each other. Whenever something noteworthy
//! happens, a notification describing what happened is published onto a message bus. The
//! notification data structure implements the [`Notification`](event::Notification) trait and
//! thus describes where it travels in a type-safe manner. All interested parties subscribe to
//! queues bound to the relevant exchanges and react to the published event notifications,
//! commonly triggering further events in the process.
//!
//! The traits in [`event`] are backed by two implementations: an AMQP one used in production
//! and an expectation-based mock used by unit tests (see [`implementation`]).

mod communication_factory;

pub mod event;
pub mod implementation;

pub use communication_factory::CommunicationFactory;
