//! Queue and exchange layout of the deployment
//!
//! Every process asserts the full layout on connect, so it does not matter in which
//! order the services come up.

use crate::constants::{
    exchange, queue, routing, service, DEFAULT_PREFETCH, PAYMENT_PREFETCH, QUEUE_MAX_LENGTH,
    QUEUE_MESSAGE_TTL,
};
use crate::domain::event::DEAD_LETTER_ADDRESS;
use crate::library::communication::event::{Address, QueueDescriptor, QueuePolicy};
use crate::library::communication::implementation::amqp::Topology;

fn intake_policy() -> QueuePolicy {
    QueuePolicy {
        message_ttl: QUEUE_MESSAGE_TTL,
        max_length: QUEUE_MAX_LENGTH,
        dead_letter: DEAD_LETTER_ADDRESS,
    }
}

/// Intake queue of the validator, fed by payment requests
pub fn validator_intake() -> QueueDescriptor {
    QueueDescriptor::new(
        queue::VALIDATOR_INTAKE.into(),
        Address::new(exchange::BOOKING, routing::PAYMENT_REQUESTED),
        DEFAULT_PREFETCH,
    )
    .with_policy(intake_policy())
}

/// Intake queue of the payment executor, fed by validated payments
pub fn payment_intake() -> QueueDescriptor {
    QueueDescriptor::new(
        queue::PAYMENT_INTAKE.into(),
        Address::new(exchange::BOOKING, routing::PAYMENT_VALIDATED),
        PAYMENT_PREFETCH,
    )
    .with_policy(intake_policy())
}

/// Queue on which the booking module observes every payment lifecycle event
pub fn booking_events() -> QueueDescriptor {
    QueueDescriptor::new(
        queue::BOOKING_EVENTS.into(),
        Address::new(exchange::PAYMENTS, routing::PAYMENT_WILDCARD),
        DEFAULT_PREFETCH,
    )
}

/// Queue on which the monitor collects liveness echoes
pub fn monitor_pong() -> QueueDescriptor {
    QueueDescriptor::new(
        queue::MONITOR_PONG.into(),
        Address::new(exchange::PONG, routing::HEALTH_PONG),
        DEFAULT_PREFETCH,
    )
}

/// Per-service queue receiving liveness probes
pub fn service_monitor(service: &str) -> QueueDescriptor {
    QueueDescriptor::new(
        format!("{}.monitor", service),
        Address::new(exchange::PING, routing::HEALTH_PING),
        DEFAULT_PREFETCH,
    )
}

/// Parking queue collecting terminally failed payments
pub fn dead_letter() -> QueueDescriptor {
    QueueDescriptor::new(queue::DEAD_LETTER.into(), DEAD_LETTER_ADDRESS, DEFAULT_PREFETCH)
}

/// The full bus layout asserted by every process
pub fn bus_topology() -> Topology {
    let mut topology = Topology::new()
        .topic_exchange(exchange::BOOKING)
        .topic_exchange(exchange::PAYMENTS)
        .topic_exchange(exchange::PING)
        .topic_exchange(exchange::PONG)
        .direct_exchange(exchange::DEAD_LETTER)
        .queue(validator_intake())
        .queue(payment_intake())
        .queue(booking_events())
        .queue(monitor_pong())
        .queue(dead_letter());

    for name in [service::BOOKING, service::VALIDATOR, service::PAYMENT] {
        topology = topology.queue(service_monitor(name));
    }

    topology
}
