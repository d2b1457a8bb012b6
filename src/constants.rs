//! Project-wide constants shared by more than one module
//!
//! Values that only concern a single service live next to that service instead.

use std::time::Duration;

/// Exchanges declared on the bus
pub mod exchange {
    /// Topic exchange carrying reservation lifecycle events
    pub const BOOKING: &str = "booking.events";
    /// Topic exchange carrying payment lifecycle events
    pub const PAYMENTS: &str = "payments.events";
    /// Topic exchange on which liveness probes are broadcast
    pub const PING: &str = "control.ping";
    /// Topic exchange on which liveness echoes are returned
    pub const PONG: &str = "control.pong";
    /// Direct exchange collecting terminally failed payments
    pub const DEAD_LETTER: &str = "payments.dlq";
}

/// Routing keys used when publishing or binding queues
pub mod routing {
    /// A new reservation requests payment
    pub const PAYMENT_REQUESTED: &str = "payment.requested";
    /// The amount has passed quorum validation
    pub const PAYMENT_VALIDATED: &str = "payment.validated";
    /// The executor picked up a validated payment
    pub const PAYMENT_STARTED: &str = "payment.started";
    /// The provider accepted the charge
    pub const PAYMENT_SUCCEEDED: &str = "payment.succeeded";
    /// The charge was abandoned after exhausting all attempts
    pub const PAYMENT_FAILED: &str = "payment.failed";
    /// Wildcard matching every payment lifecycle event
    pub const PAYMENT_WILDCARD: &str = "payment.*";
    /// Quorum validation completed without disagreement
    pub const VALIDATION_SUCCEEDED: &str = "validation.succeeded";
    /// Quorum validation detected and retired a divergent calculator
    pub const VALIDATION_DIVERGENCE: &str = "validation.divergence";
    /// Liveness probe
    pub const HEALTH_PING: &str = "health.ping";
    /// Liveness echo
    pub const HEALTH_PONG: &str = "health.pong";
}

/// Durable queue names
pub mod queue {
    /// Intake queue of the validator module
    pub const VALIDATOR_INTAKE: &str = "validator.requested";
    /// Intake queue of the payment executor
    pub const PAYMENT_INTAKE: &str = "payments.validated";
    /// Queue on which the booking module projects payment outcomes
    pub const BOOKING_EVENTS: &str = "booking.payments";
    /// Queue on which the monitor collects liveness echoes
    pub const MONITOR_PONG: &str = "monitor.pong";
    /// Parking queue for terminally failed payments
    pub const DEAD_LETTER: &str = "payments.dlq";
}

/// Names under which the services appear on the bus and in the monitor
pub mod service {
    /// Reservation CRUD and saga state projection
    pub const BOOKING: &str = "booking";
    /// Quorum amount validation
    pub const VALIDATOR: &str = "validator";
    /// Payment execution against the provider
    pub const PAYMENT: &str = "payment";
    /// Heartbeat broadcasting and collection
    pub const MONITOR: &str = "monitor";
}

/// Time after which an unprocessed intake message is dead-lettered
pub const QUEUE_MESSAGE_TTL: Duration = Duration::from_secs(30);

/// Upper bound on the number of messages an intake queue may buffer
pub const QUEUE_MAX_LENGTH: u32 = 10_000;

/// Default number of unacknowledged deliveries a consumer may hold
pub const DEFAULT_PREFETCH: u16 = 20;

/// Prefetch of the payment executor, kept lower since each delivery may block for seconds
pub const PAYMENT_PREFETCH: u16 = 10;

/// Interval at which lost bus or datastore connections are re-attempted
pub const RECONNECT_INTERVAL: Duration = Duration::from_secs(2);

/// Interval at which the monitor broadcasts liveness probes
pub const PING_INTERVAL: Duration = Duration::from_secs(10);

/// Maximum echo age before a tracked service is considered degraded
pub const DETECTION_WINDOW: Duration = Duration::from_secs(20);

/// Interval at which the monitor evaluates echo ages
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(5);
