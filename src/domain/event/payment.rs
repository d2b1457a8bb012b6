use crate::constants::{exchange, routing};
use crate::domain::{Amount, ReservationId};
use crate::library::communication::event::{Address, Notification};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Address of the dead letter parking lot for terminally failed payments
///
/// Normally messages are dead-lettered by the broker when they expire or overflow.
/// The payment executor additionally writes here explicitly once it gives up on a
/// payment, so that operators find every abandoned charge in a single place.
pub const DEAD_LETTER_ADDRESS: Address =
    Address::new(exchange::DEAD_LETTER, routing::PAYMENT_FAILED);

/// Lifecycle event of a single payment saga
///
/// The saga travels through the variants in order: a reservation requests payment, the
/// validator establishes the authoritative amount by quorum, the executor picks it up
/// and reports the final outcome. The `correlationId` equals the reservation id and
/// links all events of one saga together. Producers outside this codebase may omit it
/// on the intake events, in which case consumers fall back to the reservation id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "eventType")]
pub enum PaymentEvent {
    /// A new reservation awaits payment
    #[serde(rename_all = "camelCase")]
    PaymentRequested {
        /// Reservation this payment belongs to
        reservation_id: ReservationId,
        /// User who created the reservation
        user_id: String,
        /// Requested amount as provided by the user
        amount: Amount,
        /// Saga correlation identifier, falls back to the reservation id when absent
        #[serde(default)]
        correlation_id: Option<ReservationId>,
        /// Wall-clock time of the event
        timestamp: DateTime<Utc>,
    },
    /// The quorum agreed on an authoritative amount
    #[serde(rename_all = "camelCase")]
    PaymentValidated {
        /// Reservation this payment belongs to
        reservation_id: ReservationId,
        /// Saga correlation identifier, falls back to the reservation id when absent
        #[serde(default)]
        correlation_id: Option<ReservationId>,
        /// Authoritative amount established by the majority
        amount: Amount,
        /// Amount as originally requested
        original_amount: Amount,
        /// Whether any calculator disagreed with the majority
        divergence: bool,
        /// Calculators retired in the course of this validation
        retired_calculators: Vec<String>,
        /// Calculators still trusted after this validation
        active_calculators: Vec<String>,
        /// Wall-clock time of the event
        timestamp: DateTime<Utc>,
    },
    /// The executor claimed the payment and contacts the provider
    #[serde(rename_all = "camelCase")]
    PaymentProcessingStarted {
        /// Reservation this payment belongs to
        reservation_id: ReservationId,
        /// Saga correlation identifier
        correlation_id: ReservationId,
        /// Amount being charged
        amount: Amount,
        /// Wall-clock time of the event
        timestamp: DateTime<Utc>,
    },
    /// The provider accepted the charge
    #[serde(rename_all = "camelCase")]
    PaymentSucceeded {
        /// Reservation this payment belongs to
        reservation_id: ReservationId,
        /// Saga correlation identifier
        correlation_id: ReservationId,
        /// Amount that was charged
        amount: Amount,
        /// Wall-clock time of the event
        timestamp: DateTime<Utc>,
    },
    /// The charge was abandoned after exhausting all attempts
    #[serde(rename_all = "camelCase")]
    PaymentFailed {
        /// Reservation this payment belongs to
        reservation_id: ReservationId,
        /// Saga correlation identifier
        correlation_id: ReservationId,
        /// Amount that could not be charged
        amount: Amount,
        /// Machine-readable failure reason
        reason: String,
        /// Wall-clock time of the event
        timestamp: DateTime<Utc>,
    },
}

impl Notification for PaymentEvent {
    fn address(&self) -> Address {
        match self {
            PaymentEvent::PaymentRequested { .. } => {
                Address::new(exchange::BOOKING, routing::PAYMENT_REQUESTED)
            }
            PaymentEvent::PaymentValidated { .. } => {
                Address::new(exchange::BOOKING, routing::PAYMENT_VALIDATED)
            }
            PaymentEvent::PaymentProcessingStarted { .. } => {
                Address::new(exchange::PAYMENTS, routing::PAYMENT_STARTED)
            }
            PaymentEvent::PaymentSucceeded { .. } => {
                Address::new(exchange::PAYMENTS, routing::PAYMENT_SUCCEEDED)
            }
            PaymentEvent::PaymentFailed { .. } => {
                Address::new(exchange::PAYMENTS, routing::PAYMENT_FAILED)
            }
        }
    }
}
