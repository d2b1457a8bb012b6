use super::event::PaymentEvent;
use super::Amount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier of a reservation, doubles as the saga correlation id
pub type ReservationId = Uuid;

/// Saga state of a reservation
///
/// The state machine is strictly forward: `PENDING_PAYMENT` advances to exactly one of
/// the two terminal states and terminal states absorb nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    /// Reservation created, awaiting the payment outcome
    PendingPayment,
    /// Payment went through
    Confirmed,
    /// Payment was abandoned
    PaymentFailed,
}

impl ReservationStatus {
    /// Returns the state the reservation moves to when the given event applies
    ///
    /// `None` means the event does not advance this state, either because the state is
    /// terminal or because the event kind is not an outcome.
    pub fn advance(&self, event: &PaymentEvent) -> Option<Self> {
        match (self, event) {
            (ReservationStatus::PendingPayment, PaymentEvent::PaymentSucceeded { .. }) => {
                Some(ReservationStatus::Confirmed)
            }
            (ReservationStatus::PendingPayment, PaymentEvent::PaymentFailed { .. }) => {
                Some(ReservationStatus::PaymentFailed)
            }
            _ => None,
        }
    }

    /// Stable string representation used in the database and on HTTP surfaces
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::PendingPayment => "PENDING_PAYMENT",
            ReservationStatus::Confirmed => "CONFIRMED",
            ReservationStatus::PaymentFailed => "PAYMENT_FAILED",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when parsing an unknown reservation status string
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown reservation status: {0}")]
pub struct UnknownStatusError(pub String);

impl FromStr for ReservationStatus {
    type Err = UnknownStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING_PAYMENT" => Ok(ReservationStatus::PendingPayment),
            "CONFIRMED" => Ok(ReservationStatus::Confirmed),
            "PAYMENT_FAILED" => Ok(ReservationStatus::PaymentFailed),
            other => Err(UnknownStatusError(other.to_owned())),
        }
    }
}

/// A reservation as held in the store and served over HTTP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    /// Unique identifier
    pub reservation_id: ReservationId,
    /// User who created the reservation
    pub user_id: String,
    /// Requested amount
    pub amount: Amount,
    /// Current saga state
    pub status: ReservationStatus,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Time of the last status change
    pub updated_at: DateTime<Utc>,
}
