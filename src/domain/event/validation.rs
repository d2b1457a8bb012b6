use crate::constants::{exchange, routing};
use crate::domain::{Amount, ReservationId};
use crate::library::communication::event::{Address, Notification};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Telemetry emitted by the validator alongside the saga events
///
/// Both variants share a common envelope (reservation, correlation, the originally
/// requested amount, the majority value and the post-vote roster) and carry the full
/// per-calculator result map for observability purposes. They are not consumed by
/// any service of the saga itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "eventType")]
pub enum ValidationTelemetry {
    /// All active calculators agreed on the amount
    #[serde(rename_all = "camelCase")]
    ValidationSucceeded {
        /// Reservation whose amount was validated
        reservation_id: ReservationId,
        /// Saga correlation identifier
        correlation_id: ReservationId,
        /// Amount as originally requested
        amount: Amount,
        /// Amount established by the majority
        majority_value: Amount,
        /// Calculators still trusted after this validation
        active_calculators: Vec<String>,
        /// Value reported by each active calculator
        results_by_calculator: BTreeMap<String, Amount>,
        /// Wall-clock time of the event
        timestamp: DateTime<Utc>,
    },
    /// At least one calculator disagreed with the majority and was retired
    #[serde(rename_all = "camelCase")]
    ValidationDivergenceAlert {
        /// Reservation whose amount was validated
        reservation_id: ReservationId,
        /// Saga correlation identifier
        correlation_id: ReservationId,
        /// Amount as originally requested
        amount: Amount,
        /// Amount established by the majority
        majority_value: Amount,
        /// Calculators still trusted after this validation
        active_calculators: Vec<String>,
        /// Value reported by each active calculator
        results_by_calculator: BTreeMap<String, Amount>,
        /// Calculators retired in the course of this validation
        retired_calculators: Vec<String>,
        /// Wall-clock time of the event
        timestamp: DateTime<Utc>,
    },
}

impl Notification for ValidationTelemetry {
    fn address(&self) -> Address {
        match self {
            ValidationTelemetry::ValidationSucceeded { .. } => {
                Address::new(exchange::PAYMENTS, routing::VALIDATION_SUCCEEDED)
            }
            ValidationTelemetry::ValidationDivergenceAlert { .. } => {
                Address::new(exchange::PAYMENTS, routing::VALIDATION_DIVERGENCE)
            }
        }
    }
}
