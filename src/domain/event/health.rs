use crate::constants::{exchange, routing};
use crate::library::communication::event::{Address, Notification};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Liveness probe broadcast by the monitor to every service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "eventType", rename_all = "camelCase")]
pub struct HealthPing {
    /// Identifier of this probe round
    pub ping_id: Uuid,
    /// Name of the broadcasting process
    pub source: String,
    /// Wall-clock time of the broadcast
    pub timestamp: DateTime<Utc>,
}

impl Notification for HealthPing {
    fn address(&self) -> Address {
        Address::new(exchange::PING, routing::HEALTH_PING)
    }
}

/// Liveness echo returned by a service in response to a [`HealthPing`]
///
/// Only freshness matters to the monitor, echoes are never correlated back to
/// their probe. The ping id is carried along purely for log forensics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "eventType", rename_all = "camelCase")]
pub struct HealthPong {
    /// Name of the responding service
    pub service: String,
    /// Probe that triggered this echo, if it carried one
    pub ping_id: Option<Uuid>,
    /// Wall-clock time of the echo
    pub timestamp: DateTime<Utc>,
}

impl Notification for HealthPong {
    fn address(&self) -> Address {
        Address::new(exchange::PONG, routing::HEALTH_PONG)
    }
}
