use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Health of a single tracked service as served over HTTP
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceHealth {
    /// Name of the tracked service
    pub service: String,
    /// Whether an echo arrived within the detection window
    pub healthy: bool,
    /// Seconds since the last echo, `None` when no echo arrived yet
    pub last_seen_seconds: Option<u64>,
}

/// Last-seen bookkeeping for a fixed set of tracked services
///
/// Services are registered up front. Echoes from unknown senders are dropped so a
/// misconfigured service cannot register itself as healthy.
pub struct HeartbeatRegistry {
    window: Duration,
    last_seen: Mutex<BTreeMap<String, Option<Instant>>>,
}

impl HeartbeatRegistry {
    /// Creates a new instance tracking the given services
    pub fn new(tracked: impl IntoIterator<Item = String>, window: Duration) -> Self {
        Self {
            window,
            last_seen: Mutex::new(tracked.into_iter().map(|name| (name, None)).collect()),
        }
    }

    /// Records an echo from the given service
    ///
    /// Returns whether the sender is tracked.
    pub fn record_pong(&self, service: &str) -> bool {
        self.record_pong_at(service, Instant::now())
    }

    /// Names of tracked services whose last echo lies outside the detection window
    ///
    /// Evaluated against the current instant on every call, so repeated sweeps keep
    /// reporting a degraded service until it recovers.
    pub fn breaching(&self) -> Vec<String> {
        self.overview_at(Instant::now())
            .into_iter()
            .filter(|health| !health.healthy)
            .map(|health| health.service)
            .collect()
    }

    /// Health snapshot of every tracked service
    pub fn overview(&self) -> Vec<ServiceHealth> {
        self.overview_at(Instant::now())
    }

    fn record_pong_at(&self, service: &str, at: Instant) -> bool {
        match self.lock().get_mut(service) {
            Some(slot) => {
                *slot = Some(at);
                true
            }
            None => false,
        }
    }

    fn overview_at(&self, now: Instant) -> Vec<ServiceHealth> {
        self.lock()
            .iter()
            .map(|(service, last_seen)| {
                let age = last_seen.map(|at| now.saturating_duration_since(at));

                ServiceHealth {
                    service: service.clone(),
                    healthy: matches!(age, Some(age) if age <= self.window),
                    last_seen_seconds: age.map(|age| age.as_secs()),
                }
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<BTreeMap<String, Option<Instant>>> {
        match self.last_seen.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod does {
    use super::*;

    fn registry() -> HeartbeatRegistry {
        HeartbeatRegistry::new(
            ["booking".to_string(), "payment".to_string()],
            Duration::from_secs(20),
        )
    }

    #[test]
    fn consider_fresh_echoes_healthy() {
        let registry = registry();
        let now = Instant::now();

        assert!(registry.record_pong_at("booking", now));

        let overview = registry.overview_at(now + Duration::from_secs(5));
        let booking = &overview[0];

        assert_eq!(booking.service, "booking");
        assert!(booking.healthy);
        assert_eq!(booking.last_seen_seconds, Some(5));
    }

    #[test]
    fn flag_services_outside_the_detection_window() {
        let registry = registry();
        let now = Instant::now();

        registry.record_pong_at("booking", now);
        registry.record_pong_at("payment", now);

        let later = now + Duration::from_secs(25);
        registry.record_pong_at("payment", later);

        let overview = registry.overview_at(later);
        assert!(!overview[0].healthy);
        assert!(overview[1].healthy);
    }

    #[test]
    fn flag_services_that_never_echoed() {
        let registry = registry();
        let overview = registry.overview_at(Instant::now());

        assert!(overview.iter().all(|health| !health.healthy));
        assert!(overview.iter().all(|h| h.last_seen_seconds.is_none()));
    }

    #[test]
    fn drop_echoes_from_unknown_senders() {
        let registry = registry();

        assert!(!registry.record_pong_at("impostor", Instant::now()));
        assert_eq!(registry.overview().len(), 2);
    }

    #[test]
    fn keep_reporting_a_degraded_service() {
        let registry = registry();
        let now = Instant::now();
        registry.record_pong_at("booking", now);

        for sweep in 1..4 {
            let at = now + Duration::from_secs(20 + sweep * 5);
            let breaching = registry
                .overview_at(at)
                .into_iter()
                .filter(|h| !h.healthy)
                .count();
            assert_eq!(breaching, 2);
        }
    }
}
