//! Circuit breaker guarding calls to an unreliable downstream
//!
//! State machine: Closed → Open → HalfOpen → Closed
//!
//! - **Closed**: normal operation; consecutive failures are counted.
//! - **Open**: downstream is considered down; all calls are rejected immediately.
//! - **HalfOpen**: after `reset_timeout`, one probe call is allowed through.
//!   - Success → Closed (reset counters)
//!   - Failure → Open (restart timer)

use log::{info, warn};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Circuit breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    /// Normal operation
    Closed,
    /// Downstream is considered down; calls are rejected immediately
    Open,
    /// One probe call is allowed through to test recovery
    HalfOpen,
}

impl std::fmt::Display for BreakerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BreakerState::Closed => write!(f, "closed"),
            BreakerState::Open => write!(f, "open"),
            BreakerState::HalfOpen => write!(f, "half_open"),
        }
    }
}

/// Rejection returned while the breaker is not accepting calls
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BreakerRejection {
    /// Breaker is open and the reset timeout has not yet elapsed
    #[error("circuit breaker is open (too many consecutive failures)")]
    Open,
    /// A probe call is already in flight
    #[error("circuit breaker is half-open (probe in progress)")]
    ProbeInFlight,
}

struct BreakerInner {
    state: BreakerState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

/// Three-state circuit breaker with consecutive-failure accounting
///
/// Shared between callers through an `Arc`; all state lives behind an internal mutex.
pub struct CircuitBreaker {
    failure_threshold: u32,
    reset_timeout: Duration,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    /// Creates a new, closed instance
    pub fn new(failure_threshold: u32, reset_timeout: Duration) -> Self {
        Self {
            failure_threshold,
            reset_timeout,
            inner: Mutex::new(BreakerInner {
                state: BreakerState::Closed,
                consecutive_failures: 0,
                opened_at: None,
            }),
        }
    }

    /// Checks whether a call is allowed through
    ///
    /// Returns `Ok(())` if allowed. When the reset timeout has elapsed in the open state,
    /// the breaker transitions to half-open and admits the calling request as the probe.
    pub fn check(&self) -> Result<(), BreakerRejection> {
        let mut inner = self.lock();
        match inner.state {
            BreakerState::Closed => Ok(()),
            BreakerState::Open => {
                if let Some(opened_at) = inner.opened_at {
                    if opened_at.elapsed() >= self.reset_timeout {
                        inner.state = BreakerState::HalfOpen;
                        info!("Circuit breaker open -> half-open, probe allowed");
                        return Ok(());
                    }
                }
                Err(BreakerRejection::Open)
            }
            BreakerState::HalfOpen => Err(BreakerRejection::ProbeInFlight),
        }
    }

    /// Records a successful call outcome
    pub fn record_success(&self) {
        let mut inner = self.lock();
        inner.consecutive_failures = 0;

        if inner.state != BreakerState::Closed {
            info!("Circuit breaker {} -> closed (recovered)", inner.state);
            inner.state = BreakerState::Closed;
            inner.opened_at = None;
        }
    }

    /// Records a failed call outcome
    pub fn record_failure(&self) {
        let mut inner = self.lock();
        inner.consecutive_failures += 1;

        match inner.state {
            BreakerState::Closed => {
                if inner.consecutive_failures >= self.failure_threshold {
                    inner.state = BreakerState::Open;
                    inner.opened_at = Some(Instant::now());
                    warn!(
                        "Circuit breaker closed -> open after {} consecutive failures",
                        inner.consecutive_failures
                    );
                }
            }
            BreakerState::HalfOpen => {
                inner.state = BreakerState::Open;
                inner.opened_at = Some(Instant::now());
                warn!("Circuit breaker half-open -> open (probe failed)");
            }
            BreakerState::Open => {}
        }
    }

    /// Current state
    pub fn state(&self) -> BreakerState {
        self.lock().state
    }

    fn lock(&self) -> std::sync::MutexGuard<BreakerInner> {
        // Inner operations never panic, the lock cannot be poisoned
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod does {
    use super::*;
    use std::thread;

    fn make_breaker() -> CircuitBreaker {
        CircuitBreaker::new(3, Duration::from_millis(50))
    }

    #[test]
    fn allow_calls_while_closed() {
        let breaker = make_breaker();
        assert_eq!(breaker.state(), BreakerState::Closed);
        assert!(breaker.check().is_ok());
    }

    #[test]
    fn open_after_threshold_failures() {
        let breaker = make_breaker();
        breaker.record_failure();
        breaker.record_failure();
        assert_eq!(breaker.state(), BreakerState::Closed);
        breaker.record_failure();
        assert_eq!(breaker.state(), BreakerState::Open);
        assert_eq!(breaker.check(), Err(BreakerRejection::Open));
    }

    #[test]
    fn admit_probe_after_reset_timeout() {
        let breaker = make_breaker();
        for _ in 0..3 {
            breaker.record_failure();
        }

        thread::sleep(Duration::from_millis(60));
        assert!(breaker.check().is_ok());
        assert_eq!(breaker.state(), BreakerState::HalfOpen);
        assert_eq!(breaker.check(), Err(BreakerRejection::ProbeInFlight));
    }

    #[test]
    fn close_after_successful_probe() {
        let breaker = make_breaker();
        for _ in 0..3 {
            breaker.record_failure();
        }

        thread::sleep(Duration::from_millis(60));
        breaker.check().unwrap();
        breaker.record_success();
        assert_eq!(breaker.state(), BreakerState::Closed);
        assert!(breaker.check().is_ok());
    }

    #[test]
    fn reopen_after_failed_probe() {
        let breaker = make_breaker();
        for _ in 0..3 {
            breaker.record_failure();
        }

        thread::sleep(Duration::from_millis(60));
        breaker.check().unwrap();
        breaker.record_failure();
        assert_eq!(breaker.state(), BreakerState::Open);
        assert_eq!(breaker.check(), Err(BreakerRejection::Open));
    }

    #[test]
    fn reset_failure_count_on_success() {
        let breaker = make_breaker();
        breaker.record_failure();
        breaker.record_failure();
        breaker.record_success();
        breaker.record_failure();
        breaker.record_failure();
        assert_eq!(breaker.state(), BreakerState::Closed);
    }
}
