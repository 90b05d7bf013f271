//! Admission control: the quota check-and-reserve critical section.
//!
//! The controller exclusively owns the [`QuotaState`] behind a mutex; callers
//! see only `check_and_reserve` / `record_action` / `reset` / `snapshot`,
//! never raw counters. Concurrent requests serialize around the lock, so two
//! requests can never both observe "room under the limit" and proceed.

use crate::clock::Clock;
use crate::config::BotConfig;
use crate::error::{DenyReason, Result, RoostError};
use crate::pacing::DelaySource;
use crate::quota::{QuotaState, QuotaStore};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Admission / QuotaSnapshot
// ---------------------------------------------------------------------------

/// A granted admission. The executor must still wait out `pacing_delay`
/// before invoking the actuator: admission and execution are decoupled by
/// design, so concurrent admission checks cannot race into the actuator.
#[derive(Debug, Clone, Copy)]
pub struct Admission {
    pub pacing_delay: Duration,
}

/// Normalized read-only view of the quota counters, for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct QuotaSnapshot {
    pub daily_count: u32,
    pub daily_limit: u32,
    pub hourly_count: u32,
    pub hourly_limit: u32,
    pub last_action_at: Option<DateTime<Utc>>,
}

impl QuotaSnapshot {
    pub fn daily_remaining(&self) -> u32 {
        self.daily_limit.saturating_sub(self.daily_count)
    }

    pub fn hourly_remaining(&self) -> u32 {
        self.hourly_limit.saturating_sub(self.hourly_count)
    }
}

// ---------------------------------------------------------------------------
// AdmissionController
// ---------------------------------------------------------------------------

pub struct AdmissionController {
    daily_limit: u32,
    hourly_limit: u32,
    min_delay: Duration,
    max_delay: Duration,
    store: QuotaStore,
    state: Mutex<QuotaState>,
    clock: Arc<dyn Clock>,
    delays: Arc<dyn DelaySource>,
}

impl AdmissionController {
    pub fn new(
        config: &BotConfig,
        store: QuotaStore,
        clock: Arc<dyn Clock>,
        delays: Arc<dyn DelaySource>,
    ) -> Self {
        let state = store.load(clock.now());
        Self {
            daily_limit: config.daily_limit,
            hourly_limit: config.hourly_limit,
            min_delay: Duration::from_millis(config.min_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            store,
            state: Mutex::new(state),
            clock,
            delays,
        }
    }

    /// Decide whether an action may proceed now.
    ///
    /// Normalizes the counters against the current UTC day/hour buckets
    /// before evaluating limits. A denial never mutates state; quota is only
    /// consumed by [`record_action`](Self::record_action) after the actuator
    /// call completes.
    pub fn check_and_reserve(&self) -> Result<Admission> {
        let now = self.clock.now();
        let mut state = self.state.lock().unwrap();
        state.normalize(now);

        if state.daily_count >= self.daily_limit {
            tracing::debug!(
                daily = state.daily_count,
                limit = self.daily_limit,
                "denied: daily limit reached"
            );
            return Err(RoostError::RateLimited(DenyReason::DailyLimitExceeded));
        }
        if state.hourly_count >= self.hourly_limit {
            tracing::debug!(
                hourly = state.hourly_count,
                limit = self.hourly_limit,
                "denied: hourly limit reached"
            );
            return Err(RoostError::RateLimited(DenyReason::HourlyLimitExceeded));
        }
        if let Some(last) = state.last_action_at {
            let elapsed = (now - last).num_milliseconds().max(0) as u64;
            let min_ms = self.min_delay.as_millis() as u64;
            if elapsed < min_ms {
                return Err(RoostError::RateLimited(DenyReason::TooSoon {
                    remaining_ms: min_ms - elapsed,
                }));
            }
        }

        Ok(Admission {
            pacing_delay: self.delays.pacing_delay(self.min_delay, self.max_delay),
        })
    }

    /// Consume quota for a completed admitted action and persist the state.
    ///
    /// Called only after the actuator call finishes; `last_action_at` is the
    /// completion time.
    pub fn record_action(&self) {
        let now = self.clock.now();
        let mut state = self.state.lock().unwrap();
        state.normalize(now);
        state.daily_count += 1;
        state.hourly_count += 1;
        state.last_action_at = Some(now);
        self.store.save(&state);
        tracing::info!(
            daily = state.daily_count,
            daily_limit = self.daily_limit,
            hourly = state.hourly_count,
            hourly_limit = self.hourly_limit,
            "action recorded"
        );
    }

    /// Administrative override: zero both counters and persist immediately.
    /// The attempt ledger is untouched.
    pub fn reset(&self) {
        let mut state = self.state.lock().unwrap();
        state.daily_count = 0;
        state.hourly_count = 0;
        self.store.save(&state);
    }

    pub fn snapshot(&self) -> QuotaSnapshot {
        let now = self.clock.now();
        let mut state = self.state.lock().unwrap();
        state.normalize(now);
        QuotaSnapshot {
            daily_count: state.daily_count,
            daily_limit: self.daily_limit,
            hourly_count: state.hourly_count,
            hourly_limit: self.hourly_limit,
            last_action_at: state.last_action_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::pacing::FixedDelay;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap()
    }

    fn controller(
        dir: &TempDir,
        config: &BotConfig,
        clock: ManualClock,
    ) -> AdmissionController {
        let store = QuotaStore::new(dir.path().join("quota_state.json"));
        AdmissionController::new(
            config,
            store,
            Arc::new(clock),
            Arc::new(FixedDelay(Duration::ZERO)),
        )
    }

    fn permissive() -> BotConfig {
        BotConfig {
            daily_limit: 100,
            hourly_limit: 100,
            min_delay_ms: 0,
            max_delay_ms: 0,
            ..Default::default()
        }
    }

    #[test]
    fn admits_under_all_limits() {
        let dir = TempDir::new().unwrap();
        let ctrl = controller(&dir, &permissive(), ManualClock::new(t0()));
        assert!(ctrl.check_and_reserve().is_ok());
    }

    #[test]
    fn denies_at_daily_limit() {
        let dir = TempDir::new().unwrap();
        let config = BotConfig {
            daily_limit: 2,
            ..permissive()
        };
        let ctrl = controller(&dir, &config, ManualClock::new(t0()));
        ctrl.record_action();
        ctrl.record_action();
        match ctrl.check_and_reserve() {
            Err(RoostError::RateLimited(DenyReason::DailyLimitExceeded)) => {}
            other => panic!("expected DailyLimitExceeded, got {other:?}"),
        }
    }

    #[test]
    fn denies_at_hourly_limit() {
        let dir = TempDir::new().unwrap();
        let config = BotConfig {
            hourly_limit: 1,
            ..permissive()
        };
        let ctrl = controller(&dir, &config, ManualClock::new(t0()));
        ctrl.record_action();
        match ctrl.check_and_reserve() {
            Err(RoostError::RateLimited(DenyReason::HourlyLimitExceeded)) => {}
            other => panic!("expected HourlyLimitExceeded, got {other:?}"),
        }
    }

    #[test]
    fn denies_too_soon_with_remaining_time() {
        let dir = TempDir::new().unwrap();
        let config = BotConfig {
            min_delay_ms: 60_000,
            max_delay_ms: 60_000,
            ..permissive()
        };
        let clock = ManualClock::new(t0());
        let ctrl = controller(&dir, &config, clock.clone());
        ctrl.record_action();
        clock.advance(chrono::Duration::seconds(10));
        match ctrl.check_and_reserve() {
            Err(RoostError::RateLimited(DenyReason::TooSoon { remaining_ms })) => {
                assert_eq!(remaining_ms, 50_000);
            }
            other => panic!("expected TooSoon, got {other:?}"),
        }
        clock.advance(chrono::Duration::seconds(50));
        assert!(ctrl.check_and_reserve().is_ok());
    }

    #[test]
    fn day_boundary_resets_daily_count_before_limit_evaluation() {
        let dir = TempDir::new().unwrap();
        let config = BotConfig {
            daily_limit: 1,
            ..permissive()
        };
        let clock = ManualClock::new(t0());
        let ctrl = controller(&dir, &config, clock.clone());
        ctrl.record_action();
        assert!(matches!(
            ctrl.check_and_reserve(),
            Err(RoostError::RateLimited(DenyReason::DailyLimitExceeded))
        ));

        clock.advance(chrono::Duration::days(1));
        assert!(ctrl.check_and_reserve().is_ok());
        assert_eq!(ctrl.snapshot().daily_count, 0);
    }

    #[test]
    fn hour_boundary_resets_hourly_count_only() {
        let dir = TempDir::new().unwrap();
        let config = BotConfig {
            hourly_limit: 1,
            ..permissive()
        };
        let clock = ManualClock::new(t0());
        let ctrl = controller(&dir, &config, clock.clone());
        ctrl.record_action();

        clock.advance(chrono::Duration::hours(1));
        assert!(ctrl.check_and_reserve().is_ok());
        let snap = ctrl.snapshot();
        assert_eq!(snap.hourly_count, 0);
        assert_eq!(snap.daily_count, 1);
    }

    #[test]
    fn denial_does_not_mutate_state() {
        let dir = TempDir::new().unwrap();
        let config = BotConfig {
            daily_limit: 1,
            ..permissive()
        };
        let ctrl = controller(&dir, &config, ManualClock::new(t0()));
        ctrl.record_action();
        let before = ctrl.snapshot();
        let _ = ctrl.check_and_reserve();
        let _ = ctrl.check_and_reserve();
        let after = ctrl.snapshot();
        assert_eq!(before.daily_count, after.daily_count);
        assert_eq!(before.hourly_count, after.hourly_count);
        assert_eq!(before.last_action_at, after.last_action_at);
    }

    #[test]
    fn record_action_persists_across_reload() {
        let dir = TempDir::new().unwrap();
        let clock = ManualClock::new(t0());
        let config = permissive();
        {
            let ctrl = controller(&dir, &config, clock.clone());
            ctrl.record_action();
            ctrl.record_action();
        }
        // Fresh controller over the same backing file.
        let ctrl = controller(&dir, &config, clock);
        let snap = ctrl.snapshot();
        assert_eq!(snap.daily_count, 2);
        assert_eq!(snap.hourly_count, 2);
        assert!(snap.last_action_at.is_some());
    }

    #[test]
    fn reset_zeroes_counters_and_persists() {
        let dir = TempDir::new().unwrap();
        let clock = ManualClock::new(t0());
        let config = permissive();
        let ctrl = controller(&dir, &config, clock.clone());
        ctrl.record_action();
        ctrl.reset();
        assert_eq!(ctrl.snapshot().daily_count, 0);

        let reloaded = controller(&dir, &config, clock);
        assert_eq!(reloaded.snapshot().daily_count, 0);
    }

    #[test]
    fn pacing_delay_comes_from_the_injected_source() {
        let dir = TempDir::new().unwrap();
        let store = QuotaStore::new(dir.path().join("quota_state.json"));
        let ctrl = AdmissionController::new(
            &permissive(),
            store,
            Arc::new(ManualClock::new(t0())),
            Arc::new(FixedDelay(Duration::from_millis(1234))),
        );
        let admission = ctrl.check_and_reserve().unwrap();
        assert_eq!(admission.pacing_delay, Duration::from_millis(1234));
    }

    #[test]
    fn counters_never_exceed_limits_over_many_admissions() {
        let dir = TempDir::new().unwrap();
        let config = BotConfig {
            daily_limit: 5,
            hourly_limit: 3,
            ..permissive()
        };
        let clock = ManualClock::new(t0());
        let ctrl = controller(&dir, &config, clock.clone());
        for _ in 0..20 {
            if ctrl.check_and_reserve().is_ok() {
                ctrl.record_action();
            }
            let snap = ctrl.snapshot();
            assert!(snap.daily_count <= 5);
            assert!(snap.hourly_count <= 3);
            clock.advance(chrono::Duration::minutes(7));
        }
    }
}
