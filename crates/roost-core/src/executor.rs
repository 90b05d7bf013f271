//! One-attempt action orchestration.
//!
//! The executor holds no persistent state of its own: it borrows the
//! admission controller, rotator, and ledger, and serializes callers around
//! the single stateful actuator session. There is deliberately no retry loop
//! here — retry is the caller's responsibility (see [`crate::retry`]), so a
//! retry can never bypass admission or pacing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::actuator::{Actuator, DiagnosticSink};
use crate::admission::AdmissionController;
use crate::clock::{day_key, Clock};
use crate::error::{Result, RoostError};
use crate::ledger::{AttemptLedger, AttemptRecord};
use crate::rotator::EgressRotator;

// ---------------------------------------------------------------------------
// ActionOutcome
// ---------------------------------------------------------------------------

/// Returned to the caller after a successful attempt.
#[derive(Debug, Clone, Serialize)]
pub struct ActionOutcome {
    pub target_id: String,
    pub latency_ms: u64,
    pub egress_used: Option<String>,
    pub daily_used: u32,
    pub daily_remaining: u32,
    pub hourly_used: u32,
    pub hourly_remaining: u32,
}

// ---------------------------------------------------------------------------
// ActionExecutor
// ---------------------------------------------------------------------------

pub struct ActionExecutor<A: Actuator> {
    actuator: A,
    admission: Arc<AdmissionController>,
    rotator: Arc<EgressRotator>,
    ledger: Arc<AttemptLedger>,
    diagnostics: Arc<dyn DiagnosticSink>,
    clock: Arc<dyn Clock>,
    /// Guards the single actuator session: at most one attempt in flight.
    session: tokio::sync::Mutex<()>,
    ready: AtomicBool,
}

impl<A: Actuator> ActionExecutor<A> {
    /// Build the executor, consulting the actuator's readiness once.
    ///
    /// When the session is not ready, every `execute` fails with
    /// `NotAuthenticated` until [`refresh_readiness`](Self::refresh_readiness)
    /// observes a restored session.
    pub async fn start(
        actuator: A,
        admission: Arc<AdmissionController>,
        rotator: Arc<EgressRotator>,
        ledger: Arc<AttemptLedger>,
        diagnostics: Arc<dyn DiagnosticSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let ready = actuator.is_ready().await;
        if !ready {
            tracing::warn!("actuator session not ready; actions will be refused");
        }
        Self {
            actuator,
            admission,
            rotator,
            ledger,
            diagnostics,
            clock,
            session: tokio::sync::Mutex::new(()),
            ready: AtomicBool::new(ready),
        }
    }

    /// Re-consult the actuator after an external bootstrap re-established
    /// the session. Returns the new readiness.
    pub async fn refresh_readiness(&self) -> bool {
        let ready = self.actuator.is_ready().await;
        self.ready.store(ready, Ordering::Relaxed);
        ready
    }

    /// Run one action attempt end to end.
    ///
    /// Denials (`RateLimited`, `NotAuthenticated`, `Busy`) happen before any
    /// side effect: no actuator call, no ledger write, no quota change.
    /// The pacing sleep is a cancellable suspension point — dropping the
    /// future there mutates nothing.
    pub async fn execute(&self, target_id: &str, payload: &str) -> Result<ActionOutcome> {
        let _session = self.session.try_lock().map_err(|_| RoostError::Busy)?;

        if !self.ready.load(Ordering::Relaxed) {
            return Err(RoostError::NotAuthenticated);
        }

        let admission = self.admission.check_and_reserve()?;
        let egress = self.rotator.next();

        tracing::info!(
            target_id,
            egress = egress.as_deref().unwrap_or("none"),
            pacing_ms = admission.pacing_delay.as_millis() as u64,
            "action admitted"
        );
        tokio::time::sleep(admission.pacing_delay).await;

        let started = self.clock.now();
        match self
            .actuator
            .attempt(target_id, payload, egress.as_deref())
            .await
        {
            Ok(outcome) => {
                if let Some(addr) = &egress {
                    self.rotator.record_outcome(addr, true);
                }
                if !outcome.confirmed {
                    tracing::debug!(target_id, "submission not visibly confirmed");
                }
                self.admission.record_action();

                let now = self.clock.now();
                let record = AttemptRecord::success(
                    target_id,
                    payload,
                    outcome.latency_ms,
                    egress.clone(),
                    now,
                );
                self.persist(&record, true);

                let quota = self.admission.snapshot();
                tracing::info!(target_id, latency_ms = outcome.latency_ms, "action completed");
                Ok(ActionOutcome {
                    target_id: target_id.to_string(),
                    latency_ms: outcome.latency_ms,
                    egress_used: egress,
                    daily_used: quota.daily_count,
                    daily_remaining: quota.daily_remaining(),
                    hourly_used: quota.hourly_count,
                    hourly_remaining: quota.hourly_remaining(),
                })
            }
            Err(err) => {
                if let Some(addr) = &egress {
                    self.rotator.record_outcome(addr, false);
                }
                let now = self.clock.now();
                let latency_ms = (now - started).num_milliseconds().max(0) as u64;
                // Failed attempts never consume quota budget.
                let record = AttemptRecord::failure(
                    target_id,
                    payload,
                    err.to_string(),
                    latency_ms,
                    egress,
                    now,
                );
                self.persist(&record, false);
                self.diagnostics.on_actuator_failure(target_id, &err.detail);
                tracing::warn!(target_id, error = %err, "actuator attempt failed");
                Err(RoostError::ActuatorFailure { detail: err.detail })
            }
        }
    }

    /// Best-effort bookkeeping: ledger failures after the actuator call are
    /// logged, never surfaced as action failures.
    fn persist(&self, record: &AttemptRecord, success: bool) {
        if let Err(e) = self.ledger.record(record) {
            tracing::warn!(error = %e, "failed to append attempt record");
        }
        if let Err(e) = self.ledger.upsert_rollup(day_key(record.created_at), success) {
            tracing::warn!(error = %e, "failed to update daily rollup");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
