//! The consumed actuator capability.
//!
//! The actuator is an external collaborator (a browser-automation engine)
//! that navigates to a target-identified resource, locates an input surface,
//! submits the payload, and reports either confirmation or a
//! navigation/element/timeout failure. This module is the seam: the executor
//! depends only on the [`Actuator`] trait.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Outcome / error types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorOutcome {
    pub latency_ms: u64,
    /// Whether the platform visibly confirmed the submission. An
    /// unconfirmed success is still a success; the flag is telemetry.
    pub confirmed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActuatorErrorKind {
    Timeout,
    ElementNotFound,
    NavigationError,
    Unknown,
}

/// The executor treats every kind uniformly; the kind is kept for the
/// attempt record's detail string only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind:?}: {detail}")]
pub struct ActuatorError {
    pub kind: ActuatorErrorKind,
    pub detail: String,
}

impl ActuatorError {
    pub fn new(kind: ActuatorErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Actuator
// ---------------------------------------------------------------------------

#[allow(async_fn_in_trait)]
pub trait Actuator: Send + Sync {
    /// Login/session-readiness precondition. Consulted once at executor
    /// startup; re-checked only via an explicit refresh.
    async fn is_ready(&self) -> bool;

    /// Perform one real-world attempt through the optional egress endpoint.
    async fn attempt(
        &self,
        target_id: &str,
        payload: &str,
        egress: Option<&str>,
    ) -> std::result::Result<ActuatorOutcome, ActuatorError>;
}

/// In-process stand-in actuator that always confirms. Used by dry runs and
/// tests; performs no I/O.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedActuator {
    pub latency_ms: u64,
}

impl Default for SimulatedActuator {
    fn default() -> Self {
        Self { latency_ms: 25 }
    }
}

impl Actuator for SimulatedActuator {
    async fn is_ready(&self) -> bool {
        true
    }

    async fn attempt(
        &self,
        _target_id: &str,
        _payload: &str,
        _egress: Option<&str>,
    ) -> std::result::Result<ActuatorOutcome, ActuatorError> {
        Ok(ActuatorOutcome {
            latency_ms: self.latency_ms,
            confirmed: true,
        })
    }
}

// ---------------------------------------------------------------------------
// DiagnosticSink
// ---------------------------------------------------------------------------

/// Optional side-channel hook fired on actuator failure (the original system
/// captured a screenshot here). Not part of the core contract.
pub trait DiagnosticSink: Send + Sync {
    fn on_actuator_failure(&self, target_id: &str, detail: &str);
}

/// Default sink: log and move on.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDiagnostics;

impl DiagnosticSink for NoopDiagnostics {
    fn on_actuator_failure(&self, target_id: &str, detail: &str) {
        tracing::debug!(target_id, detail, "actuator failure diagnostic");
    }
}
