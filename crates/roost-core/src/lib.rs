//! `roost-core` — action admission and scheduling core.
//!
//! Decides whether a UI-driven posting action may run now, paces and
//! serializes admitted actions, rotates egress identity, coordinates with a
//! fallible external actuator, and persists outcomes and quota state durably
//! across restarts.
//!
//! # Architecture
//!
//! ```text
//! caller
//!   │
//!   ▼
//! AdmissionController.check_and_reserve   ← quota limits, min-delay, pacing
//!   │
//!   ▼
//! ActionExecutor.execute                  ← egress pick, pacing sleep,
//!   │                                       actuator call, outcome classify
//!   ▼
//! AttemptLedger.record + upsert_rollup    ← append-only history (redb)
//! AdmissionController.record_action       ← quota counters (JSON snapshot)
//! ```
//!
//! The actuator itself (a browser-automation engine) is an external
//! collaborator behind the [`actuator::Actuator`] trait; see the
//! `browser-driver` crate for the subprocess-backed implementation.

pub mod actuator;
pub mod admission;
pub mod clock;
pub mod config;
pub mod error;
pub mod executor;
pub mod io;
pub mod ledger;
pub mod pacing;
pub mod paths;
pub mod quota;
pub mod report;
pub mod retry;
pub mod rotator;

pub use actuator::{
    Actuator, ActuatorError, ActuatorErrorKind, ActuatorOutcome, DiagnosticSink, NoopDiagnostics,
    SimulatedActuator,
};
pub use admission::{Admission, AdmissionController, QuotaSnapshot};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{BotConfig, ConfigWarning, DriverConfig, WarnLevel};
pub use error::{DenyReason, Result, RoostError};
pub use executor::{ActionExecutor, ActionOutcome};
pub use ledger::{AttemptLedger, AttemptOutcome, AttemptRecord, DailyRollup, LedgerAggregate};
pub use pacing::{DelaySource, FixedDelay, UniformJitter};
pub use quota::{QuotaState, QuotaStore};
pub use report::{status, StatusReport};
pub use retry::{run_with_retry, RetryPolicy};
pub use rotator::{EgressEndpoint, EgressRotator};
