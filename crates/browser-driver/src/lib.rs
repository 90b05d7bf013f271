//! `browser-driver` — subprocess driver for the browser-automation sidecar.
//!
//! The sidecar is a separate program (typically a Playwright script) that
//! owns the logged-in browser session. This crate speaks its line-oriented
//! JSON protocol and presents the result as a [`roost_core::Actuator`], so
//! the scheduling core never touches page structure, selectors, or cookies.
//!
//! # Architecture
//!
//! ```text
//! DriverConfig
//!     │
//!     ▼
//! DriverProcess   ← spawns the configured sidecar command
//!     │              one JSON request line in, one response line out
//!     ▼
//! BrowserDriver   ← implements roost_core::Actuator
//!     │              maps wire failures onto ActuatorError
//!     ▼
//! ActuatorOutcome / ActuatorError
//! ```
//!
//! A transport-level fault (sidecar crash, malformed line, broken pipe) is
//! reported as an attempt failure of kind `Unknown` rather than a hard
//! error, so the caller's retry policy applies to it like any other flake.

pub mod error;
pub mod types;

pub(crate) mod process;


pub use error::DriverError;
pub use types::{DriverRequest, DriverResponse, FailureKind};

use roost_core::{Actuator, ActuatorError, ActuatorErrorKind, ActuatorOutcome, DriverConfig};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use process::DriverProcess;

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, DriverError>;

/// An actuator backed by a long-lived sidecar subprocess.
pub struct BrowserDriver {
    process: Mutex<DriverProcess>,
}

impl BrowserDriver {
    /// Spawn the sidecar named by `config` and wrap it as an actuator.
    pub fn spawn(config: &DriverConfig) -> Result<Self> {
        let process = DriverProcess::spawn(&config.command, &config.args)?;
        Ok(Self {
            process: Mutex::new(process),
        })
    }

    #[cfg(test)]
    fn from_process(process: DriverProcess) -> Self {
        Self {
            process: Mutex::new(process),
        }
    }

    /// Terminate the sidecar subprocess.
    pub async fn shutdown(&self) {
        self.process.lock().await.kill().await;
    }
}

impl Actuator for BrowserDriver {
    async fn is_ready(&self) -> bool {
        let mut process = self.process.lock().await;
        match process.call(&DriverRequest::Ready).await {
            Ok(DriverResponse::Ready { ok }) => ok,
            Ok(other) => {
                warn!(?other, "unexpected sidecar reply to readiness probe");
                false
            }
            Err(e) => {
                warn!(error = %e, "sidecar readiness probe failed");
                false
            }
        }
    }

    async fn attempt(
        &self,
        target_id: &str,
        payload: &str,
        egress: Option<&str>,
    ) -> std::result::Result<ActuatorOutcome, ActuatorError> {
        let request = DriverRequest::Attempt {
            target_id: target_id.to_owned(),
            payload: payload.to_owned(),
            proxy: egress.map(str::to_owned),
        };

        let mut process = self.process.lock().await;
        match process.call(&request).await {
            Ok(DriverResponse::Confirmed {
                latency_ms,
                confirmed,
            }) => {
                debug!(target_id, latency_ms, confirmed, "sidecar confirmed attempt");
                Ok(ActuatorOutcome {
                    latency_ms,
                    confirmed,
                })
            }
            Ok(DriverResponse::Failed { kind, detail }) => {
                Err(ActuatorError::new(kind.into(), detail))
            }
            Ok(DriverResponse::Ready { .. }) => Err(ActuatorError::new(
                ActuatorErrorKind::Unknown,
                "unexpected readiness reply during attempt",
            )),
            // Transport faults surface as attempt failures so the retry
            // policy treats them like any other flake.
            Err(e) => Err(ActuatorError::new(
                ActuatorErrorKind::Unknown,
                format!("sidecar transport error: {e}"),
            )),
        }
    }
}
