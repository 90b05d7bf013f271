//! Wire types for the sidecar protocol.
//!
//! One request per line on the sidecar's stdin, one response per line on its
//! stdout. The protocol deliberately carries no selectors or markup: the
//! sidecar owns all page knowledge, roost only names the target and payload.

use roost_core::ActuatorErrorKind;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DriverRequest {
    /// Is the login session usable? Sent once at executor startup and on
    /// explicit readiness refresh.
    Ready,
    /// Navigate to the target resource, locate the input surface, submit
    /// the payload.
    Attempt {
        target_id: String,
        payload: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        proxy: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Timeout,
    ElementNotFound,
    NavigationError,
    Unknown,
}

impl From<FailureKind> for ActuatorErrorKind {
    fn from(kind: FailureKind) -> Self {
        match kind {
            FailureKind::Timeout => ActuatorErrorKind::Timeout,
            FailureKind::ElementNotFound => ActuatorErrorKind::ElementNotFound,
            FailureKind::NavigationError => ActuatorErrorKind::NavigationError,
            FailureKind::Unknown => ActuatorErrorKind::Unknown,
        }
    }
}

fn default_confirmed() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DriverResponse {
    Ready {
        ok: bool,
    },
    /// The attempt went through. `confirmed` is false when the platform
    /// showed no visible confirmation but the submission was sent.
    Confirmed {
        latency_ms: u64,
        #[serde(default = "default_confirmed")]
        confirmed: bool,
    },
    Failed {
        kind: FailureKind,
        detail: String,
    },
}
