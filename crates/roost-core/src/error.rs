use thiserror::Error;

// ---------------------------------------------------------------------------
// DenyReason
// ---------------------------------------------------------------------------

/// Why the admission controller refused to run an action now.
///
/// Every variant is recoverable: the caller should back off and try again
/// later. Denials are never retried internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DenyReason {
    #[error("daily limit exceeded")]
    DailyLimitExceeded,

    #[error("hourly limit exceeded")]
    HourlyLimitExceeded,

    #[error("too soon: wait {remaining_ms}ms")]
    TooSoon { remaining_ms: u64 },
}

// ---------------------------------------------------------------------------
// RoostError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum RoostError {
    #[error("rate limited: {0}")]
    RateLimited(DenyReason),

    #[error("not authenticated: actuator session is not ready")]
    NotAuthenticated,

    #[error("busy: another action is already in flight")]
    Busy,

    #[error("actuator failure: {detail}")]
    ActuatorFailure { detail: String },

    #[error("ledger error: {0}")]
    Ledger(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, RoostError>;
