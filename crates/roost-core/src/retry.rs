//! Caller-level retry policy, layered on top of the single-attempt executor.
//!
//! Each retry is a fresh `execute` call subject to a fresh admission check,
//! so retries can never bypass quota or pacing. Only actuator failures are
//! retried: rate-limit denials, a missing session, and a busy executor are
//! returned to the caller immediately.

use std::time::Duration;

use crate::actuator::Actuator;
use crate::config::BotConfig;
use crate::error::{Result, RoostError};
use crate::executor::{ActionExecutor, ActionOutcome};

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_backoff: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &BotConfig) -> Self {
        Self {
            max_attempts: config.max_retries.max(1),
            base_backoff: Duration::from_secs(2),
        }
    }

    /// Exponential backoff: base × 2^(attempt-1).
    fn backoff(&self, attempt: u32) -> Duration {
        self.base_backoff * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

/// Drive `execute` to a terminal outcome under `policy`.
pub async fn run_with_retry<A: Actuator>(
    executor: &ActionExecutor<A>,
    policy: RetryPolicy,
    target_id: &str,
    payload: &str,
) -> Result<ActionOutcome> {
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match executor.execute(target_id, payload).await {
            Err(RoostError::ActuatorFailure { detail }) if attempt < policy.max_attempts => {
                let backoff = policy.backoff(attempt);
                tracing::warn!(
                    target_id,
                    attempt,
                    max_attempts = policy.max_attempts,
                    backoff_ms = backoff.as_millis() as u64,
                    %detail,
                    "actuator attempt failed, backing off"
                );
                tokio::time::sleep(backoff).await;
            }
            terminal => return terminal,
        }
    }
}
