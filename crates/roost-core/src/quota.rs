//! Durable daily/hourly action counters.
//!
//! The store is a passive counter snapshot: limits are enforced by the
//! admission controller, rollover happens lazily in [`QuotaState::normalize`]
//! on every admission check, and the file on disk is advisory — the
//! in-memory state stays authoritative for the process lifetime even when a
//! save fails.

use crate::clock::{day_key, hour_key};
use crate::error::Result;
use crate::io;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// QuotaState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaState {
    #[serde(default)]
    pub daily_count: u32,
    #[serde(default)]
    pub hourly_count: u32,
    #[serde(default)]
    pub last_action_at: Option<DateTime<Utc>>,
    /// UTC day bucket the daily counter belongs to.
    pub day_key: NaiveDate,
    /// UTC (day, hour) bucket the hourly counter belongs to.
    pub hour_key: (NaiveDate, u32),
}

impl QuotaState {
    /// Zeroed counters anchored at `now`'s buckets.
    pub fn zero(now: DateTime<Utc>) -> Self {
        Self {
            daily_count: 0,
            hourly_count: 0,
            last_action_at: None,
            day_key: day_key(now),
            hour_key: hour_key(now),
        }
    }

    /// Reset any counter whose bucket no longer matches `now`.
    ///
    /// A day change implies an hour change (the hour key carries the date),
    /// so crossing midnight resets both counters.
    pub fn normalize(&mut self, now: DateTime<Utc>) {
        let day = day_key(now);
        if day != self.day_key {
            self.daily_count = 0;
            self.day_key = day;
        }
        let hour = hour_key(now);
        if hour != self.hour_key {
            self.hourly_count = 0;
            self.hour_key = hour;
        }
    }
}

// ---------------------------------------------------------------------------
// QuotaStore
// ---------------------------------------------------------------------------

/// JSON-snapshot persistence for [`QuotaState`].
#[derive(Debug, Clone)]
pub struct QuotaStore {
    path: PathBuf,
}

impl QuotaStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the persisted state. Never fails: a missing or corrupt snapshot
    /// yields zeroed counters anchored at `now`.
    pub fn load(&self, now: DateTime<Utc>) -> QuotaState {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return QuotaState::zero(now),
        };
        match serde_json::from_str(&raw) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "corrupt quota snapshot, starting from zero state"
                );
                QuotaState::zero(now)
            }
        }
    }

    /// Best-effort durable write. Failure is logged, not fatal.
    pub fn save(&self, state: &QuotaState) {
        if let Err(e) = self.try_save(state) {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "failed to persist quota state; in-memory counters remain authoritative"
            );
        }
    }

    fn try_save(&self, state: &QuotaState) -> Result<()> {
        let json = serde_json::to_vec_pretty(state)?;
        io::atomic_write(&self.path, &json)
    }
}
