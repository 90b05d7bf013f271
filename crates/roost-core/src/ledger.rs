//! Append-only attempt history and daily rollups, persisted with redb.
//!
//! # Table design
//!
//! `ATTEMPTS` uses a 24-byte composite key:
//! ```text
//! [ created_at_ms: u64 big-endian (8 bytes) | uuid: 16 bytes ]
//! ```
//! Because the timestamp occupies the high bytes in big-endian encoding,
//! byte ordering equals timestamp ordering, so "most recent first" is a
//! reverse scan. Values are JSON-encoded [`AttemptRecord`]s and are never
//! rewritten once inserted.
//!
//! `ROLLUPS` is keyed by the `YYYY-MM-DD` day string with exactly one row
//! per day, updated with upsert-with-increment semantics inside a single
//! write transaction.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use redb::{Database, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, RoostError};

// ---------------------------------------------------------------------------
// Table definitions
// ---------------------------------------------------------------------------

/// Key: 24-byte composite (created_at_ms big-endian ++ uuid bytes)
/// Value: JSON-encoded AttemptRecord
const ATTEMPTS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("attempts");

/// Key: "YYYY-MM-DD"
/// Value: JSON-encoded DailyRollup
const ROLLUPS: TableDefinition<&str, &[u8]> = TableDefinition::new("daily_rollups");

// ---------------------------------------------------------------------------
// Record types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success,
    Failure,
}

/// One attempt against the actuator. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub id: Uuid,
    pub target_id: String,
    pub payload: String,
    pub outcome: AttemptOutcome,
    pub error_detail: Option<String>,
    pub latency_ms: u64,
    pub egress_used: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AttemptRecord {
    pub fn success(
        target_id: impl Into<String>,
        payload: impl Into<String>,
        latency_ms: u64,
        egress_used: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            target_id: target_id.into(),
            payload: payload.into(),
            outcome: AttemptOutcome::Success,
            error_detail: None,
            latency_ms,
            egress_used,
            created_at,
        }
    }

    pub fn failure(
        target_id: impl Into<String>,
        payload: impl Into<String>,
        error_detail: impl Into<String>,
        latency_ms: u64,
        egress_used: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            target_id: target_id.into(),
            payload: payload.into(),
            outcome: AttemptOutcome::Failure,
            error_detail: Some(error_detail.into()),
            latency_ms,
            egress_used,
            created_at,
        }
    }
}

/// Per-day aggregate counters, exactly one row per day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRollup {
    pub day: NaiveDate,
    pub count: u64,
    pub success_count: u64,
    pub fail_count: u64,
}

impl DailyRollup {
    fn zero(day: NaiveDate) -> Self {
        Self {
            day,
            count: 0,
            success_count: 0,
            fail_count: 0,
        }
    }
}

/// Whole-ledger aggregate for reporting. Read-only; calling it twice with no
/// intervening writes returns identical values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerAggregate {
    pub total: u64,
    pub success: u64,
    pub failed: u64,
    pub today: u64,
    pub avg_latency_ms: u64,
}

// ---------------------------------------------------------------------------
// Key helpers
// ---------------------------------------------------------------------------

fn attempt_key(ts: DateTime<Utc>, id: Uuid) -> [u8; 24] {
    let mut key = [0u8; 24];
    let ms = ts.timestamp_millis().max(0) as u64;
    key[..8].copy_from_slice(&ms.to_be_bytes());
    key[8..].copy_from_slice(id.as_bytes());
    key
}

fn rollup_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

// ---------------------------------------------------------------------------
// AttemptLedger
// ---------------------------------------------------------------------------

pub struct AttemptLedger {
    db: Database,
}

impl AttemptLedger {
    /// Open or create the redb database at `path`.
    ///
    /// Creates both tables if they don't already exist.
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database::create(path).map_err(|e| RoostError::Ledger(e.to_string()))?;
        // Ensure the tables exist before any reads
        let wt = db
            .begin_write()
            .map_err(|e| RoostError::Ledger(e.to_string()))?;
        wt.open_table(ATTEMPTS)
            .map_err(|e| RoostError::Ledger(e.to_string()))?;
        wt.open_table(ROLLUPS)
            .map_err(|e| RoostError::Ledger(e.to_string()))?;
        wt.commit()
            .map_err(|e| RoostError::Ledger(e.to_string()))?;
        Ok(Self { db })
    }

    /// Append one attempt record. The key is derived from `created_at`.
    pub fn record(&self, record: &AttemptRecord) -> Result<()> {
        let key = attempt_key(record.created_at, record.id);
        let value = serde_json::to_vec(record).map_err(|e| RoostError::Ledger(e.to_string()))?;
        let wt = self
            .db
            .begin_write()
            .map_err(|e| RoostError::Ledger(e.to_string()))?;
        {
            let mut table = wt
                .open_table(ATTEMPTS)
                .map_err(|e| RoostError::Ledger(e.to_string()))?;
            table
                .insert(key.as_slice(), value.as_slice())
                .map_err(|e| RoostError::Ledger(e.to_string()))?;
        }
        wt.commit()
            .map_err(|e| RoostError::Ledger(e.to_string()))?;
        Ok(())
    }

    /// Atomically increment the day's `count` and the matching
    /// success/fail counter, creating the row if absent.
    pub fn upsert_rollup(&self, day: NaiveDate, success: bool) -> Result<()> {
        let key = rollup_key(day);
        let wt = self
            .db
            .begin_write()
            .map_err(|e| RoostError::Ledger(e.to_string()))?;
        {
            let mut table = wt
                .open_table(ROLLUPS)
                .map_err(|e| RoostError::Ledger(e.to_string()))?;
            let mut rollup = match table
                .get(key.as_str())
                .map_err(|e| RoostError::Ledger(e.to_string()))?
            {
                Some(v) => serde_json::from_slice(v.value())
                    .map_err(|e| RoostError::Ledger(e.to_string()))?,
                None => DailyRollup::zero(day),
            };
            rollup.count += 1;
            if success {
                rollup.success_count += 1;
            } else {
                rollup.fail_count += 1;
            }
            let value =
                serde_json::to_vec(&rollup).map_err(|e| RoostError::Ledger(e.to_string()))?;
            table
                .insert(key.as_str(), value.as_slice())
                .map_err(|e| RoostError::Ledger(e.to_string()))?;
        }
        wt.commit()
            .map_err(|e| RoostError::Ledger(e.to_string()))?;
        Ok(())
    }

    pub fn rollup(&self, day: NaiveDate) -> Result<Option<DailyRollup>> {
        let key = rollup_key(day);
        let rt = self
            .db
            .begin_read()
            .map_err(|e| RoostError::Ledger(e.to_string()))?;
        let table = rt
            .open_table(ROLLUPS)
            .map_err(|e| RoostError::Ledger(e.to_string()))?;
        match table
            .get(key.as_str())
            .map_err(|e| RoostError::Ledger(e.to_string()))?
        {
            Some(v) => Ok(Some(
                serde_json::from_slice(v.value()).map_err(|e| RoostError::Ledger(e.to_string()))?,
            )),
            None => Ok(None),
        }
    }

    /// The most recent `limit` attempts, newest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<AttemptRecord>> {
        let mut all = self.list_all()?;
        all.truncate(limit);
        Ok(all)
    }

    /// All attempts, sorted by `created_at` descending (newest first).
    pub fn list_all(&self) -> Result<Vec<AttemptRecord>> {
        let rt = self
            .db
            .begin_read()
            .map_err(|e| RoostError::Ledger(e.to_string()))?;
        let table = rt
            .open_table(ATTEMPTS)
            .map_err(|e| RoostError::Ledger(e.to_string()))?;

        let mut result = Vec::new();
        for entry in table
            .iter()
            .map_err(|e| RoostError::Ledger(e.to_string()))?
        {
            let (_, v) = entry.map_err(|e| RoostError::Ledger(e.to_string()))?;
            let record: AttemptRecord = serde_json::from_slice(v.value())
                .map_err(|e| RoostError::Ledger(e.to_string()))?;
            result.push(record);
        }
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    /// Whole-history aggregate; `today` selects the day bucket counted in
    /// the `today` field.
    pub fn aggregate(&self, today: NaiveDate) -> Result<LedgerAggregate> {
        let all = self.list_all()?;
        let total = all.len() as u64;
        let success = all
            .iter()
            .filter(|r| r.outcome == AttemptOutcome::Success)
            .count() as u64;
        let today_count = all
            .iter()
            .filter(|r| r.created_at.date_naive() == today)
            .count() as u64;
        let avg_latency_ms = if total == 0 {
            0
        } else {
            all.iter().map(|r| r.latency_ms).sum::<u64>() / total
        };
        Ok(LedgerAggregate {
            total,
            success,
            failed: total - success,
            today: today_count,
            avg_latency_ms,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
