//! Status reporting for the dashboard/CLI collaborator.

use chrono::NaiveDate;
use serde::Serialize;

use crate::admission::{AdmissionController, QuotaSnapshot};
use crate::config::BotConfig;
use crate::error::Result;
use crate::ledger::{AttemptLedger, LedgerAggregate};
use crate::rotator::{EgressEndpoint, EgressRotator};

/// Echo of the operative configuration, so a report is interpretable
/// without the config file at hand.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigEcho {
    pub daily_limit: u32,
    pub hourly_limit: u32,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    pub use_rotation: bool,
    pub egress_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub stats: LedgerAggregate,
    pub quota: QuotaSnapshot,
    pub daily_remaining: u32,
    pub hourly_remaining: u32,
    pub egress: Vec<EgressEndpoint>,
    pub config: ConfigEcho,
}

/// Assemble the full status view. Read-only: calling it twice with no
/// intervening action returns identical values.
pub fn status(
    ledger: &AttemptLedger,
    admission: &AdmissionController,
    rotator: &EgressRotator,
    config: &BotConfig,
    today: NaiveDate,
) -> Result<StatusReport> {
    let stats = ledger.aggregate(today)?;
    let quota = admission.snapshot();
    let daily_remaining = quota.daily_remaining();
    let hourly_remaining = quota.hourly_remaining();
    Ok(StatusReport {
        stats,
        quota,
        daily_remaining,
        hourly_remaining,
        egress: rotator.snapshot(),
        config: ConfigEcho {
            daily_limit: config.daily_limit,
            hourly_limit: config.hourly_limit,
            min_delay_ms: config.min_delay_ms,
            max_delay_ms: config.max_delay_ms,
            use_rotation: config.use_rotation,
            egress_count: config.egress.len(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::ledger::AttemptRecord;
    use crate::pacing::FixedDelay;
    use crate::quota::QuotaStore;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn status_combines_ledger_quota_and_config() {
        let dir = TempDir::new().unwrap();
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        let config = BotConfig {
            daily_limit: 10,
            use_rotation: true,
            egress: vec!["proxy-a:8080".into()],
            ..Default::default()
        };
        let admission = AdmissionController::new(
            &config,
            QuotaStore::new(dir.path().join("quota_state.json")),
            Arc::new(ManualClock::new(now)),
            Arc::new(FixedDelay(Duration::ZERO)),
        );
        let rotator = EgressRotator::new(config.egress.clone(), config.use_rotation);
        let ledger = AttemptLedger::open(&dir.path().join("ledger.redb")).unwrap();
        ledger
            .record(&AttemptRecord::success("t1", "x", 120, None, now))
            .unwrap();
        admission.record_action();

        let report = status(&ledger, &admission, &rotator, &config, now.date_naive()).unwrap();
        assert_eq!(report.stats.total, 1);
        assert_eq!(report.quota.daily_count, 1);
        assert_eq!(report.daily_remaining, 9);
        assert_eq!(report.config.egress_count, 1);
        assert_eq!(report.egress[0].address, "proxy-a:8080");
    }
}
