use std::path::Path;

use anyhow::Context;
use roost_core::{paths, AttemptLedger, AttemptOutcome};

use crate::output::{print_json, print_table};

pub fn run(data_dir: &Path, limit: usize, json: bool) -> anyhow::Result<()> {
    roost_core::io::ensure_dir(data_dir)?;
    let ledger =
        AttemptLedger::open(&paths::ledger_file(data_dir)).context("failed to open ledger")?;
    let records = ledger.recent(limit)?;

    if json {
        return print_json(&records);
    }

    if records.is_empty() {
        println!("No attempts recorded.");
        return Ok(());
    }

    let rows = records
        .iter()
        .map(|r| {
            let outcome = match r.outcome {
                AttemptOutcome::Success => "success".to_string(),
                AttemptOutcome::Failure => {
                    format!("failed: {}", r.error_detail.as_deref().unwrap_or("?"))
                }
            };
            vec![
                r.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                r.target_id.clone(),
                outcome,
                format!("{}ms", r.latency_ms),
                r.egress_used.clone().unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();

    print_table(&["TIME (UTC)", "TARGET", "OUTCOME", "LATENCY", "EGRESS"], rows);
    Ok(())
}
