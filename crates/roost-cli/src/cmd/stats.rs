use std::path::Path;

use chrono::Utc;
use roost_core::{clock, status};

use crate::cmd::open_services;
use crate::output::print_json;

pub fn run(data_dir: &Path, config: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let services = open_services(data_dir, config)?;

    let today = clock::day_key(Utc::now());
    let report = status(
        &services.ledger,
        &services.admission,
        &services.rotator,
        &services.config,
        today,
    )?;

    if json {
        return print_json(&report);
    }

    println!("Attempts");
    println!("  total:    {}", report.stats.total);
    println!("  success:  {}", report.stats.success);
    println!("  failed:   {}", report.stats.failed);
    println!("  today:    {}", report.stats.today);
    println!("  avg ms:   {}", report.stats.avg_latency_ms);
    println!();
    println!("Quota");
    println!(
        "  daily:    {}/{} ({} remaining)",
        report.quota.daily_count, report.quota.daily_limit, report.daily_remaining
    );
    println!(
        "  hourly:   {}/{} ({} remaining)",
        report.quota.hourly_count, report.quota.hourly_limit, report.hourly_remaining
    );
    match report.quota.last_action_at {
        Some(ts) => println!("  last at:  {}", ts.to_rfc3339()),
        None => println!("  last at:  never"),
    }

    if !report.egress.is_empty() {
        println!();
        println!("Egress");
        for endpoint in &report.egress {
            println!(
                "  {}  ok={} fail={}",
                endpoint.address, endpoint.success_score, endpoint.fail_score
            );
        }
    }
    Ok(())
}
