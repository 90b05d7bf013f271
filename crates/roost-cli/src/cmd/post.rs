use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use browser_driver::BrowserDriver;
use roost_core::{
    run_with_retry, ActionExecutor, ActionOutcome, Actuator, NoopDiagnostics, RetryPolicy,
    SimulatedActuator, SystemClock,
};

use crate::cmd::{open_services, Services};
use crate::output::print_json;

pub fn run(
    data_dir: &Path,
    config: Option<&Path>,
    target_id: &str,
    text: &str,
    retries: Option<u32>,
    dry_run: bool,
    json: bool,
) -> anyhow::Result<()> {
    let services = open_services(data_dir, config)?;

    let mut policy = RetryPolicy::from_config(&services.config);
    if let Some(max) = retries {
        policy.max_attempts = max.max(1);
    }

    let rt = tokio::runtime::Runtime::new()?;
    let outcome = rt.block_on(async {
        if dry_run {
            drive(SimulatedActuator::default(), &services, policy, target_id, text).await
        } else {
            // Sidecar child is killed when the driver drops.
            let driver = BrowserDriver::spawn(&services.config.driver)
                .context("failed to spawn actuator sidecar")?;
            drive(driver, &services, policy, target_id, text).await
        }
    })?;

    if json {
        print_json(&outcome)?;
    } else {
        render_outcome(&outcome);
    }
    Ok(())
}

async fn drive<A: Actuator>(
    actuator: A,
    services: &Services,
    policy: RetryPolicy,
    target_id: &str,
    text: &str,
) -> anyhow::Result<ActionOutcome> {
    let executor = ActionExecutor::start(
        actuator,
        Arc::clone(&services.admission),
        Arc::clone(&services.rotator),
        Arc::clone(&services.ledger),
        Arc::new(NoopDiagnostics),
        Arc::new(SystemClock),
    )
    .await;

    let outcome = run_with_retry(&executor, policy, target_id, text).await?;
    Ok(outcome)
}

fn render_outcome(outcome: &ActionOutcome) {
    println!("Replied to {} in {}ms", outcome.target_id, outcome.latency_ms);
    if let Some(egress) = &outcome.egress_used {
        println!("  egress:  {}", egress);
    }
    println!(
        "  daily:   {} used, {} remaining",
        outcome.daily_used, outcome.daily_remaining
    );
    println!(
        "  hourly:  {} used, {} remaining",
        outcome.hourly_used, outcome.hourly_remaining
    );
}
