use std::path::Path;

use crate::cmd::open_services;
use crate::output::print_json;

pub fn run(data_dir: &Path, config: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let services = open_services(data_dir, config)?;

    services.admission.reset();
    let snapshot = services.admission.snapshot();

    if json {
        return print_json(&snapshot);
    }

    println!(
        "Quota reset: {}/{} daily, {}/{} hourly",
        snapshot.daily_count, snapshot.daily_limit, snapshot.hourly_count, snapshot.hourly_limit
    );
    Ok(())
}
