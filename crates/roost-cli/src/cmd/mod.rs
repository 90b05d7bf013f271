pub mod post;
pub mod recent;
pub mod reset_quota;
pub mod stats;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use roost_core::{
    paths, AdmissionController, AttemptLedger, BotConfig, EgressRotator, QuotaStore, SystemClock,
    UniformJitter,
};

/// Resolve the config file path: explicit `--config` wins, otherwise the
/// conventional location inside the data directory.
fn config_path(data_dir: &Path, explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(p) => p.to_path_buf(),
        None => paths::config_file(data_dir),
    }
}

/// Load the config and surface validation warnings without failing.
pub(crate) fn load_config(data_dir: &Path, explicit: Option<&Path>) -> anyhow::Result<BotConfig> {
    let path = config_path(data_dir, explicit);
    let config = BotConfig::load(&path)
        .with_context(|| format!("failed to load config from {}", path.display()))?;
    for warning in config.validate() {
        tracing::warn!(level = ?warning.level, "{}", warning.message);
    }
    Ok(config)
}

/// The wired-up core components every command variant draws from.
pub(crate) struct Services {
    pub config: BotConfig,
    pub admission: Arc<AdmissionController>,
    pub rotator: Arc<EgressRotator>,
    pub ledger: Arc<AttemptLedger>,
}

pub(crate) fn open_services(
    data_dir: &Path,
    explicit_config: Option<&Path>,
) -> anyhow::Result<Services> {
    roost_core::io::ensure_dir(data_dir)?;
    let config = load_config(data_dir, explicit_config)?;

    let store = QuotaStore::new(paths::quota_state_file(data_dir));
    let admission = Arc::new(AdmissionController::new(
        &config,
        store,
        Arc::new(SystemClock),
        Arc::new(UniformJitter),
    ));
    let rotator = Arc::new(EgressRotator::new(
        config.egress.clone(),
        config.use_rotation,
    ));
    let ledger = Arc::new(
        AttemptLedger::open(&paths::ledger_file(data_dir)).context("failed to open ledger")?,
    );

    Ok(Services {
        config,
        admission,
        rotator,
        ledger,
    })
}
