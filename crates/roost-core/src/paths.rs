use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Data-directory file names
// ---------------------------------------------------------------------------

pub const CONFIG_FILE: &str = "config.yaml";
pub const QUOTA_STATE_FILE: &str = "quota_state.json";
pub const LEDGER_FILE: &str = "ledger.redb";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_file(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

pub fn quota_state_file(data_dir: &Path) -> PathBuf {
    data_dir.join(QUOTA_STATE_FILE)
}

pub fn ledger_file(data_dir: &Path) -> PathBuf {
    data_dir.join(LEDGER_FILE)
}
