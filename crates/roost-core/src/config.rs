use crate::error::Result;
use crate::io;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// DriverConfig
// ---------------------------------------------------------------------------

/// How to launch the browser-automation sidecar process.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DriverConfig {
    #[serde(default = "default_driver_command")]
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

fn default_driver_command() -> String {
    "roost-actuator".to_string()
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            command: default_driver_command(),
            args: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// BotConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BotConfig {
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u32,
    #[serde(default = "default_hourly_limit")]
    pub hourly_limit: u32,
    /// Minimum gap between completed actions. Requests arriving earlier
    /// are denied, not queued.
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,
    /// Upper bound of the randomized pacing delay applied after admission.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    #[serde(default)]
    pub use_rotation: bool,
    /// Ordered egress endpoint list; rotation walks it round-robin.
    #[serde(default)]
    pub egress: Vec<String>,
    /// Advisory: consumed by the caller-level retry policy, never enforced
    /// inside the executor.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default)]
    pub driver: DriverConfig,
}

fn default_daily_limit() -> u32 {
    500
}

fn default_hourly_limit() -> u32 {
    60
}

fn default_min_delay_ms() -> u64 {
    120_000 // 2 minutes
}

fn default_max_delay_ms() -> u64 {
    300_000 // 5 minutes
}

fn default_max_retries() -> u32 {
    3
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            daily_limit: default_daily_limit(),
            hourly_limit: default_hourly_limit(),
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            use_rotation: false,
            egress: Vec::new(),
            max_retries: default_max_retries(),
            driver: DriverConfig::default(),
        }
    }
}

impl BotConfig {
    /// Load config from a YAML file, falling back to defaults when the file
    /// does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&raw)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        io::atomic_write(path, yaml.as_bytes())
    }

    /// Sanity-check the configuration. `Error`-level warnings describe
    /// settings that will deny every action.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.min_delay_ms > self.max_delay_ms {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "min_delay_ms ({}) exceeds max_delay_ms ({})",
                    self.min_delay_ms, self.max_delay_ms
                ),
            });
        }
        if self.daily_limit == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "daily_limit is 0: every action will be denied".to_string(),
            });
        }
        if self.hourly_limit == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "hourly_limit is 0: every action will be denied".to_string(),
            });
        }
        if self.hourly_limit > self.daily_limit {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "hourly_limit ({}) exceeds daily_limit ({}): the daily limit binds first",
                    self.hourly_limit, self.daily_limit
                ),
            });
        }
        if self.use_rotation && self.egress.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "use_rotation is enabled but the egress list is empty".to_string(),
            });
        }

        warnings
    }
}
