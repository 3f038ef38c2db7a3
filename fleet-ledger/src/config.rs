//! Configuration for the fleet ledger

use crate::balance::MatchBy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JSON file holding the records and roster
    pub data_file: PathBuf,

    /// Service name
    pub service_name: String,

    /// How records are attributed to drivers
    pub match_by: MatchBy,

    /// Emit logs as JSON lines
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("./data/fleet-ledger.json"),
            service_name: "fleet-ledger".to_string(),
            match_by: MatchBy::DriverName,
            log_json: false,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Override fields from `FLEET_LEDGER_*` environment variables
    pub fn apply_env(&mut self) -> crate::Result<()> {
        if let Ok(data_file) = std::env::var("FLEET_LEDGER_DATA_FILE") {
            self.data_file = PathBuf::from(data_file);
        }

        if let Ok(match_by) = std::env::var("FLEET_LEDGER_MATCH_BY") {
            self.match_by = match_by.parse()?;
        }

        if let Ok(log_json) = std::env::var("FLEET_LEDGER_LOG_JSON") {
            self.log_json = matches!(
                log_json.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }

        Ok(())
    }
}
