//! @ai:module:intent Configuration structs for the KPI suite
//! @ai:module:layer infrastructure
//! @ai:module:public_api KpiConfig, ApiConfig, RunConfig, PathConfig
//! @ai:module:stateless true

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// @ai:intent Main configuration for the KPI suite
/// @ai:effects pure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KpiConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub paths: PathConfig,
}

/// @ai:intent API configuration for the chat-completions client
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// @ai:intent Run configuration for collection
/// @ai:effects pure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub dry_run: bool,
}

/// @ai:intent Path configuration for the JSON file contract and outputs
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    pub catalog_file: PathBuf,
    pub values_file: PathBuf,
    pub historical_file: PathBuf,
    pub report_file: PathBuf,
    pub dashboard_file: PathBuf,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            catalog_file: PathBuf::from("car_kpi_data.json"),
            values_file: PathBuf::from("car_kpi_values_2024.json"),
            historical_file: PathBuf::from("car_historical_data.json"),
            report_file: PathBuf::from("car_kpi_report_2024.xlsx"),
            dashboard_file: PathBuf::from("car_kpi_dashboard.html"),
        }
    }
}

fn default_endpoint() -> String {
    "https://api.x.ai/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "grok-2-1212".to_string()
}

fn default_api_key_env() -> String {
    "XAI_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl KpiConfig {
    /// @ai:intent Load configuration from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// @ai:intent Save configuration to a TOML file
    /// @ai:effects fs:write
    pub fn save(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
