//! @ai:module:intent Optional historical KPI data, externally supplied
//! @ai:module:layer domain
//! @ai:module:public_api HistoricalData
//! @ai:module:stateless true

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// @ai:intent Per-car, per-KPI value series aligned to a shared years axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalData {
    pub years: Vec<i32>,
    pub cars: IndexMap<String, IndexMap<String, Vec<f64>>>,
}

impl HistoricalData {
    /// @ai:intent Load historical data, tolerating an absent file
    /// A present but malformed file is still an error.
    /// @ai:effects fs:read
    pub fn load_optional(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            tracing::info!("No historical data at {}, skipping trends", path.display());
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read historical file: {}", path.display()))?;
        let data: Self = serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in historical file: {}", path.display()))?;
        Ok(Some(data))
    }

    /// @ai:intent Series for one car and KPI, if recorded
    /// @ai:effects pure
    pub fn series(&self, car: &str, kpi: &str) -> Option<&[f64]> {
        self.cars
            .get(car)
            .and_then(|kpis| kpis.get(kpi))
            .map(Vec::as_slice)
    }
}
