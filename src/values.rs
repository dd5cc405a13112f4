//! @ai:module:intent KPI value matrix: per-car, per-KPI numeric dataset
//! @ai:module:layer domain
//! @ai:module:public_api KpiValue, ValueMatrix, AVERAGE_KEY
//! @ai:module:stateless true

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Reserved pseudo-car key holding the per-KPI mean across all real cars.
pub const AVERAGE_KEY: &str = "Average";

/// @ai:intent A KPI value: integer when whole, float otherwise
/// Serialized untagged so the JSON contract carries plain numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KpiValue {
    Int(i64),
    Float(f64),
}

impl KpiValue {
    /// @ai:intent Collapse a float into Int when it is a whole number
    /// @ai:effects pure
    pub fn from_f64(value: f64) -> Self {
        if value.fract() == 0.0 {
            KpiValue::Int(value as i64)
        } else {
            KpiValue::Float(value)
        }
    }

    /// @ai:intent Widen to f64 for arithmetic
    /// @ai:effects pure
    pub fn as_f64(&self) -> f64 {
        match self {
            KpiValue::Int(v) => *v as f64,
            KpiValue::Float(v) => *v,
        }
    }

    /// @ai:intent The default value for unparseable or failed cells
    /// @ai:effects pure
    pub fn zero() -> Self {
        KpiValue::Int(0)
    }
}

/// @ai:intent Mapping from car name to per-KPI values, insertion-ordered
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueMatrix(pub IndexMap<String, IndexMap<String, KpiValue>>);

impl ValueMatrix {
    /// @ai:intent Create an empty matrix
    /// @ai:effects pure
    pub fn new() -> Self {
        Self::default()
    }

    /// @ai:intent Insert one cell, creating the car row if needed
    /// @ai:effects state:write
    pub fn insert(&mut self, car: &str, kpi: &str, value: KpiValue) {
        self.0
            .entry(car.to_string())
            .or_default()
            .insert(kpi.to_string(), value);
    }

    /// @ai:intent Look up a cell if present
    /// @ai:effects pure
    pub fn get(&self, car: &str, kpi: &str) -> Option<KpiValue> {
        self.0.get(car).and_then(|row| row.get(kpi)).copied()
    }

    /// @ai:intent Cell value with the consumption-time default of 0
    /// @ai:effects pure
    pub fn value_or_zero(&self, car: &str, kpi: &str) -> f64 {
        self.get(car, kpi).map(|v| v.as_f64()).unwrap_or(0.0)
    }

    /// @ai:intent Whether a car has any row in the matrix
    /// @ai:effects pure
    pub fn contains_car(&self, car: &str) -> bool {
        self.0.contains_key(car)
    }

    /// @ai:intent Mean of a KPI across the given cars, present values only
    /// Returns 0 when no car carries the KPI.
    /// @ai:effects pure
    pub fn kpi_average(&self, kpi: &str, cars: &[String]) -> f64 {
        let values: Vec<f64> = cars
            .iter()
            .filter_map(|car| self.get(car, kpi))
            .map(|v| v.as_f64())
            .collect();

        if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        }
    }

    /// @ai:intent Compute and store the reserved Average row for all KPIs
    /// @ai:effects state:write
    pub fn append_average_row(&mut self, cars: &[String], kpis: &[String]) {
        // Recomputed wholesale on every collection run.
        self.0.shift_remove(AVERAGE_KEY);

        for kpi in kpis {
            let avg = self.kpi_average(kpi, cars);
            tracing::info!("Calculated average for {}: {}", kpi, avg);
            self.insert(AVERAGE_KEY, kpi, KpiValue::from_f64(avg));
        }
    }

    /// @ai:intent Load a value matrix from a JSON file
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read values file: {}", path.display()))?;
        let matrix: Self = serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in values file: {}", path.display()))?;
        Ok(matrix)
    }

    /// @ai:intent Save the matrix as pretty-printed JSON, overwriting any prior file
    /// @ai:effects fs:write
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write values file: {}", path.display()))?;
        Ok(())
    }
}
