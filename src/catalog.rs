//! @ai:module:intent Car and KPI catalog: the fixed comparison set for a run
//! @ai:module:layer domain
//! @ai:module:public_api Catalog, KPI_POOL, BANNED_KPIS, EXPECTED_CARS, KPI_COUNT
//! @ai:module:stateless true

use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Candidate pool the 5 run KPIs are drawn from.
pub const KPI_POOL: [&str; 9] = [
    "Fuel Efficiency (MPG)",
    "Acceleration (0-60 mph)",
    "Range (miles)",
    "Maintenance Cost",
    "Cost Over Ownership",
    "Passenger Capacity",
    "Cargo Space (cu ft)",
    "Towing Capacity (lbs)",
    "Horsepower",
];

/// KPIs that must never be selected, even if they appear in the pool.
pub const BANNED_KPIS: [&str; 3] = ["Reliability Rating", "Safety Rating", "Resale Value"];

/// Catalog sizes are fixed once established: 10 ICE + 10 EV cars, 5 KPIs.
pub const EXPECTED_CARS: usize = 20;
pub const KPI_COUNT: usize = 5;

/// @ai:intent Persisted catalog of cars and KPIs under comparison
/// The legacy `top_bought_cars_US` key is still accepted on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(rename = "top_5_KPIs")]
    pub kpis: Vec<String>,
    #[serde(rename = "top_cars_US_2024", alias = "top_bought_cars_US")]
    pub cars: Vec<String>,
}

impl Catalog {
    /// @ai:intent Load a catalog from a JSON file
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;
        let catalog: Self = serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in catalog file: {}", path.display()))?;
        Ok(catalog)
    }

    /// @ai:intent Save the catalog as pretty-printed JSON, overwriting any prior file
    /// @ai:effects fs:write
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write catalog file: {}", path.display()))?;
        Ok(())
    }

    /// @ai:intent Check whether the car list has the expected 20 entries
    /// @ai:effects pure
    pub fn has_expected_cars(&self) -> bool {
        self.cars.len() == EXPECTED_CARS
    }
}

/// @ai:intent Select a random 5-KPI subset from the pool, excluding banned KPIs
/// @ai:effects rand
pub fn select_kpis<R: rand::Rng>(rng: &mut R) -> Vec<String> {
    let available: Vec<&str> = KPI_POOL
        .iter()
        .copied()
        .filter(|kpi| !BANNED_KPIS.contains(kpi))
        .collect();

    available
        .choose_multiple(rng, KPI_COUNT)
        .map(|kpi| kpi.to_string())
        .collect()
}

/// @ai:intent Parse a one-car-per-line API reply into a clean car list
/// @ai:effects pure
pub fn parse_car_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
