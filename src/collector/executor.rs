//! @ai:module:intent Collection orchestration: catalog, matrix fill, averages
//! @ai:module:layer application
//! @ai:module:public_api Collector
//! @ai:module:stateless false

use crate::catalog::{self, Catalog, EXPECTED_CARS};
use crate::collector::client::ChatClientTrait;
use crate::collector::extract::extract_value;
use crate::config::PathConfig;
use crate::values::{KpiValue, ValueMatrix};
use anyhow::{Context, Result};
use std::sync::Arc;

/// KPI with a specialized thousands-of-dollars prompt.
const COST_KPI: &str = "Cost Over Ownership";

const CAR_LIST_PROMPT: &str = "List the 10 most bought Internal Combustion Engine (ICE) cars \
    and the 10 most bought Electric Vehicles (EV) in the US for 2024 as a simple list of names \
    with specific model tiers (e.g., 'Toyota Camry LE', 'Tesla Model 3 Long Range'), one per \
    line, no numbers or extra text.";

/// @ai:intent Fills the car x KPI value matrix, one API query per cell
pub struct Collector<C: ChatClientTrait> {
    client: Arc<C>,
    paths: PathConfig,
}

impl<C: ChatClientTrait> Collector<C> {
    /// @ai:intent Create a new collector
    /// @ai:effects pure
    pub fn new(client: Arc<C>, paths: PathConfig) -> Self {
        Self { client, paths }
    }

    /// @ai:intent Run the full collection: catalog, matrix, averages, persist
    /// @ai:effects network, fs:read, fs:write
    pub async fn run(&self) -> Result<()> {
        let catalog = self.load_or_fetch_catalog().await?;
        let matrix = self.collect_matrix(&catalog).await;

        matrix
            .save(&self.paths.values_file)
            .context("Failed to save value matrix")?;
        tracing::info!("Data saved to {}", self.paths.values_file.display());

        Ok(())
    }

    /// @ai:intent Load the catalog, regenerating it when absent or incomplete
    /// @ai:effects network, fs:read, fs:write
    pub async fn load_or_fetch_catalog(&self) -> Result<Catalog> {
        match Catalog::load(&self.paths.catalog_file) {
            Ok(catalog) if catalog.has_expected_cars() => {
                tracing::info!("Loaded catalog from {}", self.paths.catalog_file.display());
                tracing::info!("KPIs: {:?}", catalog.kpis);
                tracing::info!("Cars: {:?}", catalog.cars);
                Ok(catalog)
            }
            Ok(catalog) => {
                tracing::warn!(
                    "Catalog has {} cars, need {}. Fetching new data...",
                    catalog.cars.len(),
                    EXPECTED_CARS
                );
                self.fetch_catalog().await
            }
            Err(e) => {
                tracing::warn!(
                    "{} not found or invalid ({}). Fetching new data...",
                    self.paths.catalog_file.display(),
                    e
                );
                self.fetch_catalog().await
            }
        }
    }

    /// @ai:intent Fetch a fresh car list and select KPIs, then persist the catalog
    /// A short car list or a failed API call aborts with no partial write.
    /// @ai:effects network, fs:write, rand
    async fn fetch_catalog(&self) -> Result<Catalog> {
        let content = self
            .client
            .send_prompt(CAR_LIST_PROMPT)
            .await
            .context("Failed to fetch car list from API")?;

        let cars = catalog::parse_car_list(&content);

        if cars.len() != EXPECTED_CARS {
            anyhow::bail!(
                "Fetched {} cars instead of {}. Insufficient data.",
                cars.len(),
                EXPECTED_CARS
            );
        }

        let kpis = catalog::select_kpis(&mut rand::thread_rng());
        let catalog = Catalog { kpis, cars };

        catalog.save(&self.paths.catalog_file)?;
        tracing::info!(
            "Created {} with 2024 data (10 ICE + 10 EV) and KPIs: {:?}",
            self.paths.catalog_file.display(),
            catalog.kpis
        );

        Ok(catalog)
    }

    /// @ai:intent Fill every (car, KPI) cell and append the Average row
    /// Failed or unparseable cells default to 0; no retries.
    /// @ai:effects network
    pub async fn collect_matrix(&self, catalog: &Catalog) -> ValueMatrix {
        let mut matrix = ValueMatrix::new();
        let total = catalog.cars.len() * catalog.kpis.len();
        let mut current = 0;

        for car in &catalog.cars {
            for kpi in &catalog.kpis {
                current += 1;
                tracing::info!("[{}/{}] Querying {} for {}", current, total, kpi, car);

                let prompt = build_cell_prompt(car, kpi);
                let value = match self.client.send_prompt(&prompt).await {
                    Ok(content) => extract_value(&content),
                    Err(e) => {
                        tracing::warn!(
                            "API call failed for {} / {}: {}. Defaulting to 0.",
                            car,
                            kpi,
                            e
                        );
                        KpiValue::zero()
                    }
                };

                matrix.insert(car, kpi, value);
            }
        }

        matrix.append_average_row(&catalog.cars, &catalog.kpis);
        matrix
    }
}

/// @ai:intent Build the per-cell prompt, specialized for cost of ownership
/// @ai:effects pure
fn build_cell_prompt(car: &str, kpi: &str) -> String {
    if kpi == COST_KPI {
        format!(
            "Provide the 5-year total cost of ownership in thousands of dollars for the {} \
             in the US for 2024 as a single integer value (e.g., 25 for $25,000, no units, \
             no text, just the number).",
            car
        )
    } else {
        format!(
            "Provide the {} for the {} in the US for 2024 as a single integer value \
             (no units, no text, just the number).",
            kpi, car
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::client::MockChatClient;
    use crate::values::AVERAGE_KEY;
    use pretty_assertions::assert_eq;

    fn test_paths(dir: &std::path::Path) -> PathConfig {
        PathConfig {
            catalog_file: dir.join("car_kpi_data.json"),
            values_file: dir.join("car_kpi_values_2024.json"),
            historical_file: dir.join("car_historical_data.json"),
            report_file: dir.join("report.xlsx"),
            dashboard_file: dir.join("dashboard.html"),
        }
    }

    fn twenty_car_reply() -> String {
        (0..EXPECTED_CARS)
            .map(|i| format!("Car Model {}", i))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_cost_prompt_is_specialized() {
        let prompt = build_cell_prompt("Toyota Camry LE", COST_KPI);
        assert!(prompt.contains("thousands of dollars"));

        let prompt = build_cell_prompt("Toyota Camry LE", "Horsepower");
        assert!(prompt.contains("Horsepower"));
        assert!(!prompt.contains("thousands of dollars"));
    }

    #[tokio::test]
    async fn test_fetch_catalog_on_missing_file() {
        let temp = tempfile::tempdir().unwrap();
        let client = Arc::new(MockChatClient::new("42"));
        client.push_response(twenty_car_reply());

        let collector = Collector::new(client, test_paths(temp.path()));
        let catalog = collector.load_or_fetch_catalog().await.unwrap();

        assert_eq!(catalog.cars.len(), EXPECTED_CARS);
        assert_eq!(catalog.kpis.len(), crate::catalog::KPI_COUNT);
        assert!(temp.path().join("car_kpi_data.json").exists());
    }

    #[tokio::test]
    async fn test_short_catalog_triggers_refetch() {
        let temp = tempfile::tempdir().unwrap();
        let paths = test_paths(temp.path());

        let stale = Catalog {
            kpis: vec!["Horsepower".to_string()],
            cars: (0..19).map(|i| format!("Old Car {}", i)).collect(),
        };
        stale.save(&paths.catalog_file).unwrap();

        let client = Arc::new(MockChatClient::new("42"));
        client.push_response(twenty_car_reply());

        let collector = Collector::new(client, paths);
        let catalog = collector.load_or_fetch_catalog().await.unwrap();

        assert_eq!(catalog.cars.len(), EXPECTED_CARS);
        assert_eq!(catalog.cars[0], "Car Model 0");
    }

    #[tokio::test]
    async fn test_short_fetched_list_aborts_without_write() {
        let temp = tempfile::tempdir().unwrap();
        let paths = test_paths(temp.path());

        let client = Arc::new(MockChatClient::new("42"));
        client.push_response("Only Car One\nOnly Car Two");

        let collector = Collector::new(client, paths.clone());
        assert!(collector.load_or_fetch_catalog().await.is_err());
        assert!(!paths.catalog_file.exists());
    }

    #[tokio::test]
    async fn test_failed_fetch_aborts() {
        let temp = tempfile::tempdir().unwrap();
        let client = Arc::new(MockChatClient::new("42"));
        client.push_error("503 Service Unavailable");

        let collector = Collector::new(client, test_paths(temp.path()));
        assert!(collector.load_or_fetch_catalog().await.is_err());
    }

    #[tokio::test]
    async fn test_collect_matrix_defaults_failed_cells_to_zero() {
        let temp = tempfile::tempdir().unwrap();
        let catalog = Catalog {
            kpis: vec!["Horsepower".to_string()],
            cars: vec!["Car A".to_string(), "Car B".to_string()],
        };

        let client = Arc::new(MockChatClient::new("200"));
        client.push_error("timeout");

        let collector = Collector::new(client, test_paths(temp.path()));
        let matrix = collector.collect_matrix(&catalog).await;

        assert_eq!(matrix.get("Car A", "Horsepower"), Some(KpiValue::Int(0)));
        assert_eq!(matrix.get("Car B", "Horsepower"), Some(KpiValue::Int(200)));
        assert_eq!(
            matrix.get(AVERAGE_KEY, "Horsepower"),
            Some(KpiValue::Int(100))
        );
    }

    #[tokio::test]
    async fn test_run_persists_matrix() {
        let temp = tempfile::tempdir().unwrap();
        let paths = test_paths(temp.path());

        let catalog = Catalog {
            kpis: vec!["Range (miles)".to_string()],
            cars: (0..EXPECTED_CARS).map(|i| format!("Car {}", i)).collect(),
        };
        catalog.save(&paths.catalog_file).unwrap();

        let client = Arc::new(MockChatClient::new("310"));
        let collector = Collector::new(client, paths.clone());
        collector.run().await.unwrap();

        let matrix = ValueMatrix::load(&paths.values_file).unwrap();
        assert_eq!(matrix.get("Car 0", "Range (miles)"), Some(KpiValue::Int(310)));
        assert_eq!(
            matrix.get(AVERAGE_KEY, "Range (miles)"),
            Some(KpiValue::Int(310))
        );
    }
}
