//! @ai:module:intent Dashboard rendering: metrics, comparison and trend charts
//! @ai:module:layer application
//! @ai:module:public_api DashboardRenderer, KpiSummary, Callout

pub mod html;

use crate::catalog::Catalog;
use crate::config::PathConfig;
use crate::history::HistoricalData;
use crate::values::ValueMatrix;
use anyhow::{Context, Result};
use serde::Serialize;

/// @ai:intent Summary tile data for one KPI
#[derive(Debug, Clone, Serialize)]
pub struct KpiSummary {
    pub kpi: String,
    pub average: f64,
    /// Delta between the best car and the cross-car average.
    pub best_delta: f64,
}

/// @ai:intent Best/worst car call-out for one KPI
#[derive(Debug, Clone, Serialize)]
pub struct Callout {
    pub kpi: String,
    pub best_car: String,
    pub best_value: f64,
    pub worst_car: String,
    pub worst_value: f64,
}

/// Call-outs cover the first three KPIs only.
const CALLOUT_KPIS: usize = 3;

/// @ai:intent Build summary tiles, skipping KPIs with no recorded values
/// @ai:effects pure
pub fn kpi_summaries(matrix: &ValueMatrix, cars: &[String], kpis: &[String]) -> Vec<KpiSummary> {
    kpis.iter()
        .filter_map(|kpi| {
            let values: Vec<f64> = cars
                .iter()
                .filter_map(|car| matrix.get(car, kpi))
                .map(|v| v.as_f64())
                .collect();

            if values.is_empty() {
                return None;
            }

            let average = values.iter().sum::<f64>() / values.len() as f64;
            let max = values.iter().cloned().fold(f64::MIN, f64::max);

            Some(KpiSummary {
                kpi: kpi.clone(),
                average,
                best_delta: max - average,
            })
        })
        .collect()
}

/// @ai:intent Best/worst call-outs for the first three KPIs
/// Missing values compare as 0.
/// @ai:effects pure
pub fn callouts(matrix: &ValueMatrix, cars: &[String], kpis: &[String]) -> Vec<Callout> {
    if cars.is_empty() {
        return Vec::new();
    }

    kpis.iter()
        .take(CALLOUT_KPIS)
        .map(|kpi| {
            let best_car = cars
                .iter()
                .max_by(|a, b| {
                    matrix
                        .value_or_zero(a, kpi)
                        .total_cmp(&matrix.value_or_zero(b, kpi))
                })
                .expect("cars is non-empty");

            let worst_car = cars
                .iter()
                .min_by(|a, b| {
                    matrix
                        .value_or_zero(a, kpi)
                        .total_cmp(&matrix.value_or_zero(b, kpi))
                })
                .expect("cars is non-empty");

            Callout {
                kpi: kpi.clone(),
                best_car: best_car.clone(),
                best_value: matrix.value_or_zero(best_car, kpi),
                worst_car: worst_car.clone(),
                worst_value: matrix.value_or_zero(worst_car, kpi),
            }
        })
        .collect()
}

/// @ai:intent Renders the interactive HTML dashboard from the JSON files
pub struct DashboardRenderer {
    paths: PathConfig,
}

impl DashboardRenderer {
    /// @ai:intent Create a new dashboard renderer
    /// @ai:effects pure
    pub fn new(paths: PathConfig) -> Self {
        Self { paths }
    }

    /// @ai:intent Load the data files and write the dashboard HTML
    /// Catalog and value matrix are required; historical data is optional.
    /// @ai:effects fs:read, fs:write
    pub fn render(&self) -> Result<()> {
        let catalog = Catalog::load(&self.paths.catalog_file)?;
        let matrix = ValueMatrix::load(&self.paths.values_file)?;
        let history = HistoricalData::load_optional(&self.paths.historical_file)?;

        let page = html::render_page(&catalog, &matrix, history.as_ref())?;
        std::fs::write(&self.paths.dashboard_file, page).with_context(|| {
            format!(
                "Failed to write dashboard file: {}",
                self.paths.dashboard_file.display()
            )
        })?;

        tracing::info!("Dashboard written to {}", self.paths.dashboard_file.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::KpiValue;
    use pretty_assertions::assert_eq;

    fn sample() -> (ValueMatrix, Vec<String>, Vec<String>) {
        let cars = vec!["Car A".to_string(), "Car B".to_string(), "Car C".to_string()];
        let kpis = vec![
            "Horsepower".to_string(),
            "Range (miles)".to_string(),
            "Passenger Capacity".to_string(),
            "Cargo Space (cu ft)".to_string(),
        ];

        let mut matrix = ValueMatrix::new();
        matrix.insert("Car A", "Horsepower", KpiValue::Int(100));
        matrix.insert("Car B", "Horsepower", KpiValue::Int(300));
        matrix.insert("Car C", "Horsepower", KpiValue::Int(200));
        matrix.insert("Car A", "Range (miles)", KpiValue::Int(250));
        matrix.insert("Car B", "Range (miles)", KpiValue::Int(350));

        (matrix, cars, kpis)
    }

    #[test]
    fn test_summaries_average_and_delta() {
        let (matrix, cars, kpis) = sample();
        let summaries = kpi_summaries(&matrix, &cars, &kpis);

        let hp = summaries.iter().find(|s| s.kpi == "Horsepower").unwrap();
        assert!((hp.average - 200.0).abs() < f64::EPSILON);
        assert!((hp.best_delta - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_summaries_skip_empty_kpis() {
        let (matrix, cars, kpis) = sample();
        let summaries = kpi_summaries(&matrix, &cars, &kpis);

        assert_eq!(summaries.len(), 2);
        assert!(summaries.iter().all(|s| s.kpi != "Passenger Capacity"));
    }

    #[test]
    fn test_summaries_use_present_values_only() {
        let (matrix, cars, kpis) = sample();
        let summaries = kpi_summaries(&matrix, &cars, &kpis);

        // Car C has no range entry: mean over the two present values.
        let range = summaries.iter().find(|s| s.kpi == "Range (miles)").unwrap();
        assert!((range.average - 300.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_callouts_first_three_kpis() {
        let (matrix, cars, kpis) = sample();
        let callouts = callouts(&matrix, &cars, &kpis);

        assert_eq!(callouts.len(), 3);
        assert_eq!(callouts[0].best_car, "Car B");
        assert_eq!(callouts[0].worst_car, "Car A");
        assert_eq!(callouts[0].best_value, 300.0);
    }

    #[test]
    fn test_callouts_missing_values_compare_as_zero() {
        let (matrix, cars, kpis) = sample();
        let callouts = callouts(&matrix, &cars, &kpis);

        // Car C has no range entry, so it is the worst at 0.
        let range = callouts.iter().find(|c| c.kpi == "Range (miles)").unwrap();
        assert_eq!(range.worst_car, "Car C");
        assert_eq!(range.worst_value, 0.0);
    }

    #[test]
    fn test_callouts_empty_cars() {
        let matrix = ValueMatrix::new();
        assert!(callouts(&matrix, &[], &["Horsepower".to_string()]).is_empty());
    }

    #[test]
    fn test_render_fails_without_values_file() {
        let temp = tempfile::tempdir().unwrap();
        let paths = PathConfig {
            catalog_file: temp.path().join("car_kpi_data.json"),
            values_file: temp.path().join("car_kpi_values_2024.json"),
            historical_file: temp.path().join("car_historical_data.json"),
            report_file: temp.path().join("report.xlsx"),
            dashboard_file: temp.path().join("dashboard.html"),
        };

        let catalog = Catalog {
            kpis: vec!["Horsepower".to_string()],
            cars: vec!["Car A".to_string()],
        };
        catalog.save(&paths.catalog_file).unwrap();

        let renderer = DashboardRenderer::new(paths);
        assert!(renderer.render().is_err());
    }
}
