//! @ai:module:intent Excel report generation pipeline
//! @ai:module:layer application
//! @ai:module:public_api ReportGenerator, ExcelReporter

pub mod excel;
pub mod table;

pub use excel::ExcelReporter;
pub use table::{build, calculate_averages, validate, ReportTable, TableRow};

use crate::catalog::Catalog;
use crate::config::PathConfig;
use crate::values::ValueMatrix;
use anyhow::Result;

/// @ai:intent Loads the JSON files, validates them and writes the workbook
pub struct ReportGenerator {
    paths: PathConfig,
    excel: ExcelReporter,
}

impl ReportGenerator {
    /// @ai:intent Create a new report generator
    /// @ai:effects pure
    pub fn new(paths: PathConfig) -> Self {
        Self {
            paths,
            excel: ExcelReporter::new(),
        }
    }

    /// @ai:intent Run the full export: load, validate, build, write
    /// @ai:effects fs:read, fs:write
    pub fn run(&self) -> Result<()> {
        let catalog = Catalog::load(&self.paths.catalog_file)?;
        let matrix = ValueMatrix::load(&self.paths.values_file)?;

        tracing::info!(
            "Processing {} KPIs for {} cars",
            catalog.kpis.len(),
            catalog.cars.len()
        );

        table::validate(&catalog, &matrix)?;

        let report_table = table::build(&catalog, &matrix);
        self.excel.generate(&report_table, &self.paths.report_file)?;

        tracing::info!(
            "Successfully created Excel report: {}",
            self.paths.report_file.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::KpiValue;

    fn test_paths(dir: &std::path::Path) -> PathConfig {
        PathConfig {
            catalog_file: dir.join("car_kpi_data.json"),
            values_file: dir.join("car_kpi_values_2024.json"),
            historical_file: dir.join("car_historical_data.json"),
            report_file: dir.join("car_kpi_report_2024.xlsx"),
            dashboard_file: dir.join("dashboard.html"),
        }
    }

    fn write_inputs(paths: &PathConfig, cars: &[&str]) {
        let catalog = Catalog {
            kpis: vec!["Horsepower".to_string()],
            cars: cars.iter().map(|c| c.to_string()).collect(),
        };
        catalog.save(&paths.catalog_file).unwrap();

        let mut matrix = ValueMatrix::new();
        matrix.insert("Car A", "Horsepower", KpiValue::Int(100));
        matrix.insert("Car B", "Horsepower", KpiValue::Int(200));
        matrix.save(&paths.values_file).unwrap();
    }

    #[test]
    fn test_run_writes_report() {
        let temp = tempfile::tempdir().unwrap();
        let paths = test_paths(temp.path());
        write_inputs(&paths, &["Car A", "Car B"]);

        ReportGenerator::new(paths.clone()).run().unwrap();
        assert!(paths.report_file.exists());
    }

    #[test]
    fn test_run_fails_on_missing_car() {
        let temp = tempfile::tempdir().unwrap();
        let paths = test_paths(temp.path());
        write_inputs(&paths, &["Car A", "Car B", "Car Missing"]);

        assert!(ReportGenerator::new(paths.clone()).run().is_err());
        assert!(!paths.report_file.exists());
    }

    #[test]
    fn test_run_fails_on_missing_input_file() {
        let temp = tempfile::tempdir().unwrap();
        let paths = test_paths(temp.path());

        assert!(ReportGenerator::new(paths).run().is_err());
    }
}
