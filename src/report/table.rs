//! @ai:module:intent Validation and tabular layout for the Excel report
//! @ai:module:layer application
//! @ai:module:public_api validate, calculate_averages, ReportTable
//! @ai:module:stateless true

use crate::catalog::Catalog;
use crate::values::{ValueMatrix, AVERAGE_KEY};
use anyhow::Result;

/// @ai:intent Rectangular table: one row per car plus a trailing Average row
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    pub kpis: Vec<String>,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub car: String,
    pub values: Vec<f64>,
}

impl ReportTable {
    /// @ai:intent Number of rows excluding the trailing Average row
    /// @ai:effects pure
    pub fn car_row_count(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }
}

/// @ai:intent Validate the catalog against the value matrix
/// A declared car missing from the matrix is fatal; a missing KPI within a
/// present car only warns, since consumption defaults it to 0.
/// @ai:effects pure
pub fn validate(catalog: &Catalog, matrix: &ValueMatrix) -> Result<()> {
    if catalog.kpis.is_empty() {
        anyhow::bail!("KPI list is empty");
    }

    if catalog.cars.is_empty() {
        anyhow::bail!("Car list is empty");
    }

    for car in &catalog.cars {
        if !matrix.contains_car(car) {
            anyhow::bail!("Missing data for car '{}' in values file", car);
        }

        for kpi in &catalog.kpis {
            if matrix.get(car, kpi).is_none() {
                tracing::warn!(
                    "Missing KPI '{}' for car '{}'. Will use default value of 0.",
                    kpi,
                    car
                );
            }
        }
    }

    tracing::info!("Data validation passed");
    Ok(())
}

/// @ai:intent Per-KPI averages over all declared cars, missing cells as 0,
/// rounded to 2 decimals; independent of any Average row in the file
/// @ai:effects pure
pub fn calculate_averages(catalog: &Catalog, matrix: &ValueMatrix) -> Vec<f64> {
    catalog
        .kpis
        .iter()
        .map(|kpi| {
            if catalog.cars.is_empty() {
                return 0.0;
            }

            let sum: f64 = catalog
                .cars
                .iter()
                .map(|car| matrix.value_or_zero(car, kpi))
                .sum();
            let avg = sum / catalog.cars.len() as f64;

            (avg * 100.0).round() / 100.0
        })
        .collect()
}

/// @ai:intent Build the report table from catalog and matrix
/// @ai:effects pure
pub fn build(catalog: &Catalog, matrix: &ValueMatrix) -> ReportTable {
    let averages = calculate_averages(catalog, matrix);

    let mut rows: Vec<TableRow> = catalog
        .cars
        .iter()
        .map(|car| TableRow {
            car: car.clone(),
            values: catalog
                .kpis
                .iter()
                .map(|kpi| matrix.value_or_zero(car, kpi))
                .collect(),
        })
        .collect();

    rows.push(TableRow {
        car: AVERAGE_KEY.to_string(),
        values: averages,
    });

    ReportTable {
        kpis: catalog.kpis.clone(),
        rows,
    }
}
