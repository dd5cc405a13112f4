//! @ai:module:intent Excel workbook generation: styled table, charts, dashboard
//! @ai:module:layer infrastructure
//! @ai:module:public_api ExcelReporter
//! @ai:module:stateless true

use crate::report::table::ReportTable;
use anyhow::Result;
use rust_xlsxwriter::{
    Chart, ChartDataLabel, ChartFormat, ChartSolidFill, ChartType, Color, Format, FormatAlign,
    FormatBorder, Table, TableColumn, TableStyle, Url, Workbook,
};
use std::path::Path;

const MAIN_SHEET: &str = "Car KPIs";
const DASHBOARD_SHEET: &str = "Dashboard";
const TABLE_NAME: &str = "CarKPITable";
const HEADER_COLOR: u32 = 0x1F4E78;
const AVERAGE_ROW_COLOR: u32 = 0xD9D9D9;
const CHART_COLORS: [&str; 7] = [
    "#4472C4", "#5B9BD5", "#ED7D31", "#70AD47", "#FFC000", "#7030A0", "#C00000",
];

/// Excel caps worksheet names at 31 characters.
const MAX_SHEET_NAME: usize = 31;

/// @ai:intent Writes the formatted workbook from a report table
pub struct ExcelReporter;

impl ExcelReporter {
    /// @ai:intent Create a new Excel reporter
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }

    /// @ai:intent Build and save the complete workbook in one pass
    /// @ai:effects fs:write
    pub fn generate(&self, table: &ReportTable, output_path: &Path) -> Result<()> {
        let mut workbook = Workbook::new();

        // Created first so it leads the sheet tabs; filled after the charts
        // below have something to reference.
        workbook.add_worksheet().set_name(DASHBOARD_SHEET)?;

        self.write_main_sheet(&mut workbook, table)?;

        let kpi_sheets = self.write_kpi_chart_sheets(&mut workbook, table)?;
        self.write_dashboard_sheet(&mut workbook, table, &kpi_sheets)?;

        workbook.save(output_path)?;
        tracing::info!("Excel report saved to {}", output_path.display());
        Ok(())
    }

    /// @ai:intent Write the data sheet: styled header, borders, average row,
    /// sized columns and the named table range
    /// @ai:effects state:write
    fn write_main_sheet(&self, workbook: &mut Workbook, table: &ReportTable) -> Result<()> {
        let worksheet = workbook.add_worksheet().set_name(MAIN_SHEET)?;

        let header_format = Format::new()
            .set_bold()
            .set_font_color(Color::White)
            .set_background_color(Color::RGB(HEADER_COLOR))
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin);

        let cell_format = Format::new().set_border(FormatBorder::Thin);

        let average_format = Format::new()
            .set_bold()
            .set_background_color(Color::RGB(AVERAGE_ROW_COLOR))
            .set_border(FormatBorder::Thin);

        worksheet.write_string_with_format(0, 0, "Car", &header_format)?;
        for (col, kpi) in table.kpis.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16 + 1, kpi, &header_format)?;
        }

        let last_row = table.rows.len() as u32;
        for (i, row) in table.rows.iter().enumerate() {
            let row_num = i as u32 + 1;
            let format = if row_num == last_row {
                &average_format
            } else {
                &cell_format
            };

            worksheet.write_string_with_format(row_num, 0, &row.car, format)?;
            for (col, value) in row.values.iter().enumerate() {
                worksheet.write_number_with_format(row_num, col as u16 + 1, *value, format)?;
            }
        }

        for (col, width) in column_widths(table).into_iter().enumerate() {
            worksheet.set_column_width(col as u16, width)?;
        }

        let columns: Vec<TableColumn> = std::iter::once("Car")
            .chain(table.kpis.iter().map(String::as_str))
            .map(|header| TableColumn::new().set_header(header))
            .collect();

        let excel_table = Table::new()
            .set_name(TABLE_NAME)
            .set_style(TableStyle::Medium9)
            .set_banded_rows(true)
            .set_banded_columns(false)
            .set_columns(&columns);

        worksheet.add_table(0, 0, last_row, table.kpis.len() as u16, &excel_table)?;

        tracing::info!("Applied formatting to main worksheet");
        Ok(())
    }

    /// @ai:intent One bar-chart sheet per KPI; duplicate sheet names collapse
    /// Returns the (kpi, sheet name) pairs actually created.
    /// @ai:effects state:write
    fn write_kpi_chart_sheets(
        &self,
        workbook: &mut Workbook,
        table: &ReportTable,
    ) -> Result<Vec<(String, String)>> {
        let title_format = Format::new().set_bold().set_font_size(14);
        let mut created: Vec<(String, String)> = Vec::new();

        for (i, kpi) in table.kpis.iter().enumerate() {
            let name = sheet_name_for(kpi);

            if created.iter().any(|(_, existing)| *existing == name) {
                tracing::warn!("Duplicate sheet name '{}', skipping chart for {}", name, kpi);
                continue;
            }

            let worksheet = workbook.add_worksheet().set_name(&name)?;
            worksheet.write_string_with_format(
                0,
                0,
                &format!("{} Performance Comparison", kpi),
                &title_format,
            )?;

            let mut chart = build_kpi_chart(table, i, CHART_COLORS[(i + 1) % CHART_COLORS.len()]);
            chart
                .title()
                .set_name(&format!("{} by Car Model (2024)", kpi));
            chart.x_axis().set_name("Car Model");
            chart.y_axis().set_name(kpi);
            chart.set_width(960).set_height(576);

            worksheet.insert_chart(1, 1, &chart)?;

            created.push((kpi.clone(), name));
            tracing::info!("Created chart sheet for KPI: {}", kpi);
        }

        Ok(created)
    }

    /// @ai:intent Leading dashboard sheet: title, date, mini-chart grid and
    /// hyperlinks to each KPI sheet
    /// @ai:effects state:write
    fn write_dashboard_sheet(
        &self,
        workbook: &mut Workbook,
        table: &ReportTable,
        kpi_sheets: &[(String, String)],
    ) -> Result<()> {
        const CHARTS_PER_ROW: usize = 2;
        const GRID_ROW_STEP: u32 = 16;
        const GRID_COL_STEP: u16 = 8;

        let title_format = Format::new().set_bold().set_font_size(16);
        let date_format = Format::new().set_italic();
        let bold_format = Format::new().set_bold();

        let worksheet = workbook.worksheet_from_name(DASHBOARD_SHEET)?;

        worksheet.write_string_with_format(0, 0, "CAR PERFORMANCE DASHBOARD", &title_format)?;
        worksheet.write_string_with_format(
            1,
            0,
            &format!("Generated on {}", chrono::Local::now().format("%Y-%m-%d")),
            &date_format,
        )?;

        for (i, kpi) in table.kpis.iter().enumerate() {
            let row = 3 + (i / CHARTS_PER_ROW) as u32 * GRID_ROW_STEP;
            let col = (i % CHARTS_PER_ROW) as u16 * GRID_COL_STEP;

            let mut chart = build_kpi_chart(table, i, CHART_COLORS[i % CHART_COLORS.len()]);
            chart.title().set_name(kpi);
            chart.set_width(480).set_height(288);

            worksheet.insert_chart(row, col, &chart)?;
        }

        let grid_rows = table.kpis.len().div_ceil(CHARTS_PER_ROW) as u32;
        let link_row = 3 + grid_rows * GRID_ROW_STEP + 2;

        worksheet.write_string_with_format(link_row, 0, "Detailed KPI Charts:", &bold_format)?;

        for (i, (kpi, sheet)) in kpi_sheets.iter().enumerate() {
            let url = Url::new(format!("internal:'{}'!A1", sheet)).set_text(kpi);
            worksheet.write_url(link_row + 1 + i as u32, 0, url)?;
        }

        tracing::info!("Created dashboard sheet with summary charts");
        Ok(())
    }
}

impl Default for ExcelReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// @ai:intent Bar chart over one KPI column, Average row excluded
/// @ai:effects pure
fn build_kpi_chart(table: &ReportTable, kpi_index: usize, color: &str) -> Chart {
    // Row 0 is the header; car rows run to car_row_count.
    let last_car_row = table.car_row_count() as u32;
    let value_col = kpi_index as u16 + 1;

    let mut chart = Chart::new(ChartType::Column);
    chart.legend().set_hidden();

    chart
        .add_series()
        .set_categories((MAIN_SHEET, 1, 0, last_car_row, 0))
        .set_values((MAIN_SHEET, 1, value_col, last_car_row, value_col))
        .set_format(ChartFormat::new().set_solid_fill(ChartSolidFill::new().set_color(color)))
        .set_data_label(ChartDataLabel::new().show_value());

    chart
}

/// @ai:intent Worksheet name for a KPI: spaces to underscores, 31-char cap
/// @ai:effects pure
fn sheet_name_for(kpi: &str) -> String {
    kpi.replace(' ', "_").chars().take(MAX_SHEET_NAME).collect()
}

/// @ai:intent Column widths sized to the longest cell plus padding
/// @ai:effects pure
fn column_widths(table: &ReportTable) -> Vec<f64> {
    const PADDING: usize = 4;

    let mut widths = Vec::with_capacity(table.kpis.len() + 1);

    let car_width = std::iter::once("Car".len())
        .chain(table.rows.iter().map(|row| row.car.len()))
        .max()
        .unwrap_or(0);
    widths.push((car_width + PADDING) as f64);

    for (i, kpi) in table.kpis.iter().enumerate() {
        let width = std::iter::once(kpi.len())
            .chain(
                table
                    .rows
                    .iter()
                    .map(|row| format!("{}", row.values[i]).len()),
            )
            .max()
            .unwrap_or(0);
        widths.push((width + PADDING) as f64);
    }

    widths
}
