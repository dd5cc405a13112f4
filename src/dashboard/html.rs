//! @ai:module:intent Self-contained HTML page for the dashboard
//! @ai:module:layer infrastructure
//! @ai:module:public_api render_page
//! @ai:module:stateless true

use crate::catalog::Catalog;
use crate::dashboard::{callouts, kpi_summaries, Callout, KpiSummary};
use crate::history::HistoricalData;
use crate::values::ValueMatrix;
use anyhow::Result;
use serde::Serialize;
use std::fmt::Write as FmtWrite;

/// @ai:intent Data embedded into the page for client-side chart redraws
#[derive(Serialize)]
struct Payload<'a> {
    kpis: &'a [String],
    cars: &'a [String],
    values: &'a ValueMatrix,
    history: Option<&'a HistoricalData>,
}

/// @ai:intent Render the complete dashboard page
/// @ai:effects pure
pub fn render_page(
    catalog: &Catalog,
    matrix: &ValueMatrix,
    history: Option<&HistoricalData>,
) -> Result<String> {
    let summaries = kpi_summaries(matrix, &catalog.cars, &catalog.kpis);
    let callouts = callouts(matrix, &catalog.cars, &catalog.kpis);

    let payload = serde_json::to_string(&Payload {
        kpis: &catalog.kpis,
        cars: &catalog.cars,
        values: matrix,
        history,
    })?;

    let kpi_options = catalog
        .kpis
        .iter()
        .map(|kpi| format!("<option value=\"{0}\">{0}</option>", escape(kpi)))
        .collect::<Vec<_>>()
        .join("\n                ");

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Car Performance Dashboard</title>
    <script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
    <style>
        body {{ font-family: sans-serif; margin: 0; background: #f5f6fa; color: #222; }}
        header {{ background: #1F4E78; color: white; padding: 1rem 2rem; }}
        main {{ padding: 1rem 2rem; }}
        .tiles {{ display: flex; gap: 1rem; flex-wrap: wrap; }}
        .tile {{ background: #1F4E78; color: white; border-radius: 0.5rem; padding: 1rem; min-width: 11rem; }}
        .tile h3 {{ margin: 0 0 0.5rem 0; font-size: 0.9rem; }}
        .tile .value {{ font-size: 1.6rem; font-weight: bold; }}
        .tile .delta {{ font-size: 0.8rem; opacity: 0.8; }}
        .chart-container {{ background: white; border-radius: 0.5rem; padding: 1rem; margin-top: 1.5rem; }}
        .callouts {{ display: flex; gap: 2rem; margin-top: 1.5rem; }}
        .callouts section {{ background: white; border-radius: 0.5rem; padding: 1rem; flex: 1; }}
        select {{ font-size: 1rem; padding: 0.3rem; }}
    </style>
</head>
<body>
    <header>
        <h1>Car Performance Dashboard</h1>
        <label>Select KPI to Display:
            <select id="kpi-select">
                {kpi_options}
            </select>
        </label>
    </header>
    <main>
        <h2>Key Performance Metrics</h2>
        <div class="tiles">
{tiles}
        </div>
        <div class="chart-container">
            <h2>Performance Comparison</h2>
            <canvas id="compare-chart" height="110"></canvas>
        </div>
        <div class="chart-container" id="trend-container" hidden>
            <h2>Trend Analysis</h2>
            <canvas id="trend-chart" height="110"></canvas>
        </div>
        <div class="callouts">
            <section>
                <h3>Top Performers</h3>
{best_items}
            </section>
            <section>
                <h3>Areas for Improvement</h3>
{worst_items}
            </section>
        </div>
    </main>
    <script>
    const DATA = {payload};
    const PALETTE = ['#4472C4', '#5B9BD5', '#ED7D31', '#70AD47', '#FFC000', '#7030A0', '#C00000'];
    let compareChart = null;
    let trendChart = null;

    function drawCompare(kpi) {{
        const labels = [];
        const values = [];
        for (const car of DATA.cars) {{
            const row = DATA.values[car];
            if (row && kpi in row) {{
                labels.push(car);
                values.push(row[kpi]);
            }}
        }}
        if (compareChart) compareChart.destroy();
        compareChart = new Chart(document.getElementById('compare-chart'), {{
            type: 'bar',
            data: {{
                labels: labels,
                datasets: [{{
                    label: kpi,
                    data: values,
                    backgroundColor: labels.map((_, i) => PALETTE[i % PALETTE.length])
                }}]
            }},
            options: {{ plugins: {{ title: {{ display: true, text: kpi + ' Comparison' }} }} }}
        }});
    }}

    function drawTrend(kpi) {{
        const container = document.getElementById('trend-container');
        if (!DATA.history || !DATA.history.years) {{
            container.hidden = true;
            return;
        }}
        const datasets = [];
        for (const car of DATA.cars) {{
            const series = DATA.history.cars[car];
            if (series && kpi in series) {{
                datasets.push({{
                    label: car,
                    data: series[kpi],
                    borderColor: PALETTE[datasets.length % PALETTE.length],
                    fill: false
                }});
            }}
        }}
        if (datasets.length === 0) {{
            container.hidden = true;
            return;
        }}
        container.hidden = false;
        if (trendChart) trendChart.destroy();
        trendChart = new Chart(document.getElementById('trend-chart'), {{
            type: 'line',
            data: {{ labels: DATA.history.years, datasets: datasets }},
            options: {{ plugins: {{ title: {{ display: true, text: kpi + ' Trend Over Time' }} }} }}
        }});
    }}

    function redraw(kpi) {{
        drawCompare(kpi);
        drawTrend(kpi);
    }}

    const select = document.getElementById('kpi-select');
    select.addEventListener('change', () => redraw(select.value));
    if (DATA.kpis.length > 0) redraw(DATA.kpis[0]);
    </script>
</body>
</html>
"#,
        kpi_options = kpi_options,
        tiles = render_tiles(&summaries),
        best_items = render_best(&callouts),
        worst_items = render_worst(&callouts),
        payload = payload,
    ))
}

/// @ai:intent Render the per-KPI summary tiles
/// @ai:effects pure
fn render_tiles(summaries: &[KpiSummary]) -> String {
    let mut output = String::new();

    for summary in summaries {
        writeln!(
            output,
            "            <div class=\"tile\"><h3>{}</h3><div class=\"value\">{:.1}</div><div class=\"delta\">{:.1} (Best)</div></div>",
            escape(&summary.kpi),
            summary.average,
            summary.best_delta
        )
        .unwrap();
    }

    output
}

/// @ai:intent Render the best-car call-out list
/// @ai:effects pure
fn render_best(callouts: &[Callout]) -> String {
    let mut output = String::new();

    for callout in callouts {
        writeln!(
            output,
            "                <p><strong>{}</strong>: {} ({})</p>",
            escape(&callout.kpi),
            escape(&callout.best_car),
            callout.best_value
        )
        .unwrap();
    }

    output
}

/// @ai:intent Render the worst-car call-out list
/// @ai:effects pure
fn render_worst(callouts: &[Callout]) -> String {
    let mut output = String::new();

    for callout in callouts {
        writeln!(
            output,
            "                <p><strong>{}</strong>: {} ({})</p>",
            escape(&callout.kpi),
            escape(&callout.worst_car),
            callout.worst_value
        )
        .unwrap();
    }

    output
}

/// @ai:intent Minimal HTML escaping for interpolated names
/// @ai:effects pure
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::KpiValue;

    fn sample_catalog() -> Catalog {
        Catalog {
            kpis: vec!["Horsepower".to_string(), "Range (miles)".to_string()],
            cars: vec!["Car A".to_string(), "Car B".to_string()],
        }
    }

    fn sample_matrix() -> ValueMatrix {
        let mut matrix = ValueMatrix::new();
        matrix.insert("Car A", "Horsepower", KpiValue::Int(100));
        matrix.insert("Car B", "Horsepower", KpiValue::Int(300));
        matrix.insert("Car A", "Range (miles)", KpiValue::Int(250));
        matrix.insert("Car B", "Range (miles)", KpiValue::Float(320.5));
        matrix
    }

    #[test]
    fn test_page_embeds_data_and_options() {
        let page = render_page(&sample_catalog(), &sample_matrix(), None).unwrap();

        assert!(page.contains("<option value=\"Horsepower\">"));
        assert!(page.contains("\"Car A\""));
        assert!(page.contains("320.5"));
        assert!(page.contains("chart.js"));
    }

    #[test]
    fn test_page_includes_tiles_and_callouts() {
        let page = render_page(&sample_catalog(), &sample_matrix(), None).unwrap();

        // Horsepower tile: average 200.0, best delta 100.0.
        assert!(page.contains("<div class=\"value\">200.0</div>"));
        assert!(page.contains("Top Performers"));
        assert!(page.contains("<strong>Horsepower</strong>: Car B (300)"));
    }

    #[test]
    fn test_page_embeds_history_when_present() {
        let history: HistoricalData = serde_json::from_str(
            r#"{"years": [2023, 2024], "cars": {"Car A": {"Horsepower": [95, 100]}}}"#,
        )
        .unwrap();

        let page = render_page(&sample_catalog(), &sample_matrix(), Some(&history)).unwrap();
        assert!(page.contains("\"years\":[2023,2024]"));

        let page = render_page(&sample_catalog(), &sample_matrix(), None).unwrap();
        assert!(page.contains("\"history\":null"));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("A & B <C>"), "A &amp; B &lt;C&gt;");
    }
}
