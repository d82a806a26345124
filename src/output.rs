//! Output formatting for chart series and the reading history.
//!
//! Supports plain log lines and JSON serialization.

use anyhow::Result;
use tracing::info;

use crate::charts::AggregatedPoint;
use crate::history::Page;
use crate::readings::MeterReading;

/// Formats one series point, e.g. `01/01: 15.00 m³`.
pub fn format_point(point: &AggregatedPoint, unit: &str) -> String {
    format!("{}: {:.2} {}", point.label, point.value, unit)
}

/// Logs a chart series, one line per point.
pub fn render_series(title: &str, unit: &str, points: &[AggregatedPoint]) {
    info!("{title}");
    if points.is_empty() {
        info!("Nenhuma medição encontrada");
        return;
    }
    for point in points {
        info!("{}", format_point(point, unit));
    }
}

/// Serializes a chart series as a JSON array of `{ "label", "value" }`.
pub fn series_json(points: &[AggregatedPoint]) -> Result<String> {
    Ok(serde_json::to_string_pretty(points)?)
}

/// Writes a chart series as JSON to stdout so it can be piped.
pub fn print_series_json(points: &[AggregatedPoint]) -> Result<()> {
    println!("{}", series_json(points)?);
    Ok(())
}

/// Formats one history row: category, unit, date, responsible, value.
pub fn format_history_row(reading: &MeterReading) -> String {
    format!(
        "{} | {} | {} | {} | {} {} | {}",
        reading.category,
        reading.unit,
        reading.date.format("%d/%m/%Y"),
        reading.responsible,
        reading.value,
        reading.category.unit(),
        reading.id,
    )
}

/// Logs a page of the history listing followed by its range footer.
pub fn render_history(page: &Page<&MeterReading>) {
    if page.total == 0 {
        info!("Nenhuma medição encontrada");
        return;
    }
    for reading in &page.items {
        info!("{}", format_history_row(reading));
    }
    info!("{}", page.footer());
}
