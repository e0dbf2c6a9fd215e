// CSV export use case
use crate::domain::history::TimeRange;
use crate::domain::reading::{Parameter, Reading};
use crate::domain::timefmt;
use chrono::NaiveDate;
use thiserror::Error;

pub const CSV_MIME: &str = "text/csv;charset=utf-8";

/// All-parameters export columns, in header order.
const ALL_COLUMNS: [&str; 5] = ["timestamp", "pH", "TDS", "Temperature", "Condition"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExportError {
    /// Export attempted with nothing to export; callers skip the download
    /// instead of producing a header-only file.
    #[error("export attempted with an empty series")]
    EmptySeries,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvDownload {
    pub filename: String,
    pub content: String,
}

/// Render a series as CSV. The first line is the comma-joined header; each
/// following line is one series entry in series order (the generator's
/// oldest-first ordering is preserved, not re-sorted).
pub fn serialize(series: &[Reading], columns: &[&str]) -> String {
    let mut lines = Vec::with_capacity(series.len() + 1);
    lines.push(columns.join(","));

    for reading in series {
        let row: Vec<String> = columns
            .iter()
            .map(|column| escape(cell(reading, column)))
            .collect();
        lines.push(row.join(","));
    }

    lines.join("\n")
}

/// Export one parameter's series with `timestamp,<parameter>` columns.
pub fn single_parameter_csv(
    series: &[Reading],
    parameter: Parameter,
    range: TimeRange,
    today: NaiveDate,
) -> Result<CsvDownload, ExportError> {
    if series.is_empty() {
        return Err(ExportError::EmptySeries);
    }

    let columns = ["timestamp", parameter.wire_name()];
    Ok(CsvDownload {
        filename: filename(parameter.wire_name(), range, today),
        content: serialize(series, &columns),
    })
}

/// Export the full series with every parameter and the coarse condition.
pub fn all_parameters_csv(
    series: &[Reading],
    range: TimeRange,
    today: NaiveDate,
) -> Result<CsvDownload, ExportError> {
    if series.is_empty() {
        return Err(ExportError::EmptySeries);
    }

    Ok(CsvDownload {
        filename: filename("all_parameters", range, today),
        content: serialize(series, &ALL_COLUMNS),
    })
}

fn cell(reading: &Reading, column: &str) -> String {
    match column {
        // Timestamp cells use the shared formatter's long form, never the
        // bucket label and never the raw ISO string.
        "timestamp" => timefmt::locale_long(reading.captured_at),
        "Condition" => reading.condition.as_str().to_string(),
        name => match Parameter::from_wire_name(name) {
            Some(parameter) => reading.value(parameter).to_string(),
            // Absent fields render empty, never "undefined" or "null".
            None => String::new(),
        },
    }
}

/// Values containing a comma are wrapped in double quotes. Embedded double
/// quotes are not escaped further; known limitation.
fn escape(value: String) -> String {
    if value.contains(',') {
        format!("\"{}\"", value)
    } else {
        value
    }
}

fn filename(parameter: &str, range: TimeRange, today: NaiveDate) -> String {
    format!(
        "clearwater_{}_{}_{}.csv",
        parameter.to_lowercase(),
        range.as_str(),
        today.format("%Y-%m-%d")
    )
}
