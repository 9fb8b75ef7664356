//! CSV and binary export for tick summaries, consumption snapshots, and meter logs.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::error::ExportError;
use crate::grid::Grid;
use crate::sim::types::TickSummary;

use super::records::{EventLog, HistoryLog};

/// Column header for per-tick telemetry.
const TELEMETRY_HEADER: &str = "time,local_loop_draws,own_battery_draws,shared_battery_draws,\
                                central_draws,shortfalls,central_level,total_consumed";

/// Column header for consumption snapshots.
const CONSUMPTION_HEADER: &str = "household,consumed";

/// Exports per-tick summaries to a CSV file at the given path.
///
/// Produces deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `ExportError` if file creation or writing fails.
pub fn export_telemetry_csv(summaries: &[TickSummary], path: &Path) -> Result<(), ExportError> {
    let file = File::create(path).map_err(ExportError::io(path))?;
    write_telemetry_csv(summaries, BufWriter::new(file))?;
    Ok(())
}

/// Writes per-tick summaries as CSV to any writer.
///
/// # Errors
///
/// Returns a `csv::Error` if writing fails.
pub fn write_telemetry_csv(summaries: &[TickSummary], writer: impl Write) -> csv::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(TELEMETRY_HEADER.split(',').map(str::trim))?;

    for s in summaries {
        wtr.write_record(&[
            s.time.to_string(),
            s.local_loop_draws.to_string(),
            s.own_battery_draws.to_string(),
            s.shared_battery_draws.to_string(),
            s.central_draws.to_string(),
            s.shortfalls.to_string(),
            format!("{:.4}", s.central_level),
            format!("{:.4}", s.total_consumed),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports per-household cumulative consumption to a CSV file.
///
/// # Errors
///
/// Returns an `ExportError` if file creation or writing fails.
pub fn export_consumption_csv(consumption: &[f64], path: &Path) -> Result<(), ExportError> {
    let file = File::create(path).map_err(ExportError::io(path))?;
    write_consumption_csv(consumption, BufWriter::new(file))?;
    Ok(())
}

/// Writes one `household,consumed` row per household, in grid order.
///
/// # Errors
///
/// Returns a `csv::Error` if writing fails.
pub fn write_consumption_csv(consumption: &[f64], writer: impl Write) -> csv::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(CONSUMPTION_HEADER.split(','))?;
    for (index, value) in consumption.iter().enumerate() {
        wtr.write_record(&[index.to_string(), format!("{value:.4}")])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Every history record in the grid, ordered by record id.
pub fn collect_history(grid: &Grid) -> Vec<&HistoryLog> {
    let mut logs: Vec<&HistoryLog> = grid
        .meters()
        .into_iter()
        .flat_map(|m| m.history_logs())
        .collect();
    logs.sort_by_key(|log| log.record_id);
    logs
}

/// Every event record in the grid, ordered by record id.
pub fn collect_events(grid: &Grid) -> Vec<&EventLog> {
    let mut logs: Vec<&EventLog> = grid
        .meters()
        .into_iter()
        .flat_map(|m| m.event_logs())
        .collect();
    logs.sort_by_key(|log| log.record_id);
    logs
}

/// Writes history records as CSV with a header derived from the record fields.
///
/// # Errors
///
/// Returns a `csv::Error` if writing fails.
pub fn write_history_csv(logs: &[&HistoryLog], writer: impl Write) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for log in logs {
        wtr.serialize(log)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes event records as CSV with a header derived from the record fields.
///
/// # Errors
///
/// Returns a `csv::Error` if writing fails.
pub fn write_events_csv(logs: &[&EventLog], writer: impl Write) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for log in logs {
        wtr.serialize(log)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes history records back to back in their 36-byte encoding.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_history_bin(logs: &[&HistoryLog], mut writer: impl Write) -> io::Result<()> {
    for log in logs {
        writer.write_all(&log.encode())?;
    }
    writer.flush()
}

/// Writes event records back to back in their 24-byte encoding.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_events_bin(logs: &[&EventLog], mut writer: impl Write) -> io::Result<()> {
    for log in logs {
        writer.write_all(&log.encode())?;
    }
    writer.flush()
}

/// Record counts written by [`export_logs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogExport {
    pub history: usize,
    pub events: usize,
}

/// Writes `history.csv`, `events.csv`, `history.bin`, and `events.bin` into `dir`.
///
/// Creates `dir` if needed.
///
/// # Errors
///
/// Returns an `ExportError` if the directory or any file cannot be written.
pub fn export_logs(grid: &Grid, dir: &Path) -> Result<LogExport, ExportError> {
    fs::create_dir_all(dir).map_err(ExportError::io(dir))?;
    let history = collect_history(grid);
    let events = collect_events(grid);

    let path = dir.join("history.csv");
    write_history_csv(&history, create(&path)?)?;

    let path = dir.join("events.csv");
    write_events_csv(&events, create(&path)?)?;

    let path = dir.join("history.bin");
    write_history_bin(&history, create(&path)?).map_err(ExportError::io(&path))?;

    let path = dir.join("events.bin");
    write_events_bin(&events, create(&path)?).map_err(ExportError::io(&path))?;

    tracing::info!(
        dir = %dir.display(),
        history = history.len(),
        events = events.len(),
        "meter logs exported"
    );
    Ok(LogExport {
        history: history.len(),
        events: events.len(),
    })
}

fn create(path: &Path) -> Result<BufWriter<File>, ExportError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(ExportError::io(path))
}
