//! Extension points the engine calls on a fixed cadence.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::grid::Grid;
use crate::io::export::export_consumption_csv;

use super::report::ConsumptionReport;

/// Policy invoked between ticks with read access to every microgrid.
///
/// Called after a tick whenever the advanced time is a multiple of the
/// coordination period. Intended to carry load balancing between microgrids.
pub trait Coordinator {
    /// Inspects the grid at `time`, the start of the next tick.
    fn coordinate(&mut self, time: u32, grid: &Grid);
}

/// Coordinator that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCoordinator;

impl Coordinator for NoopCoordinator {
    fn coordinate(&mut self, time: u32, grid: &Grid) {
        debug!(time, microgrids = grid.house_microgrids().len(), "coordination tick");
    }
}

/// Sink for periodic consumption reports.
///
/// Called before a tick whenever its start time is a multiple of the report period.
pub trait Reporter {
    /// Receives the summary and the per-household values it was computed from.
    fn report(&mut self, time: u32, report: &ConsumptionReport, consumption: &[f64]);
}

/// Emits each report as a structured `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&mut self, time: u32, report: &ConsumptionReport, _consumption: &[f64]) {
        info!(
            time,
            households = report.households,
            min = report.min,
            max = report.max,
            std_dev = report.std_dev,
            total = report.total,
            "consumption report"
        );
    }
}

/// Logs each report and writes the per-household values to `<dir>/<time>.csv`.
///
/// Write failures are logged and skipped; a missing snapshot never stops a run.
#[derive(Debug, Clone)]
pub struct SnapshotReporter {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl SnapshotReporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Snapshot files written so far, in order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl Reporter for SnapshotReporter {
    fn report(&mut self, time: u32, report: &ConsumptionReport, consumption: &[f64]) {
        LogReporter.report(time, report, consumption);

        if let Err(err) = fs::create_dir_all(&self.dir) {
            warn!(dir = %self.dir.display(), %err, "cannot create snapshot directory");
            return;
        }
        let path = self.dir.join(format!("{time}.csv"));
        match export_consumption_csv(consumption, &path) {
            Ok(()) => self.written.push(path),
            Err(err) => warn!(path = %path.display(), %err, "snapshot not written"),
        }
    }
}

/// Reporter chosen at runtime, dispatched without boxing.
#[derive(Debug, Clone)]
pub enum AnyReporter {
    Log(LogReporter),
    Snapshot(SnapshotReporter),
}

impl AnyReporter {
    /// Snapshot reporter when a directory is given, log reporter otherwise.
    pub fn from_snapshot_dir(dir: Option<&Path>) -> Self {
        match dir {
            Some(dir) => Self::Snapshot(SnapshotReporter::new(dir)),
            None => Self::Log(LogReporter),
        }
    }
}

impl Reporter for AnyReporter {
    fn report(&mut self, time: u32, report: &ConsumptionReport, consumption: &[f64]) {
        match self {
            Self::Log(r) => r.report(time, report, consumption),
            Self::Snapshot(r) => r.report(time, report, consumption),
        }
    }
}
