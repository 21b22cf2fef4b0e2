//! Writing a finished run to disk.
//!
//! The daily CSV carries the aggregate series (one row per recorded day). The JSON file carries
//! the whole [`RunResult`], grid snapshots included.

use std::ffi::OsStr;
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use csv::Writer;
use serde::{Deserialize, Serialize};

use crate::error::OutbreakError;
use crate::log::info;
use crate::simulation::RunResult;
use crate::snapshot::DailySnapshot;

/// One row of the daily series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReportRow {
    pub day: usize,
    pub uninfected: usize,
    pub prevalence: usize,
    pub incidence: usize,
    pub resistant: usize,
    pub reproduction: f64,
}

impl From<&DailySnapshot> for DailyReportRow {
    fn from(snapshot: &DailySnapshot) -> Self {
        DailyReportRow {
            day: snapshot.day_index,
            uninfected: snapshot.uninfected_count,
            prevalence: snapshot.infected_count,
            incidence: snapshot.newly_infected_count,
            resistant: snapshot.immune_count,
            reproduction: snapshot.reproduction_estimate,
        }
    }
}

// Creates the file and all parent directories if they do not exist.
fn create_with_parents(path: &Path) -> Result<File, OutbreakError> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    Ok(File::create(path)?)
}

// Checks that the path names a CSV file before creating it.
fn generate_validate_filepath(path: &Path) -> Result<File, OutbreakError> {
    match path.extension().and_then(OsStr::to_str) {
        Some("csv") => create_with_parents(path),
        _ => Err(OutbreakError::ReportError(format!(
            "daily reports must be CSV files, got {}",
            path.display()
        ))),
    }
}

/// Writes `day,uninfected,prevalence,incidence,resistant,reproduction`, one row per day.
///
/// # Errors
///
/// Returns [`OutbreakError::ReportError`] if `path` does not end in `.csv`, or an I/O or CSV
/// error if writing fails.
pub fn write_daily_csv(path: &Path, result: &RunResult) -> Result<(), OutbreakError> {
    let file = generate_validate_filepath(path)?;
    let mut writer = Writer::from_writer(file);
    for snapshot in &result.days {
        writer.serialize(DailyReportRow::from(snapshot))?;
    }
    writer.flush()?;
    info!("wrote {} days to {}", result.days.len(), path.display());
    Ok(())
}

/// Writes the full result as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if the file cannot be created or serialization fails.
pub fn write_run_json(path: &Path, result: &RunResult) -> Result<(), OutbreakError> {
    let file = create_with_parents(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, result)?;
    writer.flush()?;
    info!("wrote run result to {}", path.display());
    Ok(())
}
