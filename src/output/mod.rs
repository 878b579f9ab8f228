//! Derived-file writers.
//!
//! Every output file is rendered fully in memory and persisted with a
//! single `fs::write`, so a failed run never leaves a half-written file.
//! Nothing here is called until every required input exists.

use std::fs;
use std::path::{Path, PathBuf};

use csv::Writer;
use serde::Serialize;
use tracing::info;

use crate::error::{PipelineError, Result};
use crate::models::{IntegratedRecord, RegionalSummary, SummaryMetric};

/// One row of `<state>_rental_data.csv`.
#[derive(Serialize)]
struct RentalRow<'a> {
    metro_area: &'a str,
    median_rent: f64,
    rent_yoy_change: Option<f64>,
}

/// Create the output directory if it does not exist.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    Ok(())
}

/// Write the one-row integrated dataset.
pub fn write_final_dataset(
    dir: &Path,
    prefix: &str,
    record: &IntegratedRecord,
) -> Result<PathBuf> {
    let path = dir.join(format!("{prefix}_housing_data_final.csv"));
    let bytes = csv_bytes(std::slice::from_ref(record), &path)?;
    write_whole(&path, &bytes)?;
    Ok(path)
}

/// Write the per-metro rental dataset.
pub fn write_rental_data(dir: &Path, prefix: &str, rentals: &RegionalSummary) -> Result<PathBuf> {
    let path = dir.join(format!("{prefix}_rental_data.csv"));
    let rows: Vec<RentalRow> = rentals
        .areas
        .iter()
        .map(|area| RentalRow {
            metro_area: &area.area_name,
            median_rent: area.current_value,
            rent_yoy_change: area.yoy_change_pct,
        })
        .collect();
    let bytes = csv_bytes(&rows, &path)?;
    write_whole(&path, &bytes)?;
    Ok(path)
}

/// Write the formatted summary statistics table.
pub fn write_summary_stats(dir: &Path, metrics: &[SummaryMetric]) -> Result<PathBuf> {
    let path = dir.join("summary_stats.csv");
    let bytes = csv_bytes(metrics, &path)?;
    write_whole(&path, &bytes)?;
    Ok(path)
}

/// Write the Markdown summary report.
pub fn write_report(dir: &Path, content: &str) -> Result<PathBuf> {
    let path = dir.join("summary_report.md");
    write_whole(&path, content.as_bytes())?;
    Ok(path)
}

/// Serialize rows into a complete CSV byte buffer.
fn csv_bytes<S: Serialize>(rows: &[S], path: &Path) -> Result<Vec<u8>> {
    let mut writer = Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row).map_err(|e| PipelineError::Csv {
            path: path.display().to_string(),
            source: e,
        })?;
    }
    writer
        .into_inner()
        .map_err(|e| PipelineError::Io(e.into_error()))
}

fn write_whole(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes)?;
    info!("saved {}", path.display());
    Ok(())
}
