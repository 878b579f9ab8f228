//! Wide-format dataset loading.
//!
//! The two index files share one layout: one row per region, a `RegionName`
//! identifier column, and one column per reporting month labeled with a
//! date-like string. `WideTable` keeps the cells as strings and exposes the
//! date columns pre-parsed and chronologically sorted, so the analysis
//! stages never touch raw CSV.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::ReaderBuilder;
use tracing::debug;

use crate::error::{PipelineError, Result};

/// Identifier column shared by both index datasets.
const REGION_COLUMN: &str = "RegionName";

/// Parse a column label as a reporting month.
///
/// Accepts `YYYY-MM-DD` (the index files label columns with the month's last
/// day) and bare `YYYY-MM`.
pub fn parse_month_label(label: &str) -> Option<NaiveDate> {
    let label = label.trim();
    if let Ok(date) = NaiveDate::parse_from_str(label, "%Y-%m-%d") {
        return Some(date);
    }
    // Bare year-month: anchor to the first of the month.
    if label.len() == 7 {
        if let Ok(date) = NaiveDate::parse_from_str(&format!("{label}-01"), "%Y-%m-%d") {
            return Some(date);
        }
    }
    None
}

/// A wide-format table: one row per region, one column per month.
#[derive(Debug, Clone)]
pub struct WideTable {
    /// Human label for diagnostics ("home value index", "rent index").
    name: String,
    headers: Vec<String>,
    region_col: usize,
    rows: Vec<Vec<String>>,
    /// (column index, parsed month), sorted ascending by month.
    date_cols: Vec<(usize, NaiveDate)>,
}

impl WideTable {
    /// Load a wide table from a CSV file.
    pub fn load(path: &Path, name: &str) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            PipelineError::Config(format!("cannot open {name} file {}: {e}", path.display()))
        })?;
        let table = Self::from_reader(file, name, &path.display().to_string())?;
        debug!(
            "loaded {} ({} rows, {} month columns)",
            name,
            table.rows.len(),
            table.date_cols.len()
        );
        Ok(table)
    }

    /// Build a wide table from any CSV source. `origin` names the source in
    /// errors (a path for files, a label in tests).
    pub fn from_reader<R: Read>(rdr: R, name: &str, origin: &str) -> Result<Self> {
        let mut reader = ReaderBuilder::new().flexible(true).from_reader(rdr);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| PipelineError::Csv {
                path: origin.to_string(),
                source: e,
            })?
            .iter()
            .map(str::to_string)
            .collect();

        let region_col = headers
            .iter()
            .position(|h| h == REGION_COLUMN)
            .ok_or_else(|| PipelineError::InvalidResponse {
                detail: format!("{name} has no {REGION_COLUMN} column"),
                payload_prefix: headers.join(","),
            })?;

        let mut date_cols: Vec<(usize, NaiveDate)> = headers
            .iter()
            .enumerate()
            .filter_map(|(idx, label)| parse_month_label(label).map(|month| (idx, month)))
            .collect();
        date_cols.sort_by_key(|&(_, month)| month);

        if date_cols.is_empty() {
            return Err(PipelineError::InvalidResponse {
                detail: format!("{name} has no date-labeled columns"),
                payload_prefix: headers.join(","),
            });
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| PipelineError::Csv {
                path: origin.to_string(),
                source: e,
            })?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self {
            name: name.to_string(),
            headers,
            region_col,
            rows,
            date_cols,
        })
    }

    /// Dataset label used in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    #[allow(dead_code)] // Diagnostics accessor
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[allow(dead_code)] // Companion to len()
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Date-labeled columns, ascending by month.
    pub fn date_columns(&self) -> &[(usize, NaiveDate)] {
        &self.date_cols
    }

    /// Distinct region names in input order.
    pub fn region_names(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.rows
            .iter()
            .filter_map(|row| row.get(self.region_col))
            .filter(|name| seen.insert(name.to_string()))
            .cloned()
            .collect()
    }

    /// Find the row for an exact region name.
    ///
    /// Fails with `NotFound` listing every region the table actually has.
    pub fn find_region(&self, region: &str) -> Result<&[String]> {
        self.rows
            .iter()
            .find(|row| row.get(self.region_col).map(String::as_str) == Some(region))
            .map(Vec::as_slice)
            .ok_or_else(|| PipelineError::NotFound {
                dataset: self.name.clone(),
                region: region.to_string(),
                available: self.region_names(),
            })
    }

    /// Iterate rows as (region name, full row).
    pub fn iter_rows(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.rows.iter().filter_map(|row| {
            row.get(self.region_col)
                .map(|name| (name.as_str(), row.as_slice()))
        })
    }

    /// Numeric value of one cell; empty or unparseable cells are missing.
    pub fn value(row: &[String], col: usize) -> Option<f64> {
        row.get(col)
            .map(|cell| cell.trim())
            .filter(|cell| !cell.is_empty())
            .and_then(|cell| cell.parse::<f64>().ok())
    }
}
