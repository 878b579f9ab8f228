//! Time-series normalization.
//!
//! Turns one region's row of a wide table into a chronologically ordered
//! series, and derives the latest value's trailing year-over-year change.

use crate::dataset::WideTable;
use crate::error::{PipelineError, Result};
use crate::models::{yoy_change_pct, IndexSnapshot, TimeSeriesPoint};

/// Trailing window between a month and the same month one year earlier:
/// 13 periods, endpoints inclusive.
pub const YEAR_WINDOW: usize = 13;

/// Align one region's wide row into a sorted chronological series.
///
/// Cells that are empty or non-numeric are treated as missing and skipped;
/// duplicate months keep the first occurrence. Fails with `NotFound` (listing
/// the table's region names) when the region has no row.
pub fn normalize_region_series(table: &WideTable, region: &str) -> Result<Vec<TimeSeriesPoint>> {
    let row = table.find_region(region)?;

    let mut points: Vec<TimeSeriesPoint> = table
        .date_columns()
        .iter()
        .filter_map(|&(col, month)| {
            WideTable::value(row, col).map(|value| TimeSeriesPoint { month, value })
        })
        .collect();

    points.sort_by_key(|p| p.month);
    points.dedup_by_key(|p| p.month);

    Ok(points)
}

/// Latest point of a series plus its year-over-year change.
///
/// YoY is the change against the value 12 periods before the last entry
/// (index `len - 13`). Fewer than 13 points, or a zero year-ago value,
/// leaves YoY undefined — never zero.
pub fn latest_snapshot(series: &[TimeSeriesPoint]) -> Result<IndexSnapshot> {
    let latest = *series
        .last()
        .ok_or(PipelineError::IncompleteInput("latest index value"))?;

    let year_ago = if series.len() >= YEAR_WINDOW {
        Some(series[series.len() - YEAR_WINDOW].value)
    } else {
        None
    };

    Ok(IndexSnapshot {
        latest,
        yoy_change_pct: yoy_change_pct(latest.value, year_ago),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn month(year: i32, month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, 28).unwrap()
    }

    fn series_of(values: &[f64]) -> Vec<TimeSeriesPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| TimeSeriesPoint {
                month: month(2023, 1) + chrono::Months::new(i as u32),
                value,
            })
            .collect()
    }

    fn wide_table(header_months: &str, row: &str) -> WideTable {
        let csv = format!("RegionName,{header_months}\n{row}\n");
        WideTable::from_reader(csv.as_bytes(), "home value index", "test").unwrap()
    }

    #[test]
    fn test_series_is_ascending_without_duplicates() {
        // Columns deliberately out of order in the header.
        let table = wide_table(
            "2024-03-31,2024-01-31,2024-02-29",
            "California,3.0,1.0,2.0",
        );
        let series = normalize_region_series(&table, "California").unwrap();

        let months: Vec<_> = series.iter().map(|p| p.month).collect();
        let mut sorted = months.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(months, sorted);
        assert_eq!(
            series.iter().map(|p| p.value).collect::<Vec<_>>(),
            vec![1.0, 2.0, 3.0]
        );
    }

    #[test]
    fn test_missing_cells_are_skipped() {
        let table = wide_table("2024-01-31,2024-02-29,2024-03-31", "California,1.0,,3.0");
        let series = normalize_region_series(&table, "California").unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[1].value, 3.0);
    }

    #[test]
    fn test_missing_region_lists_available_names() {
        let table = wide_table("2024-01-31", "California,1.0");
        let err = normalize_region_series(&table, "Oregon").unwrap_err();
        match err {
            PipelineError::NotFound { available, .. } => {
                assert_eq!(available, vec!["California"]);
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_yoy_defined_with_thirteen_points() {
        let mut values = vec![100.0; 12];
        values.push(103.7);
        let snapshot = latest_snapshot(&series_of(&values)).unwrap();

        assert_eq!(snapshot.latest.value, 103.7);
        let yoy = snapshot.yoy_change_pct.unwrap();
        assert!((yoy - 3.7).abs() < 1e-9);
    }

    #[test]
    fn test_yoy_undefined_with_twelve_points() {
        let values = vec![100.0; 12];
        let snapshot = latest_snapshot(&series_of(&values)).unwrap();
        assert_eq!(snapshot.yoy_change_pct, None);
    }

    #[test]
    fn test_yoy_undefined_for_zero_year_ago() {
        let mut values = vec![0.0];
        values.extend(vec![100.0; 12]);
        let snapshot = latest_snapshot(&series_of(&values)).unwrap();
        assert_eq!(snapshot.yoy_change_pct, None);
    }

    #[test]
    fn test_empty_series_is_incomplete_input() {
        let err = latest_snapshot(&[]).unwrap_err();
        assert!(matches!(err, PipelineError::IncompleteInput(_)));
    }
}
