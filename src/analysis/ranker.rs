//! Regional filtering and ranking.
//!
//! Restricts a national per-area table to one state's areas, computes each
//! area's current value and year-over-year change, and ranks by value.
//!
//! YoY policy: an area's change is defined only when at least 13
//! chronological periods exist and the year-ago value is present and
//! non-zero. There is no fallback baseline; insufficient history means
//! undefined, on every call path.

use tracing::debug;

use crate::analysis::normalizer::YEAR_WINDOW;
use crate::dataset::WideTable;
use crate::error::{PipelineError, Result};
use crate::models::{AreaObservation, RegionalSummary};

/// Filter a national table down to areas matching `qualifier` (a state
/// suffix such as `", CA"`) and summarize them.
///
/// Matching is a case-sensitive substring test; matched names have the
/// qualifier stripped for display. Fails with `NoData` (listing the distinct
/// suffixes actually present) when nothing matches.
pub fn summarize_region_areas(table: &WideTable, qualifier: &str) -> Result<RegionalSummary> {
    let matched: Vec<(&str, &[String])> = table
        .iter_rows()
        .filter(|(name, _)| name.contains(qualifier))
        .collect();

    if matched.is_empty() {
        return Err(PipelineError::NoData {
            dataset: table.name().to_string(),
            qualifier: qualifier.to_string(),
            suffixes: distinct_suffixes(table),
        });
    }

    let date_cols = table.date_columns();
    let &(latest_col, as_of) = date_cols
        .last()
        .ok_or(PipelineError::IncompleteInput("latest reporting period"))?;
    let year_ago_col = if date_cols.len() >= YEAR_WINDOW {
        Some(date_cols[date_cols.len() - YEAR_WINDOW].0)
    } else {
        None
    };

    let mut areas: Vec<AreaObservation> = Vec::with_capacity(matched.len());
    for (name, row) in matched {
        let Some(current) = WideTable::value(row, latest_col) else {
            debug!("skipping {name}: no value for the latest period");
            continue;
        };
        let year_ago = year_ago_col.and_then(|col| WideTable::value(row, col));
        areas.push(AreaObservation::new(
            name.replace(qualifier, ""),
            current,
            year_ago,
        ));
    }

    if areas.is_empty() {
        return Err(PipelineError::IncompleteInput("regional area values"));
    }

    // Stable sort: ties keep input order.
    areas.sort_by(|a, b| {
        b.current_value
            .partial_cmp(&a.current_value)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mean_value = areas.iter().map(|a| a.current_value).sum::<f64>() / areas.len() as f64;

    let yoy_changes: Vec<f64> = areas.iter().filter_map(|a| a.yoy_change_pct).collect();
    let mean_yoy_change = if yoy_changes.is_empty() {
        None
    } else {
        Some(yoy_changes.iter().sum::<f64>() / yoy_changes.len() as f64)
    };

    // Max is the head of the ranking; for min, take the first area in rank
    // order carrying the minimum so ties resolve the same way as max.
    let max_observation = areas[0].clone();
    let min_value = areas
        .iter()
        .map(|a| a.current_value)
        .fold(f64::INFINITY, f64::min);
    let min_observation = areas
        .iter()
        .find(|a| a.current_value == min_value)
        .cloned()
        .ok_or(PipelineError::IncompleteInput("minimum area value"))?;

    Ok(RegionalSummary {
        areas,
        as_of,
        mean_value,
        mean_yoy_change,
        max_observation,
        min_observation,
    })
}

/// Distinct `", XX"` suffixes present in the table, for `NoData` diagnostics.
fn distinct_suffixes(table: &WideTable) -> Vec<String> {
    let mut suffixes: Vec<String> = table
        .iter_rows()
        .filter_map(|(name, _)| name.rfind(", ").map(|idx| name[idx..].to_string()))
        .collect();
    suffixes.sort();
    suffixes.dedup();
    suffixes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rent_table(body: &str) -> WideTable {
        let csv = format!("RegionID,RegionName,2023-10-31,2024-09-30,2024-10-31\n{body}");
        WideTable::from_reader(csv.as_bytes(), "rent index", "test").unwrap()
    }

    #[test]
    fn test_filter_is_pure_substring_match() {
        let table = rent_table(
            "1,\"Fresno, CA\",1500.0,1540.0,1550.0\n\
             2,\"Fresno, TX\",1200.0,1210.0,1220.0\n",
        );
        let summary = summarize_region_areas(&table, ", CA").unwrap();

        assert_eq!(summary.areas.len(), 1);
        assert_eq!(summary.areas[0].area_name, "Fresno");
        assert_eq!(summary.areas[0].current_value, 1550.0);
    }

    #[test]
    fn test_ranking_is_descending() {
        let table = rent_table(
            "1,\"Santa Maria, CA\",3500.0,3590.0,3611.07\n\
             2,\"El Centro, CA\",1100.0,1150.0,1179.17\n\
             3,\"Santa Cruz, CA\",3400.0,3490.0,3504.87\n",
        );
        let summary = summarize_region_areas(&table, ", CA").unwrap();

        let values: Vec<f64> = summary.areas.iter().map(|a| a.current_value).collect();
        assert_eq!(values, vec![3611.07, 3504.87, 1179.17]);
    }

    #[test]
    fn test_ranking_stable_on_ties() {
        let table = rent_table(
            "1,\"Alpha, CA\",1.0,1.0,2000.0\n\
             2,\"Beta, CA\",1.0,1.0,2000.0\n\
             3,\"Gamma, CA\",1.0,1.0,2500.0\n",
        );
        let summary = summarize_region_areas(&table, ", CA").unwrap();

        let names: Vec<&str> = summary.areas.iter().map(|a| a.area_name.as_str()).collect();
        assert_eq!(names, vec!["Gamma", "Alpha", "Beta"]);
        // Ties on min resolve to the first in rank order.
        assert_eq!(summary.min_observation.area_name, "Alpha");
        assert_eq!(summary.max_observation.area_name, "Gamma");
    }

    #[test]
    fn test_aggregates() {
        let table = rent_table(
            "1,\"Santa Maria, CA\",3500.0,3590.0,3611.07\n\
             2,\"El Centro, CA\",1100.0,1150.0,1179.17\n",
        );
        let summary = summarize_region_areas(&table, ", CA").unwrap();

        let expected_mean = (3611.07 + 1179.17) / 2.0;
        assert!((summary.mean_value - expected_mean).abs() < 1e-9);
        assert_eq!(summary.max_observation.area_name, "Santa Maria");
        assert_eq!(summary.min_observation.area_name, "El Centro");
        // Only 3 periods in this fixture: YoY is undefined everywhere.
        assert_eq!(summary.mean_yoy_change, None);
        assert!(summary.areas.iter().all(|a| a.yoy_change_pct.is_none()));
    }

    #[test]
    fn test_yoy_uses_trailing_thirteenth_period() {
        let months: Vec<String> = (0..13)
            .map(|i| format!("{}-{:02}-28", 2023 + (9 + i) / 12, (9 + i) % 12 + 1))
            .collect();
        let header = format!("RegionID,RegionName,{}", months.join(","));
        let mut values: Vec<String> = vec!["2000.0".to_string(); 12];
        values.insert(0, "1000.0".to_string());
        let csv = format!("{header}\n1,\"Napa, CA\",{}\n", values.join(","));
        let table = WideTable::from_reader(csv.as_bytes(), "rent index", "test").unwrap();

        let summary = summarize_region_areas(&table, ", CA").unwrap();
        let napa = &summary.areas[0];
        assert_eq!(napa.year_ago_value, Some(1000.0));
        assert!((napa.yoy_change_pct.unwrap() - 100.0).abs() < 1e-9);
        assert!((summary.mean_yoy_change.unwrap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_filter_is_no_data_with_suffixes() {
        let table = rent_table(
            "1,\"Fresno, TX\",1.0,1.0,1.0\n\
             2,\"Boise City, ID\",1.0,1.0,1.0\n",
        );
        let err = summarize_region_areas(&table, ", CA").unwrap_err();
        match err {
            PipelineError::NoData {
                qualifier,
                suffixes,
                ..
            } => {
                assert_eq!(qualifier, ", CA");
                assert_eq!(suffixes, vec![", ID", ", TX"]);
            }
            other => panic!("expected NoData, got {other:?}"),
        }
    }

    #[test]
    fn test_areas_without_latest_value_are_excluded() {
        let table = rent_table(
            "1,\"Napa, CA\",1500.0,1540.0,\n\
             2,\"Chico, CA\",1200.0,1210.0,1220.0\n",
        );
        let summary = summarize_region_areas(&table, ", CA").unwrap();
        assert_eq!(summary.areas.len(), 1);
        assert_eq!(summary.areas[0].area_name, "Chico");
    }
}
