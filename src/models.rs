//! Data models for the housing pipeline.
//!
//! This module contains all the core data structures handed between
//! pipeline stages: population records, time series, ranked area
//! observations, and the final integrated record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// State-level population as reported by the Census API.
///
/// Sourced once per run; immutable after fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationRecord {
    /// Region name as the API reports it (e.g. "California").
    pub region_name: String,
    /// Total population count.
    pub population: i64,
    /// Region code as the API reports it (e.g. FIPS "06").
    pub region_code: String,
}

/// One month of an index series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    /// Reporting month (day component is whatever the source labels carry).
    pub month: NaiveDate,
    /// Index value for that month.
    pub value: f64,
}

/// The latest point of a state-level index plus its year-over-year change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndexSnapshot {
    pub latest: TimeSeriesPoint,
    /// Percent change against the same month a year earlier; `None` when
    /// fewer than 13 periods exist or the year-ago value is zero.
    pub yoy_change_pct: Option<f64>,
}

/// Year-over-year percent change, guarded against a zero or missing baseline.
///
/// Defined iff `year_ago` is present and non-zero.
pub fn yoy_change_pct(current: f64, year_ago: Option<f64>) -> Option<f64> {
    match year_ago {
        Some(base) if base != 0.0 => Some((current - base) / base * 100.0),
        _ => None,
    }
}

/// One metro area's current value and year-over-year change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaObservation {
    /// Display name with the state suffix stripped (e.g. "Santa Maria").
    pub area_name: String,
    /// Value at the latest reporting month.
    pub current_value: f64,
    /// Value from the same month a year earlier, when available.
    pub year_ago_value: Option<f64>,
    /// Percent change against `year_ago_value`. Present iff
    /// `year_ago_value` is present and non-zero.
    pub yoy_change_pct: Option<f64>,
}

impl AreaObservation {
    /// Build an observation, deriving the YoY field so the invariant
    /// (`yoy_change_pct` present iff `year_ago_value` present and non-zero)
    /// holds at every call site.
    pub fn new(area_name: String, current_value: f64, year_ago_value: Option<f64>) -> Self {
        Self {
            area_name,
            current_value,
            year_ago_value,
            yoy_change_pct: yoy_change_pct(current_value, year_ago_value),
        }
    }
}

/// Ranked per-area observations plus state-level aggregates for one region.
///
/// Derived, recomputed each run, never persisted as intermediate state.
#[derive(Debug, Clone, Serialize)]
pub struct RegionalSummary {
    /// Observations sorted by `current_value` descending (stable on ties).
    pub areas: Vec<AreaObservation>,
    /// The latest reporting month the values belong to.
    pub as_of: NaiveDate,
    /// Mean of the current values.
    pub mean_value: f64,
    /// Mean of the defined YoY changes; `None` when no area has one.
    pub mean_yoy_change: Option<f64>,
    /// Area with the highest current value (first encountered on ties).
    pub max_observation: AreaObservation,
    /// Area with the lowest current value (first encountered on ties).
    pub min_observation: AreaObservation,
}

impl RegionalSummary {
    /// The `n` most expensive areas, in rank order.
    pub fn top(&self, n: usize) -> &[AreaObservation] {
        &self.areas[..self.areas.len().min(n)]
    }

    /// Number of areas with a rising year-over-year value.
    pub fn rising_count(&self) -> usize {
        self.areas
            .iter()
            .filter(|a| a.yoy_change_pct.map_or(false, |c| c > 0.0))
            .count()
    }

    /// Number of areas with a falling year-over-year value.
    pub fn falling_count(&self) -> usize {
        self.areas
            .iter()
            .filter(|a| a.yoy_change_pct.map_or(false, |c| c < 0.0))
            .count()
    }

    /// Area with the largest YoY increase, among areas with a defined YoY.
    pub fn fastest_growing(&self) -> Option<&AreaObservation> {
        self.areas
            .iter()
            .filter(|a| a.yoy_change_pct.is_some())
            .max_by(|a, b| {
                a.yoy_change_pct
                    .partial_cmp(&b.yoy_change_pct)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }

    /// Area with the smallest YoY change, among areas with a defined YoY.
    pub fn fastest_declining(&self) -> Option<&AreaObservation> {
        self.areas
            .iter()
            .filter(|a| a.yoy_change_pct.is_some())
            .min_by(|a, b| {
                a.yoy_change_pct
                    .partial_cmp(&b.yoy_change_pct)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }
}

/// The final integrated dataset: one row joining all three sources.
///
/// Constructed once per run by the aggregator and immediately serialized;
/// never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntegratedRecord {
    pub region: String,
    pub population: i64,
    pub median_home_value: f64,
    pub home_value_yoy_change: Option<f64>,
    pub avg_metro_rent: f64,
    pub avg_rent_yoy_change: Option<f64>,
    pub num_metro_areas: usize,
    pub highest_rent_metro: String,
    pub highest_rent: f64,
    pub lowest_rent_metro: String,
    pub lowest_rent: f64,
    pub data_date: NaiveDate,
}

/// One row of `summary_stats.csv`: a label and a pre-formatted value.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryMetric {
    pub metric: String,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(name: &str, current: f64, year_ago: Option<f64>) -> AreaObservation {
        AreaObservation::new(name.to_string(), current, year_ago)
    }

    #[test]
    fn test_yoy_formula() {
        let change = yoy_change_pct(110.0, Some(100.0)).unwrap();
        assert!((change - 10.0).abs() < 1e-9);

        let change = yoy_change_pct(771_056.98, Some(743_545.0)).unwrap();
        assert!((change - 3.7).abs() < 0.1);
    }

    #[test]
    fn test_yoy_undefined_for_zero_or_missing_baseline() {
        assert_eq!(yoy_change_pct(100.0, Some(0.0)), None);
        assert_eq!(yoy_change_pct(100.0, None), None);
    }

    #[test]
    fn test_observation_invariant() {
        let with_base = obs("Fresno", 1500.0, Some(1400.0));
        assert!(with_base.yoy_change_pct.is_some());

        let zero_base = obs("Fresno", 1500.0, Some(0.0));
        assert!(zero_base.year_ago_value.is_some());
        assert!(zero_base.yoy_change_pct.is_none());

        let no_base = obs("Fresno", 1500.0, None);
        assert!(no_base.yoy_change_pct.is_none());
    }

    #[test]
    fn test_rising_and_falling_counts() {
        let summary = RegionalSummary {
            areas: vec![
                obs("A", 3.0, Some(2.0)),
                obs("B", 2.0, Some(2.5)),
                obs("C", 1.0, None),
            ],
            as_of: NaiveDate::from_ymd_opt(2024, 10, 31).unwrap(),
            mean_value: 2.0,
            mean_yoy_change: None,
            max_observation: obs("A", 3.0, Some(2.0)),
            min_observation: obs("C", 1.0, None),
        };

        assert_eq!(summary.rising_count(), 1);
        assert_eq!(summary.falling_count(), 1);
        assert_eq!(summary.fastest_growing().unwrap().area_name, "A");
        assert_eq!(summary.fastest_declining().unwrap().area_name, "B");
    }

    #[test]
    fn test_top_clamps_to_len() {
        let summary = RegionalSummary {
            areas: vec![obs("A", 3.0, None), obs("B", 2.0, None)],
            as_of: NaiveDate::from_ymd_opt(2024, 10, 31).unwrap(),
            mean_value: 2.5,
            mean_yoy_change: None,
            max_observation: obs("A", 3.0, None),
            min_observation: obs("B", 2.0, None),
        };

        assert_eq!(summary.top(5).len(), 2);
        assert_eq!(summary.top(1)[0].area_name, "A");
    }
}
