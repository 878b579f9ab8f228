//! Cross-source aggregation.
//!
//! Joins the population record, the home-value index snapshot, and the
//! rental summary into the final integrated record. Pure function of its
//! inputs: no I/O, deterministic, and every numeric aggregate is recomputed
//! from the observation list rather than copied, so downstream rounding is
//! consistent. Formatting belongs to the rendering layer, not here.

use crate::error::{PipelineError, Result};
use crate::models::{
    AreaObservation, IndexSnapshot, IntegratedRecord, PopulationRecord, RegionalSummary,
};

/// Combine the three source results into one `IntegratedRecord`.
///
/// Fails with `IncompleteInput` when an aggregate (mean, max, min) has no
/// values to draw from.
pub fn integrate(
    population: &PopulationRecord,
    home_values: &IndexSnapshot,
    rentals: &RegionalSummary,
) -> Result<IntegratedRecord> {
    if rentals.areas.is_empty() {
        return Err(PipelineError::IncompleteInput("metro rent aggregates"));
    }

    let rents: Vec<f64> = rentals.areas.iter().map(|a| a.current_value).collect();
    let avg_metro_rent = rents.iter().sum::<f64>() / rents.len() as f64;

    let yoy_changes: Vec<f64> = rentals
        .areas
        .iter()
        .filter_map(|a| a.yoy_change_pct)
        .collect();
    let avg_rent_yoy_change = if yoy_changes.is_empty() {
        None
    } else {
        Some(yoy_changes.iter().sum::<f64>() / yoy_changes.len() as f64)
    };

    // Ties resolve to the first area encountered, matching the ranker.
    let highest = rentals
        .areas
        .iter()
        .fold(None::<&AreaObservation>, |best, area| {
            match best {
                Some(b) if b.current_value >= area.current_value => Some(b),
                _ => Some(area),
            }
        })
        .ok_or(PipelineError::IncompleteInput("highest metro rent"))?;
    let lowest = rentals
        .areas
        .iter()
        .fold(None::<&AreaObservation>, |best, area| {
            match best {
                Some(b) if b.current_value <= area.current_value => Some(b),
                _ => Some(area),
            }
        })
        .ok_or(PipelineError::IncompleteInput("lowest metro rent"))?;

    Ok(IntegratedRecord {
        region: population.region_name.clone(),
        population: population.population,
        median_home_value: home_values.latest.value,
        home_value_yoy_change: home_values.yoy_change_pct,
        avg_metro_rent,
        avg_rent_yoy_change,
        num_metro_areas: rentals.areas.len(),
        highest_rent_metro: highest.area_name.clone(),
        highest_rent: highest.current_value,
        lowest_rent_metro: lowest.area_name.clone(),
        lowest_rent: lowest.current_value,
        data_date: rentals.as_of,
    })
}
