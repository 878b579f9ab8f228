//! Census population gateway.
//!
//! Wraps the Census API behind an explicit schema check: the caller gets a
//! validated `PopulationRecord` or a typed error, never a partially-valid
//! structure. The API answers with a JSON array-of-arrays where row 0 holds
//! the header labels and each following row is data.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::config::{CensusConfig, RegionConfig};
use crate::error::{PipelineError, Result};
use crate::models::PopulationRecord;

/// Column labels the population query must answer with.
const NAME_COLUMN: &str = "NAME";
const POPULATION_COLUMN: &str = "P1_001N";
const STATE_COLUMN: &str = "state";

/// How much of an offending payload to echo in errors.
const PAYLOAD_PREFIX_LEN: usize = 200;

/// Client for the Census population endpoint.
pub struct CensusClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl CensusClient {
    /// Build a client with an explicit request timeout. The upstream service
    /// imposes no bound of its own, so the client must.
    pub fn new(config: &CensusConfig, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key,
        })
    }

    /// Probe the endpoint with a minimal query to validate the credential
    /// before the real fetch. Fails fast on transport errors and on
    /// payloads that do not decode to the expected shape.
    pub async fn validate_key(&self) -> Result<()> {
        let body = self.get(&[("get", NAME_COLUMN), ("for", "state:*")]).await?;
        parse_rows(&body)?;
        Ok(())
    }

    /// Fetch the population record for one state.
    pub async fn fetch_population(&self, region: &RegionConfig) -> Result<PopulationRecord> {
        let for_clause = format!("state:{}", region.fips);
        let get_clause = format!("{NAME_COLUMN},{POPULATION_COLUMN}");
        let body = self
            .get(&[("get", &get_clause), ("for", &for_clause)])
            .await?;
        let rows = parse_rows(&body)?;
        parse_population(&rows)
    }

    async fn get(&self, params: &[(&str, &str)]) -> Result<String> {
        let mut query: Vec<(&str, &str)> = params.to_vec();
        query.push(("key", &self.api_key));

        let response = self
            .client
            .get(&self.endpoint)
            .query(&query)
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        debug!("census response: {}", payload_prefix(&body));
        Ok(body)
    }
}

/// Decode the array-of-arrays payload and check its minimum shape:
/// a header row plus at least one data row.
pub fn parse_rows(body: &str) -> Result<Vec<Vec<String>>> {
    let rows: Vec<Vec<String>> =
        serde_json::from_str(body).map_err(|e| PipelineError::InvalidResponse {
            detail: format!("payload is not a JSON array of string arrays: {e}"),
            payload_prefix: payload_prefix(body),
        })?;

    if rows.len() < 2 {
        return Err(PipelineError::InvalidResponse {
            detail: format!(
                "expected a header row plus at least one data row, got {} row(s)",
                rows.len()
            ),
            payload_prefix: payload_prefix(body),
        });
    }

    Ok(rows)
}

/// Validate the header labels and build the population record from the
/// first data row.
pub fn parse_population(rows: &[Vec<String>]) -> Result<PopulationRecord> {
    let header = &rows[0];
    let data = &rows[1];

    let column = |label: &str| -> Result<usize> {
        header
            .iter()
            .position(|h| h == label)
            .ok_or_else(|| PipelineError::InvalidResponse {
                detail: format!("header is missing the {label} column"),
                payload_prefix: header.join(","),
            })
    };

    let name_idx = column(NAME_COLUMN)?;
    let population_idx = column(POPULATION_COLUMN)?;
    let state_idx = column(STATE_COLUMN)?;

    let field = |idx: usize| -> Result<&String> {
        data.get(idx).ok_or_else(|| PipelineError::InvalidResponse {
            detail: format!("data row is shorter than the header ({} columns)", data.len()),
            payload_prefix: data.join(","),
        })
    };

    let population = field(population_idx)?
        .parse::<i64>()
        .map_err(|_| PipelineError::InvalidResponse {
            detail: format!("{POPULATION_COLUMN} is not an integer"),
            payload_prefix: data.join(","),
        })?;

    Ok(PopulationRecord {
        region_name: field(name_idx)?.clone(),
        population,
        region_code: field(state_idx)?.clone(),
    })
}

fn payload_prefix(body: &str) -> String {
    body.chars().take(PAYLOAD_PREFIX_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_BODY: &str =
        r#"[["NAME","P1_001N","state"],["California","39538223","06"]]"#;

    #[test]
    fn test_parse_population_happy_path() {
        let rows = parse_rows(VALID_BODY).unwrap();
        let record = parse_population(&rows).unwrap();

        assert_eq!(record.region_name, "California");
        assert_eq!(record.population, 39_538_223);
        assert_eq!(record.region_code, "06");
    }

    #[test]
    fn test_non_json_payload_rejected() {
        let err = parse_rows("<html>rate limited</html>").unwrap_err();
        match err {
            PipelineError::InvalidResponse { payload_prefix, .. } => {
                assert!(payload_prefix.starts_with("<html>"));
            }
            other => panic!("expected InvalidResponse, got {other:?}"),
        }
    }

    #[test]
    fn test_header_only_payload_rejected() {
        let err = parse_rows(r#"[["NAME","P1_001N","state"]]"#).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidResponse { .. }));
    }

    #[test]
    fn test_missing_column_rejected() {
        let rows = parse_rows(r#"[["NAME","state"],["California","06"]]"#).unwrap();
        let err = parse_population(&rows).unwrap_err();
        match err {
            PipelineError::InvalidResponse { detail, .. } => {
                assert!(detail.contains(POPULATION_COLUMN));
            }
            other => panic!("expected InvalidResponse, got {other:?}"),
        }
    }

    #[test]
    fn test_non_integer_population_rejected() {
        let rows =
            parse_rows(r#"[["NAME","P1_001N","state"],["California","many","06"]]"#).unwrap();
        let err = parse_population(&rows).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidResponse { .. }));
    }

    #[test]
    fn test_payload_prefix_truncates() {
        let long = "x".repeat(500);
        assert_eq!(payload_prefix(&long).len(), PAYLOAD_PREFIX_LEN);
    }
}
