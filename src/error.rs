//! Typed error taxonomy for the pipeline.
//!
//! Every load-bearing stage fails fast with one of these variants; only the
//! PDF extraction path swallows its errors (see `pdf::extract_tables`).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Missing or invalid configuration (credential, region settings).
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP transport failure talking to the Census API.
    #[error("census API request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A source answered (or a file parsed), but not with the shape we
    /// expect. `payload_prefix` echoes the start of the offending payload so
    /// the failure can be diagnosed without rerunning.
    #[error("invalid census API response: {detail} (payload: {payload_prefix:?})")]
    InvalidResponse {
        detail: String,
        payload_prefix: String,
    },

    /// An expected region is absent from a dataset. Lists the region names
    /// that were actually present.
    #[error("region {region:?} not found in {dataset}; available regions: {available:?}")]
    NotFound {
        dataset: String,
        region: String,
        available: Vec<String>,
    },

    /// A regional filter matched nothing. Lists the distinct area suffixes
    /// seen so a bad qualifier is obvious.
    #[error("no areas matching {qualifier:?} in {dataset}; suffixes present: {suffixes:?}")]
    NoData {
        dataset: String,
        qualifier: String,
        suffixes: Vec<String>,
    },

    /// An aggregate could not be computed because its input was empty.
    #[error("cannot compute {0}: input collection is empty")]
    IncompleteInput(&'static str),

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
