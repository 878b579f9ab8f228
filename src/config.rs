//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.housescope.toml` files. The Census credential is deliberately NOT part
//! of the file: it comes from the process environment only (a `.env` file is
//! honored), so a checked-in config can never leak it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::PipelineError;

/// Environment variable holding the Census API key.
pub const API_KEY_VAR: &str = "CENSUS_API_KEY";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Census API settings.
    #[serde(default)]
    pub census: CensusConfig,

    /// Target region settings.
    #[serde(default)]
    pub region: RegionConfig,

    /// Input dataset locations.
    #[serde(default)]
    pub datasets: DatasetsConfig,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Census API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CensusConfig {
    /// Population endpoint (2020 Decennial Census).
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds. The upstream service enforces no bound,
    /// so this one is load-bearing.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for CensusConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_endpoint() -> String {
    "https://api.census.gov/data/2020/dec/pl".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// The state the pipeline integrates data for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionConfig {
    /// State name as the population and home-value sources spell it.
    #[serde(default = "default_state")]
    pub state: String,

    /// Two-digit census FIPS code.
    #[serde(default = "default_fips")]
    pub fips: String,

    /// Two-letter postal abbreviation.
    #[serde(default = "default_abbrev")]
    pub abbrev: String,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            state: default_state(),
            fips: default_fips(),
            abbrev: default_abbrev(),
        }
    }
}

impl RegionConfig {
    /// Substring that marks a metro area as belonging to this state,
    /// e.g. `", CA"`.
    pub fn qualifier(&self) -> String {
        format!(", {}", self.abbrev)
    }

    /// Prefix for the derived file names, e.g. `california`.
    pub fn file_prefix(&self) -> String {
        self.state.to_lowercase().replace(' ', "_")
    }
}

fn default_state() -> String {
    "California".to_string()
}

fn default_fips() -> String {
    "06".to_string()
}

fn default_abbrev() -> String {
    "CA".to_string()
}

/// Input dataset locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetsConfig {
    /// Directory containing the index files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Home-value index file name (one row per state).
    #[serde(default = "default_home_value_file")]
    pub home_value_file: String,

    /// Rent index file name (one row per metro area).
    #[serde(default = "default_rent_file")]
    pub rent_file: String,
}

impl Default for DatasetsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            home_value_file: default_home_value_file(),
            rent_file: default_rent_file(),
        }
    }
}

impl DatasetsConfig {
    pub fn home_value_path(&self) -> PathBuf {
        self.data_dir.join(&self.home_value_file)
    }

    pub fn rent_path(&self) -> PathBuf {
        self.data_dir.join(&self.rent_file)
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_home_value_file() -> String {
    "State_zhvi_uc_sfrcondo_tier_0.33_0.67_sm_sa_month.csv".to_string()
}

fn default_rent_file() -> String {
    "Metro_zori_uc_sfrcondomfr_sm_month.csv".to_string()
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the derived files are written to.
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but
    /// can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".housescope.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings; only
    /// explicitly provided values override.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref state) = args.state {
            self.region.state = state.clone();
        }
        if let Some(ref fips) = args.fips {
            self.region.fips = fips.clone();
        }
        if let Some(ref abbrev) = args.abbrev {
            self.region.abbrev = abbrev.clone();
        }
        if let Some(ref data_dir) = args.data_dir {
            self.datasets.data_dir = data_dir.clone();
        }
        if let Some(ref output) = args.output {
            self.output.dir = output.clone();
        }
        if let Some(timeout) = args.timeout {
            self.census.timeout_seconds = timeout;
        }
    }

    /// Read the Census API key from the environment (a `.env` file is
    /// honored). Fails before any network call when absent or empty.
    pub fn census_api_key() -> std::result::Result<String, PipelineError> {
        dotenvy::dotenv().ok();

        match env::var(API_KEY_VAR) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(PipelineError::Config(format!(
                "{API_KEY_VAR} not set; export it or add it to a .env file"
            ))),
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
