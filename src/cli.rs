//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// Housescope - housing market data integrator
///
/// Integrates census population, home-value index, and rent index data for
/// one U.S. state into derived CSV datasets and a Markdown summary report.
///
/// Examples:
///   housescope
///   housescope --state Washington --fips 53 --abbrev WA
///   housescope --data-dir ./data --output ./output
///   housescope --pdf reports/housing_policy_2024.pdf
///   housescope --dry-run
///   housescope --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// State name as the population and home-value sources spell it
    ///
    /// Defaults to the config file value (California out of the box).
    #[arg(long, value_name = "NAME")]
    pub state: Option<String>,

    /// Two-digit census FIPS code for the state
    #[arg(long, value_name = "CODE")]
    pub fips: Option<String>,

    /// Two-letter postal abbreviation
    ///
    /// Drives the ", XX" suffix used to pick the state's metro areas out of
    /// the national rent index.
    #[arg(long, value_name = "ABBREV")]
    pub abbrev: Option<String>,

    /// Directory containing the two index CSV files
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory the derived files are written to
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Housing policy PDF to extract tables from
    ///
    /// Optional and best-effort: extraction failures are logged, never fatal.
    #[arg(long, value_name = "FILE")]
    pub pdf: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .housescope.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Census API request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Validate configuration and input files without fetching or writing
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .housescope.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref state) = self.state {
            if state.trim().is_empty() {
                return Err("State name must not be empty".to_string());
            }
        }

        if let Some(ref fips) = self.fips {
            if fips.len() != 2 || !fips.chars().all(|c| c.is_ascii_digit()) {
                return Err(format!("FIPS code must be two digits, got '{fips}'"));
            }
        }

        if let Some(ref abbrev) = self.abbrev {
            if abbrev.len() != 2 || !abbrev.chars().all(|c| c.is_ascii_uppercase()) {
                return Err(format!(
                    "State abbreviation must be two uppercase letters, got '{abbrev}'"
                ));
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate timeout if provided
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        // Validate the data directory if provided
        if let Some(ref data_dir) = self.data_dir {
            if !data_dir.exists() {
                return Err(format!(
                    "Data directory does not exist: {}",
                    data_dir.display()
                ));
            }
            if !data_dir.is_dir() {
                return Err(format!(
                    "Data path is not a directory: {}",
                    data_dir.display()
                ));
            }
        }

        // Validate the PDF path if provided
        if let Some(ref pdf) = self.pdf {
            if !pdf.exists() {
                return Err(format!("PDF file does not exist: {}", pdf.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            state: None,
            fips: None,
            abbrev: None,
            data_dir: None,
            output: None,
            pdf: None,
            config: None,
            timeout: None,
            verbose: false,
            quiet: false,
            dry_run: false,
            init_config: false,
        }
    }

    #[test]
    fn test_defaults_validate() {
        let args = make_args();
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_bad_fips() {
        let mut args = make_args();
        args.fips = Some("6".to_string());
        assert!(args.validate().is_err());

        args.fips = Some("CA".to_string());
        assert!(args.validate().is_err());

        args.fips = Some("06".to_string());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_bad_abbrev() {
        let mut args = make_args();
        args.abbrev = Some("ca".to_string());
        assert!(args.validate().is_err());

        args.abbrev = Some("CAL".to_string());
        assert!(args.validate().is_err());

        args.abbrev = Some("CA".to_string());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_timeout() {
        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
