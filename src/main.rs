//! Housescope - housing market data integrator
//!
//! A CLI tool that joins census population data with home-value and rent
//! index files for one U.S. state, producing derived CSV datasets and a
//! Markdown summary report.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (config, fetch, missing region, write failure)

mod analysis;
mod census;
mod cli;
mod config;
mod dataset;
mod error;
mod models;
mod output;
mod pdf;
mod report;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::Args;
use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use models::RegionalSummary;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("Housescope v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the pipeline
    match run_pipeline(args).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Pipeline failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .housescope.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".housescope.toml");

    if path.exists() {
        eprintln!("⚠️  .housescope.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .housescope.toml")?;

    println!("✅ Created .housescope.toml with default settings.");
    println!("   Edit it to customize the region, dataset paths, and output directory.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete integration pipeline.
async fn run_pipeline(args: Args) -> Result<()> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    // Handle --dry-run: validate inputs and exit
    if args.dry_run {
        return handle_dry_run(&config);
    }

    let region = config.region.clone();
    let qualifier = region.qualifier();

    // Step 1: credential, then population. The key check runs before any
    // network call; the probe request runs before the real fetch.
    let api_key = Config::census_api_key()?;

    println!("📡 Fetching census population for {}...", region.state);
    let client = census::CensusClient::new(&config.census, api_key)?;
    let spinner = fetch_spinner(&args);
    client.validate_key().await?;
    let population = client.fetch_population(&region).await?;
    spinner.finish_and_clear();
    info!(
        "Retrieved census data: {} residents in {} (state:{})",
        population.population, population.region_name, population.region_code
    );

    // Step 2: home value index
    println!("🏠 Processing home value index...");
    let home_table = dataset::WideTable::load(
        &config.datasets.home_value_path(),
        "home value index",
    )?;
    debug!(
        "Available regions in home value data: {:?}",
        home_table.region_names()
    );
    let series = analysis::normalize_region_series(&home_table, &region.state)?;
    let home_values = analysis::latest_snapshot(&series)?;
    info!("{} Housing Market Analysis:", region.state);
    info!(
        "Latest month: {}",
        home_values.latest.month.format("%B %Y")
    );
    info!(
        "Median home value: {}",
        report::fmt_money(home_values.latest.value)
    );
    info!(
        "Year-over-year change: {}",
        report::fmt_pct(home_values.yoy_change_pct)
    );

    // Step 3: rent index
    println!("🏙️  Analyzing rental markets...");
    let rent_table = dataset::WideTable::load(&config.datasets.rent_path(), "rent index")?;
    let rentals = analysis::summarize_region_areas(&rent_table, &qualifier)?;
    log_rental_analysis(&region.state, &rentals);

    // Step 4: optional policy PDF (best-effort, never fatal)
    if let Some(ref pdf_path) = args.pdf {
        println!("📄 Extracting policy PDF tables...");
        let tables = pdf::extract_tables(pdf_path);
        if tables.is_empty() {
            warn!("No tables extracted from {}", pdf_path.display());
        }
        for table in &tables {
            debug!(
                "PDF table {}: {} columns x {} rows ({})",
                table.number,
                table.headers.len(),
                table.rows.len(),
                table.headers.join(", ")
            );
        }
    }

    // Step 5: integrate the three sources
    println!("🔗 Building integrated dataset...");
    let record = analysis::integrate(&population, &home_values, &rentals)?;

    // Step 6: write the derived files
    println!("📝 Writing derived files...");
    let out_dir = &config.output.dir;
    output::ensure_dir(out_dir)?;
    let prefix = region.file_prefix();
    output::write_final_dataset(out_dir, &prefix, &record)?;
    output::write_rental_data(out_dir, &prefix, &rentals)?;
    output::write_summary_stats(out_dir, &report::summary_metrics(&record))?;
    let report_md = report::generate_summary_report(&record, &rentals, Utc::now());
    output::write_report(out_dir, &report_md)?;

    // Print summary
    let duration = start_time.elapsed().as_secs_f64();
    println!("\n📊 Integration Summary:");
    println!("   Population: {}", report::fmt_int(record.population));
    println!(
        "   Median home value: {} ({} YoY)",
        report::fmt_money(record.median_home_value),
        report::fmt_pct(record.home_value_yoy_change)
    );
    println!("   Metro areas analyzed: {}", record.num_metro_areas);
    println!(
        "   Average metro rent: {} ({} YoY)",
        report::fmt_money(record.avg_metro_rent),
        report::fmt_pct(record.avg_rent_yoy_change)
    );
    println!("   Duration: {:.1}s", duration);
    println!(
        "\n✅ Analysis complete! Results saved to: {}",
        out_dir.display()
    );

    Ok(())
}

/// Handle --dry-run: validate configuration and input files, no network,
/// no writes.
fn handle_dry_run(config: &Config) -> Result<()> {
    println!("\n🔍 Dry run: validating inputs (no network, no writes)...\n");

    match Config::census_api_key() {
        Ok(_) => println!("   🔑 {} is set", config::API_KEY_VAR),
        Err(e) => println!("   ⚠️  {e}"),
    }

    for (label, path) in [
        ("home value index", config.datasets.home_value_path()),
        ("rent index", config.datasets.rent_path()),
    ] {
        let table = dataset::WideTable::load(&path, label)?;
        println!(
            "   📄 {} ({}): {} rows, {} month columns",
            label,
            path.display(),
            table.len(),
            table.date_columns().len()
        );
    }

    println!(
        "   🎯 Target region: {} (FIPS {}, metro filter {:?})",
        config.region.state,
        config.region.fips,
        config.region.qualifier()
    );

    println!("\n✅ Dry run complete. No data was fetched or written.");
    Ok(())
}

/// Log the rental market analysis the way the report presents it.
fn log_rental_analysis(state: &str, rentals: &RegionalSummary) {
    info!("{state} Rental Market Analysis:");
    info!("Data as of: {}", rentals.as_of.format("%B %Y"));
    info!("Number of metro areas analyzed: {}", rentals.areas.len());

    info!("Top 5 Most Expensive Rental Markets:");
    for (i, market) in rentals.top(5).iter().enumerate() {
        info!(
            "{}. {}: {}/month (YoY change: {})",
            i + 1,
            market.area_name,
            report::fmt_money(market.current_value),
            report::fmt_pct(market.yoy_change_pct)
        );
    }

    info!(
        "Average Rent (across metros): {}",
        report::fmt_money(rentals.mean_value)
    );
    match rentals.mean_yoy_change {
        Some(change) => info!(
            "Average Year-over-Year Change: {}",
            report::fmt_pct(Some(change))
        ),
        None => info!("Average Year-over-Year Change: Not enough historical data"),
    }
    info!(
        "Highest Rent: {}",
        report::fmt_money(rentals.max_observation.current_value)
    );
    info!(
        "Lowest Rent: {}",
        report::fmt_money(rentals.min_observation.current_value)
    );

    info!("Markets with increasing rents: {}", rentals.rising_count());
    info!("Markets with decreasing rents: {}", rentals.falling_count());
    if let Some(area) = rentals.fastest_growing() {
        info!(
            "Fastest growing market: {} ({})",
            area.area_name,
            report::fmt_pct(area.yoy_change_pct)
        );
    }
    if let Some(area) = rentals.fastest_declining() {
        info!(
            "Fastest declining market: {} ({})",
            area.area_name,
            report::fmt_pct(area.yoy_change_pct)
        );
    }
}

/// Spinner shown while the census request is in flight.
fn fetch_spinner(args: &Args) -> ProgressBar {
    if args.quiet {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("   {spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Waiting for api.census.gov...");
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .housescope.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
