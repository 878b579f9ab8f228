//! Markdown report generation.
//!
//! This module renders the integrated record and the rental summary into
//! the narrative `summary_report.md`. All number formatting lives here —
//! the analysis stages hand over raw values.

use chrono::{DateTime, Utc};

use crate::models::{IntegratedRecord, RegionalSummary, SummaryMetric};

/// Generate the complete Markdown summary report.
pub fn generate_summary_report(
    record: &IntegratedRecord,
    rentals: &RegionalSummary,
    generated_at: DateTime<Utc>,
) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "# {} Housing Market Analysis Summary\n\n",
        record.region
    ));

    output.push_str(&generate_sources_section(record));
    output.push_str(&generate_processing_section());
    output.push_str(&generate_insights_section(record, rentals));
    output.push_str(&generate_quality_section(record));
    output.push_str(&generate_footer(generated_at));

    output
}

/// Generate the data sources section.
fn generate_sources_section(record: &IntegratedRecord) -> String {
    let mut section = String::new();

    section.push_str("## Data Sources and Integration Process\n\n");
    section.push_str(&format!(
        "This analysis integrates housing-related data for {} from multiple sources:\n\n",
        record.region
    ));

    section.push_str("1. **Census Data**\n");
    section.push_str(&format!("   - Population: {}\n", fmt_int(record.population)));
    section.push_str("   - Source: U.S. Census Bureau API (2020 Decennial Census)\n\n");

    section.push_str("2. **Housing Prices (Home Value Index)**\n");
    section.push_str(&format!(
        "   - Current median home value: {}\n",
        fmt_money(record.median_home_value)
    ));
    section.push_str(&format!(
        "   - Year-over-year change: {}\n",
        fmt_pct(record.home_value_yoy_change)
    ));
    section.push_str("   - Source: Zillow Research Data\n\n");

    section.push_str("3. **Rental Market (Observed Rent Index)**\n");
    section.push_str(&format!(
        "   - Average metro area rent: {}\n",
        fmt_money(record.avg_metro_rent)
    ));
    section.push_str(&format!(
        "   - Number of metro areas analyzed: {}\n",
        record.num_metro_areas
    ));
    section.push_str(&format!(
        "   - Year-over-year change: {}\n",
        fmt_pct(record.avg_rent_yoy_change)
    ));
    section.push_str("   - Source: Zillow Research Data\n\n");

    section
}

/// Generate the processing steps section.
fn generate_processing_section() -> String {
    let mut section = String::new();

    section.push_str("## Data Processing Steps\n\n");
    section.push_str("1. **Data Cleaning**\n");
    section.push_str("   - Standardized column names across datasets\n");
    section.push_str("   - Handled missing values\n");
    section.push_str("   - Converted date labels to ISO months\n");
    section.push_str("   - Dropped duplicate reporting periods\n\n");
    section.push_str("2. **Data Integration**\n");
    section.push_str("   - Merged datasets using region identifiers\n");
    section.push_str("   - Created calculated year-over-year fields\n");
    section.push_str("   - Validated data shape at every source boundary\n");
    section.push_str("   - Generated summary statistics\n\n");

    section
}

/// Generate the market insights section.
fn generate_insights_section(record: &IntegratedRecord, rentals: &RegionalSummary) -> String {
    let mut section = String::new();

    section.push_str("## Key Market Insights\n\n");

    section.push_str("1. **Housing Market**\n");
    section.push_str(&format!(
        "   - Median home value: {}\n",
        fmt_money(record.median_home_value)
    ));
    section.push_str(&format!(
        "   - Home values have shown {} change over the past year\n\n",
        fmt_pct(record.home_value_yoy_change)
    ));

    section.push_str("2. **Rental Market**\n");
    section.push_str(&format!(
        "   - Most expensive market: {} ({}/month)\n",
        record.highest_rent_metro,
        fmt_money(record.highest_rent)
    ));
    section.push_str(&format!(
        "   - Most affordable market: {} ({}/month)\n",
        record.lowest_rent_metro,
        fmt_money(record.lowest_rent)
    ));
    section.push_str(&format!(
        "   - Average rent across metro areas: {}\n\n",
        fmt_money(record.avg_metro_rent)
    ));

    section.push_str("3. **Market Momentum**\n");
    section.push_str(&format!(
        "   - Markets with rising rents: {}\n",
        rentals.rising_count()
    ));
    section.push_str(&format!(
        "   - Markets with falling rents: {}\n",
        rentals.falling_count()
    ));
    if let Some(area) = rentals.fastest_growing() {
        section.push_str(&format!(
            "   - Fastest growing market: {} ({})\n",
            area.area_name,
            fmt_pct(area.yoy_change_pct)
        ));
    }
    if let Some(area) = rentals.fastest_declining() {
        section.push_str(&format!(
            "   - Slowest growing market: {} ({})\n",
            area.area_name,
            fmt_pct(area.yoy_change_pct)
        ));
    }
    section.push('\n');

    section
}

/// Generate the data quality notes section.
fn generate_quality_section(record: &IntegratedRecord) -> String {
    let mut section = String::new();

    section.push_str("## Data Quality Notes\n\n");
    section.push_str("- Census data is from the 2020 Decennial Census\n");
    section.push_str(&format!(
        "- Housing and rental data is current as of {}\n",
        record.data_date.format("%Y-%m-%d")
    ));
    section.push_str("- All monetary values are in USD\n");
    section.push_str(&format!(
        "- Rental data covers {} major metropolitan areas in {}\n\n",
        record.num_metro_areas, record.region
    ));

    section
}

/// Generate the report footer.
fn generate_footer(generated_at: DateTime<Utc>) -> String {
    format!(
        "_Report generated on: {}_\n",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    )
}

/// Build the `summary_stats.csv` rows.
pub fn summary_metrics(record: &IntegratedRecord) -> Vec<SummaryMetric> {
    vec![
        SummaryMetric {
            metric: "Population".to_string(),
            value: fmt_int(record.population),
        },
        SummaryMetric {
            metric: "Median Home Value".to_string(),
            value: fmt_money(record.median_home_value),
        },
        SummaryMetric {
            metric: "YoY Home Value Change".to_string(),
            value: fmt_pct(record.home_value_yoy_change),
        },
        SummaryMetric {
            metric: "Average Metro Rent".to_string(),
            value: fmt_money(record.avg_metro_rent),
        },
    ]
}

/// Format an integer with thousands separators.
pub fn fmt_int(value: i64) -> String {
    let sign = if value < 0 { "-" } else { "" };
    format!("{sign}{}", group_thousands(&value.unsigned_abs().to_string()))
}

/// Format a dollar amount with thousands separators and two decimals.
pub fn fmt_money(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}${}.{frac_part}", group_thousands(int_part))
}

/// Format an optional percentage with one decimal; absent values render
/// as "N/A".
pub fn fmt_pct(value: Option<f64>) -> String {
    match value {
        Some(pct) => format!("{pct:.1}%"),
        None => "N/A".to_string(),
    }
}

fn group_thousands(digits: &str) -> String {
    let chars: Vec<char> = digits.chars().collect();
    let mut grouped = String::with_capacity(chars.len() + chars.len() / 3);
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }
    grouped
}
