//! Report rendering.

pub mod generator;

pub use generator::{fmt_int, fmt_money, fmt_pct, generate_summary_report, summary_metrics};
