//! Analysis report: every metric of one pipeline run.
//!
//! The report is the single hand-off point to presentation:
//! console text, markdown, charts, dashboard and `--json` all
//! read from it and never recompute anything.

use crate::{
    churn_tagger::ChurnSummary,
    clock::AsOf,
    clv_estimator::ClvEstimate,
    derivation::LifetimeBasis,
    describe::{FieldSummary, HistogramBin},
    quartile_bucketer::QuartileSummary,
    record::AnnotatedRecord,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisReport {
    pub as_of:             AsOf,
    pub churn_cutoff_days: u32,
    pub lifetime_basis:    LifetimeBasis,
    pub cohort_size:       usize,
    pub clv:               ClvEstimate,
    pub churn:             ChurnSummary,
    pub quartiles:         QuartileSummary,
    pub fields:            Vec<FieldSummary>,
    pub join_histogram:    Vec<HistogramBin>,
    pub records:           Vec<AnnotatedRecord>,
}

/// `£12,345.67`-style amount with thousands separators.
pub fn format_currency(amount: f64, symbol: &str, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, amount.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(f) => format!("{sign}{symbol}{grouped}.{f}"),
        None => format!("{sign}{symbol}{grouped}"),
    }
}

/// `12.3%`-style rate from a 0..1 fraction.
pub fn format_percent(rate: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, rate * 100.0)
}
