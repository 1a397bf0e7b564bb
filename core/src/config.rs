//! Analysis configuration: the two dashboard controls plus report knobs.
//!
//! Defaults match the batch report. A JSON file may override any field;
//! CLI flags override the file. `validate()` runs before every pipeline run.

use crate::{
    clock::AsOf,
    derivation::LifetimeBasis,
    error::{AnalyticsError, AnalyticsResult},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const MIN_CUTOFF_DAYS: u32 = 7;
pub const MAX_CUTOFF_DAYS: u32 = 90;
pub const DEFAULT_CUTOFF_DAYS: u32 = 30;
pub const DEFAULT_HISTOGRAM_BINS: usize = 6;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    pub as_of:             AsOf,
    pub churn_cutoff_days: u32,
    pub lifetime_basis:    LifetimeBasis,
    pub histogram_bins:    usize,
    pub currency_symbol:   String,
}

/// On-disk shape: every field optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct AnalysisConfigFile {
    as_of:             Option<String>,
    churn_cutoff_days: Option<u32>,
    lifetime_basis:    Option<LifetimeBasis>,
    histogram_bins:    Option<usize>,
    currency_symbol:   Option<String>,
}

impl AnalysisConfig {
    pub fn new(as_of: AsOf) -> Self {
        Self {
            as_of,
            churn_cutoff_days: DEFAULT_CUTOFF_DAYS,
            lifetime_basis: LifetimeBasis::AsOf,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            currency_symbol: "£".to_string(),
        }
    }

    /// Load from a JSON file. Fields absent from the file keep the
    /// defaults of `AnalysisConfig::new(as_of)`.
    pub fn load(path: &str, as_of: AsOf) -> AnalyticsResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AnalyticsError::Load {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        let file: AnalysisConfigFile = serde_json::from_str(&content)?;

        let mut config = Self::new(as_of);
        if let Some(date) = file.as_of.as_deref() {
            config.as_of = AsOf::parse(date)?;
        }
        if let Some(days) = file.churn_cutoff_days {
            config.churn_cutoff_days = days;
        }
        if let Some(basis) = file.lifetime_basis {
            config.lifetime_basis = basis;
        }
        if let Some(bins) = file.histogram_bins {
            config.histogram_bins = bins;
        }
        if let Some(symbol) = file.currency_symbol {
            config.currency_symbol = symbol;
        }
        Ok(config)
    }

    /// Config pinned to 2025-07-04 for use in tests.
    pub fn default_test() -> Self {
        let date = NaiveDate::from_ymd_opt(2025, 7, 4).expect("valid date");
        Self::new(AsOf::new(date))
    }

    pub fn with_cutoff(mut self, days: u32) -> Self {
        self.churn_cutoff_days = days;
        self
    }

    pub fn with_basis(mut self, basis: LifetimeBasis) -> Self {
        self.lifetime_basis = basis;
        self
    }

    pub fn validate(&self) -> AnalyticsResult<()> {
        if !(MIN_CUTOFF_DAYS..=MAX_CUTOFF_DAYS).contains(&self.churn_cutoff_days) {
            return Err(AnalyticsError::InvalidConfig(format!(
                "churn cutoff must be between {MIN_CUTOFF_DAYS} and {MAX_CUTOFF_DAYS} days, got {}",
                self.churn_cutoff_days
            )));
        }
        if self.histogram_bins == 0 {
            return Err(AnalyticsError::InvalidConfig(
                "histogram needs at least one bin".to_string(),
            ));
        }
        Ok(())
    }
}
