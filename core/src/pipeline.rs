//! The metrics pipeline.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Derivation      lifetime + monthly revenue per record
//!   2. CLV estimator
//!   3. Churn tagger
//!   4. Quartile bucketer
//!   5. Annotation      derived record + churn status + quartile
//!   6. Describe table and join-date histogram
//!
//! RULES:
//!   - Metrics read the derived table only; none sees another's output.
//!   - The as-of timestamp is passed in; nothing reads the wall clock.
//!   - Any error aborts the run. A report holds every metric or none.

use crate::{
    churn_tagger::ChurnTagger,
    clv_estimator::ClvEstimator,
    config::AnalysisConfig,
    derivation::derive_records,
    describe::{describe, join_date_histogram},
    error::{AnalyticsError, AnalyticsResult},
    loader::load_records,
    metric::Metric,
    quartile_bucketer::QuartileBucketer,
    record::{AnnotatedRecord, DerivedRecord, UserRecord},
    report::AnalysisReport,
};
use std::path::Path;

pub struct Pipeline<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, records: &[UserRecord]) -> AnalyticsResult<AnalysisReport> {
        self.config.validate()?;
        if records.is_empty() {
            return Err(AnalyticsError::EmptyDataset);
        }

        let config = self.config;
        log::info!(
            "pipeline: {} records, as_of={}, cutoff={}d, basis={:?}",
            records.len(),
            config.as_of,
            config.churn_cutoff_days,
            config.lifetime_basis,
        );

        let derived = derive_records(records, config.as_of, config.lifetime_basis);

        let clv = run_metric(&ClvEstimator, &derived)?;
        let churn = run_metric(&ChurnTagger::new(config.as_of, config.churn_cutoff_days), &derived)?;
        let quartiles = run_metric(&QuartileBucketer, &derived)?;

        let annotated: Vec<AnnotatedRecord> = derived
            .into_iter()
            .zip(churn.statuses.iter().copied())
            .zip(quartiles.assignments.iter().copied())
            .map(|((derived, churned), games_quartile)| AnnotatedRecord {
                derived,
                churned,
                games_quartile,
            })
            .collect();

        let fields = describe(&annotated);
        let join_histogram = join_date_histogram(records, config.histogram_bins);

        log::info!(
            "pipeline: clv={:.2} churned={}/{} non_empty_quartiles={}",
            clv.avg_clv,
            churn.churned_count,
            churn.total,
            quartiles.non_empty_buckets(),
        );

        Ok(AnalysisReport {
            as_of: config.as_of,
            churn_cutoff_days: config.churn_cutoff_days,
            lifetime_basis: config.lifetime_basis,
            cohort_size: records.len(),
            clv,
            churn,
            quartiles,
            fields,
            join_histogram,
            records: annotated,
        })
    }
}

fn run_metric<M: Metric>(metric: &M, table: &[DerivedRecord]) -> AnalyticsResult<M::Output> {
    log::debug!("metric '{}' over {} rows", metric.name(), table.len());
    metric.compute(table)
}

/// Load `path` and run the pipeline over it.
pub fn analyze_file(path: impl AsRef<Path>, config: &AnalysisConfig) -> AnalyticsResult<AnalysisReport> {
    config.validate()?;
    let records = load_records(path)?;
    Pipeline::new(config).run(&records)
}
