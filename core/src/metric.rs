//! Metric trait.
//!
//! RULE: Every metric implements Metric.
//! Metrics are read-only over the derived table and independent of
//! each other; the pipeline calls them in a fixed order documented
//! in pipeline.rs.

use crate::{error::AnalyticsResult, record::DerivedRecord};

pub trait Metric {
    type Output;

    /// Unique stable name for this metric.
    fn name(&self) -> &'static str;

    /// Compute over the full derived table.
    /// An empty table is an error, never a NaN result.
    fn compute(&self, table: &[DerivedRecord]) -> AnalyticsResult<Self::Output>;
}
