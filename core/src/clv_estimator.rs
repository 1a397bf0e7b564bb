//! CLV estimator.
//!
//! Average CLV = avg monthly revenue per customer × avg customer lifetime (months).
//! The product is taken of the two means, not averaged per customer.

use crate::{
    error::{AnalyticsError, AnalyticsResult},
    metric::Metric,
    record::DerivedRecord,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ClvEstimate {
    pub avg_monthly_revenue: f64,
    pub avg_lifetime_months: f64,
    pub avg_clv:             f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ClvEstimator;

impl Metric for ClvEstimator {
    type Output = ClvEstimate;

    fn name(&self) -> &'static str { "clv" }

    fn compute(&self, table: &[DerivedRecord]) -> AnalyticsResult<ClvEstimate> {
        if table.is_empty() {
            return Err(AnalyticsError::EmptyDataset);
        }
        let n = table.len() as f64;
        let avg_monthly_revenue = table.iter().map(|r| r.monthly_revenue).sum::<f64>() / n;
        let avg_lifetime_months = table.iter().map(|r| r.lifetime_months).sum::<f64>() / n;

        let estimate = ClvEstimate {
            avg_monthly_revenue,
            avg_lifetime_months,
            avg_clv: avg_monthly_revenue * avg_lifetime_months,
        };
        log::debug!(
            "clv: revenue/month={:.4} lifetime_months={:.4} clv={:.4}",
            estimate.avg_monthly_revenue,
            estimate.avg_lifetime_months,
            estimate.avg_clv,
        );
        Ok(estimate)
    }
}
