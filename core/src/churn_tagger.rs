//! Churn tagger: a pure predicate per record.
//!
//! churned  ⇔  last_login_date < as_of − cutoff_days
//!
//! The comparison is strict: a last login exactly `cutoff_days`
//! before the as-of date still counts as active.

use crate::{
    clock::AsOf,
    error::{AnalyticsError, AnalyticsResult},
    metric::Metric,
    record::DerivedRecord,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChurnStatus {
    Active,
    Churned,
}

impl ChurnStatus {
    pub fn is_churned(&self) -> bool {
        matches!(self, Self::Churned)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChurnSummary {
    pub cutoff_days:   u32,
    pub cutoff:        NaiveDateTime,
    pub churned_count: usize,
    pub total:         usize,
    pub churn_rate:    f64,
    /// Index-aligned with the table the tagger ran over.
    #[serde(skip)]
    pub statuses:      Vec<ChurnStatus>,
}

#[derive(Debug, Clone, Copy)]
pub struct ChurnTagger {
    as_of:       AsOf,
    cutoff_days: u32,
}

impl ChurnTagger {
    pub fn new(as_of: AsOf, cutoff_days: u32) -> Self {
        Self { as_of, cutoff_days }
    }

    pub fn cutoff(&self) -> NaiveDateTime {
        self.as_of.minus_days(self.cutoff_days as i64)
    }

    pub fn status_of(&self, last_login: NaiveDateTime) -> ChurnStatus {
        if last_login < self.cutoff() {
            ChurnStatus::Churned
        } else {
            ChurnStatus::Active
        }
    }
}

impl Metric for ChurnTagger {
    type Output = ChurnSummary;

    fn name(&self) -> &'static str { "churn" }

    fn compute(&self, table: &[DerivedRecord]) -> AnalyticsResult<ChurnSummary> {
        if table.is_empty() {
            return Err(AnalyticsError::EmptyDataset);
        }
        let cutoff = self.cutoff();
        let statuses: Vec<ChurnStatus> = table
            .iter()
            .map(|r| self.status_of(r.user.last_login_date))
            .collect();
        let churned_count = statuses.iter().filter(|s| s.is_churned()).count();
        let total = table.len();

        log::debug!(
            "churn: cutoff={cutoff} churned={churned_count}/{total}"
        );
        Ok(ChurnSummary {
            cutoff_days: self.cutoff_days,
            cutoff,
            churned_count,
            total,
            churn_rate: churned_count as f64 / total as f64,
            statuses,
        })
    }
}
