//! Analysis clock: the explicit "as-of" reference timestamp.
//!
//! RULE: Nothing in the pipeline reads the wall clock.
//! Every time-based calculation receives an `AsOf` argument,
//! resolved once at the CLI edge.

use crate::{
    error::{AnalyticsError, AnalyticsResult},
    types::Days,
};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct AsOf {
    pub date: NaiveDate,
}

impl AsOf {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }

    /// Parse a `YYYY-MM-DD` date.
    pub fn parse(s: &str) -> AnalyticsResult<Self> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Self::new)
            .map_err(|e| AnalyticsError::InvalidConfig(format!("as-of date '{s}': {e}")))
    }

    /// Midnight at the start of the as-of date.
    pub fn timestamp(&self) -> NaiveDateTime {
        self.date.and_time(NaiveTime::MIN)
    }

    /// The instant `days` whole days before the as-of timestamp.
    pub fn minus_days(&self, days: Days) -> NaiveDateTime {
        self.timestamp() - Duration::days(days)
    }

    /// Whole days from `earlier` to the as-of timestamp.
    /// Negative when `earlier` lies after the as-of date.
    pub fn days_since(&self, earlier: NaiveDateTime) -> Days {
        (self.timestamp() - earlier).num_days()
    }
}

impl std::fmt::Display for AsOf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.date.format("%Y-%m-%d"))
    }
}
