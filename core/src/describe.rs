//! Descriptive statistics and chart data over the annotated table.
//!
//! `describe` mirrors a dataframe `describe(include="all")`: numeric
//! fields get count/mean/std/min/quartiles/max, date fields the same
//! minus std, the churn flag gets count/unique/top/freq. Numbers are
//! rounded to 2 decimals.

use crate::{
    quartile_bucketer::quantile,
    record::{AnnotatedRecord, UserRecord},
};
use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One row of the describe table. Absent statistics are `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FieldSummary {
    pub field:  String,
    pub count:  usize,
    pub unique: Option<usize>,
    pub top:    Option<String>,
    pub freq:   Option<usize>,
    pub mean:   Option<String>,
    pub std:    Option<String>,
    pub min:    Option<String>,
    pub p25:    Option<String>,
    pub p50:    Option<String>,
    pub p75:    Option<String>,
    pub max:    Option<String>,
}

impl FieldSummary {
    /// Header labels in display order.
    pub const COLUMNS: [&'static str; 12] = [
        "field", "count", "unique", "top", "freq", "mean", "std", "min", "25%", "50%", "75%",
        "max",
    ];

    /// Cells in `COLUMNS` order; absent values render as empty strings.
    pub fn cells(&self) -> Vec<String> {
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();
        let opt_n = |v: &Option<usize>| v.map(|n| n.to_string()).unwrap_or_default();
        vec![
            self.field.clone(),
            self.count.to_string(),
            opt_n(&self.unique),
            opt(&self.top),
            opt_n(&self.freq),
            opt(&self.mean),
            opt(&self.std),
            opt(&self.min),
            opt(&self.p25),
            opt(&self.p50),
            opt(&self.p75),
            opt(&self.max),
        ]
    }
}

pub fn describe(records: &[AnnotatedRecord]) -> Vec<FieldSummary> {
    vec![
        date_summary("date_joined", records.iter().map(|r| r.derived.user.date_joined)),
        date_summary("last_login_date", records.iter().map(|r| r.derived.user.last_login_date)),
        numeric_summary("total_deposit", records.iter().map(|r| r.derived.user.total_deposit)),
        numeric_summary(
            "total_games_played",
            records.iter().map(|r| r.derived.user.total_games_played as f64),
        ),
        numeric_summary("lifetime_days", records.iter().map(|r| r.derived.lifetime_days as f64)),
        numeric_summary("lifetime_months", records.iter().map(|r| r.derived.lifetime_months)),
        numeric_summary("monthly_revenue", records.iter().map(|r| r.derived.monthly_revenue)),
        churn_summary(records),
    ]
}

fn numeric_summary(field: &str, values: impl Iterator<Item = f64>) -> FieldSummary {
    let mut sorted: Vec<f64> = values.collect();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    let stats = Stats::of(&sorted);
    let fmt = |v: Option<f64>| v.map(round2);

    FieldSummary {
        field: field.to_string(),
        count: n,
        mean: fmt(stats.mean),
        std: fmt(stats.std),
        min: fmt(sorted.first().copied()),
        p25: fmt(quantile(&sorted, 0.25)),
        p50: fmt(quantile(&sorted, 0.50)),
        p75: fmt(quantile(&sorted, 0.75)),
        max: fmt(sorted.last().copied()),
        ..FieldSummary::default()
    }
}

fn date_summary(field: &str, values: impl Iterator<Item = NaiveDateTime>) -> FieldSummary {
    let mut seconds: Vec<f64> = values.map(|dt| dt.and_utc().timestamp() as f64).collect();
    seconds.sort_by(f64::total_cmp);
    let stats = Stats::of(&seconds);
    let fmt = |v: Option<f64>| v.and_then(format_timestamp);

    FieldSummary {
        field: field.to_string(),
        count: seconds.len(),
        mean: fmt(stats.mean),
        min: fmt(seconds.first().copied()),
        p25: fmt(quantile(&seconds, 0.25)),
        p50: fmt(quantile(&seconds, 0.50)),
        p75: fmt(quantile(&seconds, 0.75)),
        max: fmt(seconds.last().copied()),
        ..FieldSummary::default()
    }
}

fn churn_summary(records: &[AnnotatedRecord]) -> FieldSummary {
    let churned = records.iter().filter(|r| r.churned.is_churned()).count();
    let active = records.len() - churned;
    let unique = usize::from(churned > 0) + usize::from(active > 0);
    // Ties resolve to "false", the first value a dataframe would see sorted.
    let (top, freq) = if churned > active {
        ("true", churned)
    } else {
        ("false", active)
    };

    FieldSummary {
        field: "churned".to_string(),
        count: records.len(),
        unique: Some(unique),
        top: (!records.is_empty()).then(|| top.to_string()),
        freq: (!records.is_empty()).then_some(freq),
        ..FieldSummary::default()
    }
}

struct Stats {
    mean: Option<f64>,
    std:  Option<f64>,
}

impl Stats {
    fn of(values: &[f64]) -> Self {
        let n = values.len();
        if n == 0 {
            return Self { mean: None, std: None };
        }
        let mean = values.iter().sum::<f64>() / n as f64;
        let std = (n > 1).then(|| {
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
            var.sqrt()
        });
        Self { mean: Some(mean), std }
    }
}

fn round2(v: f64) -> String {
    format!("{v:.2}")
}

fn format_timestamp(seconds: f64) -> Option<String> {
    DateTime::from_timestamp(seconds.round() as i64, 0)
        .map(|dt| dt.naive_utc().format("%Y-%m-%d %H:%M:%S").to_string())
}

// ── Join-date histogram ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistogramBin {
    pub start: NaiveDateTime,
    pub end:   NaiveDateTime,
    pub count: usize,
}

/// Split [min, max] of date_joined into `bins` equal-width intervals.
/// Every interval is half-open except the last, which also holds max.
pub fn join_date_histogram(records: &[UserRecord], bins: usize) -> Vec<HistogramBin> {
    let Some(min) = records.iter().map(|r| r.date_joined).min() else {
        return Vec::new();
    };
    let Some(max) = records.iter().map(|r| r.date_joined).max() else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }
    if min == max {
        return vec![HistogramBin { start: min, end: max, count: records.len() }];
    }

    let span = (max - min).num_seconds() as f64;
    let width = span / bins as f64;
    let edge = |i: usize| min + chrono::Duration::seconds((width * i as f64).round() as i64);

    let mut counts = vec![0_usize; bins];
    for r in records {
        let offset = (r.date_joined - min).num_seconds() as f64;
        let idx = ((offset / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: edge(i),
            end: if i + 1 == bins { max } else { edge(i + 1) },
            count,
        })
        .collect()
}
