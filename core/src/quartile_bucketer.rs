//! Quartile bucketer: engagement (games played) vs. spend (deposit).
//!
//! Edges are the 0/25/50/75/100th percentiles of total_games_played,
//! linearly interpolated between closest ranks.
//!
//!   Q1 = [e0, e1]   Q2 = (e1, e2]   Q3 = (e2, e3]   Q4 = (e3, e4]
//!
//! Each record goes to the first quartile whose interval holds its value.
//! Tied edges leave the later quartile with an empty interval: it keeps its
//! label, gets no members and reports `mean_deposit = None`. Labels are
//! never renumbered, so Q4 always means "top engagement".

use crate::{
    error::{AnalyticsError, AnalyticsResult},
    metric::Metric,
    record::DerivedRecord,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Quartile {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quartile {
    pub const ALL: [Quartile; 4] = [Quartile::Q1, Quartile::Q2, Quartile::Q3, Quartile::Q4];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Q1 => "Q1",
            Self::Q2 => "Q2",
            Self::Q3 => "Q3",
            Self::Q4 => "Q4",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for Quartile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The five percentile edges e0..e4.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct QuartileEdges(pub [f64; 5]);

impl QuartileEdges {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let mut edges = [0.0; 5];
        for (i, edge) in edges.iter_mut().enumerate() {
            *edge = quantile(&sorted, i as f64 / 4.0)?;
        }
        Some(Self(edges))
    }

    pub fn assign(&self, value: f64) -> Quartile {
        let e = &self.0;
        Quartile::ALL
            .into_iter()
            .find(|q| value <= e[q.index() + 1])
            .unwrap_or(Quartile::Q4)
    }

    /// `(lower, upper)` of a quartile's interval.
    pub fn bounds(&self, q: Quartile) -> (f64, f64) {
        (self.0[q.index()], self.0[q.index() + 1])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuartileBucket {
    pub quartile:     Quartile,
    pub lower:        f64,
    pub upper:        f64,
    pub population:   usize,
    pub mean_deposit: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuartileSummary {
    pub edges:   QuartileEdges,
    /// Always four entries, Q1..Q4.
    pub buckets: Vec<QuartileBucket>,
    /// Index-aligned with the table the bucketer ran over.
    #[serde(skip)]
    pub assignments: Vec<Quartile>,
}

impl QuartileSummary {
    /// Number of quartiles with at least one member (1..=4).
    pub fn non_empty_buckets(&self) -> usize {
        self.buckets.iter().filter(|b| b.population > 0).count()
    }

    pub fn bucket(&self, q: Quartile) -> Option<&QuartileBucket> {
        self.buckets.iter().find(|b| b.quartile == q)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct QuartileBucketer;

impl Metric for QuartileBucketer {
    type Output = QuartileSummary;

    fn name(&self) -> &'static str { "quartile" }

    fn compute(&self, table: &[DerivedRecord]) -> AnalyticsResult<QuartileSummary> {
        let games: Vec<f64> = table
            .iter()
            .map(|r| r.user.total_games_played as f64)
            .collect();
        let edges = QuartileEdges::from_values(&games).ok_or(AnalyticsError::EmptyDataset)?;

        let assignments: Vec<Quartile> = games.iter().map(|g| edges.assign(*g)).collect();

        let mut sums = [0.0_f64; 4];
        let mut counts = [0_usize; 4];
        for (record, q) in table.iter().zip(&assignments) {
            sums[q.index()] += record.user.total_deposit;
            counts[q.index()] += 1;
        }

        let buckets = Quartile::ALL
            .into_iter()
            .map(|q| {
                let (lower, upper) = edges.bounds(q);
                let population = counts[q.index()];
                QuartileBucket {
                    quartile: q,
                    lower,
                    upper,
                    population,
                    mean_deposit: (population > 0).then(|| sums[q.index()] / population as f64),
                }
            })
            .collect();

        let summary = QuartileSummary { edges, buckets, assignments };
        log::debug!(
            "quartile: edges={:?} non_empty={}",
            summary.edges.0,
            summary.non_empty_buckets()
        );
        Ok(summary)
    }
}

/// Linear-interpolation quantile of an ascending slice. `None` when empty.
pub fn quantile(sorted: &[f64], p: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let pos = p.clamp(0.0, 1.0) * last as f64;
    let lo = pos.floor() as usize;
    let hi = (lo + 1).min(last);
    let frac = pos - lo as f64;
    Some(sorted[lo] + frac * (sorted[hi] - sorted[lo]))
}
