//! Synthetic user data for demos and tests.
//!
//! Join dates fall in the year before the as-of date, last logins
//! between join and as-of (a share of players go quiet early), games
//! played spread over 1..=300, and deposits grow with games played
//! plus a heavy-tailed top-up.

use crate::{clock::AsOf, record::UserRecord, rng::SampleRng};
use chrono::Duration;

pub const SAMPLE_HISTORY_DAYS: i64 = 365;
pub const MAX_SAMPLE_GAMES: i64 = 300;

/// Share of players whose last login lands in their first weeks.
const EARLY_DROPOUT_RATE: f64 = 0.20;

pub struct SampleGenerator {
    rng:   SampleRng,
    as_of: AsOf,
}

impl SampleGenerator {
    pub fn new(seed: u64, as_of: AsOf) -> Self {
        Self { rng: SampleRng::new(seed), as_of }
    }

    pub fn generate(&mut self, rows: usize) -> Vec<UserRecord> {
        let records: Vec<UserRecord> = (1..=rows).map(|i| self.generate_one(i)).collect();
        log::debug!("sample: generated {} records as_of={}", records.len(), self.as_of);
        records
    }

    fn generate_one(&mut self, n: usize) -> UserRecord {
        let now = self.as_of.timestamp();
        let rng = &mut self.rng;

        let joined_days_ago = rng.range_inclusive(1, SAMPLE_HISTORY_DAYS);
        let date_joined = now - Duration::days(joined_days_ago)
            + Duration::minutes(rng.range_inclusive(0, 24 * 60 - 1));

        let active_span = if rng.chance(EARLY_DROPOUT_RATE) {
            rng.range_inclusive(0, joined_days_ago.min(21))
        } else {
            rng.range_inclusive(0, joined_days_ago - 1)
        };
        let last_login_date = (date_joined + Duration::days(active_span)).min(now);

        let total_games_played = rng.range_inclusive(1, MAX_SAMPLE_GAMES);
        let per_game = rng.uniform(1.5, 4.0);
        let top_up = rng.pareto(5.0, 2.2);
        let total_deposit = ((total_games_played as f64 * per_game + top_up) * 100.0).round() / 100.0;

        UserRecord {
            customer_id: format!("C{n:05}"),
            date_joined,
            last_login_date,
            total_deposit,
            total_games_played,
        }
    }
}
