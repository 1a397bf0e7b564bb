//! Derivation: per-row lifetime and revenue-rate fields.
//!
//! lifetime_days   = whole days from date_joined to the lifetime end, floored at 1
//! lifetime_months = lifetime_days / 30
//! monthly_revenue = total_deposit / lifetime_months
//!
//! The floor keeps monthly_revenue finite for same-day sign-ups.

use crate::{
    clock::AsOf,
    record::{DerivedRecord, UserRecord},
    types::{Days, DAYS_PER_MONTH},
};
use serde::{Deserialize, Serialize};

/// Which timestamp ends a customer's lifetime.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LifetimeBasis {
    /// Lifetime runs to the as-of date (dashboard).
    #[default]
    AsOf,
    /// Lifetime runs to the customer's last login (batch report).
    LastLogin,
}

pub fn derive_record(user: &UserRecord, as_of: AsOf, basis: LifetimeBasis) -> DerivedRecord {
    let raw_days: Days = match basis {
        LifetimeBasis::AsOf => as_of.days_since(user.date_joined),
        LifetimeBasis::LastLogin => (user.last_login_date - user.date_joined).num_days(),
    };
    let lifetime_days = raw_days.max(1);
    let lifetime_months = lifetime_days as f64 / DAYS_PER_MONTH;

    DerivedRecord {
        user: user.clone(),
        lifetime_days,
        lifetime_months,
        monthly_revenue: user.total_deposit / lifetime_months,
    }
}

pub fn derive_records(users: &[UserRecord], as_of: AsOf, basis: LifetimeBasis) -> Vec<DerivedRecord> {
    let derived: Vec<DerivedRecord> = users
        .iter()
        .map(|u| derive_record(u, as_of, basis))
        .collect();
    log::debug!(
        "derivation: {} records, as_of={as_of}, basis={basis:?}",
        derived.len()
    );
    derived
}
