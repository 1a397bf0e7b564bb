//! Typed rows flowing through the pipeline.
//!
//! `UserRecord`: one validated input row (loader output).
//! `DerivedRecord`: `UserRecord` + lifetime/revenue fields (derivation output).
//! `AnnotatedRecord`: `DerivedRecord` + churn status + quartile label.
//!
//! Each stage builds a new value; nothing is mutated after creation.

use crate::{
    churn_tagger::ChurnStatus,
    quartile_bucketer::Quartile,
    types::{CustomerId, Days},
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    pub customer_id:        CustomerId,
    pub date_joined:        NaiveDateTime,
    pub last_login_date:    NaiveDateTime,
    pub total_deposit:      f64,
    pub total_games_played: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DerivedRecord {
    #[serde(flatten)]
    pub user:            UserRecord,
    pub lifetime_days:   Days,
    pub lifetime_months: f64,
    pub monthly_revenue: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnnotatedRecord {
    #[serde(flatten)]
    pub derived:        DerivedRecord,
    pub churned:        ChurnStatus,
    pub games_quartile: Quartile,
}
