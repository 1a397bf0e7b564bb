//! cohort-core: customer-analytics metrics over a table of user records.
//!
//! Loader → Derivation → {CLV, Churn, Quartile} → Report.

pub mod churn_tagger;
pub mod clock;
pub mod clv_estimator;
pub mod command;
pub mod config;
pub mod dashboard;
pub mod derivation;
pub mod describe;
pub mod error;
pub mod loader;
pub mod metric;
pub mod pipeline;
pub mod quartile_bucketer;
pub mod record;
pub mod report;
pub mod rng;
pub mod sample;
pub mod types;
