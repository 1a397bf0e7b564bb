//! Shared primitive types used across the entire pipeline.

/// A stable, unique identifier for one customer row.
pub type CustomerId = String;

/// A whole number of calendar days.
pub type Days = i64;

/// Days in one "month" for lifetime and revenue-rate maths.
pub const DAYS_PER_MONTH: f64 = 30.0;
