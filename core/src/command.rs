use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// All dashboard commands, one JSON object per input line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DashboardCommand {
    // ── Session ──────────────────────────────────
    GetState,
    Quit,

    // ── Controls ─────────────────────────────────
    SetAsOf { date: NaiveDate },
    SetCutoff { days: u32 },

    // ── Data ─────────────────────────────────────
    Load { path: String },
    FieldSummary,
    RawData,
}
