//! Interactive dashboard: a line-oriented JSON session.
//!
//! Each input line holds one `DashboardCommand`; each command except
//! `quit` writes exactly one JSON reply line. A failing command replies
//! `{"error": ...}` and leaves the session as it was.
//!
//! The session owns the dataset and the two controls (as-of date,
//! churn cutoff). Every recompute passes them to the pipeline
//! explicitly.

use crate::{
    clock::AsOf,
    command::DashboardCommand,
    config::AnalysisConfig,
    derivation::LifetimeBasis,
    describe::FieldSummary,
    error::AnalyticsResult,
    loader::load_records,
    pipeline::Pipeline,
    quartile_bucketer::Quartile,
    record::{AnnotatedRecord, UserRecord},
    report::{format_currency, AnalysisReport},
};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuartileBar {
    pub quartile:     Quartile,
    pub mean_deposit: Option<f64>,
}

/// The summary cards plus the quartile chart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardState {
    pub as_of:           AsOf,
    pub cutoff_days:     u32,
    pub cohort_size:     usize,
    pub avg_clv:         f64,
    pub avg_clv_display: String,
    pub inactive:        usize,
    pub churn_rate:      f64,
    pub quartiles:       Vec<QuartileBar>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DashboardReply {
    State(DashboardState),
    FieldSummary { fields: Vec<FieldSummary> },
    RawData { records: Vec<AnnotatedRecord> },
}

pub struct DashboardSession {
    records: Vec<UserRecord>,
    config:  AnalysisConfig,
    report:  AnalysisReport,
}

impl DashboardSession {
    /// The dashboard always measures lifetime up to the as-of date.
    pub fn new(records: Vec<UserRecord>, config: AnalysisConfig) -> AnalyticsResult<Self> {
        let config = config.with_basis(LifetimeBasis::AsOf);
        let report = Pipeline::new(&config).run(&records)?;
        Ok(Self { records, config, report })
    }

    pub fn open(path: &str, config: AnalysisConfig) -> AnalyticsResult<Self> {
        let records = load_records(path)?;
        Self::new(records, config)
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn report(&self) -> &AnalysisReport {
        &self.report
    }

    pub fn state(&self) -> DashboardState {
        let r = &self.report;
        DashboardState {
            as_of: r.as_of,
            cutoff_days: r.churn_cutoff_days,
            cohort_size: r.cohort_size,
            avg_clv: r.clv.avg_clv,
            avg_clv_display: format_currency(r.clv.avg_clv, &self.config.currency_symbol, 0),
            inactive: r.churn.churned_count,
            churn_rate: r.churn.churn_rate,
            quartiles: r
                .quartiles
                .buckets
                .iter()
                .map(|b| QuartileBar { quartile: b.quartile, mean_deposit: b.mean_deposit })
                .collect(),
        }
    }

    /// Apply one command. `Ok(None)` means the session is over.
    pub fn handle(&mut self, command: DashboardCommand) -> AnalyticsResult<Option<DashboardReply>> {
        let reply = match command {
            DashboardCommand::Quit => return Ok(None),
            DashboardCommand::GetState => DashboardReply::State(self.state()),
            DashboardCommand::SetAsOf { date } => {
                let mut config = self.config.clone();
                config.as_of = AsOf::new(date);
                self.recompute(self.records.clone(), config)?;
                DashboardReply::State(self.state())
            }
            DashboardCommand::SetCutoff { days } => {
                let config = self.config.clone().with_cutoff(days);
                self.recompute(self.records.clone(), config)?;
                DashboardReply::State(self.state())
            }
            DashboardCommand::Load { path } => {
                let records = load_records(&path)?;
                self.recompute(records, self.config.clone())?;
                DashboardReply::State(self.state())
            }
            DashboardCommand::FieldSummary => DashboardReply::FieldSummary {
                fields: self.report.fields.clone(),
            },
            DashboardCommand::RawData => DashboardReply::RawData {
                records: self.report.records.clone(),
            },
        };
        Ok(Some(reply))
    }

    /// Swap in new data or controls only if the pipeline succeeds on them.
    fn recompute(&mut self, records: Vec<UserRecord>, config: AnalysisConfig) -> AnalyticsResult<()> {
        let report = Pipeline::new(&config).run(&records)?;
        log::info!(
            "dashboard: recomputed as_of={} cutoff={}d rows={}",
            config.as_of,
            config.churn_cutoff_days,
            records.len()
        );
        self.records = records;
        self.config = config;
        self.report = report;
        Ok(())
    }
}

/// Drive a session until `quit` or end of input.
pub fn run_dashboard<R: BufRead, W: Write>(
    session: &mut DashboardSession,
    input: R,
    mut output: W,
) -> anyhow::Result<()> {
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let command: DashboardCommand = match serde_json::from_str(&line) {
            Ok(c) => c,
            Err(e) => {
                write_error(&mut output, &e.to_string())?;
                continue;
            }
        };

        match session.handle(command) {
            Ok(None) => break,
            Ok(Some(reply)) => {
                writeln!(output, "{}", serde_json::to_string(&reply)?)?;
            }
            Err(e) => {
                log::warn!("dashboard command failed: {e}");
                write_error(&mut output, &e.to_string())?;
            }
        }
        output.flush()?;
    }
    output.flush()?;
    Ok(())
}

fn write_error<W: Write>(output: &mut W, message: &str) -> anyhow::Result<()> {
    let err_json = serde_json::json!({ "error": message });
    writeln!(output, "{err_json}")?;
    output.flush()?;
    Ok(())
}
