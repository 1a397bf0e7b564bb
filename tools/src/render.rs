//! Text presentation: console summary block and markdown describe table.

use cohort_core::{
    describe::FieldSummary,
    report::{format_currency, format_percent, AnalysisReport},
};
use comfy_table::{presets::ASCII_MARKDOWN, Table};

pub const RULE: &str = "------------------------------------------------------------";

pub fn console_block(report: &AnalysisReport, currency_symbol: &str) -> String {
    let churn = &report.churn;
    let mut lines = vec![
        RULE.to_string(),
        format!("As of: {}", report.as_of),
        format!(
            "Average CLV: {}",
            format_currency(report.clv.avg_clv, currency_symbol, 2)
        ),
        format!(
            "Churned users (>{} days inactive): {} of {} ({})",
            churn.cutoff_days,
            churn.churned_count,
            churn.total,
            format_percent(churn.churn_rate, 1)
        ),
        "Average deposit by games-played quartile:".to_string(),
    ];
    for bucket in &report.quartiles.buckets {
        let deposit = bucket
            .mean_deposit
            .map(|d| format_currency(d, currency_symbol, 2))
            .unwrap_or_else(|| "n/a".to_string());
        lines.push(format!(
            "  {}  games {:>8.2}..{:<8.2} players {:>5}  avg deposit {}",
            bucket.quartile, bucket.lower, bucket.upper, bucket.population, deposit
        ));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

pub fn markdown_table(fields: &[FieldSummary]) -> String {
    let mut table = Table::new();
    table.load_preset(ASCII_MARKDOWN);
    table.set_header(FieldSummary::COLUMNS.to_vec());
    for field in fields {
        table.add_row(field.cells());
    }
    table.to_string()
}
