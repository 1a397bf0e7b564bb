use chrono::NaiveDate;
use cohort_core::{
    clock::AsOf,
    command::DashboardCommand,
    config::AnalysisConfig,
    dashboard::{run_dashboard, DashboardReply, DashboardSession},
    loader::write_csv,
    sample::SampleGenerator,
};
use serde_json::Value;
use std::io::Cursor;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn as_of() -> AsOf {
    AsOf::new(NaiveDate::from_ymd_opt(2025, 7, 4).unwrap())
}

fn make_session(seed: u64, rows: usize) -> DashboardSession {
    let records = SampleGenerator::new(seed, as_of()).generate(rows);
    DashboardSession::new(records, AnalysisConfig::default_test()).unwrap()
}

fn run_lines(session: &mut DashboardSession, lines: &[&str]) -> Vec<Value> {
    let input = Cursor::new(lines.join("\n"));
    let mut output = Vec::new();
    run_dashboard(session, input, &mut output).unwrap();
    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn state_reports_the_three_cards_and_quartile_bars() {
    let session = make_session(3, 100);

    let state = session.state();

    assert_eq!(state.cohort_size, 100);
    assert_eq!(state.cutoff_days, 30);
    assert_eq!(state.as_of, as_of());
    assert!(state.avg_clv_display.starts_with('£'));
    assert!(!state.avg_clv_display.contains('.'), "whole currency units only");
    assert!(state.inactive <= state.cohort_size);
    assert_eq!(state.quartiles.len(), 4);
}

#[test]
fn cutoff_control_recomputes_churn() {
    let mut session = make_session(8, 150);
    let before = session.state().inactive;

    let reply = session
        .handle(DashboardCommand::SetCutoff { days: 7 })
        .unwrap()
        .unwrap();

    let DashboardReply::State(after) = reply else {
        panic!("expected state reply");
    };
    assert_eq!(after.cutoff_days, 7);
    assert!(after.inactive >= before, "shorter cutoff cannot reduce churn");
}

#[test]
fn as_of_control_moves_the_reference_date() {
    let mut session = make_session(8, 150);
    let later = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();

    session.handle(DashboardCommand::SetAsOf { date: later }).unwrap();

    let state = session.state();
    assert_eq!(state.as_of, AsOf::new(later));
    // Nobody logged in after the original as-of date, so by year end
    // every player is past a 30-day cutoff.
    assert_eq!(state.inactive, state.cohort_size);
}

#[test]
fn session_protocol_replies_once_per_command_until_quit() {
    let mut session = make_session(21, 50);

    let replies = run_lines(
        &mut session,
        &[
            r#"{"type":"get_state"}"#,
            r#"{"type":"set_cutoff","days":120}"#,
            r#"{"type":"set_cutoff","days":60}"#,
            "not json",
            "",
            r#"{"type":"set_as_of","date":"2025-08-01"}"#,
            r#"{"type":"field_summary"}"#,
            r#"{"type":"raw_data"}"#,
            r#"{"type":"quit"}"#,
            r#"{"type":"get_state"}"#,
        ],
    );

    assert_eq!(replies.len(), 7, "{replies:#?}");
    assert_eq!(replies[0]["kind"], "state");
    assert_eq!(replies[0]["cutoff_days"], 30);

    assert!(replies[1]["error"].as_str().unwrap().contains("between 7 and 90"));

    assert_eq!(replies[2]["kind"], "state");
    assert_eq!(replies[2]["cutoff_days"], 60);

    assert!(replies[3].get("error").is_some());

    assert_eq!(replies[4]["as_of"]["date"], "2025-08-01");
    assert_eq!(replies[4]["cutoff_days"], 60, "rejected cutoff left no trace");

    assert_eq!(replies[5]["kind"], "field_summary");
    assert!(replies[5]["fields"].as_array().unwrap().len() >= 5);

    assert_eq!(replies[6]["kind"], "raw_data");
    assert_eq!(replies[6]["records"].as_array().unwrap().len(), 50);
    assert!(replies[6]["records"][0].get("games_quartile").is_some());
    assert!(replies[6]["records"][0].get("monthly_revenue").is_some());
}

#[test]
fn load_command_swaps_the_dataset() {
    let mut session = make_session(4, 40);
    let replacement = SampleGenerator::new(5, as_of()).generate(75);
    let file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    write_csv(&replacement, file.path()).unwrap();
    let path = file.path().to_string_lossy().to_string();

    session.handle(DashboardCommand::Load { path }).unwrap();
    assert_eq!(session.state().cohort_size, 75);

    let missing = DashboardCommand::Load { path: "/no/such/file.csv".to_string() };
    assert!(session.handle(missing).is_err());
    assert_eq!(session.state().cohort_size, 75, "failed load keeps the old data");
}

#[test]
fn dashboard_measures_lifetime_to_as_of() {
    use cohort_core::derivation::LifetimeBasis;

    let records = SampleGenerator::new(6, as_of()).generate(20);
    let config = AnalysisConfig::default_test().with_basis(LifetimeBasis::LastLogin);

    let session = DashboardSession::new(records, config).unwrap();

    assert_eq!(session.config().lifetime_basis, LifetimeBasis::AsOf);
}
