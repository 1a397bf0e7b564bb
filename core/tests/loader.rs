use cohort_core::{
    error::AnalyticsError,
    loader::{load_records, write_csv},
    pipeline::analyze_file,
    config::AnalysisConfig,
};
use chrono::{NaiveDate, NaiveDateTime};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use std::io::Write;
use tempfile::NamedTempFile;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn temp_file(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file.flush().expect("flush temp file");
    file
}

fn csv_file(contents: &str) -> NamedTempFile {
    temp_file(".csv", contents)
}

fn ts(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn loads_typed_records_from_csv() {
    let file = csv_file(
        "customer_id,date_joined,last_login_date,total_deposit,total_games_played\n\
         C1,2025-01-15,2025-06-30 18:45:00,250.50,42\n\
         C2,2025-02-01T09:00:00,2025-02-20,0,3\n",
    );

    let records = load_records(file.path()).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].customer_id, "C1");
    assert_eq!(records[0].date_joined.to_string(), "2025-01-15 00:00:00");
    assert_eq!(records[0].last_login_date.to_string(), "2025-06-30 18:45:00");
    assert_eq!(records[0].total_deposit, 250.5);
    assert_eq!(records[0].total_games_played, 42);
    assert_eq!(records[1].date_joined.to_string(), "2025-02-01 09:00:00");
}

#[test]
fn header_matching_ignores_case_whitespace_and_order() {
    let file = csv_file(
        " Total_Games_Played , DATE_JOINED ,last_login_date,total_deposit\n\
         7,2025-03-01,2025-03-10,99.9\n",
    );

    let records = load_records(file.path()).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].total_games_played, 7);
    assert_eq!(records[0].total_deposit, 99.9);
}

#[test]
fn customer_id_is_synthesized_when_column_absent() {
    let file = csv_file(
        "date_joined,last_login_date,total_deposit,total_games_played\n\
         2025-01-01,2025-01-02,10,1\n\
         2025-01-01,2025-01-02,20,2\n",
    );

    let records = load_records(file.path()).unwrap();

    let ids: Vec<&str> = records.iter().map(|r| r.customer_id.as_str()).collect();
    assert_eq!(ids, ["row-1", "row-2"]);
}

#[test]
fn missing_required_column_names_the_column() {
    let file = csv_file(
        "date_joined,last_login_date,total_games_played\n\
         2025-01-01,2025-01-02,1\n",
    );

    let err = load_records(file.path()).unwrap_err();

    match err {
        AnalyticsError::Schema { column, .. } => assert_eq!(column, "total_deposit"),
        other => panic!("expected schema error, got {other:?}"),
    }
}

#[test]
fn unparsable_date_is_a_parse_error_with_location() {
    let file = csv_file(
        "date_joined,last_login_date,total_deposit,total_games_played\n\
         2025-01-01,2025-01-02,10,1\n\
         2025-01-01,yesterday,10,1\n",
    );

    let err = load_records(file.path()).unwrap_err();

    match err {
        AnalyticsError::Parse { column, row, value } => {
            assert_eq!(column, "last_login_date");
            assert_eq!(row, 2);
            assert_eq!(value, "yesterday");
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn wrong_numeric_types_are_schema_errors() {
    let bad_deposit = csv_file(
        "date_joined,last_login_date,total_deposit,total_games_played\n\
         2025-01-01,2025-01-02,lots,1\n",
    );
    let fractional_games = csv_file(
        "date_joined,last_login_date,total_deposit,total_games_played\n\
         2025-01-01,2025-01-02,10,2.5\n",
    );

    assert!(matches!(
        load_records(bad_deposit.path()),
        Err(AnalyticsError::Schema { column, .. }) if column == "total_deposit"
    ));
    assert!(matches!(
        load_records(fractional_games.path()),
        Err(AnalyticsError::Schema { column, .. }) if column == "total_games_played"
    ));
}

#[test]
fn negative_values_pass_through() {
    let file = csv_file(
        "date_joined,last_login_date,total_deposit,total_games_played\n\
         2025-01-01,2025-01-02,-15.25,-3\n",
    );

    let records = load_records(file.path()).unwrap();

    assert_eq!(records[0].total_deposit, -15.25);
    assert_eq!(records[0].total_games_played, -3);
}

#[test]
fn empty_file_is_an_empty_dataset() {
    let file = csv_file("");

    let err = analyze_file(file.path(), &AnalysisConfig::default_test()).unwrap_err();

    assert!(matches!(err, AnalyticsError::EmptyDataset), "got {err:?}");
}

#[test]
fn header_only_file_loads_empty_and_pipeline_rejects_it() {
    let file = csv_file("date_joined,last_login_date,total_deposit,total_games_played\n");

    assert!(load_records(file.path()).unwrap().is_empty());

    let err = analyze_file(file.path(), &AnalysisConfig::default_test()).unwrap_err();
    assert!(matches!(err, AnalyticsError::EmptyDataset), "got {err:?}");
}

#[test]
fn missing_file_is_a_load_error() {
    let err = load_records("/definitely/not/here/users.csv").unwrap_err();
    assert!(matches!(err, AnalyticsError::Load { .. }), "got {err:?}");
}

#[test]
fn non_csv_extensions_are_read_as_spreadsheets() {
    let unknown = temp_file(".txt", "date_joined,last_login_date\n");
    let corrupt = temp_file(".xlsx", "this is not a zip archive");

    assert!(matches!(
        load_records(unknown.path()),
        Err(AnalyticsError::Load { .. })
    ));
    assert!(matches!(
        load_records(corrupt.path()),
        Err(AnalyticsError::Workbook(_))
    ));
}

#[test]
fn loads_typed_records_from_xlsx() {
    let file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, name) in [
        "customer_id",
        "date_joined",
        "last_login_date",
        "total_deposit",
        "total_games_played",
    ]
    .into_iter()
    .enumerate()
    {
        sheet.write_string(0, col as u16, name).unwrap();
    }

    // Native date cell, plain serial number, numeric id.
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let joined = ExcelDateTime::from_ymd(2025, 1, 15).unwrap();
    sheet.write_number(1, 0, 7.0).unwrap();
    sheet.write_datetime_with_format(1, 1, &joined, &date_format).unwrap();
    sheet.write_number(1, 2, 45_839.0).unwrap();
    sheet.write_number(1, 3, 120.5).unwrap();
    sheet.write_number(1, 4, 12.0).unwrap();

    // Text dates, month first.
    sheet.write_string(2, 0, "C2").unwrap();
    sheet.write_string(2, 1, "01/02/2025").unwrap();
    sheet.write_string(2, 2, "2025-06-30 10:00").unwrap();
    sheet.write_number(2, 3, 10.0).unwrap();
    sheet.write_number(2, 4, 3.0).unwrap();
    workbook.save(file.path()).unwrap();

    let records = load_records(file.path()).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].customer_id, "7");
    assert_eq!(records[0].date_joined, ts(2025, 1, 15, 0, 0));
    assert_eq!(records[0].last_login_date, ts(2025, 7, 1, 0, 0));
    assert_eq!(records[0].total_deposit, 120.5);
    assert_eq!(records[0].total_games_played, 12);

    assert_eq!(records[1].customer_id, "C2");
    assert_eq!(records[1].date_joined, ts(2025, 1, 2, 0, 0));
    assert_eq!(records[1].last_login_date, ts(2025, 6, 30, 10, 0));
    assert_eq!(records[1].total_games_played, 3);
}

#[test]
fn zero_byte_file_is_empty_in_every_format() {
    for suffix in [".csv", ".xlsx", ".ods"] {
        let file = temp_file(suffix, "");
        let err = load_records(file.path()).unwrap_err();
        assert!(matches!(err, AnalyticsError::EmptyDataset), "{suffix}: got {err:?}");
    }
}

#[test]
fn written_csv_loads_back_identically() {
    let file = csv_file(
        "customer_id,date_joined,last_login_date,total_deposit,total_games_played\n\
         A,2025-01-15 08:30:00,2025-06-30 18:45:00,250.50,42\n\
         B,2024-12-31,2025-01-01,1000,300\n",
    );
    let original = load_records(file.path()).unwrap();

    let out = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    write_csv(&original, out.path()).unwrap();
    let reloaded = load_records(out.path()).unwrap();

    assert_eq!(original, reloaded);
}
