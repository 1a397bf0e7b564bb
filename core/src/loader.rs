//! Loader: reads a tabular file into validated `UserRecord`s.
//!
//! Format is chosen by extension: `.csv` goes through the csv reader,
//! everything else is opened as a spreadsheet (first worksheet).
//! Both paths produce a `RawTable` of loosely typed cells; a single
//! validation step then builds the typed records.
//!
//! RULE: only this module knows about file formats.

use crate::{
    error::{AnalyticsError, AnalyticsResult},
    record::UserRecord,
};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use std::path::Path;

pub const COL_CUSTOMER_ID: &str = "customer_id";
pub const COL_DATE_JOINED: &str = "date_joined";
pub const COL_LAST_LOGIN: &str = "last_login_date";
pub const COL_TOTAL_DEPOSIT: &str = "total_deposit";
pub const COL_GAMES_PLAYED: &str = "total_games_played";

pub const REQUIRED_COLUMNS: [&str; 4] = [
    COL_DATE_JOINED,
    COL_LAST_LOGIN,
    COL_TOTAL_DEPOSIT,
    COL_GAMES_PLAYED,
];

const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xls", "xlsb", "ods"];

const DATETIME_FORMATS: [&str; 8] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

// Month-first before day-first, as dataframe date parsers do.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Spreadsheet,
}

impl InputFormat {
    /// `.csv` (any case) is CSV; every other extension is a spreadsheet.
    pub fn detect(path: &Path) -> Self {
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if is_csv {
            Self::Csv
        } else {
            Self::Spreadsheet
        }
    }
}

/// One loosely typed cell, before validation.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
}

impl Cell {
    fn display(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => n.to_string(),
            Cell::DateTime(dt) => dt.to_string(),
        }
    }
}

/// Header row plus data rows, exactly as read from the file.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows:    Vec<Vec<Cell>>,
}

impl RawTable {
    fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    }

    fn require_column(&self, name: &str) -> AnalyticsResult<usize> {
        self.column_index(name)
            .ok_or_else(|| AnalyticsError::missing_column(name))
    }
}

/// Load and validate every row of `path`.
pub fn load_records(path: impl AsRef<Path>) -> AnalyticsResult<Vec<UserRecord>> {
    let path = path.as_ref();
    let raw = load_raw_table(path)?;
    let records = records_from_table(&raw)?;
    log::info!("loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Read `path` into a `RawTable` without validating column contents.
pub fn load_raw_table(path: &Path) -> AnalyticsResult<RawTable> {
    if !path.is_file() {
        return Err(AnalyticsError::Load {
            path: path.display().to_string(),
            reason: "file does not exist or is not a regular file".to_string(),
        });
    }
    // Zero bytes is an empty dataset whatever the extension claims.
    if std::fs::metadata(path)?.len() == 0 {
        return Err(AnalyticsError::EmptyDataset);
    }
    match InputFormat::detect(path) {
        InputFormat::Csv => read_csv(path),
        InputFormat::Spreadsheet => read_spreadsheet(path),
    }
}

fn read_csv(path: &Path) -> AnalyticsResult<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?;

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let row = record
            .iter()
            .map(|field| {
                if field.is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(field.to_string())
                }
            })
            .collect();
        rows.push(row);
    }

    // A blank file has neither headers nor rows.
    let headers = if headers.len() == 1 && headers[0].is_empty() {
        Vec::new()
    } else {
        headers
    };
    Ok(RawTable { headers, rows })
}

fn read_spreadsheet(path: &Path) -> AnalyticsResult<RawTable> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !SPREADSHEET_EXTENSIONS.contains(&extension.as_str()) {
        return Err(AnalyticsError::Load {
            path: path.display().to_string(),
            reason: format!("unsupported file extension '{extension}'"),
        });
    }

    let mut workbook = open_workbook_auto(path)?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => return Ok(RawTable::default()),
    };

    let mut rows_iter = range.rows();
    let headers = match rows_iter.next() {
        Some(header_row) => header_row.iter().map(|c| spreadsheet_cell(c).display()).collect(),
        None => return Ok(RawTable::default()),
    };
    let rows = rows_iter
        .map(|row| row.iter().map(spreadsheet_cell).collect())
        .collect();

    Ok(RawTable { headers, rows })
}

fn spreadsheet_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) | Data::DateTimeIso(s) => {
            if s.trim().is_empty() {
                Cell::Empty
            } else {
                Cell::Text(s.trim().to_string())
            }
        }
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ts) => Cell::DateTime(ts),
            None => Cell::Number(dt.as_f64()),
        },
        other => Cell::Text(other.to_string()),
    }
}

/// The validation step: typed records out of loosely typed cells.
pub fn records_from_table(raw: &RawTable) -> AnalyticsResult<Vec<UserRecord>> {
    if raw.headers.is_empty() && raw.rows.is_empty() {
        return Err(AnalyticsError::EmptyDataset);
    }

    let joined_idx = raw.require_column(COL_DATE_JOINED)?;
    let login_idx = raw.require_column(COL_LAST_LOGIN)?;
    let deposit_idx = raw.require_column(COL_TOTAL_DEPOSIT)?;
    let games_idx = raw.require_column(COL_GAMES_PLAYED)?;
    let id_idx = raw.column_index(COL_CUSTOMER_ID);

    let mut records = Vec::with_capacity(raw.rows.len());
    for (i, row) in raw.rows.iter().enumerate() {
        let row_number = i + 1;
        let cell = |idx: usize| row.get(idx).unwrap_or(&Cell::Empty);

        // Skip blank lines entirely.
        if row.iter().all(|c| *c == Cell::Empty) {
            continue;
        }

        let customer_id = match id_idx.map(cell) {
            Some(Cell::Empty) | None => format!("row-{row_number}"),
            Some(c) => c.display(),
        };

        let record = UserRecord {
            customer_id,
            date_joined: parse_date_cell(cell(joined_idx), COL_DATE_JOINED, row_number)?,
            last_login_date: parse_date_cell(cell(login_idx), COL_LAST_LOGIN, row_number)?,
            total_deposit: parse_number_cell(cell(deposit_idx), COL_TOTAL_DEPOSIT, row_number)?,
            total_games_played: parse_count_cell(cell(games_idx), COL_GAMES_PLAYED, row_number)?,
        };

        if record.last_login_date < record.date_joined {
            log::warn!(
                "row {row_number} ({}): last login {} precedes join date {}",
                record.customer_id,
                record.last_login_date,
                record.date_joined,
            );
        }
        records.push(record);
    }
    Ok(records)
}

fn parse_date_cell(cell: &Cell, column: &str, row: usize) -> AnalyticsResult<NaiveDateTime> {
    let parsed = match cell {
        Cell::DateTime(dt) => Some(*dt),
        Cell::Number(serial) => excel_serial_to_datetime(*serial),
        Cell::Text(s) => parse_datetime(s),
        Cell::Empty => None,
    };
    parsed.ok_or_else(|| AnalyticsError::Parse {
        column: column.to_string(),
        row,
        value: cell.display(),
    })
}

fn parse_number_cell(cell: &Cell, column: &str, row: usize) -> AnalyticsResult<f64> {
    let value = match cell {
        Cell::Number(n) => Some(*n),
        Cell::Text(s) => s.replace(',', "").parse::<f64>().ok(),
        Cell::Empty | Cell::DateTime(_) => None,
    };
    value
        .filter(|v| v.is_finite())
        .ok_or_else(|| AnalyticsError::Schema {
            column: column.to_string(),
            reason: format!("row {row}: expected a number, got '{}'", cell.display()),
        })
}

fn parse_count_cell(cell: &Cell, column: &str, row: usize) -> AnalyticsResult<i64> {
    let value = parse_number_cell(cell, column, row)?;
    if value.fract() != 0.0 {
        return Err(AnalyticsError::Schema {
            column: column.to_string(),
            reason: format!("row {row}: expected a whole number, got '{}'", cell.display()),
        });
    }
    Ok(value as i64)
}

/// Parse the textual date and date-time forms found in exported user data.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// Excel stores dates as days since 1899-12-30 (fraction = time of day).
fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_time(NaiveTime::MIN);
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}

/// Write records in the five-column layout `load_records` reads.
pub fn write_csv(records: &[UserRecord], path: impl AsRef<Path>) -> AnalyticsResult<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        COL_CUSTOMER_ID,
        COL_DATE_JOINED,
        COL_LAST_LOGIN,
        COL_TOTAL_DEPOSIT,
        COL_GAMES_PLAYED,
    ])?;
    for r in records {
        writer.write_record([
            r.customer_id.clone(),
            r.date_joined.format("%Y-%m-%d %H:%M:%S").to_string(),
            r.last_login_date.format("%Y-%m-%d %H:%M:%S").to_string(),
            format!("{:.2}", r.total_deposit),
            r.total_games_played.to_string(),
        ])?;
    }
    writer.flush()?;
    log::info!("wrote {} records to {}", records.len(), path.display());
    Ok(())
}
