use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Cannot load '{path}': {reason}")]
    Load { path: String, reason: String },

    #[error("Column '{column}': {reason}")]
    Schema { column: String, reason: String },

    #[error("Column '{column}', row {row}: cannot parse '{value}' as a date")]
    Parse { column: String, row: usize, value: String },

    #[error("Dataset is empty: no data to compute metrics from")]
    EmptyDataset,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalyticsError {
    pub fn missing_column(column: &str) -> Self {
        Self::Schema {
            column: column.to_string(),
            reason: "required column is missing".to_string(),
        }
    }
}

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;
