use thiserror::Error;

/// Application-level error type.
///
/// Only fatal conditions live here. A failed inference call is never an
/// `AppError`: the agent turns it into response text and the batch continues.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{}", range_message(.index, .row_count))]
    Range { index: usize, row_count: usize },

    #[error("Format error: {0}")]
    Format(String),

    #[error("Template parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn range_message(index: &usize, row_count: &usize) -> String {
    if *row_count == 0 {
        format!("Row index {index} is out of range: the table has no rows")
    } else {
        format!(
            "Row index {index} is out of range (0-{})",
            row_count - 1
        )
    }
}

impl From<csv::Error> for AppError {
    fn from(error: csv::Error) -> Self {
        AppError::Format(error.to_string())
    }
}
