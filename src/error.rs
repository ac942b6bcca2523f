use chrono::NaiveDate;
use thiserror::Error;

/// Binary-level error: a message plus the process exit code to report.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failures raised by the dataset pipeline (generation, derivation, aggregation).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A row reached dataset construction or aggregation without its derived
    /// fields. The assembler always derives before materializing, so this is
    /// an internal-consistency failure.
    #[error("Row {index} ({date}) is missing derived fields")]
    IncompleteRow { index: usize, date: NaiveDate },
}

pub type DataResult<T> = Result<T, DataError>;

impl From<DataError> for AppError {
    fn from(err: DataError) -> Self {
        let exit_code = match err {
            DataError::InvalidArgument(_) => 2,
            DataError::IncompleteRow { .. } => 4,
        };
        AppError::new(exit_code, err.to_string())
    }
}
