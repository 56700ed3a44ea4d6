use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{EditClass, Granularity};

/// Recoverable failures of the period bucketing module.
///
/// None of these are fatal: front ends fall back to an empty/placeholder
/// display when they see one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodError {
    #[error("invalid range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("malformed {granularity} label '{label}'")]
    MalformedLabel { label: String, granularity: Granularity },

    #[error("period sequence is empty")]
    EmptySequence,

    #[error("period {index} is {class} and cannot be edited")]
    LockedPeriod { index: usize, class: EditClass },

    #[error("period index {index} is out of range for a sequence of {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

impl PeriodError {
    pub(crate) fn malformed(label: &str, granularity: Granularity) -> Self {
        Self::MalformedLabel {
            label: label.to_string(),
            granularity,
        }
    }
}

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

impl From<PeriodError> for AppError {
    fn from(err: PeriodError) -> Self {
        let code = match err {
            PeriodError::EmptySequence => 3,
            _ => 2,
        };
        AppError::new(code, err.to_string())
    }
}
