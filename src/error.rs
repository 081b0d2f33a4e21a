//! Error types for the option lister

use chrono::NaiveDate;
use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ListError {
    #[error("Invalid week offset {0}: use 0 for the nearest expiration or -1 for all dates")]
    InvalidWeek(i64),

    #[error("Week offset {week} is out of range for {ticker}: only {available} expiration dates available")]
    WeekOutOfRange {
        ticker: String,
        week: usize,
        available: usize,
    },

    #[error("Expiration date {date} is not available for {ticker}")]
    DateNotAvailable { ticker: String, date: NaiveDate },

    #[error("No option expiration dates available for {0}")]
    NoExpirations(String),

    #[error("Invalid sort key {0:?}: expected strike, volume or openInterest")]
    InvalidSortKey(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Frame error: {0}")]
    Frame(#[from] PolarsError),
}

pub type ListResult<T> = Result<T, ListError>;

impl ListError {
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    /// Selector errors are detected before any chain is fetched.
    pub fn is_invalid_selector(&self) -> bool {
        matches!(
            self,
            Self::InvalidWeek(_)
                | Self::WeekOutOfRange { .. }
                | Self::DateNotAvailable { .. }
                | Self::NoExpirations(_)
        )
    }

    /// Process exit status. 1 is reserved for interruption.
    pub fn exit_code(&self) -> u8 {
        if self.is_invalid_selector() || matches!(self, Self::InvalidSortKey(_)) {
            2
        } else {
            3
        }
    }
}
