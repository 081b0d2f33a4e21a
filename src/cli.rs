use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use clap::Parser;

use crate::error::{ListError, ListResult};
use crate::expiry::ExpirationSelector;

/// List calls & put options for a ticker at some expiration date
#[derive(Parser, Debug)]
#[command(author = "F&O", version = "0.1.0", about = "List calls & put options for a ticker at some expiration date.", long_about = None)]
pub struct Args {
    /// Stock ticker symbol
    pub ticker: String,

    /// Maximum number of rows to display per side
    #[arg(short = 'n', long, default_value_t = 5, allow_negative_numbers = true)]
    pub max_rows: i64,

    /// Sorting key for the options
    #[arg(short, long, default_value = "strike", value_parser = ["strike", "volume", "OI"])]
    pub sort: String,

    /// Reverse the sorting order
    #[arg(short, long)]
    pub reverse: bool,

    /// Index into the ticker's available expiration dates (0 = nearest, 1 = the one after, etc), -1 = all dates
    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
    pub week: i64,

    /// Explicit expiration date (YYYY-MM-DD), must be one of the ticker's available dates
    #[arg(short, long, conflicts_with = "week")]
    pub date: Option<NaiveDate>,

    /// Print debug logs to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Strike,
    Volume,
    OpenInterest,
}

impl SortKey {
    /// Frame column the key sorts on
    pub fn column(&self) -> &'static str {
        match self {
            Self::Strike => "strike",
            Self::Volume => "volume",
            Self::OpenInterest => "openInterest",
        }
    }
}

impl FromStr for SortKey {
    type Err = ListError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strike" => Ok(Self::Strike),
            "volume" => Ok(Self::Volume),
            "openInterest" => Ok(Self::OpenInterest),
            other => Err(ListError::InvalidSortKey(other.to_string())),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// `OI` is accepted on the command line as shorthand for `openInterest`.
pub fn normalize_sort_key(raw: &str) -> String {
    raw.replace("OI", "openInterest")
}

/// Everything a single report run needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSettings {
    pub ticker: String,
    pub selector: ExpirationSelector,
    pub sort_key: SortKey,
    pub reverse: bool,
    pub max_rows: i64,
}

impl Args {
    pub fn settings(&self) -> ListResult<ReportSettings> {
        Ok(ReportSettings {
            ticker: self.ticker.clone(),
            selector: ExpirationSelector::from_args(self.week, self.date)?,
            sort_key: normalize_sort_key(&self.sort).parse()?,
            reverse: self.reverse,
            max_rows: self.max_rows,
        })
    }
}
