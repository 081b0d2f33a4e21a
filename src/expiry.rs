//! Expiration date resolution
//!
//! Maps a user selector onto the expiration dates the provider reports for a
//! ticker. `--week` is an index into that list: 0 is the nearest expiration,
//! 1 the next one, and -1 selects every available date.

use chrono::NaiveDate;

use crate::error::{ListError, ListResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpirationSelector {
    /// Nth available expiration in ascending order
    Week(usize),
    /// Explicit calendar date, must be one of the available dates
    Date(NaiveDate),
    All,
}

impl ExpirationSelector {
    pub const ALL_WEEKS: i64 = -1;

    /// Build a selector from the raw `--week` / `--date` arguments.
    pub fn from_args(week: i64, date: Option<NaiveDate>) -> ListResult<Self> {
        if let Some(date) = date {
            return Ok(Self::Date(date));
        }
        match week {
            Self::ALL_WEEKS => Ok(Self::All),
            w if w >= 0 => Ok(Self::Week(w as usize)),
            w => Err(ListError::InvalidWeek(w)),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

pub fn resolve(
    ticker: &str,
    available: &[NaiveDate],
    selector: ExpirationSelector,
) -> ListResult<Vec<NaiveDate>> {
    if available.is_empty() {
        return Err(ListError::NoExpirations(ticker.to_string()));
    }

    match selector {
        ExpirationSelector::Week(week) => available
            .get(week)
            .map(|&date| vec![date])
            .ok_or_else(|| ListError::WeekOutOfRange {
                ticker: ticker.to_string(),
                week,
                available: available.len(),
            }),
        ExpirationSelector::Date(date) => {
            if available.contains(&date) {
                Ok(vec![date])
            } else {
                Err(ListError::DateNotAvailable {
                    ticker: ticker.to_string(),
                    date,
                })
            }
        }
        ExpirationSelector::All => Ok(available.to_vec()),
    }
}
