//! The single selected calendar day that scopes the jobs view.

use std::fmt;

use chrono::{Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Date format used on the wire and in persisted state.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Selected service day. Starts at today (local machine date).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateCursor {
    date: NaiveDate,
}

impl DateCursor {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }

    pub fn today() -> Self {
        Self::new(Local::now().date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn set(&mut self, date: NaiveDate) {
        self.date = date;
    }

    /// Parse and set a `YYYY-MM-DD` string. Leaves the cursor unchanged on
    /// a parse failure.
    pub fn set_str(&mut self, value: &str) -> Result<()> {
        self.date = parse_date(value)?;
        Ok(())
    }

    pub fn go_to_next_day(&mut self) {
        if let Some(next) = self.date.checked_add_days(Days::new(1)) {
            self.date = next;
        }
    }

    pub fn go_to_prev_day(&mut self) {
        if let Some(prev) = self.date.checked_sub_days(Days::new(1)) {
            self.date = prev;
        }
    }

    pub fn go_to_today(&mut self) {
        self.date = Local::now().date_naive();
    }

    pub fn reset_to(&mut self, date: NaiveDate) {
        self.date = date;
    }

    pub fn as_string(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}

impl Default for DateCursor {
    fn default() -> Self {
        Self::today()
    }
}

impl fmt::Display for DateCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.date.format(DATE_FORMAT))
    }
}

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|e| Error::InvalidInput(format!("invalid date '{}': {}", value, e)))
}
