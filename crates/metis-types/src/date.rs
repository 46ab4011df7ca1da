use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TypeError};

/// Textual form of a plain date (`2024-01-05`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Textual form of a calendar day (`05-Jan-2024`).
pub const DAY_FORMAT: &str = "%d-%b-%Y";

/// A calendar day as used by the finance layer.
///
/// Wraps a [`NaiveDate`] but renders with [`DAY_FORMAT`], which is distinct
/// from the ISO form used for plain dates.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CalendarDay(NaiveDate);

impl CalendarDay {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Build from year, month and day. Returns `None` for impossible dates.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }
}

impl fmt::Debug for CalendarDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CalendarDay({self})")
    }
}

impl fmt::Display for CalendarDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DAY_FORMAT))
    }
}

impl FromStr for CalendarDay {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self> {
        NaiveDate::parse_from_str(s, DAY_FORMAT)
            .map(Self)
            .map_err(|e| TypeError::InvalidDate {
                input: s.to_string(),
                reason: e.to_string(),
            })
    }
}

impl From<NaiveDate> for CalendarDay {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}
