use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// A quarterly review cycle, written `YYYY-Qn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReviewCycle {
    year: i32,
    quarter: u8,
    starts_on: NaiveDate,
    ends_on: NaiveDate,
}

impl ReviewCycle {
    pub fn new(year: i32, quarter: u8) -> Option<Self> {
        if !(1..=4).contains(&quarter) {
            return None;
        }
        let first_month = u32::from(quarter - 1) * 3 + 1;
        let starts_on = NaiveDate::from_ymd_opt(year, first_month, 1)?;
        let ends_on = starts_on.checked_add_months(Months::new(3))?.pred_opt()?;
        Some(Self {
            year,
            quarter,
            starts_on,
            ends_on,
        })
    }

    /// The cycle a calendar date falls in.
    pub fn containing(date: NaiveDate) -> Option<Self> {
        let quarter = (date.month0() / 3 + 1) as u8;
        Self::new(date.year(), quarter)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn quarter(&self) -> u8 {
        self.quarter
    }

    pub fn starts_on(&self) -> NaiveDate {
        self.starts_on
    }

    pub fn ends_on(&self) -> NaiveDate {
        self.ends_on
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.starts_on <= date && date <= self.ends_on
    }

    /// Last day assessments for this cycle may stay unpublished.
    pub fn deadline(&self, grace_days: u16) -> NaiveDate {
        self.ends_on
            .checked_add_days(Days::new(u64::from(grace_days)))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Negative once the deadline has passed.
    pub fn days_until_deadline(&self, today: NaiveDate, grace_days: u16) -> i64 {
        (self.deadline(grace_days) - today).num_days()
    }

    pub fn is_overdue(&self, today: NaiveDate, grace_days: u16) -> bool {
        today > self.deadline(grace_days)
    }

    pub fn next(&self) -> Option<Self> {
        match self.quarter {
            4 => Self::new(self.year.checked_add(1)?, 1),
            quarter => Self::new(self.year, quarter + 1),
        }
    }

    pub fn previous(&self) -> Option<Self> {
        match self.quarter {
            1 => Self::new(self.year.checked_sub(1)?, 4),
            quarter => Self::new(self.year, quarter - 1),
        }
    }
}

impl fmt::Display for ReviewCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-Q{}", self.year, self.quarter)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CycleParseError {
    #[error("review cycle '{0}' must look like YYYY-Qn")]
    Format(String),
    #[error("review cycle '{0}' is outside the supported calendar")]
    OutOfRange(String),
}

impl FromStr for ReviewCycle {
    type Err = CycleParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let (year, quarter) = trimmed
            .split_once(['-', ' '])
            .ok_or_else(|| CycleParseError::Format(raw.to_string()))?;
        let year: i32 = year
            .parse()
            .map_err(|_| CycleParseError::Format(raw.to_string()))?;
        let quarter: u8 = quarter
            .strip_prefix(['Q', 'q'])
            .and_then(|digit| digit.parse().ok())
            .ok_or_else(|| CycleParseError::Format(raw.to_string()))?;
        if !(1..=4).contains(&quarter) {
            return Err(CycleParseError::Format(raw.to_string()));
        }
        Self::new(year, quarter).ok_or_else(|| CycleParseError::OutOfRange(raw.to_string()))
    }
}

impl TryFrom<String> for ReviewCycle {
    type Error = CycleParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ReviewCycle> for String {
    fn from(value: ReviewCycle) -> Self {
        value.to_string()
    }
}
