//! Canonical `YYYY-MM` period keys: the unit of iteration for the whole engine.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::MortgageError;

/// One calendar month in a schedule.
///
/// Ordered by calendar position; rendered and parsed as `YYYY-MM`. Every row
/// sequence produced by the engine is strictly increasing and contiguous in
/// this key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeriodKey {
    year: i32,
    month: u32,
}

impl PeriodKey {
    /// Build a key from a year and a 1-based month.
    ///
    /// The year must have four digits (the canonical rendering is fixed-width)
    /// and the month must be 1..=12.
    pub fn new(year: i32, month: u32) -> Result<Self, MortgageError> {
        if !(1000..=9999).contains(&year) {
            return Err(MortgageError::InvalidPeriod {
                key: format!("{year}-{month:02}"),
                reason: "year must have four digits".into(),
            });
        }
        if !(1..=12).contains(&month) {
            return Err(MortgageError::InvalidPeriod {
                key: format!("{year}-{month:02}"),
                reason: "month must be between 01 and 12".into(),
            });
        }
        Ok(PeriodKey { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// 1-based calendar month.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// The next calendar month.
    pub fn next(self) -> Self {
        if self.month == 12 {
            PeriodKey {
                year: self.year + 1,
                month: 1,
            }
        } else {
            PeriodKey {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Whole months from `self` to `other` (negative when `other` is earlier).
    pub fn months_until(self, other: PeriodKey) -> i64 {
        (i64::from(other.year) - i64::from(self.year)) * 12 + i64::from(other.month)
            - i64::from(self.month)
    }

    /// The key `months` calendar months after `self`.
    pub fn plus_months(self, months: u32) -> Self {
        let total = i64::from(self.year) * 12 + i64::from(self.month) - 1 + i64::from(months);
        PeriodKey {
            year: (total / 12) as i32,
            month: (total % 12) as u32 + 1,
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for PeriodKey {
    type Err = MortgageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| MortgageError::InvalidPeriod {
            key: s.to_string(),
            reason: reason.into(),
        };

        let (year_part, month_part) = s.split_once('-').ok_or_else(|| {
            invalid("expected the form YYYY-MM")
        })?;
        if year_part.len() != 4 || month_part.len() != 2 {
            return Err(invalid("expected the form YYYY-MM"));
        }

        let year: i32 = year_part
            .parse()
            .map_err(|_| invalid("year is not a number"))?;
        let month: u32 = month_part
            .parse()
            .map_err(|_| invalid("month is not a number"))?;

        PeriodKey::new(year, month).map_err(|_| invalid("month must be between 01 and 12"))
    }
}

impl Serialize for PeriodKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PeriodKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
