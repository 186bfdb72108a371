//! Date handling for reservations and searches.
//!
//! Dates arrive as separate day/month/year parts. This module turns them into calendar
//! dates and validates the ordering of ranges.

use crate::errors::{Error, Result};
use chrono::{NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};

/// One date bound as it was supplied by the caller. Any part may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateParts {
    /// Day of month
    pub day: Option<i32>,
    /// Month (1-12)
    pub month: Option<i32>,
    /// Calendar year
    pub year: Option<i32>,
}

impl DateParts {
    /// Creates a bound with all three parts set.
    #[must_use]
    pub const fn new(day: i32, month: i32, year: i32) -> Self {
        Self {
            day: Some(day),
            month: Some(month),
            year: Some(year),
        }
    }

    /// A bound is present as soon as any of its parts is.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        self.day.is_some() || self.month.is_some() || self.year.is_some()
    }

    /// Resolves the bound into a date.
    ///
    /// Returns `Ok(None)` when no part is given and [`Error::IncompleteDate`] when only
    /// some parts are.
    pub fn resolve(&self, bound: &'static str) -> Result<Option<NaiveDate>> {
        if !self.is_present() {
            return Ok(None);
        }
        match (self.day, self.month, self.year) {
            (Some(day), Some(month), Some(year)) => calendar_date(year, month, day)
                .map(Some)
                .ok_or_else(|| Error::InvalidDate {
                    reason: format!("{day}-{month}-{year} is outside the supported calendar"),
                }),
            _ => Err(Error::IncompleteDate { bound }),
        }
    }
}

/// Builds a date from parts, normalising overflowing values the way calendar arithmetic
/// does: day 31 of February becomes early March, month 13 becomes January of the next year.
#[must_use]
pub fn calendar_date(year: i32, month: i32, day: i32) -> Option<NaiveDate> {
    let months = i64::from(year) * 12 + i64::from(month) - 1;
    let year = i32::try_from(months.div_euclid(12)).ok()?;
    let month = u32::try_from(months.rem_euclid(12) + 1).ok()?;
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    first.checked_add_signed(TimeDelta::try_days(i64::from(day) - 1)?)
}

/// A validated date range with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayRange {
    /// First day
    pub start: NaiveDate,
    /// Last day
    pub end: NaiveDate,
}

impl StayRange {
    /// Creates a range, failing with [`Error::InvalidRange`] if `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Closed-interval intersection: `[s1, e1]` and `[s2, e2]` overlap iff
    /// `s1 <= e2 && e1 >= s2`. Ranges sharing only an endpoint overlap.
    ///
    /// Queries express the same rule in SQL through `availability::overlap_condition`.
    #[cfg(test)]
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start <= other.end && self.end >= other.start
    }

    /// Number of whole nights between start and end.
    #[must_use]
    pub fn nights(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// The date filter produced from an optional start bound and an optional end bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateWindow {
    /// Neither bound supplied; no date filtering
    Unbounded,
    /// Only the start bound supplied
    From(NaiveDate),
    /// Only the end bound supplied
    Until(NaiveDate),
    /// Both bounds supplied
    Between(StayRange),
}

/// Resolves a pair of optional bounds into a [`DateWindow`].
///
/// # Errors
/// - [`Error::IncompleteDate`] if a bound has some but not all of its parts
/// - [`Error::InvalidRange`] if both bounds are present and the start is after the end
pub fn resolve_window(start: &DateParts, end: &DateParts) -> Result<DateWindow> {
    let start = start.resolve("start")?;
    let end = end.resolve("end")?;

    Ok(match (start, end) {
        (None, None) => DateWindow::Unbounded,
        (Some(start), None) => DateWindow::From(start),
        (None, Some(end)) => DateWindow::Until(end),
        (Some(start), Some(end)) => DateWindow::Between(StayRange::new(start, end)?),
    })
}
