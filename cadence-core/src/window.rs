//! Query windows for projecting events.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};

use crate::error::{CadenceError, CadenceResult};

/// Half-open time window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> CadenceResult<Self> {
        if end <= start {
            return Err(CadenceError::InvalidWindow(format!(
                "window end {} must be after its start {}",
                end, start
            )));
        }
        Ok(Window { start, end })
    }

    /// The whole calendar year.
    pub fn year(year: i32) -> CadenceResult<Self> {
        let first = date(year, 1, 1)?;
        let next = date(year + 1, 1, 1)?;
        Self::new(midnight(first), midnight(next))
    }

    /// One calendar month (1-12).
    pub fn month(year: i32, month: u32) -> CadenceResult<Self> {
        let first = date(year, month, 1)?;
        let next = if month == 12 {
            date(year + 1, 1, 1)?
        } else {
            date(year, month + 1, 1)?
        };
        Self::new(midnight(first), midnight(next))
    }

    /// ISO 8601 week: Monday through Sunday.
    pub fn iso_week(year: i32, week: u32) -> CadenceResult<Self> {
        let monday = NaiveDate::from_isoywd_opt(year, week, Weekday::Mon).ok_or_else(|| {
            CadenceError::InvalidWindow(format!("week {} does not exist in {}", week, year))
        })?;
        Self::spanning(monday, 7)
    }

    /// A single day.
    pub fn day(day: NaiveDate) -> CadenceResult<Self> {
        Self::spanning(day, 1)
    }

    fn spanning(first: NaiveDate, days: i64) -> CadenceResult<Self> {
        let start = midnight(first);
        let end = start
            .checked_add_signed(Duration::days(days))
            .ok_or_else(|| {
                CadenceError::InvalidWindow(format!("{} days from {} is out of range", days, first))
            })?;
        Self::new(start, end)
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }

    /// Whether an event spanning `[from, to)` overlaps this window.
    /// Zero-length events overlap when their instant falls inside.
    pub fn intersects(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        if to <= from {
            return self.contains(from);
        }
        from < self.end && to > self.start
    }

    /// Calendar days touched by this window, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let first = self.start.date_naive();
        let last = (self.end - Duration::nanoseconds(1)).date_naive();
        first.iter_days().take_while(move |d| *d <= last)
    }
}

/// Midnight UTC at the start of `date`.
pub fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Number of days in the given month of the given year.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(31)
}

fn date(year: i32, month: u32, day: u32) -> CadenceResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        CadenceError::InvalidWindow(format!("{}-{:02}-{:02} is not a valid date", year, month, day))
    })
}
