//! Calendar and clock abstraction.
//!
//! Schedule generation never reads the system clock directly; it asks a
//! `Calendar` for "today", weekdays and date arithmetic so tests can pin
//! all three.

use chrono::{Datelike, Days, Local, NaiveDate, Weekday};

/// Supplies the current date and date arithmetic.
pub trait Calendar {
    /// The current date.
    fn today(&self) -> NaiveDate;

    /// Day of the week for a date.
    fn weekday(&self, date: NaiveDate) -> Weekday {
        date.weekday()
    }

    /// `date + days`, or None on overflow.
    fn add_days(&self, date: NaiveDate, days: u64) -> Option<NaiveDate> {
        date.checked_add_days(Days::new(days))
    }

    /// Saturday or Sunday.
    fn is_weekend(&self, date: NaiveDate) -> bool {
        matches!(self.weekday(date), Weekday::Sat | Weekday::Sun)
    }
}

impl<T: Calendar + ?Sized> Calendar for &T {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }

    fn weekday(&self, date: NaiveDate) -> Weekday {
        (**self).weekday(date)
    }

    fn add_days(&self, date: NaiveDate, days: u64) -> Option<NaiveDate> {
        (**self).add_days(date, days)
    }
}

/// Calendar backed by the local system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCalendar;

impl Calendar for SystemCalendar {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Calendar pinned to a fixed "today".
#[derive(Debug, Clone, Copy)]
pub struct FixedCalendar {
    today: NaiveDate,
}

impl FixedCalendar {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }
}

impl Calendar for FixedCalendar {
    fn today(&self) -> NaiveDate {
        self.today
    }
}

/// First valid match day on or after `date`.
///
/// With `weekends_only` this is the nearest Saturday or Sunday; otherwise the
/// date itself.
pub fn next_match_day<C: Calendar>(
    calendar: &C,
    date: NaiveDate,
    weekends_only: bool,
) -> Option<NaiveDate> {
    if !weekends_only {
        return Some(date);
    }

    let mut current = date;
    while !calendar.is_weekend(current) {
        current = calendar.add_days(current, 1)?;
    }
    Some(current)
}
