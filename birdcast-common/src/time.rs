//! Clock and calendar utilities
//!
//! Extraction resolves relative phrases ("tomorrow", "in 3 days") and
//! defaults against a [`Clock`] so handlers and tests agree on "now".

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Source of the current local date and time
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Wall-clock time in the server's local timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock frozen at a single instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl FixedClock {
    /// Build from calendar fields, `None` if the date or time does not exist
    pub fn at(year: i32, month: u32, day: u32, hour: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .map(Self)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

pub const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

pub const DAY_NAMES: [&str; 7] = [
    "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday",
];

/// Day name for a Monday-based index (0 = Monday)
pub fn day_name(day_of_week: u32) -> &'static str {
    DAY_NAMES[(day_of_week % 7) as usize]
}

/// Monday-based weekday index for a lower-case day name
pub fn day_name_to_index(name: &str) -> Option<u32> {
    DAY_NAMES
        .iter()
        .position(|d| d.eq_ignore_ascii_case(name))
        .map(|i| i as u32)
}

/// Full English month name, `None` outside 1..=12
pub fn month_name(month: u32) -> Option<&'static str> {
    month
        .checked_sub(1)
        .and_then(|i| MONTH_NAMES.get(i as usize))
        .copied()
}

/// Number of days in the given month
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some(next.signed_duration_since(first).num_days() as u32)
}

/// Meteorological season (northern-hemisphere months)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Summer,
    Winter,
    Spring,
    Autumn,
}

impl Season {
    /// Ordering used for the one-hot model columns
    pub const ALL: [Season; 4] = [Season::Summer, Season::Winter, Season::Spring, Season::Autumn];

    /// Dec–Feb winter, Mar–May spring, Jun–Aug summer, else autumn
    pub fn for_month(month: u32) -> Self {
        match month {
            12 | 1 | 2 => Season::Winter,
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            _ => Season::Autumn,
        }
    }

    pub fn current(clock: &dyn Clock) -> Self {
        Self::for_month(clock.today().month())
    }

    /// Word looked for in query text
    pub fn keyword(self) -> &'static str {
        match self {
            Season::Summer => "summer",
            Season::Winter => "winter",
            Season::Spring => "spring",
            Season::Autumn => "autumn",
        }
    }
}
