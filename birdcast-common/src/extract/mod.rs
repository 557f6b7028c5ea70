//! Free-text query feature extraction
//!
//! Turns a natural-language sighting question ("Will the kingfisher be at
//! Yala tomorrow morning?") into the structured record each model expects.
//! Three variants exist, one per prediction route:
//!
//! - [`extract_presence_features`]: date, hour, locality and species
//! - [`extract_location_features`]: date, hour and species
//! - [`extract_best_time_features`]: year, weekday, locality, species and
//!   season / time-period flags
//!
//! Extraction never fails on unrecognized text; missing fields fall back to
//! the clock or to the unknown sentinels. It fails only when the text names
//! a calendar date that does not exist.

pub mod rules;

use chrono::{Datelike, Days, NaiveDate, Timelike};
use serde::Serialize;
use std::fmt;

use crate::catalog::{find_locality, find_species, Locality, Species};
use crate::time::{day_name, days_in_month, Clock, Season};
use crate::{Error, Result};
use rules::{first_match, DAY_NUMBER, HOUR_RULES, MONTH, RELATIVE_DATE, WEEKDAY, YEAR};

/// Coarse time-of-day bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
    Unspecified,
}

impl TimeOfDay {
    /// Bucket for a 24-hour clock hour
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=10 => TimeOfDay::Morning,
            11..=15 => TimeOfDay::Afternoon,
            16..=19 => TimeOfDay::Evening,
            20..=23 | 0 => TimeOfDay::Night,
            _ => TimeOfDay::Unspecified,
        }
    }

    /// Hour assumed when only the bucket word is given
    pub fn start_hour(self) -> u32 {
        match self {
            TimeOfDay::Morning => 6,
            TimeOfDay::Afternoon => 11,
            TimeOfDay::Evening => 16,
            TimeOfDay::Night => 20,
            TimeOfDay::Unspecified => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
            TimeOfDay::Unspecified => "unspecified",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calendar date resolved from query text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    /// 0 = Monday .. 6 = Sunday
    pub day_of_week: u32,
    pub day_name: &'static str,
}

impl ResolvedDate {
    fn from_date(date: NaiveDate) -> Self {
        let day_of_week = date.weekday().num_days_from_monday();
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
            day_of_week,
            day_name: day_name(day_of_week),
        }
    }
}

/// Features for the presence model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresenceFeatures {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub day_of_week: u32,
    pub day_name: &'static str,
    pub hour: u32,
    pub time_of_day: TimeOfDay,
    pub locality: Locality,
    pub bird_name: Species,
}

/// Features for the location model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationFeatures {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub day_of_week: u32,
    pub day_name: &'static str,
    pub hour: u32,
    pub time_of_day: TimeOfDay,
    pub bird_name: Species,
}

/// One-hot season columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SeasonFlags {
    #[serde(rename = "Is_Summer")]
    pub summer: bool,
    #[serde(rename = "Is_Winter")]
    pub winter: bool,
    #[serde(rename = "Is_Spring")]
    pub spring: bool,
    #[serde(rename = "Is_Autumn")]
    pub autumn: bool,
}

impl SeasonFlags {
    pub fn set(&mut self, season: Season) {
        match season {
            Season::Summer => self.summer = true,
            Season::Winter => self.winter = true,
            Season::Spring => self.spring = true,
            Season::Autumn => self.autumn = true,
        }
    }

    pub fn any(&self) -> bool {
        self.summer || self.winter || self.spring || self.autumn
    }

    /// Values in model column order: summer, winter, spring, autumn
    pub fn as_row(&self) -> [f64; 4] {
        [self.summer, self.winter, self.spring, self.autumn].map(|f| f as u8 as f64)
    }
}

/// One-hot time-period columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PeriodFlags {
    #[serde(rename = "Is_Morning")]
    pub morning: bool,
    #[serde(rename = "Is_Afternoon")]
    pub afternoon: bool,
    #[serde(rename = "Is_Evening")]
    pub evening: bool,
    #[serde(rename = "Is_Night")]
    pub night: bool,
}

impl PeriodFlags {
    /// Values in model column order: morning, afternoon, evening, night
    pub fn as_row(&self) -> [f64; 4] {
        [self.morning, self.afternoon, self.evening, self.night].map(|f| f as u8 as f64)
    }
}

/// Features for the best-time models
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestTimeFeatures {
    pub year: i32,
    pub day_of_week: u32,
    pub day_name: &'static str,
    pub locality: Locality,
    pub bird_name: Species,
    #[serde(flatten)]
    pub seasons: SeasonFlags,
    #[serde(flatten)]
    pub periods: PeriodFlags,
}

/// Resolve the target date of a lower-cased query
///
/// Priority: relative phrase, weekday name, bare day number, today. A
/// number may count as both the hour and the day.
pub fn resolve_date(query: &str, clock: &dyn Clock) -> Result<ResolvedDate> {
    let today = clock.today();
    let year = YEAR.first(query).unwrap_or(today.year());
    let month = MONTH.first(query).unwrap_or(today.month());

    if let Some(relative) = RELATIVE_DATE.first(query) {
        let offset = relative.offset_days();
        let date = today
            .checked_add_days(Days::new(offset))
            .ok_or_else(|| Error::InvalidDate(format!("{} days from {}", offset, today)))?;
        return Ok(ResolvedDate::from_date(date));
    }

    let day = if let Some(weekday) = WEEKDAY.first(query) {
        let first = calendar_date(year, month, 1)?;
        let shift = (7 + weekday - first.weekday().num_days_from_monday()) % 7;
        first.day() + shift
    } else if let Some(day) = DAY_NUMBER.first(query) {
        day
    } else if year == today.year() && month == today.month() {
        today.day()
    } else {
        let last = days_in_month(year, month)
            .ok_or_else(|| Error::InvalidDate(format!("{}-{:02}", year, month)))?;
        today.day().min(last)
    };

    calendar_date(year, month, day).map(ResolvedDate::from_date)
}

fn calendar_date(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| Error::InvalidDate(format!("{}-{:02}-{:02}", year, month, day)))
}

/// Resolve the target hour of a lower-cased query
///
/// Explicit clock time, then a time-of-day word, then the current hour.
pub fn resolve_hour(query: &str, clock: &dyn Clock) -> u32 {
    first_match(&HOUR_RULES, query).unwrap_or_else(|| clock.now().hour())
}

/// Extract presence-model features from a free-text query
pub fn extract_presence_features(query: &str, clock: &dyn Clock) -> Result<PresenceFeatures> {
    let query = query.to_lowercase();
    let date = resolve_date(&query, clock)?;
    let hour = resolve_hour(&query, clock);

    Ok(PresenceFeatures {
        year: date.year,
        month: date.month,
        day: date.day,
        day_of_week: date.day_of_week,
        day_name: date.day_name,
        hour,
        time_of_day: TimeOfDay::from_hour(hour),
        locality: find_locality(&query),
        bird_name: find_species(&query),
    })
}

/// Extract location-model features from a free-text query
pub fn extract_location_features(query: &str, clock: &dyn Clock) -> Result<LocationFeatures> {
    let query = query.to_lowercase();
    let date = resolve_date(&query, clock)?;
    let hour = resolve_hour(&query, clock);

    Ok(LocationFeatures {
        year: date.year,
        month: date.month,
        day: date.day,
        day_of_week: date.day_of_week,
        day_name: date.day_name,
        hour,
        time_of_day: TimeOfDay::from_hour(hour),
        bird_name: find_species(&query),
    })
}

/// Extract best-time-model features from a free-text query
///
/// Season words are plain substrings; with none present the current season
/// is flagged. Time-period flags have no default.
pub fn extract_best_time_features(query: &str, clock: &dyn Clock) -> BestTimeFeatures {
    let query = query.to_lowercase();
    let today = clock.today();

    let year = YEAR.first(&query).unwrap_or(today.year());
    let day_of_week = WEEKDAY
        .first(&query)
        .unwrap_or_else(|| today.weekday().num_days_from_monday());

    let mut seasons = SeasonFlags::default();
    for season in Season::ALL {
        if query.contains(season.keyword()) {
            seasons.set(season);
        }
    }
    if !seasons.any() {
        seasons.set(Season::current(clock));
    }

    let periods = PeriodFlags {
        morning: query.contains("morning"),
        afternoon: query.contains("afternoon"),
        evening: query.contains("evening"),
        night: query.contains("night"),
    };

    BestTimeFeatures {
        year,
        day_of_week,
        day_name: day_name(day_of_week),
        locality: find_locality(&query),
        bird_name: find_species(&query),
        seasons,
        periods,
    }
}
