//! Ordered lexical rules for query parsing
//!
//! Each rule pairs a compiled pattern with an extractor. Rules are tried in
//! list order and, within a rule, matches are tried left to right; the first
//! extractor returning `Some` wins. All patterns expect lower-cased input.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::ops::Range;

use super::TimeOfDay;
use crate::time::day_name_to_index;

/// A (pattern, extractor) pair
pub struct Rule<T> {
    pub name: &'static str,
    pattern: &'static Lazy<Regex>,
    extract: fn(&Captures<'_>) -> Option<T>,
}

impl<T> Rule<T> {
    /// First accepted match of this rule, with the byte span it covered
    pub fn find(&self, text: &str) -> Option<(T, Range<usize>)> {
        self.pattern.captures_iter(text).find_map(|caps| {
            let span = caps.get(0)?.range();
            (self.extract)(&caps).map(|value| (value, span))
        })
    }

    /// Value of the first accepted match
    pub fn first(&self, text: &str) -> Option<T> {
        self.find(text).map(|(value, _)| value)
    }
}

/// Evaluate rules in priority order, first accepted match wins
pub fn first_match<T>(rules: &[&Rule<T>], text: &str) -> Option<T> {
    rules.iter().find_map(|rule| {
        let (value, span) = rule.find(text)?;
        tracing::trace!(rule = rule.name, ?span, "Rule matched");
        Some(value)
    })
}

// ============================================================================
// Patterns
// ============================================================================

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(20[0-9]{2})\b").expect("valid regex"));

static MONTH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(january|february|march|april|may|june|july|august|september|october|november|december)\b",
    )
    .expect("valid regex")
});

static WEEKDAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b")
        .expect("valid regex")
});

static RELATIVE_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(tomorrow|next week|day after tomorrow|in (\d+) days)").expect("valid regex")
});

static DAY_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([1-9]|[12][0-9]|3[01])\b").expect("valid regex"));

static CLOCK_TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([0-9]{1,2}):?([0-9]{2})?\s?(a\.?m\.?|p\.?m\.?)?\b").expect("valid regex")
});

static TIME_OF_DAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(morning|afternoon|evening|night)\b").expect("valid regex"));

// ============================================================================
// Rules
// ============================================================================

/// Relative date phrase, resolved against today
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeDate {
    Tomorrow,
    DayAfterTomorrow,
    NextWeek,
    InDays(u64),
}

impl RelativeDate {
    pub fn offset_days(self) -> u64 {
        match self {
            RelativeDate::Tomorrow => 1,
            RelativeDate::DayAfterTomorrow => 2,
            RelativeDate::NextWeek => 7,
            RelativeDate::InDays(n) => n,
        }
    }
}

pub static YEAR: Rule<i32> = Rule {
    name: "year",
    pattern: &YEAR_RE,
    extract: |caps| caps.get(1)?.as_str().parse().ok(),
};

pub static MONTH: Rule<u32> = Rule {
    name: "month",
    pattern: &MONTH_RE,
    extract: |caps| {
        let name = caps.get(1)?.as_str();
        crate::time::MONTH_NAMES
            .iter()
            .position(|m| m.eq_ignore_ascii_case(name))
            .map(|i| i as u32 + 1)
    },
};

pub static WEEKDAY: Rule<u32> = Rule {
    name: "weekday",
    pattern: &WEEKDAY_RE,
    extract: |caps| day_name_to_index(caps.get(1)?.as_str()),
};

pub static RELATIVE_DATE: Rule<RelativeDate> = Rule {
    name: "relative_date",
    pattern: &RELATIVE_DATE_RE,
    extract: |caps| {
        let phrase = caps.get(1)?.as_str();
        Some(match phrase {
            "tomorrow" => RelativeDate::Tomorrow,
            "day after tomorrow" => RelativeDate::DayAfterTomorrow,
            "next week" => RelativeDate::NextWeek,
            // Offsets too large for u64 cannot land on a calendar date anyway
            _ => RelativeDate::InDays(caps.get(2)?.as_str().parse().unwrap_or(u64::MAX)),
        })
    },
};

pub static DAY_NUMBER: Rule<u32> = Rule {
    name: "day_number",
    pattern: &DAY_NUMBER_RE,
    extract: |caps| caps.get(1)?.as_str().parse().ok(),
};

/// Clock time: `H`, `H:MM`, `HMM`, each with an optional meridiem
///
/// The hour is the leading one or two digits, so a bare number counts as
/// an hour. `pm` adds 12 below noon and `12 am` is midnight. A token whose
/// resulting hour is past 23 is skipped in favour of the next one.
pub static CLOCK_TIME: Rule<u32> = Rule {
    name: "clock_time",
    pattern: &CLOCK_TIME_RE,
    extract: clock_time_hour,
};

static TIME_OF_DAY_HOUR: Rule<u32> = Rule {
    name: "time_of_day_hour",
    pattern: &TIME_OF_DAY_RE,
    extract: |caps| time_of_day_word(caps).map(TimeOfDay::start_hour),
};

/// Hour rules in priority order
pub static HOUR_RULES: [&Rule<u32>; 2] = [&CLOCK_TIME, &TIME_OF_DAY_HOUR];

fn clock_time_hour(caps: &Captures<'_>) -> Option<u32> {
    let hour: u32 = caps.get(1)?.as_str().parse().ok()?;
    let period = caps.get(3).map(|p| p.as_str().replace('.', ""));

    let hour = match period.as_deref() {
        Some("pm") if hour < 12 => hour + 12,
        Some("am") if hour == 12 => 0,
        _ => hour,
    };
    (hour <= 23).then_some(hour)
}

fn time_of_day_word(caps: &Captures<'_>) -> Option<TimeOfDay> {
    match caps.get(1)?.as_str() {
        "morning" => Some(TimeOfDay::Morning),
        "afternoon" => Some(TimeOfDay::Afternoon),
        "evening" => Some(TimeOfDay::Evening),
        "night" => Some(TimeOfDay::Night),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find<T>(rule: &Rule<T>, text: &str) -> Option<T> {
        rule.first(text)
    }

    #[test]
    fn test_year_requires_twenty_prefix() {
        assert_eq!(find(&YEAR, "in march 2026"), Some(2026));
        assert_eq!(find(&YEAR, "back in 1999"), None);
        assert_eq!(find(&YEAR, "code 20251"), None);
    }

    #[test]
    fn test_month_first_match() {
        assert_eq!(find(&MONTH, "june or july"), Some(6));
        assert_eq!(find(&MONTH, "marching band"), None);
    }

    #[test]
    fn test_weekday() {
        assert_eq!(find(&WEEKDAY, "next sunday"), Some(6));
        assert_eq!(find(&WEEKDAY, "mondays"), None);
    }

    #[test]
    fn test_relative_date_leftmost_phrase() {
        assert_eq!(
            find(&RELATIVE_DATE, "the day after tomorrow"),
            Some(RelativeDate::DayAfterTomorrow)
        );
        assert_eq!(find(&RELATIVE_DATE, "tomorrow, not next week"), Some(RelativeDate::Tomorrow));
        assert_eq!(find(&RELATIVE_DATE, "in 10 days"), Some(RelativeDate::InDays(10)));
        assert_eq!(find(&RELATIVE_DATE, "next week"), Some(RelativeDate::NextWeek));
        assert_eq!(find(&RELATIVE_DATE, "today"), None);
    }

    #[test]
    fn test_relative_date_huge_offset_saturates() {
        assert_eq!(
            find(&RELATIVE_DATE, "in 99999999999999999999999 days"),
            Some(RelativeDate::InDays(u64::MAX))
        );
    }

    #[test]
    fn test_clock_time_meridiem() {
        assert_eq!(find(&CLOCK_TIME, "at 3pm"), Some(15));
        assert_eq!(find(&CLOCK_TIME, "at 12am"), Some(0));
        assert_eq!(find(&CLOCK_TIME, "at 12pm"), Some(12));
        assert_eq!(find(&CLOCK_TIME, "at 7 a.m. sharp"), Some(7));
        assert_eq!(find(&CLOCK_TIME, "at 5:30 p.m."), Some(17));
        assert_eq!(find(&CLOCK_TIME, "at 0:30 am"), Some(0));
        assert_eq!(find(&CLOCK_TIME, "at 13pm"), Some(13));
    }

    #[test]
    fn test_clock_time_twenty_four_hour() {
        assert_eq!(find(&CLOCK_TIME, "around 18:45"), Some(18));
        assert_eq!(find(&CLOCK_TIME, "around 1830"), Some(18));
        assert_eq!(find(&CLOCK_TIME, "around 25:00"), None);
    }

    #[test]
    fn test_clock_time_bare_number_is_hour() {
        assert_eq!(find(&CLOCK_TIME, "at 7 in june"), Some(7));
        assert_eq!(find(&CLOCK_TIME, "on 15 march 2025"), Some(15));
        assert_eq!(find(&CLOCK_TIME, "on 28 march at 4pm"), Some(16));
        assert_eq!(find(&CLOCK_TIME, "in march"), None);
    }

    #[test]
    fn test_hour_rules_priority() {
        assert_eq!(first_match(&HOUR_RULES, "morning at 9am"), Some(9));
        assert_eq!(first_match(&HOUR_RULES, "in the evening"), Some(16));
        assert_eq!(first_match(&HOUR_RULES, "some time"), None);
    }

    #[test]
    fn test_hour_rules_share_clock_time_rule() {
        assert!(std::ptr::eq(HOUR_RULES[0], &CLOCK_TIME));
    }

    #[test]
    fn test_day_number_includes_clock_hours() {
        assert_eq!(find(&DAY_NUMBER, "at 3 pm on the 21"), Some(3));
        assert_eq!(find(&DAY_NUMBER, "on 7 march"), Some(7));
        assert_eq!(find(&DAY_NUMBER, "at 3pm"), None);
        assert_eq!(find(&DAY_NUMBER, "march 2025"), None);
        assert_eq!(find(&DAY_NUMBER, "the 32nd"), None);
    }
}
