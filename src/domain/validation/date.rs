//! Natural-language date normalization.
//!
//! The general grammar covers absolute dates and the common relative forms,
//! always preferring a future date when the expression is ambiguous. Phrases
//! of the shape "next <weekday>" are not part of that grammar and go through
//! a dedicated weekday-offset fallback.

use chrono::{Datelike, Days, Local, NaiveDate, Weekday};
use regex::Regex;
use std::sync::LazyLock;

/// Canonical rendering for normalized dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const WEEKDAYS: [(&str, Weekday); 7] = [
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sunday", Weekday::Sun),
];

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

const NUMERIC_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

static RELATIVE_IN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^in (\d{1,4}) (day|days|week|weeks)$").expect("valid relative regex")
});

static RELATIVE_FROM_NOW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,4}) (day|days|week|weeks) from (?:now|today)$")
        .expect("valid relative regex")
});

static MONTH_FIRST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z]+)\.? (\d{1,2})(?:st|nd|rd|th)?(?:,? (\d{4}))?$")
        .expect("valid month-first regex")
});

static DAY_FIRST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})(?:st|nd|rd|th)? (?:of )?([a-z]+)\.?(?:,? (\d{4}))?$")
        .expect("valid day-first regex")
});

/// Parses `input` relative to the local calendar date.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    parse_date_relative_to(input, Local::now().date_naive())
}

/// Parses `input` as if the current date were `today`.
///
/// Returns `None` when neither the general grammar nor the "next <weekday>"
/// fallback can derive a date.
pub fn parse_date_relative_to(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    let text = normalize(input);
    if text.is_empty() {
        return None;
    }

    parse_general(&text, today).or_else(|| {
        if text.contains("next") {
            next_weekday_fallback(&text, today)
        } else {
            None
        }
    })
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn normalize(input: &str) -> String {
    input
        .trim()
        .trim_end_matches(['.', '!', '?'])
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_general(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let text = text.strip_prefix("on ").unwrap_or(text);

    match text {
        "today" | "now" => return Some(today),
        "tomorrow" => return today.checked_add_days(Days::new(1)),
        "day after tomorrow" | "the day after tomorrow" => {
            return today.checked_add_days(Days::new(2))
        }
        "yesterday" => return today.checked_sub_days(Days::new(1)),
        "next week" => return today.checked_add_days(Days::new(7)),
        _ => {}
    }

    if let Some(weekday) = weekday_from_name(text) {
        return upcoming_weekday(today, weekday);
    }

    if let Some(caps) = RELATIVE_IN_RE
        .captures(text)
        .or_else(|| RELATIVE_FROM_NOW_RE.captures(text))
    {
        let amount: u64 = caps[1].parse().ok()?;
        let days = if caps[2].starts_with("week") {
            amount.checked_mul(7)?
        } else {
            amount
        };
        return today.checked_add_days(Days::new(days));
    }

    if let Some(date) = NUMERIC_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
    {
        return Some(date);
    }

    if let Some(caps) = MONTH_FIRST_RE.captures(text) {
        let month = month_from_name(&caps[1])?;
        let day: u32 = caps[2].parse().ok()?;
        return resolve_month_day(today, month, day, caps.get(3).map(|m| m.as_str()));
    }

    if let Some(caps) = DAY_FIRST_RE.captures(text) {
        let day: u32 = caps[1].parse().ok()?;
        let month = month_from_name(&caps[2])?;
        return resolve_month_day(today, month, day, caps.get(3).map(|m| m.as_str()));
    }

    None
}

/// Handles "next <weekday>" by computing the offset to the named weekday.
///
/// The trailing token after the last "next" must be one of the seven weekday
/// names; anything else is rejected.
fn next_weekday_fallback(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let (_, tail) = text.rsplit_once("next")?;
    let target = weekday_from_name(tail.trim())?;
    upcoming_weekday(today, target)
}

fn weekday_from_name(name: &str) -> Option<Weekday> {
    WEEKDAYS
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, weekday)| *weekday)
}

/// Strictly future occurrence of `target`: one to seven days ahead.
fn upcoming_weekday(today: NaiveDate, target: Weekday) -> Option<NaiveDate> {
    let offset = (target.num_days_from_monday() + 7 - today.weekday().num_days_from_monday()) % 7;
    let offset = if offset == 0 { 7 } else { offset };
    today.checked_add_days(Days::new(u64::from(offset)))
}

fn month_from_name(name: &str) -> Option<u32> {
    MONTHS
        .iter()
        .position(|full| *full == name || (name.len() >= 3 && full.starts_with(name)))
        .and_then(|idx| u32::try_from(idx + 1).ok())
}

fn resolve_month_day(
    today: NaiveDate,
    month: u32,
    day: u32,
    year: Option<&str>,
) -> Option<NaiveDate> {
    match year {
        Some(year) => NaiveDate::from_ymd_opt(year.parse().ok()?, month, day),
        // Without a year, pick the next occurrence on or after today.
        None => (today.year()..=today.year() + 8)
            .filter_map(|y| NaiveDate::from_ymd_opt(y, month, day))
            .find(|date| *date >= today),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-01-01 is a Monday.
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_next_weekday_is_strictly_future() {
        for offset in 0..7 {
            let today = monday() + Days::new(offset);
            let parsed = parse_date_relative_to("next monday", today).unwrap();
            let ahead = (parsed - today).num_days();

            assert_eq!(parsed.weekday(), Weekday::Mon);
            assert!((1..=7).contains(&ahead), "offset {ahead} from {today}");
        }
    }

    #[test]
    fn test_next_weekday_from_monday() {
        assert_eq!(parse_date_relative_to("next monday", monday()), ymd(2024, 1, 8));
        assert_eq!(parse_date_relative_to("Next Wednesday", monday()), ymd(2024, 1, 3));
        assert_eq!(parse_date_relative_to("  next   SUNDAY ", monday()), ymd(2024, 1, 7));
    }

    #[test]
    fn test_unknown_weekday_after_next_is_invalid() {
        assert_eq!(parse_date_relative_to("next funday", monday()), None);
        assert_eq!(parse_date_relative_to("next", monday()), None);
        assert_eq!(parse_date_relative_to("next month please", monday()), None);
    }

    #[test]
    fn test_relative_keywords() {
        assert_eq!(parse_date_relative_to("today", monday()), Some(monday()));
        assert_eq!(parse_date_relative_to("Tomorrow", monday()), ymd(2024, 1, 2));
        assert_eq!(parse_date_relative_to("day after tomorrow", monday()), ymd(2024, 1, 3));
        assert_eq!(parse_date_relative_to("yesterday", monday()), ymd(2023, 12, 31));
        assert_eq!(parse_date_relative_to("next week", monday()), ymd(2024, 1, 8));
    }

    #[test]
    fn test_bare_weekday_prefers_future() {
        assert_eq!(parse_date_relative_to("friday", monday()), ymd(2024, 1, 5));
        assert_eq!(parse_date_relative_to("on Friday", monday()), ymd(2024, 1, 5));
        assert_eq!(parse_date_relative_to("monday", monday()), ymd(2024, 1, 8));
    }

    #[test]
    fn test_counted_offsets() {
        assert_eq!(parse_date_relative_to("in 3 days", monday()), ymd(2024, 1, 4));
        assert_eq!(parse_date_relative_to("in 1 week", monday()), ymd(2024, 1, 8));
        assert_eq!(parse_date_relative_to("2 weeks from now", monday()), ymd(2024, 1, 15));
    }

    #[test]
    fn test_numeric_formats() {
        assert_eq!(parse_date_relative_to("2024-02-29", monday()), ymd(2024, 2, 29));
        assert_eq!(parse_date_relative_to("2024/03/15", monday()), ymd(2024, 3, 15));
        assert_eq!(parse_date_relative_to("12/25/2024", monday()), ymd(2024, 12, 25));
        assert_eq!(parse_date_relative_to("2023-02-29", monday()), None);
    }

    #[test]
    fn test_month_names() {
        assert_eq!(parse_date_relative_to("March 5", monday()), ymd(2024, 3, 5));
        assert_eq!(parse_date_relative_to("mar 5th, 2025", monday()), ymd(2025, 3, 5));
        assert_eq!(parse_date_relative_to("5 March 2025", monday()), ymd(2025, 3, 5));
        assert_eq!(parse_date_relative_to("1st of feb", monday()), ymd(2024, 2, 1));
        assert_eq!(parse_date_relative_to("jan 1", monday()), Some(monday()));
        assert_eq!(parse_date_relative_to("smarch 5", monday()), None);
    }

    #[test]
    fn test_month_day_without_year_rolls_forward() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(parse_date_relative_to("february 29", today), ymd(2028, 2, 29));
        assert_eq!(parse_date_relative_to("jan 15", today), ymd(2025, 1, 15));
    }

    #[test]
    fn test_garbage_is_invalid() {
        assert_eq!(parse_date_relative_to("", monday()), None);
        assert_eq!(parse_date_relative_to("   ", monday()), None);
        assert_eq!(parse_date_relative_to("whenever", monday()), None);
        assert_eq!(parse_date_relative_to("in 99999 days", monday()), None);
    }

    #[test]
    fn test_format_is_canonical() {
        assert_eq!(format_date(monday()), "2024-01-01");
    }

    #[test]
    fn test_parse_date_uses_local_calendar() {
        let parsed = parse_date("next monday").unwrap();
        let ahead = (parsed - Local::now().date_naive()).num_days();
        assert!((1..=7).contains(&ahead));
    }
}
