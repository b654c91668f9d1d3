// ABOUTME: Rule-based date parser turning a planner's free text into ordered calendar dates
// ABOUTME: Weekdays, weekday ranges, numeric and month-name dates, relative words, unions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Date parsing.
//!
//! The input is split into pieces on commas, `and`, `or` and `&`; each
//! piece must be one recognized date form (or pure filler). The result
//! keeps input order with duplicates removed, and its summary re-parses to
//! the same date set.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike, Weekday};
use huddle_core::constants::keywords::{GREETINGS, MENU_WORDS};
use huddle_core::constants::limits::SAME_DAY_CUTOFF_HOUR;
use huddle_core::constants::normalize_reply;
use regex::Regex;
use std::sync::LazyLock;

use crate::errors::DateParseError;
use crate::render::dates_summary;

/// Longest span a single range may expand to
const MAX_RANGE_DAYS: i64 = 31;

/// Weekday spellings, longest first within each day
pub(crate) const WEEKDAY: &str = r"(mondays?|mon|tuesdays?|tues|tue|wednesdays?|weds|wed|thursdays?|thurs|thur|thu|fridays?|fri|saturdays?|sat|sundays?|sun)";

const MONTH: &str = r"(january|jan|february|feb|march|mar|april|apr|may|june|jun|july|jul|august|aug|september|sept|sep|october|oct|november|nov|december|dec)";

static SPLIT_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\s*(?:[,;&\n]|\band\b|\bor\b)\s*").ok());

static UNION_PREFIX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(?:add|also|plus)\b[:\s]*").ok());

static WEEKDAY_RANGE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^(?:next\s+|this\s+)?{WEEKDAY}\s*(?:-|to|through|thru|until|till)\s*{WEEKDAY}$"
    ))
    .ok()
});

static SINGLE_WEEKDAY: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(&format!(r"^(?:next\s+|this\s+|on\s+)?{WEEKDAY}$")).ok());

// 10/17, 10/17/26, 10/17-10/19, 10/17-19, optionally preceded by a weekday
static NUMERIC_DATE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^(?:{WEEKDAY}\s+)?(\d{{1,2}})/(\d{{1,2}})(?:/(\d{{2}}|\d{{4}}))?(?:\s*(?:-|to|through|thru)\s*(?:{WEEKDAY}\s+)?(?:(\d{{1,2}})/)?(\d{{1,2}}))?$"
    ))
    .ok()
});

// Oct 17, October 17th, October 17-19, Oct 30 - Nov 2
static MONTH_DATE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^(?:{WEEKDAY}\s+)?{MONTH}\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?(?:\s*(?:-|to|through|thru)\s*(?:{MONTH}\.?\s+)?(\d{{1,2}})(?:st|nd|rd|th)?)?$"
    ))
    .ok()
});

static DATE_WORD: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(?:{WEEKDAY}|{MONTH}|today|tonight|tomorrow|tmrw|tmr|weekend)\b|\d{{1,2}}/\d{{1,2}}"
    ))
    .ok()
});

/// Words that may pad a piece without changing its meaning
const FILLER: &[&str] = &[
    "", "on", "the", "either", "both", "maybe", "how about", "what about", "works", "work",
    "dates", "days", "any of", "morning", "afternoon", "evening", "night",
];

/// Successful date parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDates {
    /// Dates in input order, duplicates removed
    pub dates: Vec<NaiveDate>,
    /// `Friday 10/17, Saturday 10/18`
    pub summary: String,
}

impl ParsedDates {
    /// Build from dates already in input order, rendering the summary
    #[must_use]
    pub fn from_dates(dates: Vec<NaiveDate>) -> Self {
        let summary = dates_summary(&dates);
        Self { dates, summary }
    }
}

/// Parse free text into dates relative to `now`.
///
/// `previous` is the event's currently accepted date set; it only matters
/// when the text starts with `add`, `also` or `plus`, in which case the new
/// dates are appended to it.
///
/// # Errors
///
/// Returns a [`DateParseError`] describing why the text is not a date list.
pub fn parse_dates(
    text: &str,
    now: NaiveDateTime,
    previous: &[NaiveDate],
) -> Result<ParsedDates, DateParseError> {
    let normalized = normalize_reply(text);
    reject_non_dates(&normalized)?;

    let (body, union) = strip_union_prefix(&normalized);
    let mut dates: Vec<NaiveDate> = if union { previous.to_vec() } else { Vec::new() };

    let pieces: Vec<&str> = SPLIT_PATTERN
        .as_ref()
        .map_or_else(|| vec![body], |split| split.split(body).collect());

    for piece in pieces {
        let piece = strip_filler(piece.trim());
        if FILLER.contains(&piece) {
            continue;
        }
        for date in parse_piece(piece, now)? {
            if !dates.contains(&date) {
                dates.push(date);
            }
        }
    }

    if dates.is_empty() {
        return Err(DateParseError::NoDateTokens);
    }
    Ok(ParsedDates::from_dates(dates))
}

/// Whether every piece of `text` is a weekday or a weekday range.
///
/// These forms are always answered by the rule-based parser.
#[must_use]
pub fn is_weekday_expression(text: &str) -> bool {
    let normalized = normalize_reply(text);
    let (body, _) = strip_union_prefix(&normalized);
    let (Some(split), Some(single), Some(range)) = (
        SPLIT_PATTERN.as_ref(),
        SINGLE_WEEKDAY.as_ref(),
        WEEKDAY_RANGE.as_ref(),
    ) else {
        return false;
    };
    let mut saw_weekday = false;
    for piece in split.split(body) {
        let piece = strip_filler(piece.trim());
        if FILLER.contains(&piece) {
            continue;
        }
        if single.is_match(piece) || range.is_match(piece) {
            saw_weekday = true;
        } else {
            return false;
        }
    }
    saw_weekday
}

/// Apply the rejection rules alone: menu digits, keywords, greetings and
/// text with no date word at all.
///
/// # Errors
///
/// Returns the same [`DateParseError`] [`parse_dates`] would for such text.
pub fn screen_date_text(text: &str) -> Result<(), DateParseError> {
    reject_non_dates(&normalize_reply(text))
}

/// Whether the text asks to add to the current dates (`add`, `also`, `plus`)
#[must_use]
pub fn is_union_request(text: &str) -> bool {
    strip_union_prefix(&normalize_reply(text)).1
}

fn reject_non_dates(normalized: &str) -> Result<(), DateParseError> {
    if normalized.is_empty() {
        return Err(DateParseError::Empty);
    }
    if normalized.len() <= 2 && normalized.chars().all(|c| c.is_ascii_digit()) {
        return Err(DateParseError::MenuChoice(normalized.to_owned()));
    }
    if MENU_WORDS.contains(&normalized) || GREETINGS.contains(&normalized) {
        return Err(DateParseError::Keyword(normalized.to_owned()));
    }
    let has_date_word = DATE_WORD
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(normalized));
    if has_date_word {
        Ok(())
    } else {
        Err(DateParseError::NoDateTokens)
    }
}

fn strip_union_prefix(normalized: &str) -> (&str, bool) {
    UNION_PREFIX
        .as_ref()
        .and_then(|pattern| pattern.find(normalized))
        .map_or((normalized, false), |found| {
            (&normalized[found.end()..], true)
        })
}

fn strip_filler(piece: &str) -> &str {
    let mut piece = piece;
    loop {
        let before = piece;
        for word in FILLER.iter().filter(|word| !word.is_empty()) {
            if let Some(rest) = piece.strip_prefix(word) {
                if rest.is_empty() || rest.starts_with(' ') {
                    piece = rest.trim_start();
                }
            }
            if let Some(rest) = piece.strip_suffix(word) {
                if rest.is_empty() || rest.ends_with(' ') {
                    piece = rest.trim_end();
                }
            }
        }
        if piece == before {
            return piece;
        }
    }
}

fn parse_piece(piece: &str, now: NaiveDateTime) -> Result<Vec<NaiveDate>, DateParseError> {
    let today = now.date();
    match piece {
        "today" | "tonight" => return Ok(vec![today]),
        "tomorrow" | "tmrw" | "tmr" => return Ok(vec![today + Duration::days(1)]),
        "this weekend" | "weekend" | "the weekend" => return Ok(weekend(today, 0)),
        "next weekend" => return Ok(weekend(today, 7)),
        _ => {}
    }

    if let Some(caps) = WEEKDAY_RANGE.as_ref().and_then(|p| p.captures(piece)) {
        let (Some(from), Some(to)) = (
            caps.get(1).and_then(|m| weekday_from(m.as_str())),
            caps.get(2).and_then(|m| weekday_from(m.as_str())),
        ) else {
            return Err(DateParseError::Unrecognized(piece.to_owned()));
        };
        let start = next_weekday(now, from);
        // "Fri to Fri" runs a full week, ending on the following Friday
        let span = match (to.num_days_from_monday() + 7 - from.num_days_from_monday()) % 7 {
            0 => 7,
            days => i64::from(days),
        };
        return Ok((0..=span).map(|offset| start + Duration::days(offset)).collect());
    }

    if let Some(caps) = SINGLE_WEEKDAY.as_ref().and_then(|p| p.captures(piece)) {
        return caps
            .get(1)
            .and_then(|m| weekday_from(m.as_str()))
            .map(|weekday| vec![next_weekday(now, weekday)])
            .ok_or_else(|| DateParseError::Unrecognized(piece.to_owned()));
    }

    if let Some(caps) = NUMERIC_DATE.as_ref().and_then(|p| p.captures(piece)) {
        let number = |index: usize| caps.get(index).and_then(|m| m.as_str().parse::<u32>().ok());
        let (Some(month), Some(day)) = (number(2), number(3)) else {
            return Err(DateParseError::Unrecognized(piece.to_owned()));
        };
        let year = number(4).map(|y| if y < 100 { 2000 + y } else { y });
        return expand_range(piece, today, month, day, year, number(7), number(6));
    }

    if let Some(caps) = MONTH_DATE.as_ref().and_then(|p| p.captures(piece)) {
        let month = caps.get(2).and_then(|m| month_from(m.as_str()));
        let day = caps.get(3).and_then(|m| m.as_str().parse::<u32>().ok());
        let end_month = caps.get(4).and_then(|m| month_from(m.as_str()));
        let end_day = caps.get(5).and_then(|m| m.as_str().parse::<u32>().ok());
        let (Some(month), Some(day)) = (month, day) else {
            return Err(DateParseError::Unrecognized(piece.to_owned()));
        };
        return expand_range(piece, today, month, day, None, end_day, end_month);
    }

    Err(DateParseError::Unrecognized(piece.to_owned()))
}

/// Resolve a start (and optional end) month/day into consecutive dates
fn expand_range(
    piece: &str,
    today: NaiveDate,
    month: u32,
    day: u32,
    year: Option<u32>,
    end_day: Option<u32>,
    end_month: Option<u32>,
) -> Result<Vec<NaiveDate>, DateParseError> {
    let unrecognized = || DateParseError::Unrecognized(piece.to_owned());
    let start = match year {
        Some(year) => NaiveDate::from_ymd_opt(year as i32, month, day).ok_or_else(unrecognized)?,
        None => upcoming(today, month, day).ok_or_else(unrecognized)?,
    };
    let Some(end_day) = end_day else {
        return Ok(vec![start]);
    };

    let mut end_month = end_month.unwrap_or(month);
    let mut end_year = start.year();
    if end_month == month && end_day < day {
        end_month = month % 12 + 1;
    }
    if end_month < month {
        end_year += 1;
    }
    let end = NaiveDate::from_ymd_opt(end_year, end_month, end_day).ok_or_else(unrecognized)?;

    let span = (end - start).num_days();
    if span < 0 {
        return Err(unrecognized());
    }
    if span >= MAX_RANGE_DAYS {
        return Err(DateParseError::RangeTooLong(piece.to_owned()));
    }
    Ok((0..=span).map(|offset| start + Duration::days(offset)).collect())
}

/// This year's month/day, or next year's when it has already passed
fn upcoming(today: NaiveDate, month: u32, day: u32) -> Option<NaiveDate> {
    let this_year = NaiveDate::from_ymd_opt(today.year(), month, day);
    match this_year {
        Some(date) if date >= today => Some(date),
        _ => NaiveDate::from_ymd_opt(today.year() + 1, month, day),
    }
}

/// Next occurrence of `weekday`: today before the evening cutoff, else strictly later
#[must_use]
pub fn next_weekday(now: NaiveDateTime, weekday: Weekday) -> NaiveDate {
    let today = now.date();
    let mut days_ahead = (weekday.num_days_from_monday() + 7
        - today.weekday().num_days_from_monday())
        % 7;
    if days_ahead == 0 && now.hour() >= SAME_DAY_CUTOFF_HOUR {
        days_ahead = 7;
    }
    today + Duration::days(i64::from(days_ahead))
}

fn weekend(today: NaiveDate, shift: i64) -> Vec<NaiveDate> {
    let dates = match today.weekday() {
        Weekday::Sat => vec![today, today + Duration::days(1)],
        Weekday::Sun => vec![today],
        other => {
            let until_saturday = i64::from(5 - other.num_days_from_monday());
            let saturday = today + Duration::days(until_saturday);
            vec![saturday, saturday + Duration::days(1)]
        }
    };
    if shift == 0 {
        return dates;
    }
    let saturday = dates
        .first()
        .map_or(today, |first| *first - Duration::days(i64::from(first.weekday() == Weekday::Sun)));
    vec![
        saturday + Duration::days(shift),
        saturday + Duration::days(shift + 1),
    ]
}

/// Weekday from any accepted spelling
#[must_use]
pub fn weekday_from(word: &str) -> Option<Weekday> {
    let word = word.trim_end_matches('s');
    let weekday = match word {
        "monday" | "mon" => Weekday::Mon,
        "tuesday" | "tue" => Weekday::Tue,
        "wednesday" | "wed" => Weekday::Wed,
        "thursday" | "thu" | "thur" => Weekday::Thu,
        "friday" | "fri" => Weekday::Fri,
        "saturday" | "sat" => Weekday::Sat,
        "sunday" | "sun" => Weekday::Sun,
        _ => return None,
    };
    Some(weekday)
}

fn month_from(word: &str) -> Option<u32> {
    let month = match word {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sept" | "sep" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Tuesday 2026-10-13
    fn tuesday_at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 13)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .unwrap_or_default()
    }

    fn d(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, month, day).unwrap_or_default()
    }

    fn dates(text: &str, now: NaiveDateTime) -> Vec<NaiveDate> {
        parse_dates(text, now, &[])
            .map(|parsed| parsed.dates)
            .unwrap_or_default()
    }

    #[test]
    fn test_weekday_conjunction_keeps_input_order() {
        assert_eq!(
            dates("Friday or Saturday", tuesday_at(10)),
            vec![d(10, 16), d(10, 17)]
        );
        assert_eq!(
            dates("saturday and friday", tuesday_at(10)),
            vec![d(10, 17), d(10, 16)]
        );
    }

    #[test]
    fn test_same_weekday_cutoff() {
        assert_eq!(dates("Tuesday", tuesday_at(17)), vec![d(10, 13)]);
        assert_eq!(dates("Tuesday", tuesday_at(18)), vec![d(10, 20)]);
    }

    #[test]
    fn test_weekday_range_wraps_the_week() {
        assert_eq!(
            dates("Fri to Sun", tuesday_at(9)),
            vec![d(10, 16), d(10, 17), d(10, 18)]
        );
        assert_eq!(
            dates("saturday - monday", tuesday_at(9)),
            vec![d(10, 17), d(10, 18), d(10, 19)]
        );
    }

    #[test]
    fn test_same_weekday_range_covers_a_week() {
        let week = dates("Fri to Fri", tuesday_at(9));
        assert_eq!(week.len(), 8);
        assert_eq!(week.first(), Some(&d(10, 16)));
        assert_eq!(week.last(), Some(&d(10, 23)));
    }

    #[test]
    fn test_numeric_ranges() {
        assert_eq!(
            dates("10/17-10/19", tuesday_at(9)),
            vec![d(10, 17), d(10, 18), d(10, 19)]
        );
        assert_eq!(dates("10/30-2", tuesday_at(9)).len(), 4);
        let past = dates("3/1", tuesday_at(9));
        assert_eq!(past, vec![NaiveDate::from_ymd_opt(2027, 3, 1).unwrap_or_default()]);
    }

    #[test]
    fn test_month_names() {
        assert_eq!(
            dates("October 17-19", tuesday_at(9)),
            vec![d(10, 17), d(10, 18), d(10, 19)]
        );
        assert_eq!(dates("Oct 17th", tuesday_at(9)), vec![d(10, 17)]);
    }

    #[test]
    fn test_relative_words_and_weekend() {
        assert_eq!(dates("tomorrow", tuesday_at(9)), vec![d(10, 14)]);
        assert_eq!(
            dates("this weekend", tuesday_at(9)),
            vec![d(10, 17), d(10, 18)]
        );
        assert_eq!(
            dates("next weekend", tuesday_at(9)),
            vec![d(10, 24), d(10, 25)]
        );
    }

    #[test]
    fn test_add_prefix_unions_with_previous() {
        let parsed = parse_dates("add Sunday", tuesday_at(9), &[d(10, 16)]);
        assert_eq!(
            parsed.map(|p| p.dates).unwrap_or_default(),
            vec![d(10, 16), d(10, 18)]
        );
    }

    #[test]
    fn test_summary_round_trips() {
        let now = tuesday_at(9);
        let first = parse_dates("Friday, Sat, 10/20", now, &[]).unwrap_or_else(|_| {
            ParsedDates::from_dates(Vec::new())
        });
        assert_eq!(first.summary, "Friday 10/16, Saturday 10/17, Tuesday 10/20");
        let again = parse_dates(&first.summary, now, &[]).map(|p| p.dates);
        assert_eq!(again, Ok(first.dates));
    }

    #[test]
    fn test_rejections() {
        let now = tuesday_at(9);
        assert_eq!(
            parse_dates("1", now, &[]),
            Err(DateParseError::MenuChoice("1".to_owned()))
        );
        assert!(matches!(
            parse_dates("hey", now, &[]),
            Err(DateParseError::Keyword(_))
        ));
        assert_eq!(
            parse_dates("whenever works", now, &[]),
            Err(DateParseError::NoDateTokens)
        );
        assert!(matches!(
            parse_dates("friday banana", now, &[]),
            Err(DateParseError::Unrecognized(_))
        ));
        assert!(matches!(
            parse_dates("13/45", now, &[]),
            Err(DateParseError::Unrecognized(_))
        ));
    }

    #[test]
    fn test_weekday_expression_detection() {
        assert!(is_weekday_expression("Friday or Saturday"));
        assert!(is_weekday_expression("fri to sun"));
        assert!(!is_weekday_expression("Friday 10/17"));
        assert!(!is_weekday_expression("next weekend"));
    }
}
