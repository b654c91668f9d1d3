// ABOUTME: Rule-based time-range parser mapping guest replies onto an event's proposed dates
// ABOUTME: Whitelists accepted shapes token by token before producing any window
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Availability parsing.
//!
//! Input is split into segments on `,` `;` `&` `and` `also` `or` `but`.
//! Every token in a segment must belong to the vocabulary (day reference,
//! period word, clock time, range connector, after/before, all-day phrase,
//! or filler); one unknown token rejects the whole reply. Days resolve only
//! against the event's proposed dates.
//!
//! Clock-time conventions:
//! - a trailing `am`/`pm` binds to both ends unless that would invert the
//!   range, in which case the start takes the other meridiem (`10-2pm`);
//! - a leading suffix binds forward the same way (`9am-5`);
//! - bare digit ranges use a day-shape heuristic (`2-4` is 14:00-16:00,
//!   `11-5` is 11:00-17:00, `9-12` is 09:00-12:00);
//! - a lone bare hour below 12 is PM; `noon` is 12:00;
//! - an end of midnight means 23:59.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use huddle_core::models::{TimeWindow, DAY_END, DAY_START};
use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::dates::{weekday_from, WEEKDAY};
use crate::errors::TimeParseError;
use crate::render::window_label;

static SEGMENT_SPLIT: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"\s*(?:[,;&\n]|\band\b|\balso\b|\bplus\b|\bor\b|\bbut\b)\s*").ok()
});

static BETWEEN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\bbetween\s+(\S+)\s+and\s+(\S+)").ok());

static TOKEN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?x)
        (?P<allday>\ball[\s-]?day(?:\s+long)?\b|\bwhole\s+day\b|\bany\s?time\b)
        |(?P<tonight>\btonight\b)
        |(?P<relday>\b(?:today|tomorrow|tmrw)\b)
        |(?P<weekday>\b(?:next\s+|this\s+)?{WEEKDAY}\b)
        |(?P<date>\b\d{{1,2}}/\d{{1,2}}\b)
        |(?P<period>\b(?:mornings?|afternoons?|evenings?|nights?)\b)
        |(?P<time>\b(?:noon|midday|midnight)\b|\b\d{{1,2}}(?::\d{{2}})?(?:\s*(?:am|pm|a|p)\b)?)
        |(?P<dash>-|\bto\b|\bthrough\b|\bthru\b)
        |(?P<until>\b(?:until|till|til)\b)
        |(?P<after>\b(?:after|past|since)\b)
        |(?P<before>\b(?:before|by)\b)
        |(?P<filler>\b(?:free|available|availability|avail|works|work|working|good|fine|ok|okay
            |from|on|in|at|the|i'm|im|i\s+am|i|is|it|are|be|can|could|do|should|would|will
            |any|either|both|between|only|just|pretty|much|probably|around|about|ish|like|my
            |for|every|all|totally|definitely|open|day|days|time|sometime|me|we|us|then|so
            |yes|yeah|sure|well|too|start|starting|let'?s|lets|onwards?|later)\b)
        "
    ))
    .ok()
});

/// Punctuation tolerated between tokens
const GAP_CHARS: &str = ".!?():@~'\"/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    const fn opposite(self) -> Self {
        match self {
            Self::Am => Self::Pm,
            Self::Pm => Self::Am,
        }
    }
}

/// A clock time as typed, before meridiem resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ClockTime {
    hour: u32,
    minute: u32,
    meridiem: Option<Meridiem>,
    twenty_four: bool,
}

impl ClockTime {
    /// The time under meridiem `meridiem`, when the hour is a 12-hour hour
    fn with(self, meridiem: Meridiem) -> Option<NaiveTime> {
        if !(1..=12).contains(&self.hour) {
            return None;
        }
        let hour = match (meridiem, self.hour) {
            (Meridiem::Am, 12) => 0,
            (Meridiem::Pm, 12) | (Meridiem::Am, _) => self.hour,
            (Meridiem::Pm, hour) => hour + 12,
        };
        NaiveTime::from_hms_opt(hour, self.minute, 0)
    }

    fn literal(self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0)
    }

    /// A lone time: explicit suffix wins, 24-hour stays, bare 1-11 is PM
    fn resolve_alone(self) -> Option<NaiveTime> {
        match self.meridiem {
            Some(meridiem) => self.with(meridiem),
            None if self.twenty_four => self.literal(),
            None => self.with(Meridiem::Pm),
        }
    }

    /// The end of a window that opens at 08:00: bare 9 to 11 stay morning
    fn resolve_before(self) -> Option<NaiveTime> {
        match self.meridiem {
            None if !self.twenty_four && (9..=11).contains(&self.hour) => {
                self.with(Meridiem::Am)
            }
            _ => self.resolve_alone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DayRef {
    Weekday(Weekday),
    MonthDay(u32, u32),
    Today,
    Tomorrow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Period {
    Morning,
    Afternoon,
    Evening,
    AllDay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Day(DayRef),
    Period(Period),
    Time(ClockTime),
    Dash,
    Until,
    After,
    Before,
    Filler,
}

/// A window shape not yet placed on a date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: NaiveTime,
    end: NaiveTime,
    all_day: bool,
    bare: bool,
}

impl Span {
    fn timed(start: NaiveTime, end: NaiveTime, bare: bool) -> Self {
        Self {
            start,
            end: if end == NaiveTime::MIN { DAY_END } else { end },
            all_day: false,
            bare,
        }
    }

    const fn on(self, date: NaiveDate) -> TimeWindow {
        TimeWindow {
            date,
            start: self.start,
            end: self.end,
            all_day: self.all_day,
        }
    }
}

/// Parse a guest's availability reply against the event's proposed dates.
///
/// `today` resolves `today`/`tonight`/`tomorrow`. Windows come back sorted
/// by date and start with duplicates removed. Invalid windows are dropped
/// when at least one valid window remains.
///
/// # Errors
///
/// Returns a [`TimeParseError`] when the reply is outside the accepted
/// shapes, names no proposed date, or yields only invalid windows.
pub fn parse_availability(
    text: &str,
    proposed: &[NaiveDate],
    today: NaiveDate,
) -> Result<Vec<TimeWindow>, TimeParseError> {
    let normalized = normalize(text);
    if normalized.is_empty() {
        return Err(TimeParseError::Empty);
    }
    if proposed.is_empty() {
        return Err(TimeParseError::NoProposedDates);
    }

    let segments: Vec<&str> = SEGMENT_SPLIT
        .as_ref()
        .map_or_else(|| vec![normalized.as_str()], |split| split.split(&normalized).collect());

    let mut windows: Vec<TimeWindow> = Vec::new();
    let mut offenders: Vec<String> = Vec::new();
    let mut pending_days: Vec<DayRef> = Vec::new();
    let mut carried_days: Vec<DayRef> = Vec::new();
    let mut unmatched_day = false;

    for segment in segments.into_iter().map(str::trim).filter(|s| !s.is_empty()) {
        let tokens = tokenize(segment)?;
        let days: Vec<DayRef> = tokens
            .iter()
            .filter_map(|token| match token {
                Token::Day(day) => Some(*day),
                _ => None,
            })
            .collect();
        let shape: Vec<Token> = tokens
            .into_iter()
            .filter(|token| !matches!(token, Token::Day(_) | Token::Filler))
            .collect();

        if shape.is_empty() {
            pending_days.extend(days);
            continue;
        }
        let spans = interpret(&shape, segment)?;

        let mut target_days: Vec<DayRef> = std::mem::take(&mut pending_days);
        target_days.extend(days);
        if target_days.is_empty() {
            target_days.clone_from(&carried_days);
        } else {
            carried_days.clone_from(&target_days);
        }

        let dates = if target_days.is_empty() {
            if proposed.len() > 1 && spans.iter().any(|span| span.bare) {
                return Err(TimeParseError::NeedsDay(segment.to_owned()));
            }
            proposed.to_vec()
        } else {
            resolve_days(&target_days, proposed, today)
        };
        if dates.is_empty() {
            unmatched_day = true;
            continue;
        }

        for date in dates {
            for span in &spans {
                place(span.on(date), &mut windows, &mut offenders);
            }
        }
    }

    if !pending_days.is_empty() {
        let dates = resolve_days(&pending_days, proposed, today);
        if dates.is_empty() {
            unmatched_day = true;
        }
        for date in dates {
            place(TimeWindow::all_day(date), &mut windows, &mut offenders);
        }
    }

    if windows.is_empty() {
        return Err(match (offenders.is_empty(), unmatched_day) {
            (false, _) => TimeParseError::Invalid(offenders),
            (true, true) => TimeParseError::NoMatchingDate,
            (true, false) => TimeParseError::UnsupportedShape(normalized),
        });
    }

    windows.sort();
    windows.dedup();
    Ok(windows)
}

/// Parse one clock time such as `7pm`, `7:30 pm`, `19:00` or `at 7`
///
/// # Errors
///
/// Returns a [`TimeParseError`] unless the reply is exactly one time.
pub fn parse_single_time(text: &str) -> Result<NaiveTime, TimeParseError> {
    let normalized = normalize(text);
    if normalized.is_empty() {
        return Err(TimeParseError::Empty);
    }
    let tokens = tokenize(&normalized)?;
    let mut times = tokens.iter().filter_map(|token| match token {
        Token::Time(time) => Some(*time),
        _ => None,
    });
    let only_filler = tokens
        .iter()
        .all(|token| matches!(token, Token::Time(_) | Token::Filler));

    match (times.next(), times.next()) {
        (Some(time), None) if only_filler => time
            .resolve_alone()
            .ok_or(TimeParseError::UnsupportedShape(normalized)),
        _ => Err(TimeParseError::UnsupportedShape(normalized)),
    }
}

fn normalize(text: &str) -> String {
    let lowered = text
        .trim()
        .to_lowercase()
        .replace(['\u{2013}', '\u{2014}'], "-")
        .replace('\u{2019}', "'")
        .replace("a.m.", "am")
        .replace("p.m.", "pm");
    let trimmed = lowered.trim_end_matches(['.', '!', '?']).trim().to_owned();
    match BETWEEN.as_ref() {
        Some(between) => between.replace_all(&trimmed, "${1}-${2}").into_owned(),
        None => trimmed,
    }
}

fn tokenize(segment: &str) -> Result<Vec<Token>, TimeParseError> {
    let Some(pattern) = TOKEN.as_ref() else {
        return Err(TimeParseError::UnsupportedShape(segment.to_owned()));
    };
    let mut tokens = Vec::new();
    let mut last = 0;
    for caps in pattern.captures_iter(segment) {
        let Some(whole) = caps.get(0) else { continue };
        check_gap(&segment[last..whole.start()])?;
        last = whole.end();
        push_tokens(&caps, whole.as_str(), &mut tokens)
            .ok_or_else(|| TimeParseError::UnrecognizedToken(whole.as_str().trim().to_owned()))?;
    }
    check_gap(&segment[last..])?;
    Ok(tokens)
}

fn check_gap(gap: &str) -> Result<(), TimeParseError> {
    if gap
        .chars()
        .all(|c| c.is_whitespace() || GAP_CHARS.contains(c))
    {
        Ok(())
    } else {
        let word = gap
            .split_whitespace()
            .find(|word| !word.chars().all(|c| GAP_CHARS.contains(c)))
            .unwrap_or(gap);
        Err(TimeParseError::UnrecognizedToken(word.to_owned()))
    }
}

fn push_tokens(caps: &Captures<'_>, text: &str, tokens: &mut Vec<Token>) -> Option<()> {
    let token = if caps.name("allday").is_some() {
        Token::Period(Period::AllDay)
    } else if caps.name("tonight").is_some() {
        tokens.push(Token::Day(DayRef::Today));
        Token::Period(Period::Evening)
    } else if caps.name("relday").is_some() {
        Token::Day(if text.starts_with("today") {
            DayRef::Today
        } else {
            DayRef::Tomorrow
        })
    } else if caps.name("weekday").is_some() {
        Token::Day(DayRef::Weekday(weekday_from(text.split_whitespace().last()?)?))
    } else if caps.name("date").is_some() {
        let (month, day) = text.split_once('/')?;
        Token::Day(DayRef::MonthDay(month.parse().ok()?, day.parse().ok()?))
    } else if caps.name("period").is_some() {
        Token::Period(match text.trim_end_matches('s') {
            "morning" => Period::Morning,
            "afternoon" => Period::Afternoon,
            _ => Period::Evening,
        })
    } else if caps.name("time").is_some() {
        Token::Time(clock_time(text.trim())?)
    } else if caps.name("dash").is_some() {
        Token::Dash
    } else if caps.name("until").is_some() {
        Token::Until
    } else if caps.name("after").is_some() {
        Token::After
    } else if caps.name("before").is_some() {
        Token::Before
    } else {
        Token::Filler
    };
    tokens.push(token);
    Some(())
}

fn clock_time(text: &str) -> Option<ClockTime> {
    match text {
        "noon" | "midday" => {
            return Some(ClockTime {
                hour: 12,
                minute: 0,
                meridiem: Some(Meridiem::Pm),
                twenty_four: false,
            })
        }
        "midnight" => {
            return Some(ClockTime {
                hour: 12,
                minute: 0,
                meridiem: Some(Meridiem::Am),
                twenty_four: false,
            })
        }
        _ => {}
    }
    let digits_end = text
        .find(|c: char| !c.is_ascii_digit() && c != ':')
        .unwrap_or(text.len());
    let (clock, suffix) = text.split_at(digits_end);
    let meridiem = match suffix.trim() {
        "" => None,
        "am" | "a" => Some(Meridiem::Am),
        "pm" | "p" => Some(Meridiem::Pm),
        _ => return None,
    };
    let (hour_text, minute) = match clock.split_once(':') {
        Some((hour, minute)) => (hour, minute.parse::<u32>().ok()?),
        None => (clock, 0),
    };
    let hour: u32 = hour_text.parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    let twenty_four =
        meridiem.is_none() && (hour >= 13 || hour == 0 || hour_text.starts_with('0'));
    Some(ClockTime {
        hour,
        minute,
        meridiem,
        twenty_four,
    })
}

/// Turn the non-day tokens of one segment into spans
fn interpret(shape: &[Token], segment: &str) -> Result<Vec<Span>, TimeParseError> {
    let unsupported = || TimeParseError::UnsupportedShape(segment.to_owned());
    let bounded = shape
        .iter()
        .any(|token| matches!(token, Token::After | Token::Before | Token::Until));

    let mut spans = Vec::new();
    let mut rest = shape;
    while !rest.is_empty() {
        let consumed = match rest {
            [Token::After, Token::Time(a), Token::Before | Token::Until | Token::Dash, Token::Time(b), ..]
            | [Token::Time(a), Token::Dash | Token::Until, Token::Time(b), ..] => {
                spans.push(range(*a, *b).ok_or_else(unsupported)?);
                if matches!(rest.first(), Some(Token::After)) {
                    4
                } else {
                    3
                }
            }
            [Token::After, Token::Time(a), ..] => {
                let start = a.resolve_alone().ok_or_else(unsupported)?;
                spans.push(Span::timed(start, DAY_END, false));
                2
            }
            [Token::Before | Token::Until, Token::Time(a), ..] => {
                let end = a.resolve_before().ok_or_else(unsupported)?;
                spans.push(Span::timed(DAY_START, end, false));
                2
            }
            [Token::Period(_), ..] if bounded => 1,
            [Token::Period(period), ..] => {
                spans.push(period_span(*period));
                1
            }
            _ => return Err(unsupported()),
        };
        rest = &rest[consumed..];
    }
    Ok(spans)
}

fn period_span(period: Period) -> Span {
    let at = |hour: u32| NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(DAY_START);
    match period {
        Period::Morning => Span::timed(DAY_START, at(12), false),
        Period::Afternoon => Span::timed(at(12), at(18), false),
        Period::Evening => Span::timed(at(18), at(22), false),
        Period::AllDay => Span {
            start: DAY_START,
            end: DAY_END,
            all_day: true,
            bare: false,
        },
    }
}

/// Resolve a two-ended range under the suffix binding rules
fn range(a: ClockTime, b: ClockTime) -> Option<Span> {
    let span = match (a.meridiem, b.meridiem) {
        (Some(ma), Some(mb)) => Span::timed(a.with(ma)?, b.with(mb)?, false),
        (None, Some(mb)) if !a.twenty_four => {
            let end = b.with(mb)?;
            let start = match a.with(mb)? {
                start if start < end => start,
                _ => a.with(mb.opposite())?,
            };
            Span::timed(start, end, false)
        }
        (Some(ma), None) if !b.twenty_four => {
            let start = a.with(ma)?;
            let end = match b.with(ma)? {
                end if end > start => end,
                _ => b.with(ma.opposite())?,
            };
            Span::timed(start, end, false)
        }
        (None, None) if !a.twenty_four && !b.twenty_four => bare_range(a, b)?,
        _ => {
            let resolve = |time: ClockTime| match time.meridiem {
                Some(meridiem) => time.with(meridiem),
                None => time.literal(),
            };
            Span::timed(resolve(a)?, resolve(b)?, false)
        }
    };
    Some(span)
}

/// Day-shape heuristic for ranges with no suffix at all
fn bare_range(a: ClockTime, b: ClockTime) -> Option<Span> {
    let (start, end) = match (a.hour, b.hour) {
        (s, 12) if s < 12 => (a.with(Meridiem::Am)?, b.with(Meridiem::Pm)?),
        (12, _) => (a.with(Meridiem::Pm)?, b.with(Meridiem::Pm)?),
        (s, e) if s > e => (a.with(Meridiem::Am)?, b.with(Meridiem::Pm)?),
        _ => (a.with(Meridiem::Pm)?, b.with(Meridiem::Pm)?),
    };
    Some(Span::timed(start, end, true))
}

fn resolve_days(days: &[DayRef], proposed: &[NaiveDate], today: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    for day in days {
        for date in proposed {
            let matches = match day {
                DayRef::Weekday(weekday) => date.weekday() == *weekday,
                DayRef::MonthDay(month, day) => date.month() == *month && date.day() == *day,
                DayRef::Today => *date == today,
                DayRef::Tomorrow => *date == today + Duration::days(1),
            };
            if matches && !dates.contains(date) {
                dates.push(*date);
            }
        }
    }
    dates
}

fn place(window: TimeWindow, windows: &mut Vec<TimeWindow>, offenders: &mut Vec<String>) {
    if window.is_valid() {
        windows.push(window);
    } else {
        let reason = if window.start >= window.end {
            "ends before it starts"
        } else {
            "is shorter than 30 minutes"
        };
        offenders.push(format!("{} {reason}", window_label(&window)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Friday 10/16 and Saturday 10/17, 2026
    fn fri() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap_or_default()
    }

    fn sat() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap_or_default()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 13).unwrap_or_default()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default()
    }

    fn spans(text: &str, proposed: &[NaiveDate]) -> Vec<(NaiveDate, NaiveTime, NaiveTime, bool)> {
        parse_availability(text, proposed, today())
            .unwrap_or_default()
            .into_iter()
            .map(|w| (w.date, w.start, w.end, w.all_day))
            .collect()
    }

    #[test]
    fn test_bare_range_on_single_date_event() {
        assert_eq!(spans("2-4", &[fri()]), vec![(fri(), t(14, 0), t(16, 0), false)]);
    }

    #[test]
    fn test_bare_range_needs_day_when_several_dates() {
        assert_eq!(
            parse_availability("2-4", &[fri(), sat()], today()),
            Err(TimeParseError::NeedsDay("2-4".to_owned()))
        );
        assert_eq!(
            spans("Sat 2-4", &[fri(), sat()]),
            vec![(sat(), t(14, 0), t(16, 0), false)]
        );
    }

    #[test]
    fn test_suffixed_range_alone_applies_to_every_date() {
        assert_eq!(spans("2-6pm", &[fri(), sat()]).len(), 2);
    }

    #[test]
    fn test_gibberish_is_rejected_before_anything_else() {
        assert_eq!(
            parse_availability("Monday xyzabc", &[fri()], today()),
            Err(TimeParseError::UnrecognizedToken("xyzabc".to_owned()))
        );
    }

    #[test]
    fn test_bare_heuristics() {
        let one = [fri()];
        assert_eq!(spans("7-11", &one)[0].1, t(19, 0));
        assert_eq!(spans("7-11", &one)[0].2, t(23, 0));
        assert_eq!(spans("11-5", &one)[0].1, t(11, 0));
        assert_eq!(spans("11-5", &one)[0].2, t(17, 0));
        assert_eq!(spans("9-12", &one)[0].1, t(9, 0));
        assert_eq!(spans("9-12", &one)[0].2, t(12, 0));
        assert_eq!(spans("1-6", &one)[0].1, t(13, 0));
    }

    #[test]
    fn test_suffix_binding() {
        let one = [fri()];
        assert_eq!(spans("10-2pm", &one), vec![(fri(), t(10, 0), t(14, 0), false)]);
        assert_eq!(spans("9a-12p", &one), vec![(fri(), t(9, 0), t(12, 0), false)]);
        assert_eq!(spans("9am-5", &one), vec![(fri(), t(9, 0), t(17, 0), false)]);
        assert_eq!(spans("14:00-16:00", &one), vec![(fri(), t(14, 0), t(16, 0), false)]);
        assert_eq!(spans("8pm-12am", &one), vec![(fri(), t(20, 0), t(23, 59), false)]);
        assert_eq!(
            spans("between 2 and 4:30pm", &one),
            vec![(fri(), t(14, 0), t(16, 30), false)]
        );
    }

    #[test]
    fn test_period_words_and_bounds() {
        let both = [fri(), sat()];
        assert_eq!(
            spans("Friday afternoon", &both),
            vec![(fri(), t(12, 0), t(18, 0), false)]
        );
        assert_eq!(
            spans("Saturday all day", &both),
            vec![(sat(), DAY_START, DAY_END, true)]
        );
        assert_eq!(
            spans("I'm free Fri after 5", &both),
            vec![(fri(), t(17, 0), DAY_END, false)]
        );
        assert_eq!(
            spans("sat before 3pm", &both),
            vec![(sat(), DAY_START, t(15, 0), false)]
        );
    }

    #[test]
    fn test_bare_before_bound_stays_in_the_morning() {
        let one = [fri()];
        assert_eq!(spans("before 11", &one), vec![(fri(), DAY_START, t(11, 0), false)]);
        assert_eq!(spans("until 10:30", &one), vec![(fri(), DAY_START, t(10, 30), false)]);
        assert_eq!(spans("before 12", &one), vec![(fri(), DAY_START, t(12, 0), false)]);
        assert_eq!(spans("before 5", &one), vec![(fri(), DAY_START, t(17, 0), false)]);
        assert_eq!(spans("before 11pm", &one), vec![(fri(), DAY_START, t(23, 0), false)]);
    }

    #[test]
    fn test_weekday_without_time_carries_forward() {
        let both = [fri(), sat()];
        assert_eq!(
            spans("Friday and Saturday after 5pm", &both),
            vec![(fri(), t(17, 0), DAY_END, false), (sat(), t(17, 0), DAY_END, false)]
        );
        assert_eq!(
            spans("Fri 2-4pm, Saturday", &both),
            vec![(fri(), t(14, 0), t(16, 0), false), (sat(), DAY_START, DAY_END, true)]
        );
    }

    #[test]
    fn test_weekday_matching_several_dates() {
        let next_fri = fri() + Duration::days(7);
        assert_eq!(spans("Fridays 6-9pm", &[fri(), next_fri]).len(), 2);
    }

    #[test]
    fn test_unproposed_weekday_fails() {
        assert_eq!(
            parse_availability("Sunday 2-4pm", &[fri(), sat()], today()),
            Err(TimeParseError::NoMatchingDate)
        );
    }

    #[test]
    fn test_only_invalid_windows_enumerate_offenders() {
        let result = parse_availability("6pm-6:20pm", &[fri()], today());
        assert!(matches!(result, Err(TimeParseError::Invalid(ref list)) if list.len() == 1));
    }

    #[test]
    fn test_invalid_windows_dropped_when_valid_remain() {
        assert_eq!(
            spans("6pm-6:20pm, 7-9pm", &[fri()]),
            vec![(fri(), t(19, 0), t(21, 0), false)]
        );
    }

    #[test]
    fn test_single_time_shape() {
        assert_eq!(parse_single_time("7pm"), Ok(t(19, 0)));
        assert_eq!(parse_single_time("7:30 pm"), Ok(t(19, 30)));
        assert_eq!(parse_single_time("19:00"), Ok(t(19, 0)));
        assert_eq!(parse_single_time("at 7"), Ok(t(19, 0)));
        assert_eq!(parse_single_time("noon"), Ok(t(12, 0)));
        assert!(parse_single_time("2-4pm").is_err());
        assert!(parse_single_time("pizza").is_err());
    }
}
