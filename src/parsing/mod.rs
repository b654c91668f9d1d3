// ABOUTME: LLM-first date and availability parsing with the rule-based parsers as fallback
// ABOUTME: LLM output is validated with the same rules before it is accepted
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Parsing Front Door
//!
//! Handlers call [`parse_dates`] and [`parse_availability`] here rather
//! than the rule-based parsers directly, so every stage applies the same
//! grammar. Both functions:
//!
//! 1. screen the text with the rule-based whitelist, so gibberish and menu
//!    words never reach the model
//! 2. ask the LLM when one is configured, keeping its answer only if it
//!    validates
//! 3. otherwise return the rule-based result
//!
//! Weekday expressions ("Friday or Saturday", "Mon-Wed") never go to the
//! model for dates.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use huddle_core::constants::limits::MAX_SLOTS;
use huddle_core::models::TimeWindow;
use huddle_parsers::dates::{is_union_request, is_weekday_expression, screen_date_text};
use huddle_parsers::render::dates_summary;
use huddle_parsers::{DateParseError, ParsedDates, TimeParseError};
use serde::Deserialize;
use tracing::{debug, info};

use crate::llm::{strip_code_fence, LlmClient};

/// Completion token limit for a date extraction
const DATE_MAX_TOKENS: u32 = 200;

/// Completion token limit for an availability extraction
const AVAILABILITY_MAX_TOKENS: u32 = 400;

/// Longest date list accepted from the model
const MAX_LLM_DATES: usize = 31;

/// Parse candidate dates for an event.
///
/// # Errors
///
/// Returns the rule-based parser's error when neither path yields dates.
pub async fn parse_dates(
    llm: Option<&dyn LlmClient>,
    text: &str,
    now: NaiveDateTime,
    previous: &[NaiveDate],
) -> Result<ParsedDates, DateParseError> {
    screen_date_text(text)?;
    let rule_based = huddle_parsers::parse_dates(text, now, previous);

    let Some(llm) = llm else {
        return rule_based;
    };
    if is_weekday_expression(text) {
        debug!("Weekday expression, rule-based date parser is authoritative");
        return rule_based;
    }

    match llm_dates(llm, text, now.date()).await {
        Some(mut dates) => {
            if is_union_request(text) {
                let mut merged = previous.to_vec();
                merged.retain(|date| !dates.contains(date));
                merged.append(&mut dates);
                dates = merged;
            }
            info!(llm = llm.name(), count = dates.len(), "Dates parsed by LLM");
            Ok(ParsedDates::from_dates(dates))
        }
        None => {
            debug!("LLM date parse unusable, using rule-based result");
            rule_based
        }
    }
}

async fn llm_dates(llm: &dyn LlmClient, text: &str, today: NaiveDate) -> Option<Vec<NaiveDate>> {
    let prompt = format!(
        "Today is {} {}. A person planning a get-together proposed these dates: \"{}\".\n\
         Reply with only a JSON array of ISO dates (YYYY-MM-DD) in the order mentioned. \
         A bare weekday means its next occurrence. Reply [] if no dates are meant.",
        today.format("%A"),
        today.format("%Y-%m-%d"),
        text.trim()
    );
    let reply = llm.complete(&prompt, DATE_MAX_TOKENS).await?;
    validate_llm_dates(&reply, today)
}

/// Accept the model's dates only if they parse, are not in the past, and
/// form a plausible list
fn validate_llm_dates(reply: &str, today: NaiveDate) -> Option<Vec<NaiveDate>> {
    let raw: Vec<String> = serde_json::from_str(strip_code_fence(reply)).ok()?;
    let mut dates = Vec::new();
    for item in raw {
        let date = NaiveDate::parse_from_str(item.trim(), "%Y-%m-%d").ok()?;
        if date < today || date.year() > today.year() + 1 {
            return None;
        }
        if !dates.contains(&date) {
            dates.push(date);
        }
    }
    (!dates.is_empty() && dates.len() <= MAX_LLM_DATES).then_some(dates)
}

/// Parse a guest's availability against the event's proposed dates.
///
/// # Errors
///
/// Returns the rule-based parser's error when the text is outside the
/// accepted shapes, or when neither path yields a valid window.
pub async fn parse_availability(
    llm: Option<&dyn LlmClient>,
    text: &str,
    proposed: &[NaiveDate],
    today: NaiveDate,
) -> Result<Vec<TimeWindow>, TimeParseError> {
    let rule_based = huddle_parsers::parse_availability(text, proposed, today);
    if let Err(error) = &rule_based {
        if is_shape_rejection(error) {
            return rule_based;
        }
    }

    let Some(llm) = llm else {
        return rule_based;
    };

    match llm_availability(llm, text, proposed).await {
        Some(windows) => {
            info!(llm = llm.name(), count = windows.len(), "Availability parsed by LLM");
            Ok(windows)
        }
        None => {
            debug!("LLM availability parse unusable, using rule-based result");
            rule_based
        }
    }
}

/// Errors that mean the text failed the shape whitelist itself
const fn is_shape_rejection(error: &TimeParseError) -> bool {
    matches!(
        error,
        TimeParseError::Empty
            | TimeParseError::NoProposedDates
            | TimeParseError::UnrecognizedToken(_)
            | TimeParseError::UnsupportedShape(_)
            | TimeParseError::NeedsDay(_)
    )
}

#[derive(Debug, Deserialize)]
struct LlmWindow {
    date: String,
    #[serde(default)]
    start: Option<String>,
    #[serde(default)]
    end: Option<String>,
    #[serde(default)]
    all_day: bool,
}

async fn llm_availability(
    llm: &dyn LlmClient,
    text: &str,
    proposed: &[NaiveDate],
) -> Option<Vec<TimeWindow>> {
    let proposed_list = proposed
        .iter()
        .map(|date| date.format("%Y-%m-%d (%A)").to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let prompt = format!(
        "An event has these proposed dates: {proposed_list} ({}).\n\
         A guest replied with their availability: \"{}\".\n\
         Reply with only a JSON array of objects {{\"date\": \"YYYY-MM-DD\", \"start\": \"HH:MM\", \
         \"end\": \"HH:MM\", \"all_day\": false}} using 24-hour times and only the proposed dates. \
         morning is 08:00-12:00, afternoon 12:00-18:00, evening 18:00-22:00, all day 08:00-23:59, \
         \"after T\" is T-23:59, \"before T\" is 08:00-T. A bare range like 2-4 means 14:00-16:00, \
         7-11 means 19:00-23:00, 9-12 means 09:00-12:00, 11-5 means 11:00-17:00.",
        dates_summary(proposed),
        text.trim()
    );
    let reply = llm.complete(&prompt, AVAILABILITY_MAX_TOKENS).await?;
    validate_llm_windows(&reply, proposed)
}

/// Keep the model's windows that land on proposed dates and honour the
/// interval rules; `None` when nothing valid remains
fn validate_llm_windows(reply: &str, proposed: &[NaiveDate]) -> Option<Vec<TimeWindow>> {
    let raw: Vec<LlmWindow> = serde_json::from_str(strip_code_fence(reply)).ok()?;
    let mut windows = BTreeSet::new();
    for item in raw {
        let Ok(date) = NaiveDate::parse_from_str(item.date.trim(), "%Y-%m-%d") else {
            continue;
        };
        if !proposed.contains(&date) {
            continue;
        }
        let window = if item.all_day {
            TimeWindow::all_day(date)
        } else {
            let (Some(start), Some(end)) = (
                item.start.as_deref().and_then(parse_clock),
                item.end.as_deref().and_then(parse_clock),
            ) else {
                continue;
            };
            TimeWindow::timed(date, start, end)
        };
        if window.is_valid() {
            windows.insert(window);
        }
    }
    let windows: Vec<TimeWindow> = windows.into_iter().collect();
    (!windows.is_empty() && windows.len() <= proposed.len() * MAX_SLOTS).then_some(windows)
}

fn parse_clock(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    if raw == "24:00" {
        return Some(huddle_core::models::DAY_END);
    }
    NaiveTime::parse_from_str(raw, "%H:%M")
        .ok()
        .map(|time| if time == NaiveTime::MIN { huddle_core::models::DAY_END } else { time })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct CannedLlm(Option<&'static str>);

    #[async_trait]
    impl LlmClient for CannedLlm {
        async fn complete(&self, _prompt: &str, _max_tokens: u32) -> Option<String> {
            self.0.map(str::to_owned)
        }

        fn name(&self) -> &'static str {
            "canned"
        }
    }

    fn tuesday_noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 13)
            .and_then(|date| date.and_hms_opt(12, 0, 0))
            .unwrap_or_default()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, day).unwrap_or_default()
    }

    #[tokio::test]
    async fn test_weekday_conjunction_ignores_llm() {
        let llm = CannedLlm(Some("[\"2026-12-25\"]"));
        let parsed = parse_dates(Some(&llm), "Friday or Saturday", tuesday_noon(), &[]).await;
        assert_eq!(parsed.map(|p| p.dates).ok(), Some(vec![date(16), date(17)]));
    }

    #[tokio::test]
    async fn test_llm_dates_used_when_valid() {
        let llm = CannedLlm(Some("```json\n[\"2026-10-24\"]\n```"));
        let parsed = parse_dates(
            Some(&llm),
            "the saturday after next",
            tuesday_noon(),
            &[],
        )
        .await;
        assert_eq!(parsed.map(|p| p.dates).ok(), Some(vec![date(24)]));
    }

    #[tokio::test]
    async fn test_llm_failure_falls_back_to_rules() {
        let llm = CannedLlm(None);
        let parsed = parse_dates(Some(&llm), "10/17-10/18", tuesday_noon(), &[]).await;
        assert_eq!(parsed.map(|p| p.dates).ok(), Some(vec![date(17), date(18)]));
    }

    #[tokio::test]
    async fn test_menu_digits_never_reach_llm() {
        let llm = CannedLlm(Some("[\"2026-10-16\"]"));
        let parsed = parse_dates(Some(&llm), "1", tuesday_noon(), &[]).await;
        assert!(matches!(parsed, Err(DateParseError::MenuChoice(_))));
    }

    #[tokio::test]
    async fn test_gibberish_availability_refused_before_llm() {
        let llm = CannedLlm(Some(
            "[{\"date\": \"2026-10-16\", \"start\": \"14:00\", \"end\": \"16:00\"}]",
        ));
        let parsed = parse_availability(Some(&llm), "Friday xyzabc", &[date(16)], date(13)).await;
        assert!(matches!(parsed, Err(TimeParseError::UnrecognizedToken(_))));
    }

    #[tokio::test]
    async fn test_llm_windows_outside_proposed_dates_rejected() {
        let llm = CannedLlm(Some(
            "[{\"date\": \"2026-10-20\", \"start\": \"14:00\", \"end\": \"16:00\"}]",
        ));
        let parsed = parse_availability(Some(&llm), "friday 2-4pm", &[date(16)], date(13)).await;
        let expected = TimeWindow::timed(
            date(16),
            NaiveTime::from_hms_opt(14, 0, 0).unwrap_or_default(),
            NaiveTime::from_hms_opt(16, 0, 0).unwrap_or_default(),
        );
        assert_eq!(parsed.ok(), Some(vec![expected]));
    }

    #[test]
    fn test_llm_windows_validated() {
        let reply = "[{\"date\": \"2026-10-16\", \"start\": \"14:00\", \"end\": \"14:20\"}, \
                     {\"date\": \"2026-10-16\", \"all_day\": true}]";
        assert_eq!(
            validate_llm_windows(reply, &[date(16)]),
            Some(vec![TimeWindow::all_day(date(16))])
        );
    }
}
