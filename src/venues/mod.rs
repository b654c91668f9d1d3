// ABOUTME: Venue suggestion collaborator with an LLM source and a curated static fallback
// ABOUTME: Suggestions exclude names already shown so "new list" yields fresh options
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Venue Suggestions
//!
//! Called once when the planner enters venue selection and again on each
//! "new list" request. The suggester never fails: any LLM problem falls
//! back to [`CuratedVenues`].

use std::sync::Arc;

use async_trait::async_trait;
use huddle_core::constants::limits::VENUE_SUGGESTIONS;
use huddle_core::models::VenueSuggestion;
use reqwest::Url;
use tracing::{debug, warn};

use crate::llm::{strip_code_fence, LlmClient};

const VENUE_MAX_TOKENS: u32 = 500;

/// Venue suggestion collaborator
#[async_trait]
pub trait VenueSuggester: Send + Sync {
    /// Up to three venues for `activity` near `location`, skipping any whose
    /// name is in `exclude`
    async fn suggest(
        &self,
        activity: &str,
        location: &str,
        exclude: &[String],
    ) -> Vec<VenueSuggestion>;
}

/// Google Maps search link for a place
#[must_use]
pub fn map_search_link(query: &str) -> Option<String> {
    Url::parse_with_params(
        "https://www.google.com/maps/search/",
        &[("api", "1"), ("query", query)],
    )
    .ok()
    .map(String::from)
}

fn is_excluded(name: &str, exclude: &[String]) -> bool {
    exclude
        .iter()
        .any(|shown| shown.eq_ignore_ascii_case(name.trim()))
}

/// Static per-activity venue styles used when no LLM is available
#[derive(Debug, Clone, Copy, Default)]
pub struct CuratedVenues;

/// Keyword groups and the venue styles offered for them
const CURATED: &[(&[&str], &[(&str, &str)])] = &[
    (
        &["bowl", "bowling"],
        &[
            ("Bowling alley with a bar", "Lanes, shoes and a drink between frames"),
            ("Boutique bowling lounge", "Fewer lanes, better food, easier to book"),
            ("Retro bowling center", "Cheap games and a classic snack bar"),
            ("Arcade and bowling hall", "Bowling plus games for the group"),
        ],
    ),
    (
        &["karaoke", "sing"],
        &[
            ("Private karaoke rooms", "Book a room for the group by the hour"),
            ("Karaoke bar", "Open-mic style with a full bar"),
            ("Korean karaoke house", "Big song catalog and late hours"),
            ("Piano bar", "Sing-alongs with a live pianist"),
        ],
    ),
    (
        &["hike", "hiking", "walk", "trail"],
        &[
            ("Regional park trailhead", "Loop trails with parking nearby"),
            ("Scenic overlook trail", "Short climb, big views"),
            ("Waterfront path", "Flat and easy, good for chatting"),
            ("Botanical garden", "Shaded paths and a cafe"),
        ],
    ),
    (
        &["movie", "movies", "film", "cinema"],
        &[
            ("Dine-in cinema", "Recliners and food delivered to your seat"),
            ("Independent theater", "Indie picks and classic screenings"),
            ("Multiplex", "Newest releases and lots of showtimes"),
            ("Outdoor movie night", "Seasonal screenings in a park"),
        ],
    ),
];

const GENERIC: &[(&str, &str)] = &[
    ("Top-rated spot", "Highly reviewed and good for groups"),
    ("Neighborhood favorite", "Casual and easy to get into"),
    ("Hidden gem", "Smaller and quieter, worth booking ahead"),
    ("Group-friendly venue", "Space for everyone with room to talk"),
];

impl CuratedVenues {
    fn styles(activity: &str) -> Option<&'static [(&'static str, &'static str)]> {
        let lowered = activity.to_lowercase();
        CURATED
            .iter()
            .find(|(keywords, _)| {
                lowered
                    .split_whitespace()
                    .any(|word| keywords.contains(&word))
            })
            .map(|(_, styles)| *styles)
    }

    /// Curated suggestions without any I/O
    #[must_use]
    pub fn list(activity: &str, location: &str, exclude: &[String]) -> Vec<VenueSuggestion> {
        let matched = Self::styles(activity);
        let styles = matched.unwrap_or(GENERIC);
        let build = |(style, description): &(&str, &str)| VenueSuggestion {
            name: if matched.is_some() {
                format!("{style} in {location}")
            } else {
                format!("{style} for {activity} in {location}")
            },
            description: (*description).to_owned(),
            map_link: map_search_link(&format!("{activity} near {location}")),
        };
        let fresh: Vec<VenueSuggestion> = styles
            .iter()
            .map(build)
            .filter(|venue| !is_excluded(&venue.name, exclude))
            .take(VENUE_SUGGESTIONS)
            .collect();
        if fresh.is_empty() {
            styles.iter().map(build).take(VENUE_SUGGESTIONS).collect()
        } else {
            fresh
        }
    }
}

#[async_trait]
impl VenueSuggester for CuratedVenues {
    async fn suggest(
        &self,
        activity: &str,
        location: &str,
        exclude: &[String],
    ) -> Vec<VenueSuggestion> {
        Self::list(activity, location, exclude)
    }
}

/// Asks the LLM for real venues, falling back to the curated list
pub struct LlmVenueSuggester {
    llm: Arc<dyn LlmClient>,
}

impl LlmVenueSuggester {
    /// Wrap an LLM client
    #[must_use]
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    fn parse_reply(reply: &str, exclude: &[String]) -> Vec<VenueSuggestion> {
        let Ok(venues) = serde_json::from_str::<Vec<VenueSuggestion>>(strip_code_fence(reply))
        else {
            return Vec::new();
        };
        venues
            .into_iter()
            .filter(|venue| !venue.name.trim().is_empty() && !is_excluded(&venue.name, exclude))
            .map(|mut venue| {
                if venue.map_link.is_none() {
                    venue.map_link = map_search_link(&venue.name);
                }
                venue
            })
            .take(VENUE_SUGGESTIONS)
            .collect()
    }
}

#[async_trait]
impl VenueSuggester for LlmVenueSuggester {
    async fn suggest(
        &self,
        activity: &str,
        location: &str,
        exclude: &[String],
    ) -> Vec<VenueSuggestion> {
        let skip = if exclude.is_empty() {
            String::new()
        } else {
            format!(" Do not suggest: {}.", exclude.join(", "))
        };
        let prompt = format!(
            "Suggest {VENUE_SUGGESTIONS} real venues for a group outing: {activity} in {location}.{skip}\n\
             Reply with only a JSON array of objects {{\"name\": \"...\", \"description\": \
             \"one short sentence\", \"map_link\": \"https://...\"}}."
        );
        if let Some(reply) = self.llm.complete(&prompt, VENUE_MAX_TOKENS).await {
            let venues = Self::parse_reply(&reply, exclude);
            if !venues.is_empty() {
                debug!(count = venues.len(), "Venue suggestions from LLM");
                return venues;
            }
        }
        warn!(activity, location, "Venue suggestions unavailable, using curated list");
        CuratedVenues::list(activity, location, exclude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curated_matches_activity_keyword() {
        let venues = CuratedVenues::list("bowling", "Oakland", &[]);
        assert_eq!(venues.len(), 3);
        assert_eq!(venues[0].name, "Bowling alley with a bar in Oakland");
        assert!(venues[0]
            .map_link
            .as_deref()
            .is_some_and(|link| link.starts_with("https://www.google.com/maps/search/")));
    }

    #[test]
    fn test_curated_excludes_previous_names() {
        let first = CuratedVenues::list("karaoke", "SF", &[]);
        let shown: Vec<String> = first.iter().map(|venue| venue.name.clone()).collect();
        let second = CuratedVenues::list("karaoke", "SF", &shown);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].name, "Piano bar in SF");
    }

    #[test]
    fn test_unknown_activity_uses_generic_styles() {
        let venues = CuratedVenues::list("axe throwing", "Denver", &[]);
        assert_eq!(venues[0].name, "Top-rated spot for axe throwing in Denver");
    }

    #[test]
    fn test_llm_reply_filtered() {
        let reply = r#"[{"name": "Mission Bowling Club", "description": "Lanes"},
                        {"name": "Old Spot", "description": "Seen already"}]"#;
        let venues = LlmVenueSuggester::parse_reply(reply, &["old spot".to_owned()]);
        assert_eq!(venues.len(), 1);
        assert!(venues[0].map_link.is_some());
    }
}
