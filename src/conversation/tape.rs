// ABOUTME: Records collaborator answers outside the write transaction and replays them inside it
// ABOUTME: Keeps LLM and venue latency out of the window where SQLite's write lock is held
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Collaborator Tape
//!
//! A turn runs its handler twice. The first pass reads a snapshot without a
//! transaction and talks to the real collaborators through a [`Recorder`].
//! The second pass re-reads inside the write transaction and gets the same
//! answers from a [`Replayer`] with no network I/O.
//!
//! A replay miss means the state moved between the passes and the handler
//! asked something new. The LLM then answers `None`, which sends the parsers
//! down their rule-based path, and venues come from [`CuratedVenues`].

use std::sync::Mutex;

use async_trait::async_trait;
use huddle_core::models::VenueSuggestion;
use tracing::debug;

use super::Collaborators;
use crate::llm::LlmClient;
use crate::venues::{CuratedVenues, VenueSuggester};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Completion {
    prompt: String,
    max_tokens: u32,
    answer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Suggestion {
    activity: String,
    location: String,
    exclude: Vec<String>,
    answer: Vec<VenueSuggestion>,
}

/// Collaborator answers captured during one turn
#[derive(Debug, Default)]
pub struct CollaboratorTape {
    completions: Mutex<Vec<Completion>>,
    suggestions: Mutex<Vec<Suggestion>>,
}

impl CollaboratorTape {
    /// Collaborators that forward to `live` and record every answer
    #[must_use]
    pub fn recording<'a>(&'a self, live: Collaborators<'a>) -> Recorder<'a> {
        Recorder { tape: self, live }
    }

    /// Collaborators that answer only from what was recorded
    #[must_use]
    pub const fn replaying(&self, with_llm: bool) -> Replayer<'_> {
        Replayer {
            tape: self,
            with_llm,
        }
    }

    /// Number of recorded calls
    #[must_use]
    pub fn len(&self) -> usize {
        let completions = self.completions.lock().map_or(0, |calls| calls.len());
        let suggestions = self.suggestions.lock().map_or(0, |calls| calls.len());
        completions + suggestions
    }

    /// Whether nothing was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn record_completion(&self, call: Completion) {
        if let Ok(mut calls) = self.completions.lock() {
            calls.push(call);
        }
    }

    fn record_suggestion(&self, call: Suggestion) {
        if let Ok(mut calls) = self.suggestions.lock() {
            calls.push(call);
        }
    }

    fn find_completion(&self, prompt: &str, max_tokens: u32) -> Option<Option<String>> {
        let calls = self.completions.lock().ok()?;
        calls
            .iter()
            .find(|call| call.prompt == prompt && call.max_tokens == max_tokens)
            .map(|call| call.answer.clone())
    }

    fn find_suggestion(
        &self,
        activity: &str,
        location: &str,
        exclude: &[String],
    ) -> Option<Vec<VenueSuggestion>> {
        let calls = self.suggestions.lock().ok()?;
        calls
            .iter()
            .find(|call| {
                call.activity == activity && call.location == location && call.exclude == exclude
            })
            .map(|call| call.answer.clone())
    }
}

/// Live collaborators with every answer written to the tape
pub struct Recorder<'a> {
    tape: &'a CollaboratorTape,
    live: Collaborators<'a>,
}

impl<'a> Recorder<'a> {
    /// Handler view; the LLM stays absent when no live LLM is configured
    #[must_use]
    pub fn collaborators(&'a self) -> Collaborators<'a> {
        Collaborators {
            llm: self.live.llm.map(|_| self as &dyn LlmClient),
            venues: self,
        }
    }
}

#[async_trait]
impl<'a> LlmClient for Recorder<'a> {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Option<String> {
        let answer = match self.live.llm {
            Some(llm) => llm.complete(prompt, max_tokens).await,
            None => None,
        };
        self.tape.record_completion(Completion {
            prompt: prompt.to_owned(),
            max_tokens,
            answer: answer.clone(),
        });
        answer
    }

    fn name(&self) -> &'static str {
        self.live.llm.map_or("none", |llm| llm.name())
    }
}

#[async_trait]
impl<'a> VenueSuggester for Recorder<'a> {
    async fn suggest(
        &self,
        activity: &str,
        location: &str,
        exclude: &[String],
    ) -> Vec<VenueSuggestion> {
        let answer = self.live.venues.suggest(activity, location, exclude).await;
        self.tape.record_suggestion(Suggestion {
            activity: activity.to_owned(),
            location: location.to_owned(),
            exclude: exclude.to_vec(),
            answer: answer.clone(),
        });
        answer
    }
}

/// Collaborators answering from the tape only
pub struct Replayer<'a> {
    tape: &'a CollaboratorTape,
    with_llm: bool,
}

impl<'a> Replayer<'a> {
    /// Handler view with the same LLM presence as the recording pass
    #[must_use]
    pub fn collaborators(&'a self) -> Collaborators<'a> {
        Collaborators {
            llm: self.with_llm.then_some(self as &dyn LlmClient),
            venues: self,
        }
    }
}

#[async_trait]
impl<'a> LlmClient for Replayer<'a> {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Option<String> {
        let answer = self.tape.find_completion(prompt, max_tokens);
        if answer.is_none() {
            debug!("Completion not recorded; using rule-based parse");
        }
        answer.flatten()
    }

    fn name(&self) -> &'static str {
        "replay"
    }
}

#[async_trait]
impl<'a> VenueSuggester for Replayer<'a> {
    async fn suggest(
        &self,
        activity: &str,
        location: &str,
        exclude: &[String],
    ) -> Vec<VenueSuggestion> {
        if let Some(answer) = self.tape.find_suggestion(activity, location, exclude) {
            return answer;
        }
        debug!("Venue request not recorded; using curated list");
        CuratedVenues::list(activity, location, exclude)
    }
}
