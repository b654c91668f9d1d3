// ABOUTME: Shared constants for the Huddle SMS event coordinator
// ABOUTME: Workflow limits and the keyword vocabularies the state machines match against
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Numeric limits used across parsing, overlap, and workflow code
pub mod limits {
    /// Shortest availability interval accepted, in minutes
    pub const MIN_INTERVAL_MINUTES: i64 = 30;

    /// Shortest slot the overlap engine emits for multi-guest events, in minutes
    pub const MIN_GROUP_SLOT_MINUTES: i64 = 120;

    /// Shortest slot the overlap engine emits when only one guest is invited
    pub const MIN_SOLO_SLOT_MINUTES: i64 = 60;

    /// Maximum number of slots offered to the planner
    pub const MAX_SLOTS: usize = 5;

    /// Maximum planner name length accepted at onboarding
    pub const MAX_NAME_LEN: usize = 40;

    /// Maximum event title length taken from an opening message
    pub const MAX_TITLE_LEN: usize = 80;

    /// Shortest free-text custom venue name
    pub const MIN_CUSTOM_VENUE_LEN: usize = 3;

    /// Number of venue suggestions requested per list
    pub const VENUE_SUGGESTIONS: usize = 3;

    /// Hour (local) from which a bare same-day weekday means next week
    pub const SAME_DAY_CUTOFF_HOUR: u32 = 18;
}

/// Keyword vocabularies. All entries are lowercase; callers compare against
/// trimmed, lowercased input with trailing punctuation removed.
pub mod keywords {
    /// Greetings that open a conversation without describing an event
    pub const GREETINGS: &[&str] = &[
        "hi",
        "hey",
        "hello",
        "yo",
        "sup",
        "hiya",
        "howdy",
        "hey there",
        "hi there",
        "hello there",
        "good morning",
        "good afternoon",
        "good evening",
    ];

    /// Words that reset the planner's in-flight event
    pub const RESET: &[&str] = &["reset", "restart", "start over"];

    /// Words that finish a list-building step
    pub const DONE: &[&str] = &["done", "next", "that's it", "thats it", "that is it", "finished"];

    /// Words that leave a sub-menu
    pub const BACK: &[&str] = &["back", "cancel"];

    /// Guest says none of the dates work
    pub const BUSY: &[&str] = &[
        "busy",
        "unavailable",
        "unavail",
        "can't make it",
        "cant make it",
        "none work",
        "not available",
    ];

    /// Affirmative RSVP
    pub const RSVP_YES: &[&str] = &[
        "yes",
        "y",
        "yeah",
        "yep",
        "sure",
        "accept",
        "accepted",
        "in",
        "i'm in",
        "im in",
        "count me in",
        "going",
    ];

    /// Negative RSVP
    pub const RSVP_NO: &[&str] = &[
        "no",
        "n",
        "nope",
        "decline",
        "declined",
        "can't",
        "cant",
        "not going",
        "out",
    ];

    /// Undecided RSVP
    pub const RSVP_MAYBE: &[&str] = &["maybe", "possibly", "not sure", "unsure", "perhaps", "tentative"];

    /// Activities too vague to suggest a venue for
    pub const BROAD_ACTIVITIES: &[&str] = &[
        "dinner",
        "lunch",
        "brunch",
        "breakfast",
        "food",
        "eat",
        "eating",
        "drinks",
        "drink",
        "bar",
        "restaurant",
        "coffee",
        "hang",
        "hangout",
        "hang out",
        "something",
        "anything",
        "fun",
        "party",
        "italian",
        "mexican",
        "chinese",
        "japanese",
        "thai",
        "indian",
        "sushi",
        "pizza",
        "burgers",
    ];

    /// Menu words that must never be read as dates or times
    pub const MENU_WORDS: &[&str] = &[
        "done", "next", "back", "skip", "help", "status", "reset", "restart", "yes", "no", "ok",
        "okay", "confirm", "change", "send", "new list",
    ];
}

/// Normalize a short reply for keyword matching
#[must_use]
pub fn normalize_reply(text: &str) -> String {
    text.trim()
        .trim_end_matches(['.', '!', '?'])
        .trim()
        .to_lowercase()
        .replace('\u{2019}', "'")
}

/// Whether `text` equals one of `vocabulary` after normalization
#[must_use]
pub fn matches_keyword(text: &str, vocabulary: &[&str]) -> bool {
    let normalized = normalize_reply(text);
    vocabulary.iter().any(|word| *word == normalized)
}

#[cfg(test)]
mod tests {
    use super::keywords::{BUSY, GREETINGS, RSVP_YES};
    use super::*;

    #[test]
    fn test_keyword_match_ignores_case_and_punctuation() {
        assert!(matches_keyword("  Hey! ", GREETINGS));
        assert!(matches_keyword("Can\u{2019}t make it.", BUSY));
        assert!(matches_keyword("I'm in", RSVP_YES));
        assert!(!matches_keyword("hey sam", GREETINGS));
    }
}
