// ABOUTME: Extracts (name, phone) tuples from a planner's guest-list message
// ABOUTME: Accepts "Name, phone", "Name phone", "Name(phone)", "Name: phone" and "phone Name"
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use regex::Regex;
use std::sync::LazyLock;

use crate::errors::ContactParseError;
use crate::phone::normalize_phone;

static PHONE_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?:\+?1[\s.-]?)?\(?\d{3}\)?[\s.-]?\d{3}[\s.-]?\d{4}\b").ok()
});

/// Characters trimmed from either end of a name
const NAME_TRIM: &[char] = &[',', ';', ':', '(', ')', '-', '.', '&', '\n', ' ', '\t'];

/// Separators that end a trailing name in the `phone Name` shape
const PIECE_BREAK: &[char] = &[',', ';', '\n'];

/// One parsed guest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedContact {
    /// Display name as typed
    pub name: String,
    /// Canonical 10-digit phone
    pub phone: String,
}

/// Parse every (name, phone) pair in `text`, deduplicated by phone.
///
/// # Errors
///
/// Returns [`ContactParseError`] when no usable pair is present.
pub fn parse_contacts(text: &str) -> Result<Vec<ParsedContact>, ContactParseError> {
    if text.trim().is_empty() {
        return Err(ContactParseError::Empty);
    }
    let Some(pattern) = PHONE_PATTERN.as_ref() else {
        return Err(ContactParseError::NoContacts);
    };

    let matches: Vec<_> = pattern.find_iter(text).collect();
    let mut contacts: Vec<ParsedContact> = Vec::new();
    let mut consumed_until = 0;

    for (index, found) in matches.iter().enumerate() {
        let before = &text[consumed_until.min(found.start())..found.start()];
        let next_start = matches
            .get(index + 1)
            .map_or(text.len(), regex::Match::start);
        let after = &text[found.end()..next_start];

        let name = match clean_name(before) {
            Some(name) => {
                consumed_until = found.end();
                Some(name)
            }
            None => {
                let piece_end = after.find(PIECE_BREAK).unwrap_or(after.len());
                consumed_until = found.end() + piece_end;
                clean_name(&after[..piece_end])
            }
        };

        let (Some(name), Ok(phone)) = (name, normalize_phone(found.as_str())) else {
            continue;
        };
        if contacts.iter().all(|existing| existing.phone != phone) {
            contacts.push(ParsedContact { name, phone });
        }
    }

    if contacts.is_empty() {
        Err(ContactParseError::NoContacts)
    } else {
        Ok(contacts)
    }
}

fn clean_name(raw: &str) -> Option<String> {
    let mut trimmed = raw.trim_matches(NAME_TRIM);
    for joiner in ["and ", "And ", "AND "] {
        trimmed = trimmed.strip_prefix(joiner).unwrap_or(trimmed);
    }
    let name = trimmed
        .trim_matches(NAME_TRIM)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    name.chars().any(char::is_alphabetic).then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(text: &str) -> Vec<(String, String)> {
        parse_contacts(text)
            .unwrap_or_default()
            .into_iter()
            .map(|c| (c.name, c.phone))
            .collect()
    }

    fn pair(name: &str, phone: &str) -> (String, String) {
        (name.to_owned(), phone.to_owned())
    }

    #[test]
    fn test_accepted_shapes() {
        let expected = vec![pair("Sam", "5105550199")];
        assert_eq!(pairs("Sam, 510-555-0199"), expected);
        assert_eq!(pairs("Sam 510 555 0199"), expected);
        assert_eq!(pairs("Sam(510) 555-0199"), expected);
        assert_eq!(pairs("Sam: +1 510.555.0199"), expected);
        assert_eq!(pairs("5105550199 Sam"), expected);
    }

    #[test]
    fn test_several_guests_in_one_message() {
        assert_eq!(
            pairs("Sam 510-555-0199, Alex Kim 415-555-0101 and Jo (212) 555-0000"),
            vec![
                pair("Sam", "5105550199"),
                pair("Alex Kim", "4155550101"),
                pair("Jo", "2125550000"),
            ]
        );
    }

    #[test]
    fn test_phone_first_list() {
        assert_eq!(
            pairs("5105550199 Sam, 4155550101 Alex"),
            vec![pair("Sam", "5105550199"), pair("Alex", "4155550101")]
        );
    }

    #[test]
    fn test_duplicates_and_nameless_numbers() {
        assert_eq!(
            pairs("Sam 510-555-0199, Samuel 5105550199"),
            vec![pair("Sam", "5105550199")]
        );
        assert_eq!(
            parse_contacts("510-555-0199"),
            Err(ContactParseError::NoContacts)
        );
        assert_eq!(parse_contacts("  "), Err(ContactParseError::Empty));
        assert_eq!(parse_contacts("Sam"), Err(ContactParseError::NoContacts));
    }
}
