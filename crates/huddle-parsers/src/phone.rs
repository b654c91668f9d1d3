// ABOUTME: Canonicalizes phone strings to a 10-digit key
// ABOUTME: Provides the alternate keys used to tolerate historically non-canonical rows
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::PhoneError;

/// Strip everything but digits, drop a leading country `1` from 11-digit
/// numbers, and require exactly ten digits.
///
/// # Errors
///
/// Returns [`PhoneError`] when the input has no digits or the wrong count.
pub fn normalize_phone(input: &str) -> Result<String, PhoneError> {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    let key = match digits.len() {
        0 => return Err(PhoneError::Empty),
        11 if digits.starts_with('1') => digits[1..].to_owned(),
        10 => digits,
        other => return Err(PhoneError::WrongLength(other)),
    };
    Ok(key)
}

/// Keys to try, in order, when looking a phone up in the store
#[must_use]
pub fn lookup_keys(key: &str) -> [String; 3] {
    [key.to_owned(), format!("1{key}"), format!("+1{key}")]
}

/// Phone rendered for logs: only the last four digits survive
#[must_use]
pub fn mask_phone(phone: &str) -> String {
    let digits: Vec<char> = phone.chars().filter(char::is_ascii_digit).collect();
    let tail: String = digits[digits.len().saturating_sub(4)..].iter().collect();
    format!("***{tail}")
}

/// Phone rendered for humans: `(415) 555-0101`
#[must_use]
pub fn display_phone(key: &str) -> String {
    if key.len() == 10 && key.chars().all(|c| c.is_ascii_digit()) {
        format!("({}) {}-{}", &key[..3], &key[3..6], &key[6..])
    } else {
        key.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_us_forms_share_one_key() {
        for input in [
            "+1 415 555 0101",
            "14155550101",
            "(415) 555-0101",
            "415.555.0101",
            "4155550101",
        ] {
            assert_eq!(normalize_phone(input).as_deref(), Ok("4155550101"));
        }
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let once = normalize_phone("+1 (510) 555-0199").unwrap_or_default();
        assert_eq!(normalize_phone(&once).as_deref(), Ok(once.as_str()));
    }

    #[test]
    fn test_rejects_wrong_lengths() {
        assert_eq!(normalize_phone("555-0199"), Err(PhoneError::WrongLength(7)));
        assert_eq!(
            normalize_phone("24155550101"),
            Err(PhoneError::WrongLength(11))
        );
        assert_eq!(normalize_phone("call me"), Err(PhoneError::Empty));
    }

    #[test]
    fn test_mask_keeps_last_four() {
        assert_eq!(mask_phone("4155550101"), "***0101");
        assert_eq!(mask_phone("12"), "***12");
    }

    #[test]
    fn test_display_phone() {
        assert_eq!(display_phone("5105550199"), "(510) 555-0199");
    }
}
