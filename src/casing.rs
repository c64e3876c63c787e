// SPDX-FileCopyrightText: 2025 Hong Minhee <https://hongminhee.org/>
// SPDX-License-Identifier: GPL-3.0-or-later
//! Casing transforms applied to link text.
//!
//! Every transform is total and Unicode-aware: link targets are arbitrary
//! note names, so nothing here assumes ASCII.

use std::sync::LazyLock;

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use crate::Options;

/// Leading run of letters, combining marks and apostrophes.
static FIRST_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}\p{M}'\x{2019}]+").expect("valid first word pattern"));

/// A casing command written after a backslash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// `\l`: lowercase.
    Lower,
    /// `\u`: uppercase.
    Upper,
    /// `\t`: title case.
    Title,
    /// `\c`: capitalize the first character only.
    Capital,
}

impl Command {
    /// Parse a command letter.  Letters are case-sensitive: `L` is not a
    /// command.
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            'l' => Some(Command::Lower),
            'u' => Some(Command::Upper),
            't' => Some(Command::Title),
            'c' => Some(Command::Capital),
            _ => None,
        }
    }

    /// The letter that spells this command.
    pub fn as_char(self) -> char {
        match self {
            Command::Lower => 'l',
            Command::Upper => 'u',
            Command::Title => 't',
            Command::Capital => 'c',
        }
    }

    /// Whether a target-only link drops the alias when this command leaves
    /// the target as it was.  Title case always produces an alias.
    pub fn drops_unchanged_alias(self) -> bool {
        !matches!(self, Command::Title)
    }

    /// Apply the transform bound to this command.
    pub fn apply(self, text: &str, options: &Options) -> String {
        match self {
            Command::Lower if options.lowercase_first_word_only => lower_first_word(text),
            Command::Lower => lower(text),
            Command::Upper => upper(text),
            Command::Title => title(text),
            Command::Capital => capital(text),
        }
    }
}

/// Lowercase every letter.
pub fn lower(text: &str) -> String {
    text.to_lowercase()
}

/// Lowercase only the leading word; the rest of the text is left untouched.
pub fn lower_first_word(text: &str) -> String {
    match FIRST_WORD.find(text) {
        Some(word) => {
            let mut result = word.as_str().to_lowercase();
            result.push_str(&text[word.end()..]);
            result
        }
        None => text.to_string(),
    }
}

/// Uppercase every letter.
pub fn upper(text: &str) -> String {
    text.to_uppercase()
}

/// Lowercase everything, then uppercase the first letter of each word.
///
/// Words follow Unicode word boundaries (UAX #29), so `don't` stays one word
/// and `well-known` is two.  A word that starts with a digit keeps its
/// letters lowercase (`3rd`).
pub fn title(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut result = String::with_capacity(lowered.len());
    for segment in lowered.split_word_bounds() {
        let mut chars = segment.chars();
        match chars.next() {
            Some(first) if first.is_alphabetic() => {
                result.extend(first.to_uppercase());
                result.push_str(chars.as_str());
            }
            _ => result.push_str(segment),
        }
    }
    result
}

/// Lowercase everything, then uppercase the first character.
pub fn capital(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut chars = lowered.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_letters() {
        for ch in ['l', 'u', 't', 'c'] {
            let command = Command::from_char(ch).unwrap();
            assert_eq!(command.as_char(), ch);
        }
        assert_eq!(Command::from_char('L'), None);
        assert_eq!(Command::from_char('x'), None);
    }

    #[test]
    fn test_drops_unchanged_alias() {
        assert!(Command::Lower.drops_unchanged_alias());
        assert!(Command::Upper.drops_unchanged_alias());
        assert!(!Command::Title.drops_unchanged_alias());
        assert!(Command::Capital.drops_unchanged_alias());
    }

    #[test]
    fn test_lower() {
        assert_eq!(lower("Link Name"), "link name");
        assert_eq!(lower("ÉCOLE Ünïcode"), "école ünïcode");
        assert_eq!(lower(""), "");
    }

    #[test]
    fn test_upper() {
        assert_eq!(upper("Link Name"), "LINK NAME");
        assert_eq!(upper("straße"), "STRASSE");
        assert_eq!(upper(""), "");
    }

    #[test]
    fn test_upper_of_lower_on_ascii() {
        for s in ["abc", "ABC", "MiXeD", "Link Name", ""] {
            assert_eq!(upper(&lower(s)), upper(s));
        }
    }

    #[test]
    fn test_title() {
        assert_eq!(title("link name"), "Link Name");
        assert_eq!(title("ALL CAPS TITLE"), "All Caps Title");
        assert_eq!(title("all caps title"), "All Caps Title");
        assert_eq!(title(""), "");
    }

    #[test]
    fn test_title_word_boundaries() {
        assert_eq!(title("don't stop"), "Don't Stop");
        assert_eq!(title("well-known fact"), "Well-Known Fact");
        assert_eq!(title("the 3rd act"), "The 3rd Act");
        assert_eq!(title("  leading  spaces"), "  Leading  Spaces");
    }

    #[test]
    fn test_title_unicode() {
        assert_eq!(title("élan vital"), "Élan Vital");
        assert_eq!(title("ΑΘΗΝΑ ΠΟΛΗ"), "Αθηνα Πολη");
    }

    #[test]
    fn test_title_is_idempotent() {
        for s in ["link name", "Don't Stop", "well-known fact", "élan"] {
            assert_eq!(title(&title(s)), title(s));
        }
    }

    #[test]
    fn test_capital() {
        assert_eq!(capital("link name"), "Link name");
        assert_eq!(capital("LINK NAME"), "Link name");
        assert_eq!(capital("élan"), "Élan");
        assert_eq!(capital(""), "");
    }

    #[test]
    fn test_capital_leading_non_letter() {
        assert_eq!(capital(" Link"), " link");
        assert_eq!(capital("1ST"), "1st");
    }

    #[test]
    fn test_lower_first_word() {
        assert_eq!(lower_first_word("Link Name"), "link Name");
        assert_eq!(lower_first_word("DON'T Stop"), "don't Stop");
        assert_eq!(lower_first_word("Élan Vital"), "élan Vital");
        assert_eq!(lower_first_word(""), "");
    }

    #[test]
    fn test_lower_first_word_requires_leading_letter() {
        assert_eq!(lower_first_word(" Link Name"), " Link Name");
        assert_eq!(lower_first_word("1 Link"), "1 Link");
    }

    #[test]
    fn test_lower_first_word_stops_at_punctuation() {
        assert_eq!(lower_first_word("Well-Known"), "well-Known");
    }

    #[test]
    fn test_apply_selects_lower_mode() {
        let default = Options::default();
        let first_word = Options {
            lowercase_first_word_only: true,
        };
        assert_eq!(Command::Lower.apply("Link Name", &default), "link name");
        assert_eq!(Command::Lower.apply("Link Name", &first_word), "link Name");
        assert_eq!(Command::Upper.apply("Link Name", &first_word), "LINK NAME");
    }
}
