//! Lightweight natural-language extraction for the search keyword.
//!
//! The parser pulls at most one bedroom count and one apartment type out of
//! a free-text query and leaves the rest as text to match against listing
//! fields. Each pass is first-match-wins and removes the matched tokens, so
//! `"2 bedroom duplex lekki"` yields `bedrooms = 2`, `type = duplex` and the
//! remainder `"lekki"`.

use crate::domain::listing::ApartmentType;

const NUMBER_WORDS: [(&str, u32); 10] = [
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
];

const BEDROOM_UNITS: [&str; 7] = ["bedroom", "bedrooms", "bed", "beds", "br", "bdr", "bdrs"];

/// Type vocabulary in priority order. `None` marks generic nouns that are
/// consumed without producing a filter.
const TYPE_VOCABULARY: [(&[&str], Option<ApartmentType>); 12] = [
    (&["mini-flat"], Some(ApartmentType::MiniFlat)),
    (&["mini", "flat"], Some(ApartmentType::MiniFlat)),
    (&["self-contained"], Some(ApartmentType::SelfContained)),
    (&["self", "contained"], Some(ApartmentType::SelfContained)),
    (&["self", "contain"], Some(ApartmentType::SelfContained)),
    (&["penthouse"], Some(ApartmentType::Penthouse)),
    (&["bungalow"], Some(ApartmentType::Bungalow)),
    (&["duplex"], Some(ApartmentType::Duplex)),
    (&["studio"], Some(ApartmentType::Studio)),
    (&["flat"], None),
    (&["apartment"], None),
    (&["apartments"], None),
];

/// Structured reading of a keyword query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedKeyword {
    /// Extracted bedroom count.
    pub bedrooms: Option<u32>,
    /// Extracted apartment type.
    pub apartment_type: Option<ApartmentType>,
    /// Whatever text is left once the structured parts are removed.
    pub remainder: Option<String>,
}

/// Parse a raw keyword.
///
/// # Examples
/// ```
/// use rentals::domain::discovery::parse_keyword;
///
/// let parsed = parse_keyword("2 bedroom Lekki");
/// assert_eq!(parsed.bedrooms, Some(2));
/// assert_eq!(parsed.remainder.as_deref(), Some("lekki"));
/// ```
pub fn parse_keyword(raw: &str) -> ParsedKeyword {
    let mut tokens: Vec<String> = raw
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();

    let bedrooms = take_bedroom_count(&mut tokens);
    let apartment_type = take_apartment_type(&mut tokens);
    let remainder = (!tokens.is_empty()).then(|| tokens.join(" "));

    ParsedKeyword {
        bedrooms,
        apartment_type,
        remainder,
    }
}

fn parse_count(raw: &str) -> Option<u32> {
    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        return raw.parse().ok();
    }
    NUMBER_WORDS
        .iter()
        .find(|(word, _)| *word == raw)
        .map(|(_, count)| *count)
}

fn is_bedroom_unit(raw: &str) -> bool {
    BEDROOM_UNITS.contains(&raw)
}

/// Single-token forms: `2bedroom`, `2-bedroom`, `two-beds`, `3br`.
fn compact_count(token: &str) -> Option<u32> {
    if let Some((number, unit)) = token.split_once('-') {
        return if is_bedroom_unit(unit) {
            parse_count(number)
        } else {
            None
        };
    }
    let digits = token.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let (number, unit) = token.split_at(digits);
    if is_bedroom_unit(unit) {
        number.parse().ok()
    } else {
        None
    }
}

fn take_bedroom_count(tokens: &mut Vec<String>) -> Option<u32> {
    for index in 0..tokens.len() {
        let Some(token) = tokens.get(index) else {
            break;
        };
        if let Some(count) = compact_count(token) {
            tokens.remove(index);
            return Some(count);
        }
        let Some(next) = tokens.get(index + 1) else {
            continue;
        };
        if !is_bedroom_unit(next) {
            continue;
        }
        if let Some(count) = parse_count(token) {
            tokens.drain(index..=index + 1);
            return Some(count);
        }
    }

    let studio = tokens.iter().position(|token| token == "studio")?;
    tokens.remove(studio);
    Some(0)
}

fn take_apartment_type(tokens: &mut Vec<String>) -> Option<ApartmentType> {
    for (phrase, apartment_type) in TYPE_VOCABULARY {
        if let Some(start) = find_phrase(tokens, phrase) {
            tokens.drain(start..start + phrase.len());
            return apartment_type;
        }
    }
    None
}

fn find_phrase(tokens: &[String], phrase: &[&str]) -> Option<usize> {
    if phrase.is_empty() || phrase.len() > tokens.len() {
        return None;
    }
    tokens
        .windows(phrase.len())
        .position(|window| window.iter().zip(phrase).all(|(token, word)| token == word))
}
