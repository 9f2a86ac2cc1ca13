//! Display-name cleanup for raw API identifiers

use crate::regions::region_slugs;

/// Suffix token the API appends to location-area slugs
const AREA_TOKEN: &str = "area";

/// Turn a raw location-area slug into the route name shown to the user.
///
/// `"kanto-route-1-area"` becomes `"Route 1"`. Never fails; unexpected input
/// comes back title-cased and trimmed.
pub fn normalize_area_name(raw: &str) -> String {
    let mut name = raw.trim();

    for slug in region_slugs() {
        if let Some(rest) = name.strip_prefix(slug).and_then(|r| r.strip_prefix('-')) {
            name = rest;
            break;
        }
    }

    let spaced = name
        .split('-')
        .enumerate()
        .filter(|(i, token)| *i == 0 || *token != AREA_TOKEN)
        .map(|(_, token)| token)
        .collect::<Vec<_>>()
        .join(" ");

    let titled = title_case(&spaced);
    if titled.contains("Route") {
        fix_route_numbers(&titled)
    } else {
        collapse_whitespace(&titled)
    }
}

/// Uppercase every letter that starts a word, lowercase the rest.
///
/// A word starts at any letter not preceded by a letter or apostrophe, so
/// `"mt moon b1f"` becomes `"Mt Moon B1F"` and `"mr-mime"` becomes `"Mr-Mime"`.
/// A letter after an apostrophe stays lowercase (`"Farfetch'd"`, not `"Farfetch'D"`).
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;

    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            in_word = c == '\'' && in_word;
            out.push(c);
        }
    }

    out
}

/// Ensure exactly one space between "Route" and its number
fn fix_route_numbers(s: &str) -> String {
    let mut words: Vec<&str> = Vec::new();

    for word in s.split_whitespace() {
        match word.strip_prefix("Route") {
            Some(digits) if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) => {
                words.push("Route");
                words.push(digits);
            }
            _ => words.push(word),
        }
    }

    words.join(" ")
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
