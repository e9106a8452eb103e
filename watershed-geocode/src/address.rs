//! Address input parsing and normalization.
//!
//! Normalization makes the user's text and a provider's formatted address
//! comparable: both go through the same lowercase / de-punctuate / expand
//! pipeline before token matching.

use serde::Serialize;
use std::fmt;
use strsim::jaro_winkler;

/// Minimum Jaro-Winkler similarity for two alphabetic tokens to match.
pub const TOKEN_MATCH_THRESHOLD: f64 = 0.93;

/// A cleaned, single-line address as submitted by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressInput {
    text: String,
}

impl AddressInput {
    /// Parse raw caller text.
    ///
    /// Multi-line input (street / city / region / postal on separate lines)
    /// is joined with commas. Returns `None` when nothing but whitespace and
    /// separators remains.
    pub fn parse(raw: &str) -> Option<Self> {
        let text = raw
            .lines()
            .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
            .map(|line| line.trim_matches(|c: char| c == ',' || c.is_whitespace()).to_string())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        if text.chars().any(char::is_alphanumeric) {
            Some(Self { text })
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Normalized form, used as the memoization key.
    pub fn normalized(&self) -> String {
        normalize(&self.text)
    }

    /// House number from the street line, if present.
    ///
    /// Only the part before the first comma is considered so that postal
    /// codes and unit numbers in later parts are not mistaken for one.
    pub fn house_number(&self) -> Option<String> {
        let street = self.text.split(',').next().unwrap_or_default();
        tokens(street)
            .into_iter()
            .find(|t| t.starts_with(|c: char| c.is_ascii_digit()))
    }
}

impl fmt::Display for AddressInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Street-type and direction abbreviations.
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("st", "street"),
    ("str", "street"),
    ("ave", "avenue"),
    ("av", "avenue"),
    ("rd", "road"),
    ("dr", "drive"),
    ("blvd", "boulevard"),
    ("ln", "lane"),
    ("ct", "court"),
    ("pl", "place"),
    ("cres", "crescent"),
    ("hwy", "highway"),
    ("pkwy", "parkway"),
    ("ter", "terrace"),
    ("sq", "square"),
    ("apt", "apartment"),
    ("n", "north"),
    ("s", "south"),
    ("e", "east"),
    ("w", "west"),
    ("ne", "northeast"),
    ("nw", "northwest"),
    ("se", "southeast"),
    ("sw", "southwest"),
];

/// Jurisdiction names reduced to postal abbreviations.
const JURISDICTIONS: &[(&[&str], &str)] = &[
    (&["british", "columbia"], "bc"),
    (&["alberta"], "ab"),
    (&["yukon"], "yt"),
    (&["washington"], "wa"),
    (&["oregon"], "or"),
    (&["idaho"], "id"),
    (&["montana"], "mt"),
    (&["california"], "ca"),
    (&["alaska"], "ak"),
    (&["united", "states", "of", "america"], "usa"),
    (&["united", "states"], "usa"),
    (&["us"], "usa"),
];

/// Lowercase, split on anything that is not alphanumeric, expand
/// abbreviations, and collapse jurisdiction names.
pub fn tokens(text: &str) -> Vec<String> {
    let raw: Vec<String> = text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    'outer: while i < raw.len() {
        for (words, abbrev) in JURISDICTIONS {
            let end = i + words.len();
            if end <= raw.len() && raw[i..end].iter().zip(words.iter()).all(|(a, b)| a.as_str() == *b) {
                out.push(abbrev.to_string());
                i = end;
                continue 'outer;
            }
        }
        let token = &raw[i];
        match ABBREVIATIONS.iter().find(|(short, _)| *short == token.as_str()) {
            Some((_, long)) => out.push(long.to_string()),
            None => out.push(token.clone()),
        }
        i += 1;
    }
    out
}

/// Normalized single-string form of an address.
pub fn normalize(text: &str) -> String {
    tokens(text).join(" ")
}

/// Fraction of `input` tokens found among `formatted` tokens.
///
/// Tokens containing a digit must match exactly; alphabetic tokens match
/// when equal or when Jaro-Winkler similarity reaches
/// [`TOKEN_MATCH_THRESHOLD`].
pub fn similarity(input: &str, formatted: &str) -> f64 {
    let wanted = tokens(input);
    if wanted.is_empty() {
        return 0.0;
    }
    let have = tokens(formatted);
    let matched = wanted
        .iter()
        .filter(|w| {
            if w.chars().any(|c| c.is_ascii_digit()) {
                have.iter().any(|h| h == *w)
            } else {
                have.iter()
                    .any(|h| h == *w || jaro_winkler(w, h) >= TOKEN_MATCH_THRESHOLD)
            }
        })
        .count();
    matched as f64 / wanted.len() as f64
}
