//! Formats `dict -m` match output as a "Similar Words" list.

use crate::markup::{Palette, escape};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// A term whose only similar word is itself.
pub const SELF_REFERENTIAL: &str = "recursion";

static SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s{2,}|\n").expect("valid separator regex"));

/// Candidate words from raw match output, minus the term itself.
///
/// dict prints `db:` followed by candidates separated by two or more spaces,
/// wrapping onto indented lines and quoting some or all of them. Candidates
/// are compared whole, so a longer word containing the term survives.
pub fn candidates(raw: &str, term: &str, database: &str) -> Vec<String> {
    let prefix = format!("{database}:");
    let lowered = term.trim().to_lowercase();
    let mut seen = HashSet::new();
    let mut words = Vec::new();
    for line in raw.trim_end().lines() {
        let line = line.trim_start();
        let line = line.strip_prefix(prefix.as_str()).unwrap_or(line);
        for token in SEPARATOR.split(line) {
            let word = token.trim().trim_matches('"').trim();
            if word.is_empty() || word.to_lowercase() == lowered {
                continue;
            }
            if seen.insert(word.to_string()) {
                words.push(word.to_string());
            }
        }
    }
    words
}

/// Builds the similar words section, or `None` when nothing is left to show.
///
/// When the definition lookup failed the same list is offered under
/// "Did you mean" instead.
pub fn format(
    raw: &str,
    term: &str,
    database: &str,
    definition_found: bool,
    palette: &Palette,
) -> Option<String> {
    let words = if term == SELF_REFERENTIAL {
        vec![term.to_string()]
    } else {
        candidates(raw, term, database)
    };
    if words.is_empty() {
        return None;
    }
    let header = if definition_found {
        "Similar Words"
    } else {
        "Did you mean"
    };
    let list = words
        .iter()
        .map(|word| escape(word))
        .collect::<Vec<_>>()
        .join(", ");
    Some(format!(
        "<b>{header}</b>:\n<i>{}  {list}</span></i>",
        palette.word_span()
    ))
}
