//! Query sanitizing and reserved command phrases.

use crate::error::QueryError;

/// Characters trimmed from both ends of a query before lookup.
pub const STRIP_CHARS: &[char] = &[
    '<', '>', '"', '?', '`', '!', '[', ']', '(', ')', '/', '\\', ':', ';', ',',
];

/// Phrases that bypass dictionary lookup entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reserved {
    Fortune,
    CowFortune,
    Exit,
    SelfDescription,
}

impl Reserved {
    /// Matches a phrase exactly; reserved phrases are case-sensitive.
    pub fn from_phrase(phrase: &str) -> Option<Self> {
        match phrase {
            "fortune -a" => Some(Reserved::Fortune),
            "cowfortune" => Some(Reserved::CowFortune),
            "crash now" | "close now" => Some(Reserved::Exit),
            "reo" => Some(Reserved::SelfDescription),
            _ => None,
        }
    }
}

/// A query that survived sanitizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Reserved(Reserved),
    Term(String),
}

impl Query {
    pub fn term(&self) -> Option<&str> {
        match self {
            Query::Term(term) => Some(term.as_str()),
            Query::Reserved(_) => None,
        }
    }
}

/// Classifies raw input and strips the bracketing punctuation around a term.
pub fn sanitize(raw: &str) -> Result<Query, QueryError> {
    if raw.trim().is_empty() {
        return Err(QueryError::Empty);
    }
    if let Some(reserved) = Reserved::from_phrase(raw) {
        return Ok(Query::Reserved(reserved));
    }
    let term = raw.trim().trim_matches(STRIP_CHARS).trim();
    if term.is_empty() {
        return Err(QueryError::InvalidCharacters);
    }
    if let Some(reserved) = Reserved::from_phrase(term) {
        return Ok(Query::Reserved(reserved));
    }
    Ok(Query::Term(term.to_string()))
}

/// Rejoins text copied out of a rendered definition into a single-line query.
pub fn normalize_selection(text: &str) -> String {
    text.replace("-\n         ", "-")
        .replace('\n', " ")
        .replace("         ", "")
}
