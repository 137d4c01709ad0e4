//! Helpers for the inline markup every formatter emits.
//!
//! The markup is the small tag vocabulary understood by text views such as
//! GTK's: `<b>`, `<i>` and `<span foreground="…">`. Color tokens are opaque and
//! passed through untouched.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<b>(.*?)</b>").expect("valid bold regex"));
static ITALIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<i>(.*?)</i>").expect("valid italic regex"));
static ANY_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</?(?:b|i|span)(?:\s[^>]*)?>").expect("valid tag regex"));

/// The two color tokens threaded through formatting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    /// Color of example sentences.
    pub sense_color: String,
    /// Color of similar words, synonyms and antonyms.
    pub word_color: String,
}

impl Palette {
    pub fn new(sense_color: impl Into<String>, word_color: impl Into<String>) -> Self {
        Self {
            sense_color: sense_color.into(),
            word_color: word_color.into(),
        }
    }

    pub fn light() -> Self {
        Self::new("blue", "green")
    }

    pub fn dark() -> Self {
        Self::new("cyan", "lightgreen")
    }

    pub(crate) fn sense_span(&self) -> String {
        span_open(&self.sense_color)
    }

    pub(crate) fn word_span(&self) -> String {
        span_open(&self.word_color)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::light()
    }
}

pub(crate) fn span_open(color: &str) -> String {
    format!("<span foreground=\"{color}\">")
}

/// Escapes text so it can be embedded in markup verbatim.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Drops every tag, leaving the text a plain terminal would show.
pub fn to_plain(markup: &str) -> String {
    unescape(&ANY_TAG.replace_all(markup, ""))
}

/// Converts markup into the markdown subset termimad renders.
///
/// Emphasis markers are kept tight against the emphasized text; whitespace
/// that sat inside a tag moves outside the markers.
pub fn to_markdown(markup: &str) -> String {
    let bold = BOLD.replace_all(markup, |caps: &Captures<'_>| emphasize(&caps[1], "**"));
    let italic = ITALIC.replace_all(&bold, |caps: &Captures<'_>| emphasize(&caps[1], "*"));
    to_plain(&italic)
}

fn emphasize(inner: &str, marker: &str) -> String {
    let trimmed = inner.trim();
    if trimmed.is_empty() {
        return inner.to_string();
    }
    let leading = &inner[..inner.len() - inner.trim_start().len()];
    let trailing = &inner[inner.trim_end().len()..];
    format!("{leading}{marker}{trimmed}{marker}{trailing}")
}
