//! Turns raw `dict -d wn` output into definition markup.
//!
//! The dictd rendering of WordNet is a fixed-width text layout: a banner, the
//! headword indented by two spaces, then sense lines indented by six spaces
//! whose continuation lines are indented to line up with the sense text.
//! Rewriting it into markup is an ordered table of literal substitutions,
//! each applied to the cumulative result of the ones before it. The table is
//! stable: running it again over its own output changes nothing.

use crate::markup::Palette;
use regex::RegexBuilder;
use serde::Serialize;
use std::fmt;
use std::ops::Range;
use tracing::debug;

/// Banners printed by dictd ahead of a WordNet entry, by database release.
pub const BANNERS: [&str; 2] = [
    "1 definition found\n\nFrom WordNet (r) 3.0 (2006) [wn]:\n",
    "1 definition found\n\nFrom WordNet (r) 3.1 (2011) [wn]:\n",
];

/// Highest sense number that gets emboldened.
pub const MAX_SENSE_NUMBER: u32 = 100;

/// Indentation of example sentences and synonym blocks in the output.
const NOTE_INDENT: &str = "\n    ";

const CORPUS_FIXES: [(&str, &str); 1] = [(
    "thunder started the sleeping",
    "thunder started, the sleeping",
)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
}

impl PartOfSpeech {
    pub const ALL: [PartOfSpeech; 4] = [
        PartOfSpeech::Noun,
        PartOfSpeech::Verb,
        PartOfSpeech::Adjective,
        PartOfSpeech::Adverb,
    ];

    /// The abbreviation dictd prints before the first sense.
    pub fn marker(self) -> &'static str {
        match self {
            PartOfSpeech::Noun => "n",
            PartOfSpeech::Verb => "v",
            PartOfSpeech::Adjective => "adj",
            PartOfSpeech::Adverb => "adv",
        }
    }

    pub fn from_marker(marker: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|pos| pos.marker() == marker)
    }

    pub fn label(self) -> &'static str {
        match self {
            PartOfSpeech::Noun => "noun",
            PartOfSpeech::Verb => "verb",
            PartOfSpeech::Adjective => "adjective",
            PartOfSpeech::Adverb => "adverb",
        }
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One numbered meaning within a part-of-speech group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SenseEntry {
    pub part_of_speech: Option<PartOfSpeech>,
    pub ordinal: u32,
    pub text: String,
}

/// A literal substitution.
///
/// When the replacement contains the pattern (as `(` → `<i>(` does), an
/// occurrence already sitting inside a copy of the replacement is left alone,
/// so applying a rule twice is the same as applying it once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub from: String,
    pub to: String,
}

impl Rule {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn apply(&self, text: &str) -> String {
        if self.from.is_empty() {
            return text.to_string();
        }
        let Some(offset) = self.to.find(self.from.as_str()) else {
            return text.replace(self.from.as_str(), &self.to);
        };
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for (pos, matched) in text.match_indices(self.from.as_str()) {
            let already = pos >= offset
                && text
                    .get(pos - offset..)
                    .is_some_and(|rest| rest.starts_with(self.to.as_str()));
            out.push_str(&text[last..pos]);
            out.push_str(if already { matched } else { &self.to });
            last = pos + matched.len();
        }
        out.push_str(&text[last..]);
        out
    }
}

/// The substitution table for one entry, in application order.
pub fn rules(headword: &str, palette: &Palette) -> Vec<Rule> {
    let sense = palette.sense_span();
    let word = palette.word_span();
    let open_note = format!("{NOTE_INDENT}{sense}");
    let mut table = Vec::with_capacity(48);

    // Wrapped lines: continuation indents are 9, 10, 11 or 13 columns wide.
    table.push(Rule::new("\"--\n           ", "</span> - "));
    for width in [13, 11, 10, 9] {
        let indent = " ".repeat(width);
        table.push(Rule::new(format!("\n{indent}--"), "--"));
    }
    for width in [13, 11, 10, 9] {
        let indent = " ".repeat(width);
        table.push(Rule::new(format!("-\n{indent}"), "-"));
    }
    for width in [13, 11, 10, 9] {
        let indent = " ".repeat(width);
        table.push(Rule::new(format!("\n{indent}"), " "));
    }

    // Part-of-speech headers, then the remaining sense indentation.
    for pos in PartOfSpeech::ALL {
        table.push(Rule::new(
            format!("      {} 1", pos.marker()),
            format!("<b>{headword}</b> ~ <i>{}</i>:\n  1", pos.label()),
        ));
    }
    table.push(Rule::new("\n      ", "\n  "));

    // Synonym and antonym blocks.
    table.push(Rule::new("\"; [", "</span> ["));
    table.push(Rule::new("[syn:", format!("<i>{NOTE_INDENT}Synonyms:")));
    table.push(Rule::new("[ant:", format!("<i>{NOTE_INDENT}Antonyms:")));
    table.push(Rule::new("}]", "}</i>"));
    table.push(Rule::new("{", word));
    table.push(Rule::new("}", "</span>"));

    // Example sentences.
    table.push(Rule::new("\"; \"", format!("</span>; {sense}")));
    table.push(Rule::new("\", \"", format!("</span>; {sense}")));
    table.push(Rule::new("\"\n", "</span>\n"));
    table.push(Rule::new("\" <i>", "</span> <i>"));
    table.push(Rule::new("\"  <i>", "</span><i>"));
    for opener in ["; e.g. \"", ";   \"", ";  \"", "; \"", ";\"", ": \"", ":\"", ", \""] {
        table.push(Rule::new(opener, open_note.clone()));
    }
    for closer in ["\"--", "\"- ", "\"-", "\" -"] {
        table.push(Rule::new(closer, "</span> - "));
    }
    table.push(Rule::new("\"; ", "</span>; "));

    // Parenthesized qualifiers.
    table.push(Rule::new("(", "<i>("));
    table.push(Rule::new(")", ")</i>"));

    table
}

/// Applies every rule in order, each to the output of the previous one.
pub fn rewrite(text: &str, rules: &[Rule]) -> String {
    rules
        .iter()
        .fold(text.to_string(), |acc, rule| rule.apply(&acc))
}

/// Removes a known dictd banner, leaving unknown text untouched.
pub fn strip_banner(raw: &str) -> String {
    BANNERS
        .iter()
        .fold(raw.to_string(), |text, banner| text.replace(banner, ""))
}

/// Byte range of the first line holding the two-space-indented headword for
/// `term`, ignoring case. The range excludes the line break.
fn headword_span(body: &str, term: &str) -> Option<Range<usize>> {
    let pattern = format!("^  {}$", regex::escape(term.trim()));
    let regex = RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .multi_line(true)
        .build()
        .ok()?;
    regex.find(body).map(|found| found.range())
}

/// Cuts the headword line for `term` out of `body`, line break included, and
/// returns the word as printed.
pub fn take_headword(body: &mut String, term: &str) -> Option<String> {
    let span = headword_span(body, term)?;
    let headword = body[span.clone()].trim().to_string();
    let end = if body[span.end..].starts_with('\n') {
        span.end + 1
    } else {
        span.end
    };
    body.replace_range(span.start..end, "");
    Some(headword)
}

/// Bolds ` N: ` sense markers, from the highest number down.
pub fn bold_sense_numbers(text: &str) -> String {
    (0..=MAX_SENSE_NUMBER).rev().fold(text.to_string(), |acc, n| {
        acc.replace(&format!(" {n}: "), &format!(" <b>{n}:</b> "))
    })
}

/// Produces definition markup for a non-empty dictionary response.
///
/// Never fails: text that does not look like a dictd WordNet entry comes back
/// with whatever rules happened to match.
pub fn parse(raw: &str, term: &str, palette: &Palette) -> String {
    let mut body = strip_banner(raw);
    let headword = take_headword(&mut body, term).unwrap_or_else(|| {
        debug!(term, "headword line not found; continuing without it");
        String::new()
    });

    let table = rules(&headword, palette);
    let mut text = bold_sense_numbers(&rewrite(&body, &table));
    text = text.replace('`', "'");
    for (typo, fix) in CORPUS_FIXES {
        text = text.replace(typo, fix);
    }
    text.trim().to_string()
}

/// Extracts sense entries from raw dictd WordNet output.
pub fn senses(raw: &str) -> Vec<SenseEntry> {
    let mut entries: Vec<SenseEntry> = Vec::new();
    let mut part_of_speech = None;
    for line in strip_banner(raw).lines() {
        let indent = line.len() - line.trim_start().len();
        let content = line.trim();
        if content.is_empty() {
            continue;
        }
        if indent == 6 {
            if let Some((pos, ordinal, text)) = sense_line(content) {
                if pos.is_some() {
                    part_of_speech = pos;
                }
                entries.push(SenseEntry {
                    part_of_speech,
                    ordinal,
                    text: text.to_string(),
                });
                continue;
            }
        }
        if indent > 6 {
            if let Some(entry) = entries.last_mut() {
                if !entry.text.ends_with('-') {
                    entry.text.push(' ');
                }
                entry.text.push_str(content);
            }
        }
    }
    entries
}

fn sense_line(content: &str) -> Option<(Option<PartOfSpeech>, u32, &str)> {
    let (marker, rest) = content.split_once(": ")?;
    let (pos, number) = match marker.split_once(' ') {
        Some((abbreviation, number)) => (Some(PartOfSpeech::from_marker(abbreviation)?), number),
        None => (None, marker),
    };
    let ordinal = number.parse().ok()?;
    Some((pos, ordinal, rest))
}
