//! Random words from the WordNet word lists.
//!
//! One list ships per WordNet release (`wn3.0`, `wn3.1`), one word per line.
//! Which release is installed is probed once per process and remembered.

use crate::error::ReoError;
use once_cell::sync::OnceCell;
use rand::{Rng, thread_rng};
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Lines in the stock WordNet word lists.
pub const DEFAULT_LINE_COUNT: usize = 147_478;

static PROBED_VERSION: OnceCell<WordNetVersion> = OnceCell::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum WordNetVersion {
    #[serde(rename = "3.0")]
    V30,
    #[default]
    #[serde(rename = "3.1")]
    V31,
}

impl WordNetVersion {
    pub fn tag(self) -> &'static str {
        match self {
            WordNetVersion::V30 => "3.0",
            WordNetVersion::V31 => "3.1",
        }
    }

    /// Reads the release out of a dictd WordNet banner.
    pub fn from_banner(text: &str) -> Option<Self> {
        if text.contains("From WordNet (r) 3.1 (2011) [wn]:") {
            Some(WordNetVersion::V31)
        } else if text.contains("From WordNet (r) 3.0 (2006) [wn]:") {
            Some(WordNetVersion::V30)
        } else {
            None
        }
    }
}

/// The release recorded by an earlier probe, if any.
pub fn probed_version() -> Option<WordNetVersion> {
    PROBED_VERSION.get().copied()
}

/// Records a probe result. The first recorded value sticks; it is returned.
pub fn remember_version(version: WordNetVersion) -> WordNetVersion {
    *PROBED_VERSION.get_or_init(|| version)
}

/// A line-oriented word list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordList {
    path: PathBuf,
    line_count: usize,
}

impl WordList {
    pub fn new(path: impl Into<PathBuf>, line_count: usize) -> Self {
        Self {
            path: path.into(),
            line_count,
        }
    }

    /// The stock list for a release inside `dir`.
    pub fn for_version(dir: &Path, version: WordNetVersion) -> Self {
        Self::new(
            dir.join(format!("wn{}", version.tag())),
            DEFAULT_LINE_COUNT,
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn pick(&self) -> Result<String, ReoError> {
        self.pick_with(&mut thread_rng())
    }

    /// Returns one line chosen uniformly, streaming the file rather than
    /// loading it.
    ///
    /// If the list is shorter than its declared line count, the index wraps
    /// around the real length.
    pub fn pick_with<R: Rng>(&self, rng: &mut R) -> Result<String, ReoError> {
        if self.line_count == 0 {
            return Err(ReoError::EmptyWordList(self.path.clone()));
        }
        let index = rng.gen_range(0..self.line_count);
        let (line, seen) = self.line(index)?;
        if let Some(line) = line {
            return Ok(line);
        }
        if seen == 0 {
            return Err(ReoError::EmptyWordList(self.path.clone()));
        }
        let (line, _) = self.line(index % seen)?;
        line.ok_or_else(|| ReoError::EmptyWordList(self.path.clone()))
    }

    /// The trimmed line at `index` (0-based), plus how many lines were read.
    fn line(&self, index: usize) -> Result<(Option<String>, usize), ReoError> {
        let file = File::open(&self.path).map_err(|source| self.read_error(source))?;
        let mut seen = 0;
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|source| self.read_error(source))?;
            if seen == index {
                return Ok((Some(line.trim().to_string()), seen + 1));
            }
            seen += 1;
        }
        Ok((None, seen))
    }

    fn read_error(&self, source: std::io::Error) -> ReoError {
        ReoError::WordList {
            path: self.path.clone(),
            source,
        }
    }
}

/// Picks a random line out of `resource`, which holds `line_count` lines.
pub fn pick(resource: &Path, line_count: usize) -> Result<String, ReoError> {
    WordList::new(resource, line_count).pick()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn list(words: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for word in words {
            writeln!(file, "{word}").unwrap();
        }
        file
    }

    #[test]
    fn picks_a_line_from_the_list() {
        let file = list(&["alpha", "beta", "gamma"]);
        let words = WordList::new(file.path(), 3);
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..20 {
            let word = words.pick_with(&mut rng).unwrap();
            assert!(["alpha", "beta", "gamma"].contains(&word.as_str()));
        }
    }

    #[test]
    fn every_line_is_reachable() {
        let file = list(&["alpha", "beta", "gamma"]);
        let words = WordList::new(file.path(), 3);
        let mut rng = SmallRng::seed_from_u64(11);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(words.pick_with(&mut rng).unwrap());
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn overstated_line_count_wraps() {
        let file = list(&["only"]);
        let words = WordList::new(file.path(), DEFAULT_LINE_COUNT);
        assert_eq!(words.pick().unwrap(), "only");
    }

    #[test]
    fn empty_and_missing_lists_are_errors() {
        let file = list(&[]);
        assert!(matches!(
            pick(file.path(), 10),
            Err(ReoError::EmptyWordList(_))
        ));
        assert!(matches!(
            pick(file.path(), 0),
            Err(ReoError::EmptyWordList(_))
        ));
        assert!(matches!(
            pick(Path::new("/nonexistent/wn3.1"), 10),
            Err(ReoError::WordList { .. })
        ));
    }

    #[test]
    fn banner_identifies_release() {
        let banner = "1 definition found\n\nFrom WordNet (r) 3.0 (2006) [wn]:\n\n  test\n";
        assert_eq!(WordNetVersion::from_banner(banner), Some(WordNetVersion::V30));
        assert_eq!(WordNetVersion::from_banner("no match"), None);
        assert_eq!(
            WordList::for_version(Path::new("/usr/share/reo"), WordNetVersion::V31).path(),
            Path::new("/usr/share/reo/wn3.1")
        );
    }

    #[test]
    fn first_remembered_version_sticks() {
        let first = remember_version(WordNetVersion::V30);
        let second = remember_version(WordNetVersion::V31);
        assert_eq!(first, second);
        assert_eq!(probed_version(), Some(first));
    }
}
