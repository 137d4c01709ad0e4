//! End-to-end resolution of a raw query into definition markup.

use crate::backend::Backend;
use crate::config::ReoConfig;
use crate::custom::CustomStore;
use crate::definition::{self, SenseEntry};
use crate::error::{QueryError, ReoError};
use crate::markup::{Palette, escape};
use crate::pronounce;
use crate::query::{Query, Reserved, sanitize};
use crate::random::{self, WordList, WordNetVersion};
use crate::similar;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

pub const FORTUNE_FALLBACK: &str = "Easter Egg Fail!!! Install 'fortune' or 'fortunemod'.";
pub const COWFORTUNE_FALLBACK: &str =
    "Easter Egg Fail!!! Install 'fortune' or 'fortunemod' and also 'cowsay'.";

static PROBE_STARTED: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKind {
    Found,
    Miss,
    InvalidInput,
    EmptyInput,
    /// The query asked the application to quit.
    Exit,
}

/// What a presentation layer shows for one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub text: String,
    pub kind: ResultKind,
    /// The text is preformatted and should be shown in a fixed-width face.
    pub monospace: bool,
    /// Structured senses behind a dictionary definition; empty otherwise.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub senses: Vec<SenseEntry>,
}

impl Resolution {
    pub fn new(text: impl Into<String>, kind: ResultKind) -> Self {
        Self {
            text: text.into(),
            kind,
            monospace: false,
            senses: Vec::new(),
        }
    }

    pub fn monospace(text: impl Into<String>, kind: ResultKind) -> Self {
        Self {
            monospace: true,
            ..Self::new(text, kind)
        }
    }

    pub fn rejected(err: QueryError) -> Self {
        let kind = match err {
            QueryError::Empty => ResultKind::EmptyInput,
            QueryError::InvalidCharacters => ResultKind::InvalidInput,
        };
        Self::new(err.to_string(), kind)
    }
}

/// Routes queries to the custom store or the backend and assembles markup.
pub struct Resolver<B> {
    backend: Arc<B>,
    store: CustomStore,
    word_list_dir: PathBuf,
    database: String,
}

impl<B: Backend + 'static> Resolver<B> {
    pub fn new(backend: B, config: &ReoConfig) -> Self {
        Self::with_backend(Arc::new(backend), config)
    }

    pub fn with_backend(backend: Arc<B>, config: &ReoConfig) -> Self {
        Self {
            backend,
            store: CustomStore::new(config.custom_dir.clone()),
            word_list_dir: config.word_list_dir.clone(),
            database: config.database.clone(),
        }
    }

    /// Sanitizes `raw` and resolves it. Never fails: every outcome, including
    /// backend trouble, is described by the returned [`Resolution`].
    pub async fn resolve(&self, raw: &str, palette: &Palette) -> Resolution {
        match sanitize(raw) {
            Ok(query) => self.dispatch(&query, palette).await,
            Err(err) => Resolution::rejected(err),
        }
    }

    /// Resolves an already sanitized query.
    pub async fn dispatch(&self, query: &Query, palette: &Palette) -> Resolution {
        match query {
            Query::Reserved(reserved) => self.reserved(*reserved, palette).await,
            Query::Term(term) => self.term(term, palette).await,
        }
    }

    async fn reserved(&self, reserved: Reserved, palette: &Palette) -> Resolution {
        match reserved {
            Reserved::Fortune => match self.fortune().await {
                Some(text) => Resolution::monospace(escape(&text), ResultKind::Found),
                None => Resolution::new(FORTUNE_FALLBACK, ResultKind::Miss),
            },
            Reserved::CowFortune => {
                let Some(fortune) = self.fortune().await else {
                    return Resolution::new(COWFORTUNE_FALLBACK, ResultKind::Miss);
                };
                match self.backend.cowsay(&fortune).await {
                    Ok(cow) if !cow.trim().is_empty() => {
                        Resolution::monospace(escape(cow.trim_end()), ResultKind::Found)
                    }
                    Ok(_) => Resolution::new(COWFORTUNE_FALLBACK, ResultKind::Miss),
                    Err(err) => {
                        warn!(error = %err, "cowsay failed");
                        Resolution::new(COWFORTUNE_FALLBACK, ResultKind::Miss)
                    }
                }
            }
            Reserved::Exit => Resolution::new("", ResultKind::Exit),
            Reserved::SelfDescription => {
                Resolution::monospace(self_description(palette), ResultKind::Found)
            }
        }
    }

    async fn fortune(&self) -> Option<String> {
        match self.backend.fortune().await {
            Ok(text) if !text.trim().is_empty() => Some(text.trim_end().to_string()),
            Ok(_) => None,
            Err(err) => {
                warn!(error = %err, "fortune failed");
                None
            }
        }
    }

    async fn term(&self, term: &str, palette: &Palette) -> Resolution {
        if let Some(text) = self.store.lookup(term, palette).await {
            return Resolution::new(text, ResultKind::Found);
        }

        let (definition, pronunciation, similar) = tokio::join!(
            self.backend.define(term),
            self.backend.pronounce(term),
            self.backend.similar(term),
        );

        let mut senses = Vec::new();
        let (definition, found) = match definition {
            Ok(raw) if !raw.trim().is_empty() => {
                senses = definition::senses(&raw);
                (definition::parse(&raw, term, palette), true)
            }
            Ok(_) => {
                debug!(term, "no definition");
                (format!("No definition found for '{}'.", escape(term)), false)
            }
            Err(err) => {
                warn!(term, error = %err, "definition lookup failed");
                (
                    format!(
                        "ERROR: Could not obtain a definition for '{}': {}",
                        escape(term),
                        escape(&err.to_string())
                    ),
                    false,
                )
            }
        };

        let pronunciation = match pronunciation {
            Ok(raw) => pronounce::format(&raw, found),
            Err(err) => {
                warn!(term, error = %err, "pronunciation lookup failed");
                pronounce::FAILURE.to_string()
            }
        };

        let similar = match similar {
            Ok(raw) => similar::format(&raw, term, &self.database, found, palette)
                .unwrap_or_default(),
            Err(err) => {
                warn!(term, error = %err, "similar words lookup failed");
                format!(
                    "<i>ERROR: Could not obtain similar words: {}</i>",
                    escape(&err.to_string())
                )
            }
        };

        let text = format!(
            "{}\n{}\n{}",
            pronunciation.trim_end(),
            definition,
            similar.trim()
        );
        let kind = if found {
            ResultKind::Found
        } else {
            ResultKind::Miss
        };
        Resolution {
            senses,
            ..Resolution::new(text.trim_end(), kind)
        }
    }

    /// Picks a random headword from the installed WordNet word list.
    ///
    /// Until the dictionary's release is known the 3.1 list is used and a
    /// probe is started in the background.
    pub async fn random_word(&self) -> Result<String, ReoError> {
        let version = if self.store.pins_wordnet_31().await {
            WordNetVersion::V31
        } else {
            match random::probed_version() {
                Some(version) => version,
                None => {
                    self.start_probe();
                    WordNetVersion::default()
                }
            }
        };

        let list = WordList::for_version(&self.word_list_dir, version);
        debug!(path = %list.path().display(), "picking random word");
        tokio::task::spawn_blocking(move || list.pick())
            .await
            .map_err(|err| ReoError::Task(err.to_string()))?
    }

    fn start_probe(&self) {
        if PROBE_STARTED.swap(true, Ordering::SeqCst) {
            return;
        }
        let backend = Arc::clone(&self.backend);
        tokio::spawn(async move {
            match backend.probe_version().await {
                Ok(Some(version)) => {
                    let version = random::remember_version(version);
                    info!(version = version.tag(), "wordnet version detected");
                }
                Ok(None) => {
                    debug!("dictionary banner did not name a wordnet release");
                    PROBE_STARTED.store(false, Ordering::SeqCst);
                }
                Err(err) => {
                    warn!(error = %err, "wordnet version probe failed");
                    PROBE_STARTED.store(false, Ordering::SeqCst);
                }
            }
        });
    }
}

fn self_description(palette: &Palette) -> String {
    format!(
        "Pronunciation: <b>/ɹˈiːəʊ/</b>\n\
         <b>Reo</b> ~ <i>Japanese Word</i>:\n  \
         <b>1:</b> Name of this application, chosen kind of at random.\n  \
         <b>2:</b> Japanese word meaning 'Wise Center'\n\
         <b>Similar Words</b>:\n\
         <i>{}  ro, re, roe, redo, reno, oreo, ceo, leo, neo, rho, rio, reb, red, ref, rem, rep, res, ret, rev, rex</span></i>",
        palette.word_span()
    )
}

/// Per-window state a presentation layer keeps between queries.
#[derive(Debug, Clone, Default)]
pub struct Session {
    searched: bool,
    last_term: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves `raw`, remembering it when it named an ordinary term.
    pub async fn resolve<B: Backend + 'static>(
        &mut self,
        resolver: &Resolver<B>,
        raw: &str,
        palette: &Palette,
    ) -> Resolution {
        let query = match sanitize(raw) {
            Ok(query) => query,
            Err(err) => return Resolution::rejected(err),
        };
        if let Some(term) = query.term() {
            self.searched = true;
            self.last_term = Some(term.to_string());
        }
        resolver.dispatch(&query, palette).await
    }

    /// Whether a term has been looked up since the last reset.
    pub fn has_searched(&self) -> bool {
        self.searched
    }

    pub fn last_term(&self) -> Option<&str> {
        self.last_term.as_deref()
    }

    /// Called when the query text is edited.
    pub fn reset(&mut self) {
        self.searched = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::stub::StubBackend;
    use crate::custom::DISCLAIMER;
    use crate::definition::PartOfSpeech;
    use tempfile::TempDir;

    const CAT: &str = "1 definition found\n\nFrom WordNet (r) 3.1 (2011) [wn]:\n\n  cat\n      n 1: feline mammal usually having thick soft fur\n";

    fn config(dir: &TempDir) -> ReoConfig {
        ReoConfig {
            custom_dir: dir.path().join("cdef"),
            word_list_dir: dir.path().join("lists"),
            ..ReoConfig::default()
        }
    }

    fn resolver(backend: StubBackend) -> (Resolver<StubBackend>, TempDir) {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("cdef")).unwrap();
        std::fs::create_dir_all(dir.path().join("lists")).unwrap();
        let resolver = Resolver::new(backend, &config(&dir));
        (resolver, dir)
    }

    fn working_backend() -> StubBackend {
        StubBackend {
            define: Some(CAT.to_string()),
            pronounce: Some(" kˈat\n".to_string()),
            similar: Some("wn:  \"bat\"  \"cat\"  \"cot\"\n".to_string()),
            ..StubBackend::default()
        }
    }

    #[tokio::test]
    async fn blank_and_punctuation_queries_are_rejected() {
        let (resolver, _dir) = resolver(StubBackend::default());
        let palette = Palette::light();
        assert_eq!(
            resolver.resolve("   ", &palette).await.kind,
            ResultKind::EmptyInput
        );
        let invalid = resolver.resolve("<<<>>>", &palette).await;
        assert_eq!(invalid.kind, ResultKind::InvalidInput);
        assert!(invalid.text.starts_with("Invalid Characters!"));
    }

    #[tokio::test]
    async fn reo_describes_itself() {
        let (resolver, _dir) = resolver(StubBackend::default());
        let out = resolver.resolve("reo", &Palette::dark()).await;
        assert!(out.text.contains("Reo"));
        assert!(out.text.contains("foreground=\"lightgreen\""));
        assert!(out.monospace);
    }

    #[tokio::test]
    async fn fortune_without_collaborator_falls_back() {
        let (resolver, _dir) = resolver(StubBackend::default());
        let out = resolver.resolve("fortune -a", &Palette::light()).await;
        assert_eq!(out.text, FORTUNE_FALLBACK);
        assert!(out.text.contains("fortunemod"));

        let out = resolver.resolve("cowfortune", &Palette::light()).await;
        assert_eq!(out.text, COWFORTUNE_FALLBACK);
    }

    #[tokio::test]
    async fn fortune_text_is_escaped_and_monospaced() {
        let (resolver, _dir) = resolver(StubBackend {
            fortune: Some("a < b & c\n".to_string()),
            cowsay: Some(" ___\n< moo >".to_string()),
            ..StubBackend::default()
        });
        let out = resolver.resolve("fortune -a", &Palette::light()).await;
        assert_eq!(out.text, "a &lt; b &amp; c");
        assert!(out.monospace);

        let out = resolver.resolve("cowfortune", &Palette::light()).await;
        assert!(out.text.contains("&lt; moo &gt;"));
        assert!(out.text.ends_with("a &lt; b &amp; c"));
    }

    #[tokio::test]
    async fn exit_phrases_signal_exit() {
        let (resolver, _dir) = resolver(StubBackend::default());
        for phrase in ["crash now", "close now"] {
            let out = resolver.resolve(phrase, &Palette::light()).await;
            assert_eq!(out.kind, ResultKind::Exit);
            assert!(out.text.is_empty());
        }
    }

    #[tokio::test]
    async fn custom_record_wins_over_backend() {
        let (resolver, dir) = resolver(working_backend());
        std::fs::write(dir.path().join("cdef/foo"), "<b>foo</b> in $WORDCOL").unwrap();
        let out = resolver.resolve("foo", &Palette::light()).await;
        assert_eq!(out.kind, ResultKind::Found);
        assert!(out.text.contains("green"));
        assert!(!out.text.contains("$WORDCOL"));
        assert!(out.text.ends_with(DISCLAIMER));
    }

    #[tokio::test]
    async fn found_term_has_all_three_sections() {
        let (resolver, _dir) = resolver(working_backend());
        let out = resolver.resolve("cat", &Palette::light()).await;
        assert_eq!(out.kind, ResultKind::Found);
        let lines: Vec<&str> = out.text.lines().collect();
        assert_eq!(lines[0], "Pronunciation: <b>/kˈat/</b>");
        assert!(lines[1].starts_with("<b>cat</b> ~ <i>noun</i>:"));
        assert!(out.text.contains("<b>Similar Words</b>:"));
        assert!(out.text.ends_with("  bat, cot</span></i>"));
        assert_eq!(out.senses.len(), 1);
        assert_eq!(out.senses[0].part_of_speech, Some(PartOfSpeech::Noun));
        assert_eq!(out.senses[0].ordinal, 1);
        assert_eq!(out.senses[0].text, "feline mammal usually having thick soft fur");
    }

    #[tokio::test]
    async fn miss_relabels_pronunciation_and_suggestions() {
        let (resolver, _dir) = resolver(StubBackend {
            define: Some(String::new()),
            ..working_backend()
        });
        let out = resolver.resolve("catt", &Palette::light()).await;
        assert_eq!(out.kind, ResultKind::Miss);
        assert!(out.text.starts_with("Probable Pronunciation:"));
        assert!(out.text.contains("No definition found for 'catt'."));
        assert!(out.text.contains("<b>Did you mean</b>:"));
        assert!(out.senses.is_empty());
    }

    #[tokio::test]
    async fn backend_errors_degrade_to_notes() {
        let (resolver, _dir) = resolver(StubBackend::default());
        let out = resolver.resolve("cat", &Palette::light()).await;
        assert_eq!(out.kind, ResultKind::Miss);
        assert!(out.text.starts_with(pronounce::FAILURE));
        assert!(out.text.contains("ERROR: Could not obtain a definition for 'cat'"));
        assert!(out.text.contains("ERROR: Could not obtain similar words"));
    }

    #[tokio::test]
    async fn random_word_reads_word_list() {
        let (resolver, dir) = resolver(StubBackend {
            version: Some(WordNetVersion::V31),
            ..StubBackend::default()
        });
        for name in ["wn3.0", "wn3.1"] {
            std::fs::write(dir.path().join("lists").join(name), "kiwi\n").unwrap();
        }
        assert_eq!(resolver.random_word().await.unwrap(), "kiwi");
    }

    #[tokio::test]
    async fn marker_pins_wordnet_31_list() {
        let (resolver, dir) = resolver(StubBackend::default());
        std::fs::write(dir.path().join("cdef").join("wnver31"), "").unwrap();
        std::fs::write(dir.path().join("lists/wn3.1"), "mango\n").unwrap();
        assert_eq!(resolver.random_word().await.unwrap(), "mango");
    }

    #[tokio::test]
    async fn missing_word_list_is_an_error() {
        let (resolver, dir) = resolver(StubBackend::default());
        std::fs::write(dir.path().join("cdef").join("wnver31"), "").unwrap();
        assert!(matches!(
            resolver.random_word().await,
            Err(ReoError::WordList { .. })
        ));
    }

    #[tokio::test]
    async fn session_tracks_searches() {
        let (resolver, _dir) = resolver(working_backend());
        let mut session = Session::new();
        let palette = Palette::light();

        session.resolve(&resolver, "reo", &palette).await;
        assert!(!session.has_searched());

        session.resolve(&resolver, "\"cat\"", &palette).await;
        assert!(session.has_searched());
        assert_eq!(session.last_term(), Some("cat"));

        session.reset();
        assert!(!session.has_searched());
        assert_eq!(session.last_term(), Some("cat"));
    }
}
