//! User-written definitions that override backend lookups.
//!
//! Each definition is a file in the custom directory named exactly after the
//! sanitized term. Its content is markup that may reference the palette with
//! `$WORDCOL` / `$SENCOL` placeholders.

use crate::markup::Palette;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// A line that, when present, suppresses the disclaimer.
pub const WARNING_HIDE: &str = "\n[warninghide]";

pub const DISCLAIMER: &str = "\n<span foreground=\"#e6292f\">NOTE: This is a Custom definition. No one is to be held responsible for errors in this.</span>";

/// Marker file that pins the random word list to WordNet 3.1.
pub const WORDNET_31_MARKER: &str = "wnver31";

#[derive(Debug, Clone)]
pub struct CustomStore {
    dir: PathBuf,
}

impl CustomStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the record for `term`, or `None` when the term cannot name a
    /// plain file inside the store.
    pub fn path_for(&self, term: &str) -> Option<PathBuf> {
        let mut components = Path::new(term).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Some(self.dir.join(term)),
            _ => None,
        }
    }

    /// Returns the rendered record for `term`, if one exists and is readable.
    pub async fn lookup(&self, term: &str, palette: &Palette) -> Option<String> {
        let path = self.path_for(term)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                debug!(term, path = %path.display(), "custom definition hit");
                Some(render(&content, palette))
            }
            Err(err) => {
                debug!(term, error = %err, "no custom definition");
                None
            }
        }
    }

    pub async fn pins_wordnet_31(&self) -> bool {
        tokio::fs::metadata(self.dir.join(WORDNET_31_MARKER))
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }
}

/// Substitutes palette placeholders and appends the disclaimer unless the
/// record opts out.
pub fn render(content: &str, palette: &Palette) -> String {
    let word = palette.word_color.as_str();
    let sense = palette.sense_color.as_str();
    let rendered = content
        .replace("<i>($WORDCOL)</i>", word)
        .replace("<i>($SENCOL)</i>", sense)
        .replace("($WORDCOL)", word)
        .replace("($SENCOL)", sense)
        .replace("$WORDCOL", word)
        .replace("$SENCOL", sense);
    if rendered.contains(WARNING_HIDE) {
        rendered.replace(WARNING_HIDE, "")
    } else {
        rendered + DISCLAIMER
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_with(term: &str, content: &str) -> (CustomStore, TempDir) {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(term), content).unwrap();
        (CustomStore::new(dir.path()), dir)
    }

    #[test]
    fn placeholders_take_palette_colors() {
        let palette = Palette::new("blue", "green");
        let content = "<span foreground=\"$WORDCOL\">foo</span> <i>($SENCOL)</i> ($WORDCOL)";
        let rendered = render(content, &palette);
        assert!(!rendered.contains("$WORDCOL"));
        assert!(!rendered.contains("$SENCOL"));
        assert!(rendered.starts_with("<span foreground=\"green\">foo</span> blue green"));
        assert!(rendered.ends_with(DISCLAIMER));
    }

    #[test]
    fn warning_hide_suppresses_disclaimer() {
        let rendered = render("<b>foo</b>\n[warninghide]", &Palette::light());
        assert_eq!(rendered, "<b>foo</b>");
    }

    #[tokio::test]
    async fn lookup_reads_record_named_after_term() {
        let (store, _dir) = store_with("foo", "<b>foo</b> is $WORDCOL");
        let rendered = store
            .lookup("foo", &Palette::new("blue", "green"))
            .await
            .unwrap();
        assert!(rendered.contains("green"));
        assert!(!rendered.contains("$WORDCOL"));
    }

    #[tokio::test]
    async fn missing_record_is_none() {
        let (store, _dir) = store_with("foo", "x");
        assert!(store.lookup("bar", &Palette::light()).await.is_none());
    }

    #[tokio::test]
    async fn unreadable_store_is_none() {
        let store = CustomStore::new("/nonexistent/reo/cdef");
        assert!(store.lookup("foo", &Palette::light()).await.is_none());
        assert!(!store.pins_wordnet_31().await);
    }

    #[test]
    fn terms_cannot_escape_the_store() {
        let store = CustomStore::new("/tmp/cdef");
        assert_eq!(store.path_for("foo"), Some(PathBuf::from("/tmp/cdef/foo")));
        assert_eq!(store.path_for("hot dog"), Some(PathBuf::from("/tmp/cdef/hot dog")));
        assert_eq!(store.path_for("../secret"), None);
        assert_eq!(store.path_for("a/b"), None);
        assert_eq!(store.path_for(".."), None);
        assert_eq!(store.path_for("."), None);
    }

    #[tokio::test]
    async fn marker_file_pins_wordnet_31() {
        let (store, _dir) = store_with(WORDNET_31_MARKER, "");
        assert!(store.pins_wordnet_31().await);
    }
}
