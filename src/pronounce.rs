use crate::markup::escape;

pub const FAILURE: &str = "ERROR: Something went wrong with pronunciations.";

/// Formats an IPA transcription line.
///
/// The label hedges with "Probable" when the word itself was not found, since
/// eSpeak will happily transcribe anything.
pub fn format(transcription: &str, definition_found: bool) -> String {
    let cleaned = transcription.trim().replace("\n ", " ");
    if cleaned.is_empty() {
        return FAILURE.to_string();
    }
    let label = if definition_found {
        "Pronunciation:"
    } else {
        "Probable Pronunciation:"
    };
    format!("{label} <b>/{}/</b>", escape(&cleaned))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn found_word_gets_plain_label() {
        assert_eq!(format(" dˈɒɡ\n", true), "Pronunciation: <b>/dˈɒɡ/</b>");
    }

    #[test]
    fn missed_word_is_probable() {
        assert_eq!(
            format(" zˈɪɡzæɡ\n", false),
            "Probable Pronunciation: <b>/zˈɪɡzæɡ/</b>"
        );
    }

    #[test]
    fn continuation_lines_are_joined() {
        assert_eq!(
            format(" hˈɒt\n dˈɒɡ\n", true),
            "Pronunciation: <b>/hˈɒt dˈɒɡ/</b>"
        );
    }

    #[test]
    fn blank_output_is_an_error_note() {
        assert_eq!(format("  \n", true), FAILURE);
    }
}
