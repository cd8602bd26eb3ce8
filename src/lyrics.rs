//! Lyrics sectioning. A section is the text between runs of blank lines, where
//! a line holding only whitespace counts as blank.

use std::sync::LazyLock;

use regex::Regex;

/// One line break, any whitespace (including further line breaks), then a
/// second line break.
static BLANK_LINE_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\r?\n\s*\n").expect("blank line pattern is valid")
});

/// Separator used when sections are stitched back together.
pub const SECTION_SEPARATOR: &str = "\n\n";

/// Trim the whole text, then split it on every run of blank lines.
///
/// Empty lyrics yield a single empty section so callers can always take the
/// first entry as the title slide body.
pub fn split_sections(lyrics: &str) -> Vec<&str> {
    BLANK_LINE_RUN.split(lyrics.trim()).collect()
}

/// Join sections with a single canonical blank line.
pub fn join_sections<S: AsRef<str>>(sections: &[S]) -> String {
    sections
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(SECTION_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_single_blank_lines() {
        assert_eq!(split_sections("A\n\nB\n\nC"), vec!["A", "B", "C"]);
    }

    #[test]
    fn whitespace_only_lines_count_as_blank() {
        assert_eq!(split_sections("A\n   \nB"), vec!["A", "B"]);
        assert_eq!(split_sections("A\n\t \n \n\nB"), vec!["A", "B"]);
    }

    #[test]
    fn handles_windows_line_endings() {
        assert_eq!(split_sections("A\r\n\r\nB"), vec!["A", "B"]);
    }

    #[test]
    fn keeps_multi_line_sections_intact() {
        let lyrics = "\n\nline one\nline two\n\n\nchorus one\nchorus two\n  ";
        assert_eq!(
            split_sections(lyrics),
            vec!["line one\nline two", "chorus one\nchorus two"]
        );
    }

    #[test]
    fn empty_lyrics_yield_one_empty_section() {
        assert_eq!(split_sections(""), vec![""]);
        assert_eq!(split_sections("  \n \n"), vec![""]);
    }

    #[test]
    fn resplitting_joined_sections_is_stable() {
        let samples = [
            "A\n\nB\n\nC",
            "A\n   \nB",
            "A  \n\n  B",
            "A\n \n\n B\nB2\n\n\n\nC",
            "single section\nwith two lines",
        ];
        for lyrics in samples {
            let first = split_sections(lyrics);
            let rejoined = join_sections(&first);
            assert_eq!(split_sections(&rejoined), first, "lyrics: {lyrics:?}");
        }
    }
}
