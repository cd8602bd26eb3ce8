//! Domain model mirroring the `song` table. Songs are plain data holders that
//! travel between the store, the selection form, and the deck generator.

use std::fmt;

use crate::lyrics::split_sections;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A stored song. Lyrics keep the exact text the user typed; sections are only
/// derived when a deck is built.
pub struct Song {
    /// Primary key assigned by SQLite. Never changes after the insert.
    pub id: i64,
    /// Title shown in the list and on the first slide.
    pub title: String,
    /// Raw lyrics text. Sections are separated by one or more blank lines.
    pub lyrics: String,
}

impl Song {
    /// Split the lyrics into slide-sized sections.
    pub fn sections(&self) -> Vec<&str> {
        split_sections(&self.lyrics)
    }

    /// Title trimmed for single-line displays, falling back to a placeholder
    /// so an untitled row never renders as an empty line.
    pub fn display_title(&self) -> String {
        let title = self.title.trim();
        if title.is_empty() {
            format!("(untitled #{})", self.id)
        } else {
            title.to_string()
        }
    }

    /// Case-sensitive substring match against title or lyrics.
    pub fn matches(&self, query: &str) -> bool {
        self.title.contains(query) || self.lyrics.contains(query)
    }
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_title())
    }
}
