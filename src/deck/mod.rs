//! Slide deck generation. The script text is built by a pure function in
//! [`script`]; a [`ScriptRunner`] hands it to the presentation application.

mod runner;
mod script;

use std::path::{Path, PathBuf};

use directories::UserDirs;
use serde::Deserialize;
use tracing::{debug, error, info};

use crate::error::Result;
use crate::models::Song;

pub use runner::{Osascript, ScriptFile, ScriptRunner};
pub use script::{escape_literal, generate_script};

/// Presentation settings baked into every generated script.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeckOptions {
    /// Scriptable application that builds the document.
    pub application: String,
    /// Document theme applied when the presentation is created.
    pub theme: String,
    /// Layout of the first slide of each song (title and body).
    pub title_layout: String,
    /// Layout of every following slide (body only).
    pub body_layout: String,
    pub width: u32,
    pub height: u32,
    /// Folder the document is saved in. `None` means the desktop folder as
    /// reported by the scripting host.
    pub output_dir: Option<PathBuf>,
    /// Native document extension, without the dot.
    pub extension: String,
    /// Escape `"` and `\` in titles, lyrics and filenames before they are
    /// placed inside string literals.
    pub escape_text: bool,
}

impl Default for DeckOptions {
    fn default() -> Self {
        Self {
            application: "Keynote".to_string(),
            theme: "Worship".to_string(),
            title_layout: "Title - Lyrics".to_string(),
            body_layout: "Lyrics".to_string(),
            width: 1920,
            height: 1080,
            output_dir: None,
            extension: "key".to_string(),
            escape_text: true,
        }
    }
}

impl DeckOptions {
    /// Where the saved document is expected to land for `filename`.
    pub fn output_path(&self, filename: &str) -> PathBuf {
        let file = format!("{filename}.{}", self.extension);
        match &self.output_dir {
            Some(dir) => dir.join(file),
            None => desktop_dir().join(file),
        }
    }
}

fn desktop_dir() -> PathBuf {
    UserDirs::new()
        .and_then(|dirs| {
            dirs.desktop_dir()
                .map(Path::to_path_buf)
                .or_else(|| Some(dirs.home_dir().join("Desktop")))
        })
        .unwrap_or_else(|| PathBuf::from("Desktop"))
}

/// Builds a deck script for an ordered song list and submits it.
pub struct DeckGenerator {
    options: DeckOptions,
    runner: Box<dyn ScriptRunner>,
}

impl DeckGenerator {
    pub fn new(options: DeckOptions, runner: impl ScriptRunner + 'static) -> Self {
        Self {
            options,
            runner: Box::new(runner),
        }
    }

    /// Build the script, run it, and return the path the document is saved
    /// to. Runner failures are returned untouched.
    pub fn generate(&self, filename: &str, songs: &[Song]) -> Result<PathBuf> {
        let script = generate_script(&self.options, filename, songs);
        info!(filename, songs = songs.len(), "running deck script");
        debug!(%script, "generated deck script");

        if let Err(err) = self.runner.run(&script) {
            error!(%err, filename, "deck script failed");
            return Err(err);
        }

        let path = self.options.output_path(filename);
        info!(path = %path.display(), "deck saved");
        Ok(path)
    }
}
