use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Form inputs that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Lyrics,
    Selection,
    Filename,
    /// The filename names a path instead of a single document.
    FilenamePath,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Field::Title => "Title cannot be empty",
            Field::Lyrics => "Lyrics cannot be empty",
            Field::Selection => "Please select at least one song",
            Field::Filename => "Filename cannot be empty",
            Field::FilenamePath => "Filename cannot contain path separators",
        };
        f.write_str(message)
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Validation(Field),

    #[error("Song {id} not found")]
    NotFound { id: i64 },

    #[error("{action}: {source}")]
    Storage {
        action: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Presentation script failed: {message}")]
    ExternalExecution { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration in {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Configuration file {0} does not exist")]
    MissingConfig(PathBuf),

    #[error("Could not locate the home directory")]
    NoHomeDir,
}

impl Error {
    /// True for errors the form reports as a modal alert instead of
    /// terminating the run.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Attach a short description of the failed statement to SQLite errors, the
/// same way `anyhow::Context` labels them at the application layer.
pub(crate) trait StorageContext<T> {
    fn storage(self, action: &'static str) -> Result<T>;
}

impl<T> StorageContext<T> for std::result::Result<T, rusqlite::Error> {
    fn storage(self, action: &'static str) -> Result<T> {
        self.map_err(|source| Error::Storage { action, source })
    }
}
