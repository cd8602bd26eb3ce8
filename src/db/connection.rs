use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use rusqlite::Connection;
use tracing::debug;

use super::SongStore;
use crate::error::{Error, Result, StorageContext};

/// Folder name used beneath the user's home directory for application data.
pub(crate) const DATA_DIR_NAME: &str = ".lyric-deck";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "songs.sqlite3";

impl SongStore {
    /// Open (or create) the database file and make sure the `song` table
    /// exists.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path).storage("failed to open SQLite database")?;
        debug!(path = %path.display(), "opened song database");
        Self::with_connection(conn)
    }

    /// Private in-memory database, used by tests and dry runs.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().storage("failed to open in-memory database")?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS song (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                lyrics TEXT NOT NULL
            )",
            [],
        )
        .storage("failed to create song table")?;

        Ok(Self { conn })
    }
}

/// Resolve the absolute path to the SQLite database inside the user's home.
pub fn default_db_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or(Error::NoHomeDir)?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}
