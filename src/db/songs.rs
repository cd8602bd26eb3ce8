use rusqlite::{params, OptionalExtension};
use tracing::{debug, info};

use super::SongStore;
use crate::error::{Error, Result, StorageContext};
use crate::models::Song;

impl SongStore {
    /// Fetch every song in insertion order. Display order is decided by the
    /// form, which shows the newest row first.
    pub fn list(&self) -> Result<Vec<Song>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title, lyrics FROM song ORDER BY id")
            .storage("failed to prepare song query")?;

        let songs = stmt
            .query_map([], |row| {
                Ok(Song {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    lyrics: row.get(2)?,
                })
            })
            .storage("failed to iterate songs")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .storage("failed to collect songs")?;

        debug!(count = songs.len(), "loaded songs");
        Ok(songs)
    }

    /// Look up a single song by id.
    pub fn get(&self, id: i64) -> Result<Option<Song>> {
        self.conn
            .query_row(
                "SELECT id, title, lyrics FROM song WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Song {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        lyrics: row.get(2)?,
                    })
                },
            )
            .optional()
            .storage("failed to load song")
    }

    /// Insert a brand new song and echo the hydrated struct. Non-empty checks
    /// belong to the caller.
    pub fn insert(&self, title: &str, lyrics: &str) -> Result<Song> {
        self.conn
            .execute(
                "INSERT INTO song (title, lyrics) VALUES (?1, ?2)",
                params![title, lyrics],
            )
            .storage("failed to insert song")?;

        let id = self.conn.last_insert_rowid();
        info!(id, title, "inserted song");
        Ok(Song {
            id,
            title: title.to_string(),
            lyrics: lyrics.to_string(),
        })
    }

    /// Overwrite title and lyrics of an existing song.
    pub fn update(&self, id: i64, title: &str, lyrics: &str) -> Result<()> {
        let updated = self
            .conn
            .execute(
                "UPDATE song SET title = ?1, lyrics = ?2 WHERE id = ?3",
                params![title, lyrics, id],
            )
            .storage("failed to update song")?;

        if updated == 0 {
            Err(Error::NotFound { id })
        } else {
            info!(id, title, "updated song");
            Ok(())
        }
    }

    /// Permanently delete a song.
    pub fn delete(&self, id: i64) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM song WHERE id = ?1", params![id])
            .storage("failed to delete song")?;

        if deleted == 0 {
            Err(Error::NotFound { id })
        } else {
            info!(id, "deleted song");
            Ok(())
        }
    }
}
