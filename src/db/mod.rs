//! Persistence module split across logical submodules.

mod connection;
mod songs;

use rusqlite::Connection;

pub use connection::default_db_path;
pub(crate) use connection::DATA_DIR_NAME;

/// Owner of the SQLite connection holding the `song` table. The connection is
/// opened once at startup and closed when the store is dropped.
pub struct SongStore {
    conn: Connection,
}
