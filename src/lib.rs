//! Core library surface for the lyric deck builder.
//!
//! The binary wires these pieces together: a SQLite-backed [`SongStore`], the
//! [`SelectionForm`] state machine, and a [`DeckGenerator`] that turns the
//! selected songs into a presentation script.
pub mod config;
pub mod db;
pub mod deck;
pub mod error;
pub mod form;
pub mod logger;
pub mod lyrics;
pub mod models;
pub mod ui;

pub use config::{AppConfig, Cli};
pub use db::SongStore;
pub use deck::{DeckGenerator, DeckOptions, Osascript, ScriptFile, ScriptRunner};
pub use error::{Error, Field, Result};
pub use form::{PendingAction, Resolution, SelectionForm};
pub use models::Song;
pub use ui::{run_app, App};
