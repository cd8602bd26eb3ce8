//! Toolkit-independent state machine behind the song editor and selection
//! basket. The terminal UI translates key presses into the commands exposed
//! here; tests drive the same commands directly.
//!
//! Mutating commands that need the user's consent are split in two steps:
//! `request_save` / `request_delete` stage a [`PendingAction`], and
//! [`SelectionForm::resolve`] either performs it or reverts the edit fields.

use std::path::PathBuf;

use chrono::Local;
use tracing::{debug, info};

use crate::db::SongStore;
use crate::deck::DeckGenerator;
use crate::error::{Error, Field, Result};
use crate::models::Song;

/// Action waiting for a yes/no answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    Insert,
    Update { id: i64 },
    Delete { id: i64 },
}

impl PendingAction {
    /// Question shown to the user before the action runs.
    pub fn prompt(&self) -> &'static str {
        match self {
            PendingAction::Insert => "Are you sure you want to add this song?",
            PendingAction::Update { .. } => "Are you sure you want to update this song?",
            PendingAction::Delete { .. } => "Are you sure you want to delete this song?",
        }
    }
}

/// What [`SelectionForm::resolve`] ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Inserted(Song),
    Updated(i64),
    Deleted(i64),
    /// The user declined; fields were restored from the stored song if one
    /// was loaded.
    Declined,
    /// Nothing was pending.
    Idle,
}

/// Today's date as `YYYYMMDD`, the suggested document name.
pub fn default_filename() -> String {
    Local::now().format("%Y%m%d").to_string()
}

pub struct SelectionForm {
    store: SongStore,
    /// Every stored song, newest first.
    songs: Vec<Song>,
    /// Stored copy of the song being edited, if any.
    loaded: Option<Song>,
    title: String,
    lyrics: String,
    search: String,
    filename: String,
    basket: Vec<Song>,
    pending: Option<PendingAction>,
    finished: bool,
}

impl SelectionForm {
    pub fn new(store: SongStore, filename: impl Into<String>) -> Result<Self> {
        let mut form = Self {
            store,
            songs: Vec::new(),
            loaded: None,
            title: String::new(),
            lyrics: String::new(),
            search: String::new(),
            filename: filename.into(),
            basket: Vec::new(),
            pending: None,
            finished: false,
        };
        form.reload()?;
        Ok(form)
    }

    /// Re-read the song list and reset the editor.
    pub fn reload(&mut self) -> Result<()> {
        let mut songs = self.store.list()?;
        songs.reverse();
        self.songs = songs;
        self.clear_editor();
        debug!(count = self.songs.len(), "song list reloaded");
        Ok(())
    }

    pub fn store(&self) -> &SongStore {
        &self.store
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    /// Songs passing the search filter, in list order. An empty query shows
    /// everything.
    pub fn visible_songs(&self) -> Vec<&Song> {
        self.songs
            .iter()
            .filter(|song| self.search.is_empty() || song.matches(&self.search))
            .collect()
    }

    pub fn current_edit_id(&self) -> Option<i64> {
        self.loaded.as_ref().map(|song| song.id)
    }

    pub fn loaded(&self) -> Option<&Song> {
        self.loaded.as_ref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn lyrics(&self) -> &str {
        &self.lyrics
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn basket(&self) -> &[Song] {
        &self.basket
    }

    pub fn pending(&self) -> Option<PendingAction> {
        self.pending
    }

    /// Set once a deck has been generated; the front end closes afterwards.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn title_mut(&mut self) -> &mut String {
        &mut self.title
    }

    pub fn lyrics_mut(&mut self) -> &mut String {
        &mut self.lyrics
    }

    pub fn search_mut(&mut self) -> &mut String {
        &mut self.search
    }

    pub fn filename_mut(&mut self) -> &mut String {
        &mut self.filename
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_lyrics(&mut self, lyrics: impl Into<String>) {
        self.lyrics = lyrics.into();
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
    }

    pub fn set_filename(&mut self, filename: impl Into<String>) {
        self.filename = filename.into();
    }

    /// Load a listed song into the editor. Returns `false` when the id is not
    /// in the current list.
    pub fn select(&mut self, id: i64) -> bool {
        let Some(song) = self.songs.iter().find(|song| song.id == id).cloned() else {
            return false;
        };
        self.title = song.title.clone();
        self.lyrics = song.lyrics.clone();
        debug!(id, "song loaded into editor");
        self.loaded = Some(song);
        true
    }

    /// Start a fresh entry, silently discarding unsaved edits.
    pub fn new_song(&mut self) {
        self.clear_editor();
    }

    /// Validate the editor and stage an insert or update.
    pub fn request_save(&mut self) -> Result<PendingAction> {
        if self.title.trim().is_empty() {
            return Err(Error::Validation(Field::Title));
        }
        if self.lyrics.trim().is_empty() {
            return Err(Error::Validation(Field::Lyrics));
        }

        let action = match self.current_edit_id() {
            None => PendingAction::Insert,
            Some(id) => PendingAction::Update { id },
        };
        self.pending = Some(action);
        Ok(action)
    }

    /// Stage a delete of the loaded song. With nothing loaded the editor is
    /// simply cleared and nothing is staged.
    pub fn request_delete(&mut self) -> Option<PendingAction> {
        match self.current_edit_id() {
            None => {
                self.title.clear();
                self.lyrics.clear();
                None
            }
            Some(id) => {
                let action = PendingAction::Delete { id };
                self.pending = Some(action);
                Some(action)
            }
        }
    }

    /// Answer the staged question. Confirmed actions hit the store and reload
    /// the list; declined ones restore the stored values.
    pub fn resolve(&mut self, confirmed: bool) -> Result<Resolution> {
        let Some(action) = self.pending.take() else {
            return Ok(Resolution::Idle);
        };

        if !confirmed {
            self.revert();
            return Ok(Resolution::Declined);
        }

        let resolution = match action {
            PendingAction::Insert => {
                let song = self.store.insert(&self.title, &self.lyrics)?;
                Resolution::Inserted(song)
            }
            PendingAction::Update { id } => {
                self.store.update(id, &self.title, &self.lyrics)?;
                Resolution::Updated(id)
            }
            PendingAction::Delete { id } => {
                self.store.delete(id)?;
                Resolution::Deleted(id)
            }
        };
        self.reload()?;
        Ok(resolution)
    }

    /// Append the loaded song to the basket. Duplicates are kept.
    pub fn add_to_selection(&mut self) -> Option<&Song> {
        let song = self.loaded.clone()?;
        debug!(id = song.id, "song added to selection");
        self.basket.push(song);
        self.basket.last()
    }

    /// Build the deck for the basket. On success the form is finished; the
    /// basket is left as is.
    pub fn generate(&mut self, generator: &DeckGenerator) -> Result<PathBuf> {
        if self.basket.is_empty() {
            return Err(Error::Validation(Field::Selection));
        }
        if self.filename.trim().is_empty() {
            return Err(Error::Validation(Field::Filename));
        }
        if self.filename.contains(['/', '\\']) {
            return Err(Error::Validation(Field::FilenamePath));
        }

        let path = generator.generate(&self.filename, &self.basket)?;
        info!(songs = self.basket.len(), path = %path.display(), "deck generated");
        self.finished = true;
        Ok(path)
    }

    fn revert(&mut self) {
        if let Some(song) = &self.loaded {
            self.title = song.title.clone();
            self.lyrics = song.lyrics.clone();
        }
    }

    fn clear_editor(&mut self) {
        self.loaded = None;
        self.title.clear();
        self.lyrics.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::deck::{DeckOptions, ScriptRunner};

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<String>>>);

    impl ScriptRunner for Recorder {
        fn run(&self, script: &str) -> Result<()> {
            self.0.borrow_mut().push(script.to_string());
            Ok(())
        }
    }

    struct Failing;

    impl ScriptRunner for Failing {
        fn run(&self, _script: &str) -> Result<()> {
            Err(Error::ExternalExecution {
                message: "boom".to_string(),
            })
        }
    }

    fn form_with(songs: &[(&str, &str)]) -> SelectionForm {
        let store = SongStore::open_in_memory().unwrap();
        for (title, lyrics) in songs {
            store.insert(title, lyrics).unwrap();
        }
        SelectionForm::new(store, "svc1").unwrap()
    }

    fn id_of(form: &SelectionForm, title: &str) -> i64 {
        form.songs().iter().find(|s| s.title == title).unwrap().id
    }

    #[test]
    fn list_shows_newest_first() {
        let form = form_with(&[("First", "a"), ("Second", "b"), ("Third", "c")]);
        let titles: Vec<&str> = form.songs().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Third", "Second", "First"]);
        assert!(form.current_edit_id().is_none());
        assert!(form.title().is_empty());
    }

    #[test]
    fn search_filters_without_reordering() {
        let mut form = form_with(&[
            ("Amazing Grace", "how sweet"),
            ("Holy Holy", "Lord God Almighty"),
            ("Grace Alone", "every promise"),
        ]);

        form.set_search("Grace");
        let titles: Vec<&str> = form.visible_songs().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Grace Alone", "Amazing Grace"]);

        form.set_search("God");
        assert_eq!(form.visible_songs().len(), 1);

        form.set_search("grace");
        assert!(form.visible_songs().is_empty());

        form.set_search("");
        assert_eq!(form.visible_songs().len(), 3);
    }

    #[test]
    fn select_populates_the_editor() {
        let mut form = form_with(&[("Amazing Grace", "Verse1\n\nVerse2")]);
        let id = id_of(&form, "Amazing Grace");

        assert!(form.select(id));
        assert_eq!(form.current_edit_id(), Some(id));
        assert_eq!(form.title(), "Amazing Grace");
        assert_eq!(form.lyrics(), "Verse1\n\nVerse2");
        assert!(!form.select(id + 50));
    }

    #[test]
    fn save_requires_title_then_lyrics() {
        let mut form = form_with(&[]);
        form.set_lyrics("words");
        assert!(matches!(
            form.request_save(),
            Err(Error::Validation(Field::Title))
        ));

        form.set_title("  Title ");
        form.set_lyrics(" \n ");
        assert!(matches!(
            form.request_save(),
            Err(Error::Validation(Field::Lyrics))
        ));
        assert!(form.pending().is_none());
        assert!(form.store().list().unwrap().is_empty());
    }

    #[test]
    fn confirmed_insert_stores_and_reloads() {
        let mut form = form_with(&[]);
        form.set_title("New Song");
        form.set_lyrics("la la");

        assert_eq!(form.request_save().unwrap(), PendingAction::Insert);
        let song = match form.resolve(true).unwrap() {
            Resolution::Inserted(song) => song,
            other => panic!("expected an insert, got {other:?}"),
        };
        assert_eq!(song.title, "New Song");
        assert_eq!(form.songs(), &[song]);
        assert!(form.title().is_empty());
        assert!(form.current_edit_id().is_none());
    }

    #[test]
    fn declined_insert_keeps_the_fields() {
        let mut form = form_with(&[]);
        form.set_title("Draft");
        form.set_lyrics("unsaved");
        form.request_save().unwrap();

        assert_eq!(form.resolve(false).unwrap(), Resolution::Declined);
        assert_eq!(form.title(), "Draft");
        assert_eq!(form.lyrics(), "unsaved");
        assert!(form.store().list().unwrap().is_empty());
    }

    #[test]
    fn confirmed_update_overwrites_without_new_rows() {
        let mut form = form_with(&[("Old", "old")]);
        let id = id_of(&form, "Old");
        form.select(id);
        form.set_title("Renamed");

        assert_eq!(form.request_save().unwrap(), PendingAction::Update { id });
        assert_eq!(form.resolve(true).unwrap(), Resolution::Updated(id));

        let stored = form.store().list().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, id);
        assert_eq!(stored[0].title, "Renamed");
        assert!(form.current_edit_id().is_none());
    }

    #[test]
    fn declined_update_reverts_to_stored_values() {
        let mut form = form_with(&[("Old", "old")]);
        let id = id_of(&form, "Old");
        form.select(id);
        form.set_title("Renamed");
        form.set_lyrics("changed");
        form.request_save().unwrap();

        assert_eq!(form.resolve(false).unwrap(), Resolution::Declined);
        assert_eq!(form.title(), "Old");
        assert_eq!(form.lyrics(), "old");
        assert_eq!(form.current_edit_id(), Some(id));
        assert_eq!(form.store().get(id).unwrap().unwrap().title, "Old");
    }

    #[test]
    fn delete_without_loaded_song_just_clears() {
        let mut form = form_with(&[("Keep", "a")]);
        form.set_title("typed");
        form.set_lyrics("typed");

        assert!(form.request_delete().is_none());
        assert!(form.title().is_empty());
        assert!(form.lyrics().is_empty());
        assert_eq!(form.store().list().unwrap().len(), 1);
    }

    #[test]
    fn confirmed_delete_removes_the_song() {
        let mut form = form_with(&[("Keep", "a"), ("Gone", "b")]);
        let id = id_of(&form, "Gone");
        form.select(id);

        assert_eq!(form.request_delete(), Some(PendingAction::Delete { id }));
        assert_eq!(form.resolve(true).unwrap(), Resolution::Deleted(id));
        assert!(form.songs().iter().all(|s| s.id != id));
        assert_eq!(form.songs().len(), 1);
    }

    #[test]
    fn declined_delete_reverts_fields() {
        let mut form = form_with(&[("Keep", "a")]);
        let id = id_of(&form, "Keep");
        form.select(id);
        form.set_title("edited");
        form.request_delete();

        assert_eq!(form.resolve(false).unwrap(), Resolution::Declined);
        assert_eq!(form.title(), "Keep");
        assert_eq!(form.songs().len(), 1);
    }

    #[test]
    fn deleting_a_stale_song_surfaces_not_found() {
        let mut form = form_with(&[("Stale", "a")]);
        let id = id_of(&form, "Stale");
        form.select(id);
        form.store().delete(id).unwrap();

        form.request_delete();
        let err = form.resolve(true).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn resolve_without_pending_is_idle() {
        let mut form = form_with(&[]);
        assert_eq!(form.resolve(true).unwrap(), Resolution::Idle);
    }

    #[test]
    fn new_song_discards_edits() {
        let mut form = form_with(&[("Song", "a")]);
        let id = id_of(&form, "Song");
        form.select(id);
        form.set_title("half edited");

        form.new_song();

        assert!(form.current_edit_id().is_none());
        assert!(form.title().is_empty());
        assert!(form.lyrics().is_empty());
    }

    #[test]
    fn basket_keeps_order_and_duplicates() {
        let mut form = form_with(&[("X", "x"), ("Y", "y")]);
        assert!(form.add_to_selection().is_none());

        let x = id_of(&form, "X");
        let y = id_of(&form, "Y");
        form.select(x);
        form.add_to_selection();
        form.select(y);
        form.add_to_selection();
        form.select(x);
        form.add_to_selection();

        let ids: Vec<i64> = form.basket().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![x, y, x]);
    }

    #[test]
    fn generate_with_empty_basket_runs_nothing() {
        let recorder = Recorder::default();
        let generator = DeckGenerator::new(DeckOptions::default(), recorder.clone());
        let mut form = form_with(&[("X", "x")]);

        let err = form.generate(&generator).unwrap_err();

        assert!(matches!(err, Error::Validation(Field::Selection)));
        assert!(recorder.0.borrow().is_empty());
        assert!(!form.is_finished());
    }

    #[test]
    fn generate_requires_a_filename() {
        let recorder = Recorder::default();
        let generator = DeckGenerator::new(DeckOptions::default(), recorder.clone());
        let mut form = form_with(&[("X", "x")]);
        let x = id_of(&form, "X");
        form.select(x);
        form.add_to_selection();
        form.set_filename("   ");

        let err = form.generate(&generator).unwrap_err();

        assert!(matches!(err, Error::Validation(Field::Filename)));
        assert!(recorder.0.borrow().is_empty());
    }

    #[test]
    fn generate_rejects_filenames_with_path_separators() {
        let recorder = Recorder::default();
        let generator = DeckGenerator::new(DeckOptions::default(), recorder.clone());
        let mut form = form_with(&[("X", "x")]);
        let x = id_of(&form, "X");
        form.select(x);
        form.add_to_selection();

        for name in ["../x", "a/b", "a\\b"] {
            form.set_filename(name);
            let err = form.generate(&generator).unwrap_err();
            assert!(matches!(err, Error::Validation(Field::FilenamePath)));
        }
        assert!(recorder.0.borrow().is_empty());
        assert!(!form.is_finished());
    }

    #[test]
    fn failed_script_surfaces_and_leaves_the_form_open() {
        let generator = DeckGenerator::new(DeckOptions::default(), Failing);
        let mut form = form_with(&[("X", "x")]);
        let x = id_of(&form, "X");
        form.select(x);
        form.add_to_selection();

        let err = form.generate(&generator).unwrap_err();

        assert!(matches!(err, Error::ExternalExecution { .. }));
        assert!(!err.is_validation());
        assert!(!form.is_finished());
        assert_eq!(form.basket().len(), 1);
    }

    #[test]
    fn generate_emits_duplicates_in_order_and_finishes() {
        let recorder = Recorder::default();
        let generator = DeckGenerator::new(DeckOptions::default(), recorder.clone());
        let mut form = form_with(&[("X", "x1\n\nx2")]);
        let x = id_of(&form, "X");
        form.select(x);
        form.add_to_selection();
        form.add_to_selection();

        let path = form.generate(&generator).unwrap();

        assert_eq!(path.file_name().unwrap(), "svc1.key");
        assert!(form.is_finished());
        assert_eq!(form.basket().len(), 2);
        let scripts = recorder.0.borrow();
        assert_eq!(scripts.len(), 1);
        assert_eq!(scripts[0].matches("default title item to \"X\"").count(), 2);
        assert_eq!(scripts[0].matches("make new slide").count(), 4);
    }

    #[test]
    fn default_filename_is_a_date_stamp() {
        let name = default_filename();
        assert_eq!(name.len(), 8);
        assert!(name.chars().all(|c| c.is_ascii_digit()));
    }
}
