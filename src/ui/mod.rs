//! Ratatui front end: a three-pane screen (library, editor, deck selection)
//! over [`crate::form::SelectionForm`].

mod app;
mod helpers;
mod terminal;

pub use app::App;
pub use terminal::run_app;
