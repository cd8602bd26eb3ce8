use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use open::that as open_path;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use tracing::{info, warn};

use crate::deck::DeckGenerator;
use crate::error::Error;
use crate::form::{PendingAction, Resolution, SelectionForm};

use super::helpers::{centered_rect, edit_text, pane_block};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows skipped by PageUp / PageDown in the song list.
const PAGE_STEP: isize = 5;

/// Pane receiving plain key presses.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Focus {
    Search,
    List,
    Title,
    Lyrics,
    Filename,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Search => Focus::List,
            Focus::List => Focus::Title,
            Focus::Title => Focus::Lyrics,
            Focus::Lyrics => Focus::Filename,
            Focus::Filename => Focus::Search,
        }
    }

    fn previous(self) -> Self {
        match self {
            Focus::Search => Focus::Filename,
            Focus::List => Focus::Search,
            Focus::Title => Focus::List,
            Focus::Lyrics => Focus::Title,
            Focus::Filename => Focus::Lyrics,
        }
    }
}

/// Modal overlays.
enum Mode {
    Normal,
    Confirm(PendingAction),
    Alert(String),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Terminal front end over [`SelectionForm`].
pub struct App {
    form: SelectionForm,
    generator: DeckGenerator,
    reveal_output: bool,
    focus: Focus,
    /// Highlighted row within the visible (filtered) list.
    highlighted: Option<usize>,
    mode: Mode,
    status: Option<StatusMessage>,
    exit: bool,
}

impl App {
    pub fn new(form: SelectionForm, generator: DeckGenerator) -> Self {
        Self {
            form,
            generator,
            reveal_output: false,
            focus: Focus::Search,
            highlighted: None,
            mode: Mode::Normal,
            status: None,
            exit: false,
        }
    }

    /// Open the saved document with the system handler after generation.
    pub fn reveal_output(mut self, reveal: bool) -> Self {
        self.reveal_output = reveal;
        self
    }

    pub fn form(&self) -> &SelectionForm {
        &self.form
    }

    pub fn should_exit(&self) -> bool {
        self.exit
    }

    /// Feed a plain key press. Returns `true` once the application should
    /// close.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code)?,
            Mode::Confirm(action) => self.handle_confirm(code, action)?,
            Mode::Alert(message) => match code {
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => Mode::Normal,
                _ => Mode::Alert(message),
            },
        };

        Ok(self.exit)
    }

    /// Control-key shortcuts, available from every pane. Quitting works even
    /// while a popup is open.
    pub fn handle_ctrl(&mut self, ch: char) -> Result<bool> {
        if matches!(ch, 'q' | 'c') {
            self.exit = true;
            return Ok(self.exit);
        }
        if !matches!(self.mode, Mode::Normal) {
            return Ok(self.exit);
        }

        self.mode = match ch {
            's' => self.save()?,
            'd' => self.delete(),
            'n' => {
                self.form.new_song();
                self.highlighted = None;
                self.focus = Focus::Title;
                self.set_status("New song.", StatusKind::Info);
                Mode::Normal
            }
            'a' => {
                self.add_to_selection();
                Mode::Normal
            }
            'g' => self.generate()?,
            _ => Mode::Normal,
        };

        Ok(self.exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.exit = true;
                return Ok(Mode::Normal);
            }
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return Ok(Mode::Normal);
            }
            KeyCode::BackTab => {
                self.focus = self.focus.previous();
                return Ok(Mode::Normal);
            }
            _ => {}
        }

        match self.focus {
            Focus::Search => match code {
                KeyCode::Enter | KeyCode::Down => self.focus = Focus::List,
                _ => {
                    if edit_text(self.form.search_mut(), code, false) {
                        self.highlighted = None;
                    }
                }
            },
            Focus::List => match code {
                KeyCode::Up => self.move_highlight(-1),
                KeyCode::Down => self.move_highlight(1),
                KeyCode::PageUp => self.move_highlight(-PAGE_STEP),
                KeyCode::PageDown => self.move_highlight(PAGE_STEP),
                KeyCode::Home => self.highlight(0),
                KeyCode::End => {
                    let len = self.form.visible_songs().len();
                    if len > 0 {
                        self.highlight(len - 1);
                    }
                }
                KeyCode::Enter => {
                    self.load_highlighted();
                    self.add_to_selection();
                }
                KeyCode::Right => self.add_to_selection(),
                _ => {}
            },
            Focus::Title => {
                if code == KeyCode::Enter {
                    self.focus = Focus::Lyrics;
                } else {
                    edit_text(self.form.title_mut(), code, false);
                }
            }
            Focus::Lyrics => {
                edit_text(self.form.lyrics_mut(), code, true);
            }
            Focus::Filename => {
                if code == KeyCode::Enter {
                    return self.generate();
                }
                edit_text(self.form.filename_mut(), code, false);
            }
        }

        Ok(Mode::Normal)
    }

    fn handle_confirm(&mut self, code: KeyCode, action: PendingAction) -> Result<Mode> {
        let confirmed = match code {
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => true,
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => false,
            _ => return Ok(Mode::Confirm(action)),
        };

        match self.form.resolve(confirmed)? {
            Resolution::Inserted(song) => {
                self.highlighted = None;
                self.set_status(format!("Added {}.", song.display_title()), StatusKind::Info);
            }
            Resolution::Updated(_) => {
                self.highlighted = None;
                self.set_status("Song updated.", StatusKind::Info);
            }
            Resolution::Deleted(_) => {
                self.highlighted = None;
                self.set_status("Song deleted.", StatusKind::Info);
            }
            Resolution::Declined => self.set_status("Cancelled.", StatusKind::Info),
            Resolution::Idle => {}
        }
        Ok(Mode::Normal)
    }

    fn save(&mut self) -> Result<Mode> {
        match self.form.request_save() {
            Ok(action) => Ok(Mode::Confirm(action)),
            Err(err) => self.alert_or_fail(err),
        }
    }

    fn delete(&mut self) -> Mode {
        match self.form.request_delete() {
            Some(action) => Mode::Confirm(action),
            None => {
                self.clear_status();
                Mode::Normal
            }
        }
    }

    fn add_to_selection(&mut self) {
        let added = self.form.add_to_selection().map(|song| song.display_title());
        match added {
            Some(title) => self.set_status(format!("Added {title} to the deck."), StatusKind::Info),
            None => self.set_status("No song loaded.", StatusKind::Error),
        }
    }

    fn generate(&mut self) -> Result<Mode> {
        match self.form.generate(&self.generator) {
            Ok(path) => {
                if self.reveal_output {
                    if let Err(err) = open_path(&path) {
                        warn!(%err, path = %path.display(), "could not open generated deck");
                    }
                }
                info!(path = %path.display(), "closing after generation");
                self.exit = true;
                Ok(Mode::Normal)
            }
            Err(err) => self.alert_or_fail(err),
        }
    }

    /// Validation problems become a modal alert; anything else ends the run.
    fn alert_or_fail(&mut self, err: Error) -> Result<Mode> {
        if err.is_validation() {
            self.set_status(err.to_string(), StatusKind::Error);
            Ok(Mode::Alert(err.to_string()))
        } else {
            Err(err.into())
        }
    }

    fn move_highlight(&mut self, offset: isize) {
        let len = self.form.visible_songs().len();
        if len == 0 {
            return;
        }
        let target = match self.highlighted {
            None if offset >= 0 => 0,
            None => len - 1,
            Some(current) => (current as isize + offset).clamp(0, len as isize - 1) as usize,
        };
        self.highlight(target);
    }

    /// Highlighting a row loads it into the editor.
    fn highlight(&mut self, index: usize) {
        self.highlighted = Some(index);
        self.load_highlighted();
    }

    fn load_highlighted(&mut self) {
        let id = self
            .highlighted
            .and_then(|idx| self.form.visible_songs().get(idx).map(|song| song.id));
        if let Some(id) = id {
            self.form.select(id);
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(30),
                Constraint::Percentage(45),
                Constraint::Percentage(25),
            ])
            .split(content_area);

        self.draw_library(frame, columns[0]);
        self.draw_editor(frame, columns[1]);
        self.draw_selection(frame, columns[2]);
        self.draw_footer(frame, footer_area);

        match &self.mode {
            Mode::Confirm(action) => self.draw_confirm(frame, area, *action),
            Mode::Alert(message) => self.draw_alert(frame, area, message),
            Mode::Normal => {}
        }
    }

    fn draw_library(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let search_block = pane_block("Search (Title/Lyrics)", self.focus == Focus::Search);
        let search = Paragraph::new(self.form.search().to_string()).block(search_block);
        frame.render_widget(search, chunks[0]);

        let items: Vec<ListItem> = self
            .form
            .visible_songs()
            .into_iter()
            .map(|song| ListItem::new(song.display_title()))
            .collect();
        let list = List::new(items)
            .block(pane_block("Songs (Enter adds to deck)", self.focus == Focus::List))
            .highlight_style(
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        let mut state = ListState::default().with_selected(self.highlighted);
        frame.render_stateful_widget(list, chunks[1], &mut state);

        if self.focus == Focus::Search && matches!(self.mode, Mode::Normal) {
            let x = chunks[0].x + 1 + self.form.search().chars().count() as u16;
            frame.set_cursor_position((x.min(chunks[0].right().saturating_sub(2)), chunks[0].y + 1));
        }
    }

    fn draw_editor(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let heading = match self.form.loaded() {
            Some(song) => format!("Title (editing #{})", song.id),
            None => "Title (new song)".to_string(),
        };
        let title = Paragraph::new(self.form.title().to_string())
            .block(pane_block(&heading, self.focus == Focus::Title));
        frame.render_widget(title, chunks[0]);

        let lyrics_block = pane_block(
            "Lyrics (separate sections with empty lines)",
            self.focus == Focus::Lyrics,
        );
        let lyrics = Paragraph::new(self.form.lyrics().to_string())
            .block(lyrics_block)
            .wrap(Wrap { trim: false });
        frame.render_widget(lyrics, chunks[1]);

        if !matches!(self.mode, Mode::Normal) {
            return;
        }
        match self.focus {
            Focus::Title => {
                let x = chunks[0].x + 1 + self.form.title().chars().count() as u16;
                frame.set_cursor_position((
                    x.min(chunks[0].right().saturating_sub(2)),
                    chunks[0].y + 1,
                ));
            }
            Focus::Lyrics => {
                let lyrics = self.form.lyrics();
                let row = lyrics.matches('\n').count() as u16;
                let col = lyrics.rsplit('\n').next().unwrap_or("").chars().count() as u16;
                let inner = chunks[1];
                frame.set_cursor_position((
                    (inner.x + 1 + col).min(inner.right().saturating_sub(2)),
                    (inner.y + 1 + row).min(inner.bottom().saturating_sub(2)),
                ));
            }
            _ => {}
        }
    }

    fn draw_selection(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let filename = Paragraph::new(self.form.filename().to_string())
            .block(pane_block("Filename", self.focus == Focus::Filename));
        frame.render_widget(filename, chunks[0]);

        let lines: Vec<Line> = self
            .form
            .basket()
            .iter()
            .enumerate()
            .map(|(idx, song)| Line::from(format!("{:>2}. {}", idx + 1, song.display_title())))
            .collect();
        let selected = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Selected ({})", self.form.basket().len())),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(selected, chunks[1]);

        if self.focus == Focus::Filename && matches!(self.mode, Mode::Normal) {
            let x = chunks[0].x + 1 + self.form.filename().chars().count() as u16;
            frame.set_cursor_position((x.min(chunks[0].right().saturating_sub(2)), chunks[0].y + 1));
        }
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph =
            Paragraph::new(vec![status_line, self.footer_instructions()]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let pairs: &[(&str, &str)] = match self.mode {
            Mode::Confirm(_) => &[("[Y]", " Confirm   "), ("[N/Esc]", " Cancel")],
            Mode::Alert(_) => &[("[Enter]", " Dismiss")],
            Mode::Normal => &[
                ("[Tab]", " Next pane   "),
                ("[^S]", " Save   "),
                ("[^D]", " Delete   "),
                ("[^N]", " New   "),
                ("[^A/→]", " Add to deck   "),
                ("[^G]", " Generate   "),
                ("[Esc]", " Quit"),
            ],
        };

        let spans: Vec<Span<'static>> = pairs
            .iter()
            .flat_map(|(key, label)| {
                [
                    Span::styled(key.to_string(), key_style),
                    Span::raw(label.to_string()),
                ]
            })
            .collect();
        Line::from(spans)
    }

    fn draw_confirm(&self, frame: &mut Frame, area: Rect, action: PendingAction) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Confirmation").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(action.prompt()),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_alert(&self, frame: &mut Frame, area: Rect, message: &str) {
        let popup_area = centered_rect(50, 25, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Error")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red));
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(Span::styled(
                message.to_string(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press Enter to dismiss.",
                Style::default().fg(Color::Gray),
            )),
        ];
        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }
}
