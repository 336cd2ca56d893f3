use crate::calendar::MonthView;
use crate::clock::Clock;
use crate::editor::{EditorInput, EditorOutput, EditorState, EntryEditor};
use crate::entries::{DateKey, Entry, EntryRepository, RepoError};
use crate::help::Help;
use crate::session::CalendarState;
use crate::theme::{BASE_STYLE, ERROR_STATUS_STYLE, INFO_STATUS_STYLE};
use crossterm::event::{read, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{debug, error, info};
use ratatui::{
    backend::Backend,
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    text::Line,
    widgets::{StatefulWidget, Widget},
    Terminal,
};
use std::io::{self, Write};

pub(crate) struct App<R, C> {
    state: CalendarState,
    repo: R,
    clock: C,
    mode: AppState,
    status: Option<Status>,
}

impl<R: EntryRepository, C: Clock> App<R, C> {
    /// Creates the app and loads the entries visible in `state`'s month
    pub(crate) fn new(state: CalendarState, repo: R, clock: C) -> App<R, C> {
        let mut app = App {
            state,
            repo,
            clock,
            mode: AppState::Calendar,
            status: None,
        };
        app.load_visible();
        app
    }

    pub(crate) fn run<B: Backend>(mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        while !self.quitting() {
            self.check_date();
            self.draw(terminal)?;
            self.handle_input()?;
        }
        info!("event=app_quit entries={}", self.state.entries().len());
        Ok(())
    }

    fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        terminal.draw(|frame| frame.render_widget(self, frame.area()))?;
        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        let normal_modifiers = KeyModifiers::NONE | KeyModifiers::SHIFT;
        if let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = read()?
        {
            if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
                self.mode = AppState::Quitting;
            } else if !normal_modifiers.contains(modifiers) || !self.handle_key(code) {
                self.beep()?;
            }
        }
        // else: Redraw on resize, and we might as well redraw on other stuff
        // too
        Ok(())
    }

    // Returns `false` if the user pressed an invalid key
    fn handle_key(&mut self, key: KeyCode) -> bool {
        match &mut self.mode {
            AppState::Calendar => {
                self.status = None;
                match key {
                    KeyCode::Char('h') | KeyCode::Left => {
                        self.apply(|st| st.with_selection_moved(-1));
                        true
                    }
                    KeyCode::Char('l') | KeyCode::Right => {
                        self.apply(|st| st.with_selection_moved(1));
                        true
                    }
                    KeyCode::Char('k') | KeyCode::Up => {
                        self.apply(|st| st.with_selection_moved(-7));
                        true
                    }
                    KeyCode::Char('j') | KeyCode::Down => {
                        self.apply(|st| st.with_selection_moved(7));
                        true
                    }
                    KeyCode::Char('p') | KeyCode::PageUp => {
                        self.apply(CalendarState::with_previous_month);
                        true
                    }
                    KeyCode::Char('n') | KeyCode::PageDown => {
                        self.apply(CalendarState::with_next_month);
                        true
                    }
                    KeyCode::Char('0') | KeyCode::Home => {
                        self.apply(CalendarState::with_today);
                        true
                    }
                    KeyCode::Char('e') | KeyCode::Enter => {
                        let date = self.state.selected();
                        self.mode = AppState::Editing(EditorState::new(
                            date,
                            self.state.selected_entry(),
                        ));
                        true
                    }
                    KeyCode::Char('q') | KeyCode::Esc => {
                        self.mode = AppState::Quitting;
                        true
                    }
                    KeyCode::Char('?') => {
                        self.mode = AppState::Helping;
                        true
                    }
                    _ => false,
                }
            }
            AppState::Helping => {
                self.mode = AppState::Calendar;
                true
            }
            AppState::Editing(editor) => {
                let input = match key {
                    KeyCode::Char(c) => EditorInput::Char(c),
                    KeyCode::Backspace => EditorInput::Backspace,
                    KeyCode::Delete => EditorInput::ClearField,
                    KeyCode::Tab | KeyCode::BackTab => EditorInput::SwitchField,
                    KeyCode::Enter => EditorInput::Save,
                    KeyCode::Esc => EditorInput::Cancel,
                    _ => return false,
                };
                match editor.handle_input(input) {
                    EditorOutput::Ok => true,
                    EditorOutput::Invalid => false,
                    EditorOutput::Save(entry) => {
                        let date = editor.date();
                        self.mode = AppState::Calendar;
                        self.save_entry(DateKey::from(date), entry);
                        true
                    }
                    EditorOutput::Cancel => {
                        self.mode = AppState::Calendar;
                        true
                    }
                }
            }
            AppState::Quitting => false,
        }
    }

    fn beep(&self) -> io::Result<()> {
        io::stdout().write_all(b"\x07")
    }

    fn quitting(&self) -> bool {
        self.mode == AppState::Quitting
    }

    /// Replaces the state with `f(state)`, reloading entries from the
    /// repository if a different month came into view
    fn apply<F>(&mut self, f: F)
    where
        F: FnOnce(CalendarState) -> CalendarState,
    {
        let before = self.state.cursor();
        self.state = f(std::mem::take(&mut self.state));
        if self.state.cursor() != before {
            self.load_visible();
        }
    }

    fn load_visible(&mut self) {
        let grid = self.state.grid();
        let (first, last) = (grid.first_date(), grid.last_date());
        match self.repo.load_range(first, last) {
            Ok(records) => {
                debug!(
                    "event=entries_load first={} last={} count={}",
                    DateKey::from(first),
                    DateKey::from(last),
                    records.len()
                );
                self.state = std::mem::take(&mut self.state).with_seeded_entries(records);
            }
            Err(e) => self.report("entries_load", String::from("Could not load entries"), e),
        }
    }

    fn save_entry(&mut self, key: DateKey, entry: Entry) {
        if let Err(e) = self.repo.save(key, &entry) {
            self.report("entry_save", format!("Could not save {key}"), e);
        } else {
            info!(
                "event=entry_save key={key} status=ok has_note={} has_photo={}",
                entry.note.is_some(),
                entry.photo.is_some()
            );
            self.status = Some(Status::Info(format!("Saved {key}")));
        }
        // The session keeps the edit even if it could not be persisted
        self.apply(|st| st.with_upserted_entry(key, entry));
    }

    /// Logs a repository failure and shows it on the status line
    fn report(&mut self, event: &str, summary: String, e: RepoError) {
        let e = anyhow::Error::from(e);
        error!("event={event} status=error error={e:#}");
        self.status = Some(Status::Error(format!("{summary}: {e:#}")));
    }

    fn check_date(&mut self) {
        let today = self.clock.today();
        if today != self.state.today() {
            info!("event=date_change today={}", DateKey::from(today));
            self.apply(|st| st.with_today_as(today));
        }
    }
}

impl<R: EntryRepository, C: Clock> Widget for &mut App<R, C> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, BASE_STYLE);
        let view = MonthView::new(&self.state);
        let [cal_area, status_area] =
            Layout::vertical([Constraint::Length(view.height()), Constraint::Length(1)])
                .flex(Flex::Center)
                .areas(area);
        view.render(cal_area, buf);
        if let Some(status) = &self.status {
            let line = match status {
                Status::Info(msg) => Line::styled(msg.as_str(), INFO_STATUS_STYLE),
                Status::Error(msg) => Line::styled(msg.as_str(), ERROR_STATUS_STYLE),
            };
            line.centered().render(status_area, buf);
        }
        match &mut self.mode {
            AppState::Helping => Help(BASE_STYLE).render(area, buf),
            AppState::Editing(editor) => EntryEditor.render(area, buf, editor),
            AppState::Calendar | AppState::Quitting => (),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum AppState {
    Calendar,
    Helping,
    Editing(EditorState),
    Quitting,
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum Status {
    Info(String),
    Error(String),
}
