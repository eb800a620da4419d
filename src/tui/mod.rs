mod ui;
mod widgets;

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use rand::Rng;
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::error::QuizError;
use crate::models::{SourceFile, TableSummary};
use crate::session::{Advance, AnswerFeedback, QuizSession, SelectOutcome, SessionState, SessionSummary};
use crate::sources::list_sources;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Sources,
    Quiz,
    Bank,
}

impl View {
    fn next(&self) -> Self {
        match self {
            View::Sources => View::Quiz,
            View::Quiz => View::Bank,
            View::Bank => View::Sources,
        }
    }

    fn prev(&self) -> Self {
        match self {
            View::Sources => View::Bank,
            View::Quiz => View::Sources,
            View::Bank => View::Quiz,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupKind {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
    pub kind: PopupKind,
    pub title: String,
    pub message: String,
}

pub struct StatefulList<T> {
    pub items: Vec<T>,
    pub selected: Option<usize>,
}

impl<T> StatefulList<T> {
    fn with_items(items: Vec<T>) -> Self {
        let selected = if items.is_empty() { None } else { Some(0) };
        Self { items, selected }
    }

    fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(i) if i + 1 < self.items.len() => i + 1,
            _ => 0,
        };
        self.selected = Some(i);
    }

    fn previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(0) | None => self.items.len() - 1,
            Some(i) => i - 1,
        };
        self.selected = Some(i);
    }

    fn selected_item(&self) -> Option<&T> {
        self.selected.and_then(|i| self.items.get(i))
    }
}

pub struct App<R> {
    pub session: QuizSession<R>,
    pub view: View,
    pub sources: StatefulList<SourceFile>,
    pub tables: Vec<TableSummary>,
    // Highlighted option in the quiz view
    pub cursor: usize,
    pub feedback: Option<AnswerFeedback>,
    pub last_summary: Option<SessionSummary>,
    pub popup: Option<Popup>,
    pub should_quit: bool,
}

impl<R> App<R> {
    pub fn question_count(&self, table: &str) -> Option<i64> {
        self.tables
            .iter()
            .find(|t| t.name == table)
            .map(|t| t.question_count)
    }
}

impl<R: Rng> App<R> {
    pub fn new(session: QuizSession<R>) -> Result<Self, QuizError> {
        let mut app = Self {
            session,
            view: View::Sources,
            sources: StatefulList::with_items(Vec::new()),
            tables: Vec::new(),
            cursor: 0,
            feedback: None,
            last_summary: None,
            popup: None,
            should_quit: false,
        };
        app.refresh_data()?;
        Ok(app)
    }

    pub fn refresh_data(&mut self) -> Result<(), QuizError> {
        let selected = self.sources.selected;
        self.sources = StatefulList::with_items(list_sources(self.session.sources_dir())?);
        if let Some(i) = selected {
            if i < self.sources.items.len() {
                self.sources.selected = Some(i);
            }
        }
        self.tables = self.session.db().list_tables()?;
        Ok(())
    }

    /// Starts `file_name` if it is among the listed sources.
    pub fn preselect(&mut self, file_name: &str) {
        if let Some(i) = self.sources.items.iter().position(|s| s.file_name == file_name) {
            self.sources.selected = Some(i);
            self.start_selected();
        }
    }

    fn show(&mut self, kind: PopupKind, title: &str, message: impl Into<String>) {
        self.popup = Some(Popup {
            kind,
            title: title.to_string(),
            message: message.into(),
        });
    }

    fn start_selected(&mut self) {
        let name = match self.sources.selected_item() {
            Some(source) => source.file_name.clone(),
            None => return,
        };

        match self.session.select_source(&name) {
            Ok(SelectOutcome::Started(advance)) => {
                self.last_summary = None;
                self.view = View::Quiz;
                self.apply_advance(advance);
            }
            Ok(SelectOutcome::Empty { source }) => {
                self.show(
                    PopupKind::Warning,
                    "Warning",
                    format!("No questions found in {}.", source),
                );
            }
            Err(e) => self.show(PopupKind::Error, "Error", e.to_string()),
        }

        // A first selection may have ingested a new table
        if let Err(e) = self.refresh_data() {
            self.show(PopupKind::Error, "Error", e.to_string());
        }
    }

    fn apply_advance(&mut self, advance: Advance) {
        self.cursor = 0;
        self.feedback = None;
        if let Advance::Complete(summary) = advance {
            self.show(
                PopupKind::Info,
                "Complete",
                format!(
                    "You finished all the questions!\nScore: {}/{}",
                    summary.score, summary.total
                ),
            );
            self.last_summary = Some(summary);
        }
    }

    fn answer(&mut self, index: usize) {
        // One answer per question on screen
        if self.feedback.is_some() {
            return;
        }
        let text = match self
            .session
            .current_prompt()
            .and_then(|p| p.options.get(index))
        {
            Some((_, text)) => text.clone(),
            None => return,
        };
        self.cursor = index;
        self.feedback = self.session.submit_answer(&text);
    }

    fn abandon(&mut self) {
        if self.session.state() == SessionState::InProgress {
            self.session.reset();
            self.feedback = None;
            self.cursor = 0;
            self.view = View::Sources;
        }
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Any key dismisses a popup
        if self.popup.is_some() {
            self.popup = None;
            return;
        }

        match key {
            KeyCode::Char('q') => self.should_quit = true,

            KeyCode::Char('r') if modifiers.contains(KeyModifiers::CONTROL) => {
                if let Err(e) = self.refresh_data() {
                    self.show(PopupKind::Error, "Error", e.to_string());
                }
            }

            KeyCode::Tab => self.view = self.view.next(),
            KeyCode::BackTab => self.view = self.view.prev(),
            KeyCode::Char('h') | KeyCode::Left => self.view = self.view.prev(),
            KeyCode::Char('l') | KeyCode::Right => self.view = self.view.next(),

            _ => match self.view {
                View::Sources => self.handle_sources_key(key),
                View::Quiz => self.handle_quiz_key(key),
                View::Bank => {}
            },
        }
    }

    fn handle_sources_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('j') | KeyCode::Down => self.sources.next(),
            KeyCode::Char('k') | KeyCode::Up => self.sources.previous(),
            KeyCode::Char('g') if !self.sources.items.is_empty() => {
                self.sources.selected = Some(0);
            }
            KeyCode::Char('G') if !self.sources.items.is_empty() => {
                self.sources.selected = Some(self.sources.items.len() - 1);
            }
            KeyCode::Enter => {
                if self.session.state() == SessionState::InProgress {
                    self.view = View::Quiz;
                } else {
                    self.start_selected();
                }
            }
            _ => {}
        }
    }

    fn handle_quiz_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('j') | KeyCode::Down => self.cursor = (self.cursor + 1) % 4,
            KeyCode::Char('k') | KeyCode::Up => self.cursor = (self.cursor + 3) % 4,
            KeyCode::Enter | KeyCode::Char(' ') => self.answer(self.cursor),
            KeyCode::Char(c @ '1'..='4') => self.answer(c as usize - '1' as usize),
            KeyCode::Char('n') => {
                let advance = self.session.advance();
                if advance != Advance::Ignored {
                    self.apply_advance(advance);
                }
            }
            KeyCode::Char('x') => self.abandon(),
            _ => {}
        }
    }
}

pub fn run<R: Rng>(session: QuizSession<R>, default_source: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::new(session)?;
    if let Some(name) = default_source {
        app.preselect(name);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app<R: Rng>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<R>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code, key.modifiers);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::OptionClass;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::fs;
    use tempfile::TempDir;

    const BANK: &str = "(Cloud)(What is IaaS?)(A)(Infra as a Service)(B)(Platform)(C)(Software)(D)(None)(A)\n\
                        (Cloud)(What is SaaS?)(A)(Hardware)(B)(Software as a Service)(C)(Storage)(D)(Servers)(B)\n";

    fn setup_app() -> (App<StdRng>, TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("cloud.txt"), BANK).unwrap();
        fs::write(tmp.path().join("empty.txt"), "").unwrap();
        let db = Database::open(":memory:").unwrap();
        let session = QuizSession::with_rng(db, tmp.path(), StdRng::seed_from_u64(1));
        (App::new(session).unwrap(), tmp)
    }

    fn press(app: &mut App<StdRng>, key: KeyCode) {
        app.handle_key(key, KeyModifiers::NONE);
    }

    mod list_tests {
        use super::*;

        #[test]
        fn next_wraps_around() {
            let mut list = StatefulList::with_items(vec![1, 2, 3]);
            list.next();
            list.next();
            list.next();
            assert_eq!(list.selected, Some(0));
        }

        #[test]
        fn previous_wraps_around() {
            let mut list = StatefulList::with_items(vec![1, 2, 3]);
            list.previous();
            assert_eq!(list.selected, Some(2));
            assert_eq!(list.selected_item(), Some(&3));
        }

        #[test]
        fn empty_list_has_no_selection() {
            let mut list: StatefulList<i32> = StatefulList::with_items(vec![]);
            list.next();
            assert!(list.selected_item().is_none());
        }
    }

    mod app_tests {
        use super::*;

        #[test]
        fn lists_sources_on_start() {
            let (app, _tmp) = setup_app();
            let names: Vec<&str> = app.sources.items.iter().map(|s| s.file_name.as_str()).collect();
            assert_eq!(names, vec!["cloud.txt", "empty.txt"]);
            assert!(app.tables.is_empty());
        }

        #[test]
        fn enter_starts_selected_source() {
            let (mut app, _tmp) = setup_app();
            press(&mut app, KeyCode::Enter);

            assert_eq!(app.view, View::Quiz);
            assert_eq!(app.session.state(), SessionState::InProgress);
            assert_eq!(app.question_count("cloud"), Some(2));
        }

        #[test]
        fn empty_source_shows_warning() {
            let (mut app, _tmp) = setup_app();
            press(&mut app, KeyCode::Char('j'));
            press(&mut app, KeyCode::Enter);

            let popup = app.popup.clone().expect("warning expected");
            assert_eq!(popup.kind, PopupKind::Warning);
            assert!(popup.message.contains("empty.txt"));
            assert_eq!(app.view, View::Sources);
            assert_eq!(app.session.state(), SessionState::Idle);

            // Any key closes it
            press(&mut app, KeyCode::Char('x'));
            assert!(app.popup.is_none());
        }

        #[test]
        fn preselect_starts_default_source() {
            let (mut app, _tmp) = setup_app();
            app.preselect("cloud.txt");
            assert_eq!(app.session.state(), SessionState::InProgress);

            let (mut other, _tmp2) = setup_app();
            other.preselect("questions.txt");
            assert_eq!(other.session.state(), SessionState::Idle);
        }

        #[test]
        fn number_key_answers_once() {
            let (mut app, _tmp) = setup_app();
            press(&mut app, KeyCode::Enter);
            press(&mut app, KeyCode::Char('2'));

            let feedback = app.feedback.clone().expect("feedback expected");
            assert_eq!(app.cursor, 1);
            let score = app.session.score();

            press(&mut app, KeyCode::Char('2'));
            assert_eq!(app.session.score(), score);
            assert_eq!(app.feedback, Some(feedback));
        }

        #[test]
        fn answering_correct_option_scores() {
            let (mut app, _tmp) = setup_app();
            press(&mut app, KeyCode::Enter);

            let prompt = app.session.current_prompt().unwrap().clone();
            let correct = if prompt.question == "What is IaaS?" {
                "Infra as a Service"
            } else {
                "Software as a Service"
            };
            let index = prompt.options.iter().position(|(_, t)| t == correct).unwrap();
            app.cursor = index;
            press(&mut app, KeyCode::Enter);

            let feedback = app.feedback.clone().unwrap();
            assert!(feedback.is_correct);
            assert_eq!(feedback.classes[index], OptionClass::Correct);
            assert_eq!(app.session.score(), 1);
        }

        #[test]
        fn next_clears_feedback_and_completes() {
            let (mut app, _tmp) = setup_app();
            press(&mut app, KeyCode::Enter);
            press(&mut app, KeyCode::Char('1'));
            press(&mut app, KeyCode::Char('n'));
            assert!(app.feedback.is_none());
            assert_eq!(app.session.current_index(), 1);

            press(&mut app, KeyCode::Char('n'));
            assert_eq!(app.session.state(), SessionState::Complete);
            assert_eq!(app.popup.as_ref().map(|p| p.kind), Some(PopupKind::Info));
            assert_eq!(app.last_summary.as_ref().map(|s| s.total), Some(2));
        }

        #[test]
        fn abandon_returns_to_sources() {
            let (mut app, _tmp) = setup_app();
            press(&mut app, KeyCode::Enter);
            press(&mut app, KeyCode::Char('x'));

            assert_eq!(app.view, View::Sources);
            assert_eq!(app.session.state(), SessionState::Idle);
        }

        #[test]
        fn missing_source_shows_error() {
            let (mut app, tmp) = setup_app();
            fs::remove_file(tmp.path().join("cloud.txt")).unwrap();
            press(&mut app, KeyCode::Enter);

            assert_eq!(app.popup.as_ref().map(|p| p.kind), Some(PopupKind::Error));
            assert_eq!(app.session.state(), SessionState::Idle);
        }

        #[test]
        fn refresh_failure_shows_error_and_keeps_running() {
            let (mut app, tmp) = setup_app();
            fs::remove_dir_all(tmp.path()).unwrap();
            fs::write(tmp.path(), "").unwrap();

            app.handle_key(KeyCode::Char('r'), KeyModifiers::CONTROL);

            assert_eq!(app.popup.as_ref().map(|p| p.kind), Some(PopupKind::Error));
            assert!(!app.should_quit);
        }

        #[test]
        fn view_navigation_cycles() {
            let (mut app, _tmp) = setup_app();
            press(&mut app, KeyCode::Tab);
            assert_eq!(app.view, View::Quiz);
            press(&mut app, KeyCode::Char('l'));
            assert_eq!(app.view, View::Bank);
            press(&mut app, KeyCode::Char('l'));
            assert_eq!(app.view, View::Sources);
            press(&mut app, KeyCode::Char('h'));
            assert_eq!(app.view, View::Bank);
        }

        #[test]
        fn q_quits() {
            let (mut app, _tmp) = setup_app();
            press(&mut app, KeyCode::Char('q'));
            assert!(app.should_quit);
        }
    }
}
