//! Quiz session state machine.
//!
//! `Idle -> Loading -> InProgress -> Complete`, driven by `select_source`,
//! `advance` and `submit_answer`. The controller owns the store handle and
//! the RNG so it can be driven headlessly with a seeded generator.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::db::Database;
use crate::error::{QuizError, Result};
use crate::ingest::{self, table_name_for};
use crate::models::{Letter, OptionClass, QuestionRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    Idle,
    Loading,
    InProgress,
    Complete,
}

impl SessionState {
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Idle => "Idle",
            SessionState::Loading => "Loading",
            SessionState::InProgress => "In progress",
            SessionState::Complete => "Complete",
        }
    }
}

/// What the presentation layer renders for the active question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prompt {
    pub number: usize,
    pub total: usize,
    pub source: String,
    pub question: String,
    /// Options in display order.
    pub options: [(Letter, String); 4],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub source_name: String,
    pub table: String,
    pub score: u32,
    pub total: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SessionSummary {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.score as f64 / self.total as f64) * 100.0
        }
    }

    pub fn elapsed_label(&self) -> String {
        let secs = (self.finished_at - self.started_at).num_seconds().max(0);
        format!("{}m {:02}s", secs / 60, secs % 60)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Question(Prompt),
    Complete(SessionSummary),
    /// No session to advance; benign when it comes from a repeated key press.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    Started(Advance),
    /// The source produced no questions; nothing changed.
    Empty { source: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerFeedback {
    /// One entry per option, in display order.
    pub classes: [OptionClass; 4],
    pub is_correct: bool,
    pub correct_text: String,
    pub score: u32,
}

pub struct QuizSession<R = StdRng> {
    db: Database,
    sources_dir: PathBuf,
    rng: R,
    state: SessionState,
    questions: Vec<QuestionRecord>,
    current_index: isize,
    score: u32,
    current: Option<Prompt>,
    source_name: Option<String>,
    table: Option<String>,
    started_at: Option<DateTime<Utc>>,
}

impl QuizSession<StdRng> {
    pub fn new(db: Database, sources_dir: impl Into<PathBuf>) -> Self {
        Self::with_rng(db, sources_dir, StdRng::from_entropy())
    }
}

impl<R> QuizSession<R> {
    pub fn with_rng(db: Database, sources_dir: impl Into<PathBuf>, rng: R) -> Self {
        Self {
            db,
            sources_dir: sources_dir.into(),
            rng,
            state: SessionState::Idle,
            questions: Vec::new(),
            current_index: -1,
            score: 0,
            current: None,
            source_name: None,
            table: None,
            started_at: None,
        }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn sources_dir(&self) -> &Path {
        &self.sources_dir
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// -1 before the first question, `total()` once complete.
    pub fn current_index(&self) -> isize {
        self.current_index
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn current_prompt(&self) -> Option<&Prompt> {
        self.current.as_ref()
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }
}

impl<R: Rng> QuizSession<R> {
    /// Loads a source file's questions and starts a session on them,
    /// ingesting the file first if its table does not exist yet.
    pub fn select_source(&mut self, name: &str) -> Result<SelectOutcome> {
        if matches!(self.state, SessionState::Loading | SessionState::InProgress) {
            return Err(QuizError::SessionActive);
        }

        let table = table_name_for(name);
        if !self.db.table_exists(&table)? {
            let path = self.sources_dir.join(name);
            ingest::ingest(&self.db, &path, &table)?;
        }

        let mut questions = self.db.load_questions(&table)?;
        if questions.is_empty() {
            tracing::warn!(source = name, table = %table, "no questions found in source");
            return Ok(SelectOutcome::Empty {
                source: name.to_string(),
            });
        }

        questions.shuffle(&mut self.rng);
        tracing::info!(source = name, questions = questions.len(), "starting quiz session");

        self.questions = questions;
        self.score = 0;
        self.current_index = -1;
        self.current = None;
        self.source_name = Some(name.to_string());
        self.table = Some(table);
        self.started_at = Some(Utc::now());
        self.state = SessionState::Loading;

        Ok(SelectOutcome::Started(self.advance()))
    }

    /// Moves to the next question, or completes the session after the last.
    pub fn advance(&mut self) -> Advance {
        if !matches!(self.state, SessionState::Loading | SessionState::InProgress) {
            return Advance::Ignored;
        }

        self.current_index += 1;
        let index = self.current_index as usize;

        let record = match self.questions.get(index) {
            Some(record) => record,
            None => {
                self.current_index = self.questions.len() as isize;
                self.current = None;
                self.state = SessionState::Complete;
                let summary = self.summary();
                tracing::info!(
                    source = %summary.source_name,
                    score = summary.score,
                    total = summary.total,
                    "quiz session complete"
                );
                return Advance::Complete(summary);
            }
        };

        // Fresh option order for every question
        let mut options = record.options();
        options.shuffle(&mut self.rng);

        let prompt = Prompt {
            number: index + 1,
            total: self.questions.len(),
            source: record.source.clone(),
            question: record.question.clone(),
            options,
        };
        tracing::debug!(number = prompt.number, id = record.id, "advanced to question");

        self.current = Some(prompt.clone());
        self.state = SessionState::InProgress;
        Advance::Question(prompt)
    }

    /// Checks the selected option text against the active question.
    ///
    /// Matching is by text, so option texts must be unique within a question.
    /// Returns `None` when no question is active.
    pub fn submit_answer(&mut self, selected_text: &str) -> Option<AnswerFeedback> {
        if self.state != SessionState::InProgress {
            return None;
        }
        let prompt = self.current.as_ref()?;
        let record = self.questions.get(usize::try_from(self.current_index).ok()?)?;

        let correct_text = prompt
            .options
            .iter()
            .find(|(letter, _)| *letter == record.correct)
            .map(|(_, text)| text.clone())?;
        let is_correct = selected_text == correct_text;

        let mut classes = [OptionClass::Neutral; 4];
        for (class, (_, text)) in classes.iter_mut().zip(prompt.options.iter()) {
            if *text == correct_text {
                *class = OptionClass::Correct;
            } else if text == selected_text && !is_correct {
                *class = OptionClass::WrongSelected;
            }
        }

        if is_correct {
            self.score += 1;
        }
        tracing::debug!(is_correct, score = self.score, "answer submitted");

        Some(AnswerFeedback {
            classes,
            is_correct,
            correct_text,
            score: self.score,
        })
    }

    /// Abandons the current session.
    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.questions.clear();
        self.current_index = -1;
        self.score = 0;
        self.current = None;
        self.source_name = None;
        self.table = None;
        self.started_at = None;
    }

    fn summary(&self) -> SessionSummary {
        let finished_at = Utc::now();
        SessionSummary {
            source_name: self.source_name.clone().unwrap_or_default(),
            table: self.table.clone().unwrap_or_default(),
            score: self.score,
            total: self.questions.len(),
            started_at: self.started_at.unwrap_or(finished_at),
            finished_at,
        }
    }
}
