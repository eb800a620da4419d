use rusqlite::{params, Connection, OptionalExtension, Result, Transaction};
use std::path::Path;

use crate::models::{Letter, QuestionRecord, TableSummary};
use crate::parser::ParsedTuple;

pub struct Database {
    conn: Connection,
}

// Identifiers are sanitized before they get here, but quote them regardless
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Batches writes into one transaction; dropping it uncommitted rolls back.
    pub fn transaction(&self) -> Result<Transaction<'_>> {
        self.conn.unchecked_transaction()
    }

    #[cfg(test)]
    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn table_exists(&self, table: &str) -> Result<bool> {
        let found: Option<String> = self
            .conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![table],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    // One table per source file
    pub fn create_question_table(&self, table: &str) -> Result<()> {
        self.conn.execute_batch(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                source TEXT,
                question TEXT UNIQUE,
                A TEXT,
                B TEXT,
                C TEXT,
                D TEXT,
                correct TEXT
            );
            "#,
            quote_ident(table)
        ))
    }

    /// Inserts a question unless one with the same text already exists.
    /// Returns whether a row was written.
    pub fn insert_question(&self, table: &str, tuple: &ParsedTuple) -> Result<bool> {
        let changed = self.conn.execute(
            &format!(
                "INSERT OR IGNORE INTO {} (source, question, A, B, C, D, correct) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                quote_ident(table)
            ),
            params![
                tuple.source,
                tuple.question,
                tuple.option_a,
                tuple.option_b,
                tuple.option_c,
                tuple.option_d,
                tuple.correct.as_str()
            ],
        )?;
        Ok(changed > 0)
    }

    pub fn load_questions(&self, table: &str) -> Result<Vec<QuestionRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, source, question, A, B, C, D, correct FROM {} ORDER BY id",
            quote_ident(table)
        ))?;

        let rows = stmt.query_map([], |row| {
            let correct_str: Option<String> = row.get(7)?;
            Ok((
                QuestionRecord {
                    id: row.get(0)?,
                    source: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    question: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    option_a: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                    option_b: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                    option_c: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
                    option_d: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
                    correct: Letter::A,
                },
                correct_str,
            ))
        })?;

        let mut questions = Vec::new();
        for row in rows {
            let (mut record, correct_str) = row?;
            // Rows written by other tools may carry a bad letter
            match correct_str.as_deref().and_then(Letter::from_str) {
                Some(letter) => {
                    record.correct = letter;
                    questions.push(record);
                }
                None => {
                    tracing::warn!(
                        table,
                        id = record.id,
                        correct = ?correct_str,
                        "skipping stored question with invalid correct letter"
                    );
                }
            }
        }

        Ok(questions)
    }

    pub fn count_questions(&self, table: &str) -> Result<i64> {
        self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_ident(table)),
            [],
            |row| row.get(0),
        )
    }

    pub fn list_tables(&self) -> Result<Vec<TableSummary>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT name FROM sqlite_master
            WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
            ORDER BY name
            "#,
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>>>()?;

        names
            .into_iter()
            .map(|name| {
                let question_count = self.count_questions(&name)?;
                Ok(TableSummary {
                    name,
                    question_count,
                })
            })
            .collect()
    }
}
