use std::path::Path;

use serde::Serialize;

use crate::db::Database;
use crate::error::{QuizError, Result};
use crate::parser::{self, ParseOutcome};
use crate::sources;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub table: String,
    /// Every recognized tuple, including skipped ones.
    pub matched: usize,
    pub inserted: usize,
    pub duplicates: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Maps a name onto a safe table identifier: anything outside
/// `[A-Za-z0-9_]` becomes `_`.
pub fn sanitize_table_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if sanitized.is_empty() {
        "_".to_string()
    } else {
        sanitized
    }
}

/// Table name derived from a source file name: its sanitized stem.
pub fn table_name_for(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    sanitize_table_name(&stem)
}

/// Parses a source file and stores its valid tuples in `table`, creating the
/// table if needed. Tuples whose question already exists are left alone.
pub fn ingest(db: &Database, path: &Path, table: &str) -> Result<IngestReport> {
    if !path.exists() {
        return Err(QuizError::NotFound(path.to_path_buf()));
    }

    let table = sanitize_table_name(table);
    let text = std::fs::read_to_string(path)?;
    let outcomes = parser::parse(&text);

    db.create_question_table(&table)?;

    let mut report = IngestReport {
        table: table.clone(),
        matched: outcomes.len(),
        ..Default::default()
    };

    // Per-row failures abort only their own statement
    let tx = db.transaction()?;
    for outcome in &outcomes {
        let tuple = match outcome {
            ParseOutcome::Parsed(tuple) => tuple,
            ParseOutcome::Skipped { reason, .. } => {
                tracing::debug!(path = %path.display(), line = outcome.line(), %reason, "skipping tuple");
                report.skipped += 1;
                continue;
            }
        };

        match db.insert_question(&table, tuple) {
            Ok(true) => report.inserted += 1,
            Ok(false) => report.duplicates += 1,
            Err(e) => {
                let preview: String = tuple.question.chars().take(60).collect();
                tracing::warn!(
                    table = %table,
                    line = tuple.line,
                    question = %preview,
                    error = %e,
                    "failed to insert question"
                );
                report.failed += 1;
            }
        }
    }
    tx.commit()?;

    tracing::info!(
        path = %path.display(),
        table = %table,
        matched = report.matched,
        inserted = report.inserted,
        "ingested source file"
    );

    Ok(report)
}

/// Ingests every source file in `dir`, each into its own table.
pub fn ingest_directory(db: &Database, dir: &Path) -> Result<Vec<IngestReport>> {
    sources::list_sources(dir)?
        .iter()
        .map(|source| ingest(db, &source.path, &source.table_name))
        .collect()
}
