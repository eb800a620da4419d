use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuizError {
    #[error("source file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("a quiz session is already in progress")]
    SessionActive,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Storage(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, QuizError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_mentions_path() {
        let err = QuizError::NotFound(PathBuf::from("banks/cloud.txt"));
        assert_eq!(err.to_string(), "source file not found: banks/cloud.txt");
    }

    #[test]
    fn storage_errors_convert() {
        fn fails() -> Result<()> {
            Err(rusqlite::Error::QueryReturnedNoRows)?;
            Ok(())
        }
        assert!(matches!(fails(), Err(QuizError::Storage(_))));
    }
}
