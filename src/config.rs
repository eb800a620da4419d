use std::path::{Path, PathBuf};

pub const DEFAULT_DB_NAME: &str = "questions.db";
pub const DEFAULT_SOURCES_DIR: &str = "sources";
pub const DEFAULT_SOURCE: &str = "questions.txt";
pub const LOG_FILE_NAME: &str = "quizdesk.log";

pub const DB_ENV: &str = "QUIZDESK_DB";
pub const SOURCES_ENV: &str = "QUIZDESK_SOURCES";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub sources_dir: PathBuf,
    pub default_source: String,
    pub log_path: PathBuf,
}

fn app_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("quizdesk")
}

impl Config {
    /// Resolves paths from explicit overrides, then the environment, then
    /// the per-user config directory.
    pub fn resolve(db_override: Option<PathBuf>, sources_override: Option<PathBuf>) -> Self {
        let db_path = db_override
            .or_else(|| std::env::var_os(DB_ENV).map(PathBuf::from))
            .unwrap_or_else(|| app_dir().join(DEFAULT_DB_NAME));

        let sources_dir = sources_override
            .or_else(|| std::env::var_os(SOURCES_ENV).map(PathBuf::from))
            .unwrap_or_else(|| app_dir().join(DEFAULT_SOURCES_DIR));

        Self::with_paths(db_path, sources_dir)
    }

    pub fn with_paths(db_path: PathBuf, sources_dir: PathBuf) -> Self {
        let log_path = db_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(LOG_FILE_NAME);

        Self {
            db_path,
            sources_dir,
            default_source: DEFAULT_SOURCE.to_string(),
            log_path,
        }
    }

    pub fn ensure_db_dir(&self) -> std::io::Result<()> {
        match self.db_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_win() {
        let config = Config::resolve(
            Some(PathBuf::from("/tmp/q/bank.db")),
            Some(PathBuf::from("/tmp/q/banks")),
        );
        assert_eq!(config.db_path, PathBuf::from("/tmp/q/bank.db"));
        assert_eq!(config.sources_dir, PathBuf::from("/tmp/q/banks"));
    }

    #[test]
    fn log_sits_next_to_database() {
        let config = Config::with_paths(PathBuf::from("/data/quiz/questions.db"), PathBuf::from("s"));
        assert_eq!(config.log_path, PathBuf::from("/data/quiz/quizdesk.log"));
    }

    #[test]
    fn bare_db_name_logs_to_current_dir() {
        let config = Config::with_paths(PathBuf::from("questions.db"), PathBuf::from("s"));
        assert_eq!(config.log_path, PathBuf::from("quizdesk.log"));
    }

    #[test]
    fn default_source_is_questions_txt() {
        let config = Config::with_paths(PathBuf::from("q.db"), PathBuf::from("s"));
        assert_eq!(config.default_source, "questions.txt");
    }

    #[test]
    fn ensure_db_dir_creates_parent() {
        let tmp = tempfile::tempdir().unwrap();
        let db_path = tmp.path().join("nested").join("questions.db");
        let config = Config::with_paths(db_path, tmp.path().join("sources"));
        config.ensure_db_dir().unwrap();
        assert!(tmp.path().join("nested").is_dir());
    }
}
