mod config;
mod db;
mod error;
mod ingest;
mod models;
mod parser;
mod session;
mod sources;
mod tui;

use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use config::Config;
use db::Database;
use models::JsonOutput;
use session::QuizSession;

const LOG_ENV: &str = "QUIZDESK_LOG";

#[derive(Parser)]
#[command(name = "quizdesk")]
#[command(about = "Multiple-choice quizzes from plain-text question banks")]
#[command(version)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Database file (overrides QUIZDESK_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Directory holding .txt question banks (overrides QUIZDESK_SOURCES)
    #[arg(long, global = true)]
    sources: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the sources directory and the database
    Init,

    /// Ingest one question bank file
    Ingest {
        /// Path to the .txt file
        file: PathBuf,

        /// Target table (defaults to the file name without extension)
        #[arg(long, short)]
        table: Option<String>,
    },

    /// Ingest every .txt file in the sources directory
    IngestAll,

    /// List question bank files in the sources directory
    Sources,

    /// List ingested question tables
    Tables,

    /// Show the questions stored in a table
    Show {
        /// Table name
        table: String,
    },

    /// Launch the interactive quiz
    Tui {
        /// Source file to start right away
        #[arg(long, short)]
        source: Option<String>,
    },
}

fn init_logging(config: &Config, to_file: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    // The TUI owns the terminal, so its logs go to a file
    if to_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_path);
        if let Ok(file) = file {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init();
        }
        return;
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::resolve(cli.db.clone(), cli.sources.clone());
    config.ensure_db_dir()?;
    init_logging(&config, matches!(cli.command, Commands::Tui { .. }));

    let db = Database::open(&config.db_path)?;

    match cli.command {
        Commands::Init => {
            std::fs::create_dir_all(&config.sources_dir)?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                        "db_path": config.db_path,
                        "sources_dir": config.sources_dir
                    })))?
                );
            } else {
                println!("Database: {}", config.db_path.display());
                println!("Sources directory: {}", config.sources_dir.display());
            }
        }

        Commands::Ingest { file, table } => {
            let table = table.unwrap_or_else(|| {
                ingest::table_name_for(&file.file_name().unwrap_or_default().to_string_lossy())
            });
            match ingest::ingest(&db, &file, &table) {
                Ok(report) => {
                    if cli.json {
                        println!("{}", serde_json::to_string(&JsonOutput::ok(&report))?);
                    } else {
                        print_report(&file.display().to_string(), &report);
                    }
                }
                Err(e @ error::QuizError::NotFound(_)) if cli.json => {
                    println!("{}", serde_json::to_string(&JsonOutput::<()>::err(e.to_string()))?);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Commands::IngestAll => {
            let reports = ingest::ingest_directory(&db, &config.sources_dir)?;
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(&reports))?);
            } else if reports.is_empty() {
                println!("No source files in {}.", config.sources_dir.display());
            } else {
                for report in &reports {
                    print_report(&report.table, report);
                }
            }
        }

        Commands::Sources => {
            let files = sources::list_sources(&config.sources_dir)?;
            let tables = db.list_tables()?;
            let count_for = |table: &str| {
                tables
                    .iter()
                    .find(|t| t.name == table)
                    .map(|t| t.question_count)
            };

            if cli.json {
                let rows: Vec<_> = files
                    .iter()
                    .map(|f| {
                        serde_json::json!({
                            "file_name": f.file_name,
                            "table": f.table_name,
                            "questions": count_for(&f.table_name)
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string(&JsonOutput::ok(rows))?);
            } else if files.is_empty() {
                println!("No source files in {}.", config.sources_dir.display());
            } else {
                println!("{:<40} {:<25} QUESTIONS", "FILE", "TABLE");
                println!("{}", "-".repeat(76));
                for f in &files {
                    let count = count_for(&f.table_name)
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| "-".to_string());
                    println!("{:<40} {:<25} {}", truncate(&f.file_name, 38), f.table_name, count);
                }
            }
        }

        Commands::Tables => {
            let tables = db.list_tables()?;
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(&tables))?);
            } else if tables.is_empty() {
                println!("No tables found.");
            } else {
                println!("{:<30} QUESTIONS", "TABLE");
                println!("{}", "-".repeat(45));
                for t in tables {
                    println!("{:<30} {}", t.name, t.question_count);
                }
            }
        }

        Commands::Show { table } => {
            if !db.table_exists(&table)? {
                if cli.json {
                    println!(
                        "{}",
                        serde_json::to_string(&JsonOutput::<()>::err("Table not found"))?
                    );
                } else {
                    println!("Table not found.");
                }
                return Ok(());
            }

            let questions = db.load_questions(&table)?;
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(&questions))?);
            } else if questions.is_empty() {
                println!("No questions in {}.", table);
            } else {
                for q in questions {
                    println!("[{}] {} ({})", q.id, q.question, q.source);
                    for (letter, text) in q.options() {
                        let mark = if letter == q.correct { "*" } else { " " };
                        println!("  {} {}) {}", mark, letter.as_str(), text);
                    }
                    println!("  answer: {}", q.correct_text());
                    println!();
                }
            }
        }

        Commands::Tui { source } => {
            let session = QuizSession::new(db, config.sources_dir.clone());
            let start = source.unwrap_or_else(|| config.default_source.clone());
            tui::run(session, Some(&start))?;
        }
    }

    Ok(())
}

fn print_report(label: &str, report: &ingest::IngestReport) {
    println!(
        "{} -> {}: {} matches found, {} new questions added",
        label, report.table, report.matched, report.inserted
    );
    if report.duplicates > 0 || report.skipped > 0 || report.failed > 0 {
        println!(
            "  {} already present, {} skipped (bad answer letter), {} failed",
            report.duplicates, report.skipped, report.failed
        );
    }
}

/// Shortens `s` to at most `max_len` characters, ending in `...` when cut.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    mod truncate_tests {
        use super::*;

        #[test]
        fn truncate_short_string() {
            assert_eq!(truncate("hello", 10), "hello");
        }

        #[test]
        fn truncate_exact_length() {
            assert_eq!(truncate("hello", 5), "hello");
        }

        #[test]
        fn truncate_long_string() {
            assert_eq!(truncate("hello world", 8), "hello...");
        }

        #[test]
        fn truncate_multibyte() {
            assert_eq!(truncate("sorular_çğü.txt", 10), "sorular...");
            assert_eq!(truncate("ğüşöçı.txt", 10), "ğüşöçı.txt");
            assert_eq!(truncate("ğüşöçığüşö.txt", 8), "ğüşöç...");
        }
    }

    mod cli_parsing_tests {
        use super::*;

        #[test]
        fn parse_init_command() {
            let cli = Cli::try_parse_from(["quizdesk", "init"]).unwrap();
            assert!(!cli.json);
            assert!(cli.db.is_none());
            assert!(matches!(cli.command, Commands::Init));
        }

        #[test]
        fn parse_global_paths() {
            let cli = Cli::try_parse_from([
                "quizdesk",
                "--db",
                "/tmp/q.db",
                "tables",
                "--sources",
                "/tmp/banks",
            ])
            .unwrap();
            assert_eq!(cli.db, Some(PathBuf::from("/tmp/q.db")));
            assert_eq!(cli.sources, Some(PathBuf::from("/tmp/banks")));
            assert!(matches!(cli.command, Commands::Tables));
        }

        #[test]
        fn parse_ingest_basic() {
            let cli = Cli::try_parse_from(["quizdesk", "ingest", "banks/cloud.txt"]).unwrap();
            match cli.command {
                Commands::Ingest { file, table } => {
                    assert_eq!(file, PathBuf::from("banks/cloud.txt"));
                    assert!(table.is_none());
                }
                _ => panic!("Expected Ingest command"),
            }
        }

        #[test]
        fn parse_ingest_with_table() {
            let cli =
                Cli::try_parse_from(["quizdesk", "ingest", "cloud.txt", "-t", "cloud1"]).unwrap();
            match cli.command {
                Commands::Ingest { table, .. } => {
                    assert_eq!(table, Some("cloud1".to_string()));
                }
                _ => panic!("Expected Ingest command"),
            }
        }

        #[test]
        fn parse_ingest_all() {
            let cli = Cli::try_parse_from(["quizdesk", "ingest-all"]).unwrap();
            assert!(matches!(cli.command, Commands::IngestAll));
        }

        #[test]
        fn parse_sources_with_json() {
            let cli = Cli::try_parse_from(["quizdesk", "sources", "--json"]).unwrap();
            assert!(cli.json);
            assert!(matches!(cli.command, Commands::Sources));
        }

        #[test]
        fn parse_show_command() {
            let cli = Cli::try_parse_from(["quizdesk", "show", "cloud"]).unwrap();
            match cli.command {
                Commands::Show { table } => assert_eq!(table, "cloud"),
                _ => panic!("Expected Show command"),
            }
        }

        #[test]
        fn parse_tui_with_source() {
            let cli = Cli::try_parse_from(["quizdesk", "tui", "--source", "cloud.txt"]).unwrap();
            match cli.command {
                Commands::Tui { source } => assert_eq!(source, Some("cloud.txt".to_string())),
                _ => panic!("Expected Tui command"),
            }
        }

        #[test]
        fn parse_missing_required_arg_fails() {
            assert!(Cli::try_parse_from(["quizdesk", "ingest"]).is_err());
            assert!(Cli::try_parse_from(["quizdesk", "show"]).is_err());
        }

        #[test]
        fn parse_invalid_command_fails() {
            assert!(Cli::try_parse_from(["quizdesk", "invalid"]).is_err());
        }
    }
}
