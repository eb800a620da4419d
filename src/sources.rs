use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::ingest::table_name_for;
use crate::models::SourceFile;

const SOURCE_EXTENSION: &str = "txt";

/// Lists the question bank files in `dir`, sorted by file name.
/// The directory is created when it does not exist yet.
pub fn list_sources(dir: &Path) -> Result<Vec<SourceFile>> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }

    let mut sources = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let is_source = path
            .extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(SOURCE_EXTENSION))
            .unwrap_or(false);
        if !is_source {
            continue;
        }

        let file_name = match path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => continue,
        };
        sources.push(SourceFile {
            table_name: table_name_for(&file_name),
            file_name,
            path,
        });
    }

    sources.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(sources)
}
