use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::store::atomic_write;
use super::types::{decode_links, Link};

/// Largest import file accepted.
const MAX_IMPORT_SIZE: u64 = 10 * 1024 * 1024;

/// Errors that can occur while reading an import file.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Import file is too large ({0} bytes)")]
    TooLarge(u64),

    #[error("Import file is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Valid JSON, but not a list of links.
    #[error("Invalid JSON format: expected an array of links")]
    NotArray,
}

/// Backup file name for `date`, e.g. `hub_backup_2024-05-01.json`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("hub_backup_{}.json", date.format("%Y-%m-%d"))
}

/// Write `links` as pretty-printed JSON into `dir`, named after today's UTC date.
///
/// An existing backup from the same day is replaced.
pub fn export_to_dir(links: &[Link], dir: &Path) -> Result<PathBuf> {
    export_to_dir_on(links, dir, chrono::Utc::now().date_naive())
}

/// [`export_to_dir`] with an explicit date.
pub fn export_to_dir_on(links: &[Link], dir: &Path, date: NaiveDate) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory '{}'", dir.display()))?;

    let path = dir.join(export_file_name(date));
    let content = serde_json::to_string_pretty(links).context("Failed to serialize links")?;

    atomic_write(&path, content.as_bytes())
        .with_context(|| format!("Failed to write backup '{}'", path.display()))?;

    tracing::info!(path = %path.display(), count = links.len(), "Exported links");
    Ok(path)
}

/// Parse import text into raw links.
///
/// The top level must be a JSON array. Elements that are not link objects
/// are skipped with a warning; normalization and id backfill happen when
/// the result is handed to `LinkStore::replace_all`.
pub fn parse_import(text: &str) -> Result<Vec<Link>, ImportError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let serde_json::Value::Array(items) = value else {
        return Err(ImportError::NotArray);
    };

    Ok(decode_links(items, "import").0)
}

/// Read and parse an import file from disk.
pub fn read_import(path: &Path) -> Result<Vec<Link>, ImportError> {
    let io_err = |source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    };

    let size = std::fs::metadata(path).map_err(io_err)?.len();
    if size > MAX_IMPORT_SIZE {
        return Err(ImportError::TooLarge(size));
    }

    let text = std::fs::read_to_string(path).map_err(io_err)?;
    parse_import(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(export_file_name(date), "hub_backup_2024-03-07.json");
    }

    #[test]
    fn test_parse_import_rejects_non_array() {
        assert!(matches!(
            parse_import(r#"{"title":"x"}"#),
            Err(ImportError::NotArray)
        ));
        assert!(matches!(
            parse_import("not json"),
            Err(ImportError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_parse_import_skips_non_objects() {
        let links = parse_import(r#"[{"title":"A","url":"http://a"}, 42, "str"]"#).unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].title, "A");
    }

    #[test]
    fn test_parse_import_keeps_numeric_ids() {
        let links = parse_import(
            r#"[{"id":12,"title":"Num","url":"http://b"},{"title":"Ok","url":"http://c"}]"#,
        )
        .unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].id, "12");
        assert_eq!(links[1].title, "Ok");
    }

    #[test]
    fn test_export_names_file_after_utc_date() {
        let dir = std::env::temp_dir().join(format!("linkhub_export_utc_{}", std::process::id()));
        std::fs::remove_dir_all(&dir).ok();

        let before = chrono::Utc::now().date_naive();
        let path = export_to_dir(&[], &dir).unwrap();
        let after = chrono::Utc::now().date_naive();

        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(
            name == export_file_name(before) || name == export_file_name(after),
            "unexpected backup name {name}"
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_export_writes_pretty_json() {
        let dir = std::env::temp_dir().join("linkhub_export_test");
        std::fs::remove_dir_all(&dir).ok();

        let mut link: Link = serde_json::from_str(r#"{"id":"1","title":"A","url":"http://a"}"#)
            .unwrap();
        link.normalize();
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

        let path = export_to_dir_on(std::slice::from_ref(&link), &dir, date).unwrap();
        assert_eq!(path, dir.join("hub_backup_2024-01-02.json"));

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\n  {"));
        assert_eq!(read_import(&path).unwrap(), vec![link]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_read_import_missing_file() {
        let path = std::env::temp_dir().join("linkhub_import_missing.json");
        std::fs::remove_file(&path).ok();
        assert!(matches!(read_import(&path), Err(ImportError::Io { .. })));
    }
}
