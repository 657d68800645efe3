//! Blog export
//!
//! Saves a generated post as a text file named from the topic and a
//! timestamp, into the user's download directory when one exists.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use thiserror::Error;

/// Export-related errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write blog file: {0}")]
    WriteError(#[from] std::io::Error),
}

/// Builds the export filename for a topic at a given time.
///
/// Whitespace runs become underscores and filesystem-hostile characters are
/// stripped, e.g. `blog_AI_in_Healthcare_20260825_143015.txt`.
pub fn export_filename(topic: &str, timestamp: DateTime<Local>) -> String {
    let slug: String = topic
        .trim()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '_' | '-'))
        .collect();

    format!("blog_{}_{}.txt", slug, timestamp.format("%Y%m%d_%H%M%S"))
}

/// Directory exports are written to: the platform download directory, or the
/// current directory when none can be determined.
pub fn export_dir() -> PathBuf {
    directories::UserDirs::new()
        .and_then(|dirs| dirs.download_dir().map(|d| d.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Writes the generated text to disk and returns the file path.
pub fn save_blog(topic: &str, text: &str) -> Result<PathBuf, ExportError> {
    let path = export_dir().join(export_filename(topic, Local::now()));
    fs::write(&path, text)?;
    tracing::info!("Blog exported to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 8, 25, 14, 30, 15).unwrap()
    }

    #[test]
    fn test_filename_format() {
        let name = export_filename("AI in Healthcare", fixed_time());
        assert_eq!(name, "blog_AI_in_Healthcare_20260825_143015.txt");
    }

    #[test]
    fn test_filename_collapses_whitespace() {
        let name = export_filename("  Rust   for\tML  ", fixed_time());
        assert_eq!(name, "blog_Rust_for_ML_20260825_143015.txt");
    }

    #[test]
    fn test_filename_strips_hostile_characters() {
        let name = export_filename("C:/What? A*B|C", fixed_time());
        assert!(!name.contains('/'));
        assert!(!name.contains(':'));
        assert!(!name.contains('?'));
        assert!(!name.contains('*'));
        assert!(!name.contains('|'));
        assert!(name.starts_with("blog_"));
        assert!(name.ends_with("_20260825_143015.txt"));
    }
}
