//! Source list: one URL per line, `#` comments and blank lines ignored.

use std::collections::HashSet;
use std::path::Path;

use crate::error::SyncError;

/// Reads the source list at `path`. A missing or unreadable file is fatal
/// (`SyncError::SourceList`); an existing empty file is a valid list that
/// mirrors nothing.
pub fn read_source_list(path: &Path) -> Result<Vec<String>, SyncError> {
    let data = std::fs::read_to_string(path).map_err(|source| SyncError::SourceList {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(clean_urls(data.lines()))
}

/// Strips blank lines and `#` comments and deduplicates, preserving
/// first-seen order.
pub fn clean_urls<'a>(lines: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut urls = Vec::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if seen.insert(line.to_string()) {
            urls.push(line.to_string());
        }
    }
    urls
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn skips_comments_and_blanks() {
        let urls = clean_urls(
            [
                "# upstream lists",
                "",
                "https://a.example/x/f.json",
                "   ",
                "https://b.example/y/f.json",
                "# trailing comment",
            ],
        );
        assert_eq!(
            urls,
            vec![
                "https://a.example/x/f.json".to_string(),
                "https://b.example/y/f.json".to_string(),
            ]
        );
    }

    #[test]
    fn deduplicates_preserving_order() {
        let urls = clean_urls(["https://a.example/f", "https://b.example/f", "https://a.example/f"]);
        assert_eq!(urls.len(), 2);
        assert_eq!(urls[0], "https://a.example/f");
        assert_eq!(urls[1], "https://b.example/f");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let urls = clean_urls(["  https://a.example/f.srs  "]);
        assert_eq!(urls, vec!["https://a.example/f.srs".to_string()]);
    }

    #[test]
    fn missing_file_is_source_list_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_source_list(&dir.path().join("absent.txt")).unwrap_err();
        assert!(matches!(err, SyncError::SourceList { .. }));
    }

    #[test]
    fn empty_file_is_empty_list() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"\n# nothing active\n").unwrap();
        f.flush().unwrap();
        let urls = read_source_list(f.path()).unwrap();
        assert!(urls.is_empty());
    }
}
