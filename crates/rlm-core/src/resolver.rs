//! Local filename assignment: deterministic, collision-checked.
//!
//! A remote filename shared by two or more sources is disambiguated by
//! prefixing the second-to-last URL path segment, joined with a hyphen.
//! The result is assumed unique; a residual duplicate is surfaced as a fatal
//! error instead of silently overwriting a file.

use std::collections::HashMap;

use crate::error::SyncError;
use crate::manifest::Entry;
use crate::url_model::{sanitize_filename, second_to_last_segment};

/// Assigns `local_filename` to every entry with a known `remote_filename`.
///
/// Entries whose `remote_filename` is unique across the set keep it
/// unchanged; members of a duplicated group get
/// `<second_to_last_segment>-<remote_filename>` (empty prefix when the URL
/// has fewer than two path segments, yielding a leading hyphen). Entries with
/// an empty `remote_filename` are left untouched.
///
/// Deterministic and idempotent: re-running on an already-resolved set with
/// unchanged remote filenames reassigns the same names.
pub fn resolve_local_filenames(entries: &mut [Entry]) -> Result<(), SyncError> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for entry in entries.iter() {
        if !entry.remote_filename.is_empty() {
            *counts.entry(entry.remote_filename.as_str()).or_insert(0) += 1;
        }
    }
    let duplicated: Vec<String> = counts
        .iter()
        .filter(|(_, n)| **n > 1)
        .map(|(name, _)| name.to_string())
        .collect();

    for entry in entries.iter_mut() {
        if entry.remote_filename.is_empty() {
            continue;
        }
        entry.local_filename = if duplicated.iter().any(|d| d == &entry.remote_filename) {
            let prefix = second_to_last_segment(&entry.url)
                .map(|s| sanitize_filename(&s))
                .unwrap_or_default();
            format!("{}-{}", prefix, entry.remote_filename)
        } else {
            entry.remote_filename.clone()
        };
    }

    check_unique(entries)
}

/// Verifies no two entries share a non-empty local filename.
fn check_unique(entries: &[Entry]) -> Result<(), SyncError> {
    let mut by_name: HashMap<&str, Vec<&str>> = HashMap::new();
    for entry in entries {
        if !entry.local_filename.is_empty() {
            by_name
                .entry(entry.local_filename.as_str())
                .or_default()
                .push(entry.url.as_str());
        }
    }
    for (filename, urls) in by_name {
        if urls.len() > 1 {
            return Err(SyncError::FilenameCollision {
                filename: filename.to_string(),
                urls: urls.into_iter().map(String::from).collect(),
            });
        }
    }
    Ok(())
}
