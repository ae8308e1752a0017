//! Persistent manifest: one row per tracked rule source.
//!
//! Serialized as CSV with header `URL,RemoteFileName,LocalFileName,Hash`.
//! Saving is atomic (temp file in the same directory, then rename) so a
//! crash never leaves a half-written manifest under the canonical path.

use anyhow::{Context, Result};
use std::path::Path;

/// Column order of the persisted manifest.
pub const MANIFEST_HEADER: [&str; 4] = ["URL", "RemoteFileName", "LocalFileName", "Hash"];

/// One tracked rule source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Stable identity for the source; unique across the manifest.
    pub url: String,
    /// Basename derived from the URL path; empty until first derived.
    pub remote_filename: String,
    /// Filesystem-safe name, unique across entries; may differ from
    /// `remote_filename` when a collision was disambiguated.
    pub local_filename: String,
    /// Lowercase hex SHA-256 of the bytes last written to `local_filename`;
    /// empty until the first successful write.
    pub content_hash: String,
}

impl Entry {
    /// Fresh entry for a URL that has never been fetched.
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            remote_filename: String::new(),
            local_filename: String::new(),
            content_hash: String::new(),
        }
    }
}

/// Ordered set of entries keyed by URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<Entry>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, url: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.url == url)
    }

    /// Appends an entry. The caller is responsible for URL uniqueness.
    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// Loads the manifest at `path`.
    ///
    /// A missing, empty, or unreadable file yields an empty manifest (logged,
    /// never fatal). Rows with the wrong field count are skipped with a
    /// warning; a duplicated URL keeps the first occurrence.
    pub fn load(path: &Path) -> Manifest {
        let data = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Manifest::new(),
            Err(e) => {
                tracing::warn!("manifest {} unreadable ({}), starting empty", path.display(), e);
                return Manifest::new();
            }
        };

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(data.as_slice());

        let mut manifest = Manifest::new();
        for record in reader.records() {
            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!("manifest {}: skipping unparseable row: {}", path.display(), e);
                    continue;
                }
            };
            if record.len() != MANIFEST_HEADER.len() {
                tracing::warn!(
                    "manifest {}: skipping row with {} fields (want {})",
                    path.display(),
                    record.len(),
                    MANIFEST_HEADER.len()
                );
                continue;
            }
            let url = record[0].to_string();
            if url.is_empty() || manifest.get(&url).is_some() {
                tracing::warn!("manifest {}: skipping duplicate or empty URL row", path.display());
                continue;
            }
            manifest.push(Entry {
                url,
                remote_filename: record[1].to_string(),
                local_filename: record[2].to_string(),
                content_hash: record[3].to_string(),
            });
        }
        manifest
    }

    /// Saves the manifest to `path` atomically: write a temp file in the same
    /// directory, flush and sync it, then rename over the canonical path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("create temp manifest in {}", dir.display()))?;

        {
            let mut w = csv::Writer::from_writer(&mut tmp);
            w.write_record(MANIFEST_HEADER).context("write manifest header")?;
            for e in &self.entries {
                w.write_record([
                    e.url.as_str(),
                    e.remote_filename.as_str(),
                    e.local_filename.as_str(),
                    e.content_hash.as_str(),
                ])
                .with_context(|| format!("write manifest row for {}", e.url))?;
            }
            w.flush().context("flush manifest")?;
        }

        tmp.as_file().sync_all().context("sync manifest")?;
        tmp.persist(path)
            .map_err(|e| e.error)
            .with_context(|| format!("replace manifest {}", path.display()))?;
        Ok(())
    }
}
