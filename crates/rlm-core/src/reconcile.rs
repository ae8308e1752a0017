//! Reconciliation: diff the previous manifest against the current source list.

use std::collections::HashSet;

use crate::manifest::{Entry, Manifest};
use crate::source_list::clean_urls;

/// Outcome of diffing the previous manifest against the current URL list.
/// The three sets are disjoint; the next manifest is `kept ∪ added`.
#[derive(Debug, Clone, Default)]
pub struct ReconcilePlan {
    /// URLs present in both; previous field values carried over.
    pub kept: Vec<Entry>,
    /// URLs only in the current list; fresh entries with empty fields.
    pub added: Vec<Entry>,
    /// Entries only in the previous manifest; dropped from the next manifest,
    /// their recorded local files queued for deletion.
    pub removed: Vec<Entry>,
}

impl ReconcilePlan {
    /// Entries to carry into this run, kept first, in source-list order
    /// within each group.
    pub fn working_set(&self) -> Vec<Entry> {
        let mut set = self.kept.clone();
        set.extend(self.added.iter().cloned());
        set
    }

    /// Local filenames to delete, taken from the previous manifest (the names
    /// actually on disk). Entries never fetched have no file and are skipped.
    pub fn deletions(&self) -> Vec<String> {
        self.removed
            .iter()
            .filter(|e| !e.local_filename.is_empty())
            .map(|e| e.local_filename.clone())
            .collect()
    }
}

/// Computes kept/added/removed. `urls` is re-cleaned defensively (blank and
/// `#` lines dropped, duplicates removed) even though the source-list reader
/// already does this. Pure function, no I/O.
pub fn reconcile(previous: &Manifest, urls: &[String]) -> ReconcilePlan {
    let urls = clean_urls(urls.iter().map(String::as_str));
    let current: HashSet<&str> = urls.iter().map(String::as_str).collect();

    let mut plan = ReconcilePlan::default();

    let mut previous_urls = HashSet::new();
    for entry in previous.entries() {
        previous_urls.insert(entry.url.as_str());
        if current.contains(entry.url.as_str()) {
            plan.kept.push(entry.clone());
        } else {
            plan.removed.push(entry.clone());
        }
    }

    for url in &urls {
        if !previous_urls.contains(url.as_str()) {
            plan.added.push(Entry::new(url));
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(url: &str, local: &str, hash: &str) -> Entry {
        Entry {
            url: url.to_string(),
            remote_filename: local.to_string(),
            local_filename: local.to_string(),
            content_hash: hash.to_string(),
        }
    }

    #[test]
    fn fresh_manifest_adds_everything() {
        let urls = vec![
            "https://a.example/x/f.json".to_string(),
            "https://b.example/geo/cn.srs".to_string(),
        ];
        let plan = reconcile(&Manifest::new(), &urls);
        assert!(plan.kept.is_empty());
        assert!(plan.removed.is_empty());
        assert_eq!(plan.added.len(), 2);
        assert_eq!(plan.added[0].url, urls[0]);
        assert!(plan.added[0].remote_filename.is_empty());
    }

    #[test]
    fn empty_list_removes_everything() {
        let previous = Manifest::from_entries(vec![
            entry("https://a.example/f.json", "f.json", "aa"),
            entry("https://b.example/g.yaml", "g.yaml", "bb"),
        ]);
        let plan = reconcile(&previous, &[]);
        assert!(plan.kept.is_empty());
        assert!(plan.added.is_empty());
        assert_eq!(plan.removed.len(), 2);
        assert_eq!(plan.deletions(), vec!["f.json", "g.yaml"]);
    }

    #[test]
    fn kept_added_removed_are_disjoint() {
        let previous = Manifest::from_entries(vec![
            entry("https://a.example/f.json", "f.json", "aa"),
            entry("https://b.example/g.yaml", "g.yaml", "bb"),
        ]);
        let urls = vec![
            "https://b.example/g.yaml".to_string(),
            "https://c.example/h.srs".to_string(),
        ];
        let plan = reconcile(&previous, &urls);
        assert_eq!(plan.kept.len(), 1);
        assert_eq!(plan.kept[0].url, "https://b.example/g.yaml");
        assert_eq!(plan.kept[0].content_hash, "bb");
        assert_eq!(plan.added.len(), 1);
        assert_eq!(plan.added[0].url, "https://c.example/h.srs");
        assert_eq!(plan.removed.len(), 1);
        assert_eq!(plan.removed[0].url, "https://a.example/f.json");
    }

    #[test]
    fn deletion_uses_previous_local_filename() {
        let mut removed = entry("https://a.example/x/f.json", "f.json", "aa");
        removed.local_filename = "x-f.json".to_string();
        let previous = Manifest::from_entries(vec![removed]);
        let plan = reconcile(&previous, &[]);
        assert_eq!(plan.deletions(), vec!["x-f.json"]);
    }

    #[test]
    fn never_fetched_removed_entry_has_no_deletion() {
        let previous = Manifest::from_entries(vec![Entry::new("https://a.example/f.json")]);
        let plan = reconcile(&previous, &[]);
        assert_eq!(plan.removed.len(), 1);
        assert!(plan.deletions().is_empty());
    }

    #[test]
    fn defensive_cleaning_of_url_slice() {
        let urls = vec![
            "https://a.example/f.json".to_string(),
            "# comment".to_string(),
            String::new(),
            "https://a.example/f.json".to_string(),
        ];
        let plan = reconcile(&Manifest::new(), &urls);
        assert_eq!(plan.added.len(), 1);
    }

    #[test]
    fn working_set_is_kept_then_added() {
        let previous = Manifest::from_entries(vec![entry("https://a.example/f.json", "f.json", "aa")]);
        let urls = vec![
            "https://z.example/new.srs".to_string(),
            "https://a.example/f.json".to_string(),
        ];
        let plan = reconcile(&previous, &urls);
        let set = plan.working_set();
        assert_eq!(set.len(), 2);
        assert_eq!(set[0].url, "https://a.example/f.json");
        assert_eq!(set[1].url, "https://z.example/new.srs");
    }
}
