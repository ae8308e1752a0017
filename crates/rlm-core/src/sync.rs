//! Sync orchestrator: one reconciliation run, atomic-as-possible.
//!
//! Sequences load → reconcile → resolve → concurrent fetch → delete stale
//! files → commit. Fetch failures are per-entry and non-fatal; structural
//! failures (source list, filename collision, persistence) abort the run with
//! the previous manifest and files untouched.

use anyhow::Result;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::config::RlmConfig;
use crate::control::CancelToken;
use crate::error::SyncError;
use crate::fetch::{fetch_entry, EntryStatus, FetchOutcome};
use crate::manifest::{Entry, Manifest};
use crate::reconcile::reconcile;
use crate::resolver::resolve_local_filenames;
use crate::source_list::read_source_list;
use crate::url_model::derive_remote_filename;

/// One source that failed to fetch this run.
#[derive(Debug, Clone, Serialize)]
pub struct FailedSource {
    pub url: String,
    pub reason: String,
}

/// End-of-run summary: counts per category plus per-URL failure reasons.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub added: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub removed: usize,
    pub failed: usize,
    pub failures: Vec<FailedSource>,
}

/// Runs one full sync per `cfg`.
///
/// Returns the report on success. Fails with [`SyncError::SourceList`],
/// [`SyncError::FilenameCollision`], [`SyncError::Persist`], or
/// [`SyncError::Cancelled`] (all downcastable from the returned error); in
/// every failure case the previous manifest and on-disk files are left as
/// they were.
pub async fn run_sync(cfg: &RlmConfig, cancel: &CancelToken) -> Result<SyncReport> {
    let urls = read_source_list(&cfg.source_list)?;
    let previous = Manifest::load(&cfg.manifest);
    tracing::info!(
        "syncing {} source(s) against {} manifest entr(ies)",
        urls.len(),
        previous.len()
    );

    let plan = reconcile(&previous, &urls);
    let mut working = plan.working_set();

    // Local names the previous run put on disk, for rename detection.
    let prior: HashMap<String, String> = plan
        .kept
        .iter()
        .filter(|e| !e.local_filename.is_empty())
        .map(|e| (e.url.clone(), e.local_filename.clone()))
        .collect();

    for entry in working.iter_mut() {
        entry.remote_filename = derive_remote_filename(&entry.url);
    }
    resolve_local_filenames(&mut working)?;

    std::fs::create_dir_all(&cfg.rules_dir)
        .map_err(|e| SyncError::persist("create rules dir", e))?;

    let outcomes = fetch_all(&working, cfg, cancel).await?;
    if cancel.is_cancelled() {
        tracing::warn!("cancelled; previous manifest left untouched");
        return Err(SyncError::Cancelled.into());
    }

    let mut report = SyncReport {
        removed: plan.removed.len(),
        ..SyncReport::default()
    };
    let mut next = Manifest::new();
    let mut rename_deletions: Vec<String> = Vec::new();

    for outcome in outcomes {
        let FetchOutcome { mut entry, status } = outcome;
        match status {
            EntryStatus::Added => report.added += 1,
            EntryStatus::Updated => report.updated += 1,
            EntryStatus::Unchanged => report.unchanged += 1,
            EntryStatus::Failed(reason) => {
                report.failed += 1;
                // A renamed entry that failed keeps its previous name so the
                // file already on disk stays tracked and undeleted.
                if let Some(old_local) = prior.get(&entry.url) {
                    entry.local_filename = old_local.clone();
                }
                report.failures.push(FailedSource {
                    url: entry.url.clone(),
                    reason,
                });
            }
        }
        if let Some(old_local) = prior.get(&entry.url) {
            if *old_local != entry.local_filename {
                rename_deletions.push(old_local.clone());
            }
        }
        next.push(entry);
    }

    let deletions = deletion_list(&plan.deletions(), &rename_deletions, &next);
    apply_deletions(cfg, &deletions)?;

    if let Some(base_url) = cfg.base_url.as_deref() {
        write_url_list(&cfg.url_list, base_url, &next)?;
    }

    next.save(&cfg.manifest)
        .map_err(|e| SyncError::persist("manifest", format!("{:#}", e)))?;

    if let Err(e) = std::fs::remove_file(&cfg.del_list) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("could not remove {}: {}", cfg.del_list.display(), e);
        }
    }

    tracing::info!(
        "sync done: {} added, {} updated, {} unchanged, {} removed, {} failed",
        report.added,
        report.updated,
        report.unchanged,
        report.removed,
        report.failed
    );
    Ok(report)
}

/// Fetches the working set with a bounded worker pool. Workers fetch, hash,
/// and conditionally write their own entry's file; this function is the
/// single collector assembling results. Outcomes are returned in working-set
/// order. Stops scheduling when `cancel` fires but lets in-flight fetches
/// finish.
async fn fetch_all(
    working: &[Entry],
    cfg: &RlmConfig,
    cancel: &CancelToken,
) -> Result<Vec<FetchOutcome>> {
    let max_jobs = cfg.jobs.max(1);
    let timeout = cfg.fetch_timeout();
    let mut slots: Vec<Option<FetchOutcome>> = Vec::new();
    slots.resize_with(working.len(), || None);

    let mut join_set = tokio::task::JoinSet::new();
    let mut next = 0usize;

    loop {
        while join_set.len() < max_jobs && next < working.len() && !cancel.is_cancelled() {
            let entry = working[next].clone();
            let rules_dir = cfg.rules_dir.clone();
            let idx = next;
            join_set.spawn_blocking(move || (idx, fetch_entry(entry, &rules_dir, timeout)));
            next += 1;
        }

        let Some(res) = join_set.join_next().await else {
            break;
        };
        let (idx, outcome) = res.map_err(|e| anyhow::anyhow!("fetch worker join: {}", e))?;
        slots[idx] = Some(outcome);
    }

    // Entries never scheduled (cancellation) are reported as failed; the
    // caller discards the whole result set in that case anyway.
    Ok(slots
        .into_iter()
        .enumerate()
        .map(|(i, slot)| {
            slot.unwrap_or_else(|| FetchOutcome {
                entry: working[i].clone(),
                status: EntryStatus::Failed("not scheduled".to_string()),
            })
        })
        .collect())
}

/// Merges removal and rename deletions, dropping duplicates and any name the
/// next manifest still claims (a name freed by one entry and taken by
/// another must not be deleted).
fn deletion_list(removed: &[String], renamed: &[String], next: &Manifest) -> Vec<String> {
    let live: HashSet<&str> = next
        .entries()
        .iter()
        .filter(|e| !e.local_filename.is_empty())
        .map(|e| e.local_filename.as_str())
        .collect();
    let mut seen = HashSet::new();
    removed
        .iter()
        .chain(renamed.iter())
        .filter(|name| !live.contains(name.as_str()))
        .filter(|name| seen.insert(name.as_str()))
        .cloned()
        .collect()
}

/// Writes the pending-deletion list, then removes the files. The list is
/// written first so a crash in between leaves a resumable record; a missing
/// file is not an error.
fn apply_deletions(cfg: &RlmConfig, deletions: &[String]) -> Result<(), SyncError> {
    let mut listing = String::new();
    for name in deletions {
        listing.push_str(name);
        listing.push('\n');
    }
    std::fs::write(&cfg.del_list, listing)
        .map_err(|e| SyncError::persist("deletion list", e))?;

    for name in deletions {
        let path = cfg.rules_dir.join(name);
        match std::fs::remove_file(&path) {
            Ok(()) => tracing::info!("deleted {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("could not delete {}: {}", path.display(), e),
        }
    }
    Ok(())
}

/// Writes one externally-addressable download URL per entry, derived from the
/// configured base location, so downstream consumers need not know the
/// filename mapping.
fn write_url_list(path: &Path, base_url: &str, manifest: &Manifest) -> Result<(), SyncError> {
    let base = base_url.trim_end_matches('/');
    let mut listing = String::new();
    for entry in manifest.entries() {
        if entry.local_filename.is_empty() {
            continue;
        }
        listing.push_str(&format!("{}/{}\n", base, entry.local_filename));
    }
    std::fs::write(path, listing).map_err(|e| SyncError::persist("url list", e))
}
