//! `rlm plan` – dry run: show what a sync would do without touching anything.

use anyhow::Result;
use rlm_core::config::RlmConfig;
use rlm_core::manifest::Manifest;
use rlm_core::reconcile::reconcile;
use rlm_core::resolver::resolve_local_filenames;
use rlm_core::source_list::read_source_list;
use rlm_core::url_model::derive_remote_filename;

pub fn run_plan(cfg: &RlmConfig) -> Result<()> {
    let urls = read_source_list(&cfg.source_list)?;
    let previous = Manifest::load(&cfg.manifest);
    let plan = reconcile(&previous, &urls);

    let mut working = plan.working_set();
    for entry in working.iter_mut() {
        entry.remote_filename = derive_remote_filename(&entry.url);
    }
    resolve_local_filenames(&mut working)?;

    let added: std::collections::HashSet<&str> =
        plan.added.iter().map(|e| e.url.as_str()).collect();
    if working.is_empty() && plan.removed.is_empty() {
        println!("Nothing to do.");
        return Ok(());
    }

    println!("{:<8} {:<30} URL", "ACTION", "LOCAL FILE");
    for entry in &working {
        let action = if added.contains(entry.url.as_str()) {
            "add"
        } else {
            "keep"
        };
        println!("{:<8} {:<30} {}", action, entry.local_filename, entry.url);
    }
    for entry in &plan.removed {
        let local = if entry.local_filename.is_empty() {
            "-"
        } else {
            entry.local_filename.as_str()
        };
        println!("{:<8} {:<30} {}", "remove", local, entry.url);
    }
    Ok(())
}
