//! `rlm status` – show the tracked sources from the manifest.

use anyhow::Result;
use rlm_core::config::RlmConfig;
use rlm_core::manifest::Manifest;

pub fn run_status(cfg: &RlmConfig) -> Result<()> {
    if !cfg.manifest.exists() {
        println!("No manifest yet.");
        return Ok(());
    }

    let manifest = Manifest::load(&cfg.manifest);
    if manifest.is_empty() {
        println!("Manifest is empty.");
        return Ok(());
    }

    println!("{:<30} {:<12} URL", "LOCAL FILE", "HASH");
    for entry in manifest.entries() {
        let hash = if entry.content_hash.is_empty() {
            "-".to_string()
        } else {
            entry.content_hash.chars().take(12).collect()
        };
        let local = if entry.local_filename.is_empty() {
            "-"
        } else {
            entry.local_filename.as_str()
        };
        println!("{:<30} {:<12} {}", local, hash, entry.url);
    }
    Ok(())
}
