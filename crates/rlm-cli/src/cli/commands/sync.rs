//! `rlm sync` – run one reconciliation pass.

use anyhow::Result;
use rlm_core::config::RlmConfig;
use rlm_core::control::CancelToken;
use rlm_core::sync::run_sync;

pub async fn run_sync_cmd(cfg: &RlmConfig, json: bool) -> Result<()> {
    let cancel = CancelToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, finishing in-flight fetches");
            signal_token.cancel();
        }
    });

    let report = run_sync(cfg, &cancel).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{} added, {} updated, {} unchanged, {} removed, {} failed",
            report.added, report.updated, report.unchanged, report.removed, report.failed
        );
        for failure in &report.failures {
            println!("  failed: {} ({})", failure.url, failure.reason);
        }
    }

    if cfg.strict && report.failed > 0 {
        anyhow::bail!("{} source(s) failed to fetch", report.failed);
    }
    Ok(())
}
