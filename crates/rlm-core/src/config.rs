use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

fn default_source_list() -> PathBuf {
    PathBuf::from("rules-list.txt")
}

fn default_manifest() -> PathBuf {
    PathBuf::from("mapping.csv")
}

fn default_rules_dir() -> PathBuf {
    PathBuf::from("rules")
}

fn default_del_list() -> PathBuf {
    PathBuf::from("del_list.txt")
}

fn default_url_list() -> PathBuf {
    PathBuf::from("url-local-rules.txt")
}

fn default_jobs() -> usize {
    8
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

/// Global configuration loaded from `~/.config/rlm/config.toml`.
///
/// Paths are resolved relative to the current directory when not absolute.
/// Every field can be overridden per-run by a CLI flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RlmConfig {
    /// Source list file: one URL per line, `#` comments and blank lines ignored.
    #[serde(default = "default_source_list")]
    pub source_list: PathBuf,
    /// Persisted manifest mapping URL -> (remote name, local name, hash).
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,
    /// Target directory holding one file per manifest entry.
    #[serde(default = "default_rules_dir")]
    pub rules_dir: PathBuf,
    /// Pending-deletion list written just before stale files are removed.
    #[serde(default = "default_del_list")]
    pub del_list: PathBuf,
    /// Generated download-URL list (written only when `base_url` is set).
    #[serde(default = "default_url_list")]
    pub url_list: PathBuf,
    /// Base location joined with each local filename to form the generated URL list.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Maximum concurrent fetches.
    #[serde(default = "default_jobs")]
    pub jobs: usize,
    /// Per-fetch transfer timeout in seconds.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    /// When true, any failed fetch makes the run exit nonzero.
    #[serde(default)]
    pub strict: bool,
}

impl Default for RlmConfig {
    fn default() -> Self {
        Self {
            source_list: default_source_list(),
            manifest: default_manifest(),
            rules_dir: default_rules_dir(),
            del_list: default_del_list(),
            url_list: default_url_list(),
            base_url: None,
            jobs: default_jobs(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            strict: false,
        }
    }
}

impl RlmConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.max(1))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("rlm")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<RlmConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = RlmConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: RlmConfig = toml::from_str(&data)?;
    Ok(cfg)
}
