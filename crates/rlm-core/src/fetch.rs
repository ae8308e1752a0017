//! Per-entry fetch: curl GET with bounded timeouts, format-specific
//! post-processing, content hashing, and conditional write.

use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::Duration;

use crate::error::FetchError;
use crate::manifest::Entry;

/// Hard per-file size cap for sing-box binary rule sets. The consuming
/// system rejects larger `.srs` payloads, so content is truncated before
/// hashing and persisting.
pub const SRS_MAX_BYTES: usize = 1472;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const MAX_REDIRECTS: u32 = 10;

/// What happened to one entry during the fetch phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryStatus {
    /// First successful fetch; file written.
    Added,
    /// Remote content changed; file rewritten.
    Updated,
    /// Remote content matches the stored hash; no write.
    Unchanged,
    /// Fetch or write failed; entry keeps its prior state.
    Failed(String),
}

/// Result of one worker's fetch step: the (possibly updated) entry plus what
/// happened to it.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub entry: Entry,
    pub status: EntryStatus,
}

/// Downloads `url` into memory with a single GET. Follows redirects; fails
/// on transfer errors, the configured deadline, or a non-2xx status.
pub fn fetch_url(url: &str, timeout: Duration) -> Result<Vec<u8>, FetchError> {
    let mut body = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(MAX_REDIRECTS)?;
    easy.connect_timeout(CONNECT_TIMEOUT)?;
    easy.timeout(timeout)?;

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(FetchError::Http(code));
    }
    Ok(body)
}

/// Applies format-specific post-processing before hashing and persisting:
/// `.srs` payloads are truncated to [`SRS_MAX_BYTES`], everything else
/// passes through unmodified.
pub fn prepare_payload(remote_filename: &str, mut body: Vec<u8>) -> Vec<u8> {
    if remote_filename.ends_with(".srs") && body.len() > SRS_MAX_BYTES {
        body.truncate(SRS_MAX_BYTES);
    }
    body
}

/// SHA-256 of `bytes` as lowercase hex.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Fetches one entry and conditionally writes its file under `rules_dir`.
///
/// The hash is computed over the post-processed bytes, so the stored hash
/// always matches the on-disk file. The write is skipped when the hash is
/// unchanged and the file is already present. Any failure leaves the entry
/// exactly as it came in.
pub fn fetch_entry(mut entry: Entry, rules_dir: &Path, timeout: Duration) -> FetchOutcome {
    debug_assert!(!entry.local_filename.is_empty());

    let body = match fetch_url(&entry.url, timeout) {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!("fetch {} failed: {}", entry.url, e);
            return FetchOutcome {
                status: EntryStatus::Failed(e.to_string()),
                entry,
            };
        }
    };

    let payload = prepare_payload(&entry.remote_filename, body);
    let new_hash = sha256_hex(&payload);
    let path = rules_dir.join(&entry.local_filename);

    if new_hash == entry.content_hash && path.exists() {
        tracing::debug!("{} unchanged", entry.local_filename);
        return FetchOutcome {
            status: EntryStatus::Unchanged,
            entry,
        };
    }

    if let Err(e) = std::fs::write(&path, &payload) {
        tracing::warn!("write {} failed: {}", path.display(), e);
        return FetchOutcome {
            status: EntryStatus::Failed(format!("write {}: {}", path.display(), e)),
            entry,
        };
    }

    let status = if entry.content_hash.is_empty() {
        EntryStatus::Added
    } else if entry.content_hash != new_hash {
        EntryStatus::Updated
    } else {
        // Same content, file was missing on disk; restored without a log entry.
        EntryStatus::Unchanged
    };
    entry.content_hash = new_hash;
    tracing::info!("{} {:?}", entry.local_filename, status);

    FetchOutcome { entry, status }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srs_payload_truncated_to_cap() {
        let body = vec![0xABu8; SRS_MAX_BYTES + 600];
        let out = prepare_payload("geoip-cn.srs", body);
        assert_eq!(out.len(), SRS_MAX_BYTES);
    }

    #[test]
    fn short_srs_payload_kept_whole() {
        let body = vec![0x01u8; 128];
        let out = prepare_payload("geoip-cn.srs", body.clone());
        assert_eq!(out, body);
    }

    #[test]
    fn non_srs_never_truncated() {
        let body = vec![b'x'; SRS_MAX_BYTES * 3];
        let out = prepare_payload("reject.yaml", body.clone());
        assert_eq!(out, body);
        let out = prepare_payload("rules.json", body.clone());
        assert_eq!(out, body);
    }

    #[test]
    fn sha256_hex_known_values() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            sha256_hex(b"hello\n"),
            "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03"
        );
    }

    #[test]
    fn hash_matches_truncated_bytes_not_raw() {
        let body = vec![0x7Fu8; SRS_MAX_BYTES * 2];
        let payload = prepare_payload("cn.srs", body.clone());
        assert_ne!(sha256_hex(&payload), sha256_hex(&body));
        assert_eq!(sha256_hex(&payload), sha256_hex(&body[..SRS_MAX_BYTES]));
    }
}
