//! URL modeling and filename derivation.
//!
//! Derives safe local filenames from a rule source's URL path, sanitized for
//! Linux filesystems, plus the path segments used to disambiguate duplicates.

mod path;
mod sanitize;

pub use path::{filename_from_url_path, second_to_last_segment};
pub use sanitize::sanitize_filename;

/// Fallback when the URL path yields no usable filename (root path, `.`/`..`).
const DEFAULT_FILENAME: &str = "rules.bin";

/// Derives the remote filename for a rule source: the sanitized last path
/// segment of `url`, or a fixed fallback when the path has none.
///
/// # Examples
///
/// - `derive_remote_filename("https://cdn.example/geo/cn.srs")` → `"cn.srs"`
/// - `derive_remote_filename("https://example.com/")` → `"rules.bin"`
pub fn derive_remote_filename(url: &str) -> String {
    let raw = match filename_from_url_path(url) {
        Some(s) => s,
        None => return DEFAULT_FILENAME.to_string(),
    };

    let sanitized = sanitize_filename(&raw);
    if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
        DEFAULT_FILENAME.to_string()
    } else {
        sanitized
    }
}
