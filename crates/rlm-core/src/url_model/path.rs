//! Path segment extraction from source URLs.

/// Extracts the last non-empty path segment from a URL for use as a filename.
///
/// Returns `None` if the URL cannot be parsed or the path is empty/root.
pub fn filename_from_url_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let path = parsed.path();
    let segment = path.split('/').filter(|s| !s.is_empty()).last()?;
    if segment == "." || segment == ".." {
        return None;
    }
    Some(segment.to_string())
}

/// Extracts the path segment immediately preceding the final one, used to
/// disambiguate sources that share a remote filename.
///
/// Returns `None` when the URL cannot be parsed or has fewer than two
/// non-empty path segments.
pub fn second_to_last_segment(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segments: Vec<&str> = parsed.path().split('/').filter(|s| !s.is_empty()).collect();
    if segments.len() < 2 {
        return None;
    }
    Some(segments[segments.len() - 2].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_segment_normal() {
        assert_eq!(
            filename_from_url_path("https://example.com/geo/cn.srs").as_deref(),
            Some("cn.srs")
        );
        assert_eq!(
            filename_from_url_path("https://example.com/single").as_deref(),
            Some("single")
        );
    }

    #[test]
    fn last_segment_root_or_empty() {
        assert_eq!(filename_from_url_path("https://example.com/"), None);
        assert_eq!(filename_from_url_path("https://example.com"), None);
    }

    #[test]
    fn last_segment_ignores_query() {
        assert_eq!(
            filename_from_url_path("https://example.com/reject.yaml?token=abc").as_deref(),
            Some("reject.yaml")
        );
    }

    #[test]
    fn second_to_last_normal() {
        assert_eq!(
            second_to_last_segment("https://a.example/x/f.json").as_deref(),
            Some("x")
        );
        assert_eq!(
            second_to_last_segment("https://example.com/a/b/c.srs").as_deref(),
            Some("b")
        );
    }

    #[test]
    fn second_to_last_too_few_segments() {
        assert_eq!(second_to_last_segment("https://example.com/only.json"), None);
        assert_eq!(second_to_last_segment("https://example.com/"), None);
    }

    #[test]
    fn second_to_last_trailing_slash() {
        assert_eq!(
            second_to_last_segment("https://example.com/a/b/").as_deref(),
            Some("a")
        );
    }
}
