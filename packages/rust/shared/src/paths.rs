//! URL path-segment normalization shared by the crawl modes.

/// Normalize a raw path segment for URL assembly.
///
/// Always prepends a leading `/` when missing, then appends or strips a
/// trailing `/` according to `want_trailing_slash`. Never reduces the result
/// below a bare `/`, so empty input is safe in either mode.
pub fn normalize_path_segment(path: &str, want_trailing_slash: bool) -> String {
    let mut segment = path.trim().to_string();
    if !segment.starts_with('/') {
        segment.insert(0, '/');
    }
    if want_trailing_slash {
        if !segment.ends_with('/') {
            segment.push('/');
        }
    } else if segment.len() > 1 && segment.ends_with('/') {
        segment.pop();
    }
    segment
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepends_leading_slash() {
        assert_eq!(normalize_path_segment("test", false), "/test");
        assert_eq!(normalize_path_segment("/test", false), "/test");
    }

    #[test]
    fn strips_trailing_slash_when_unwanted() {
        assert_eq!(normalize_path_segment("test/", false), "/test");
        assert_eq!(normalize_path_segment("/test/", false), "/test");
    }

    #[test]
    fn appends_trailing_slash_when_wanted() {
        assert_eq!(normalize_path_segment("test", true), "/test/");
        assert_eq!(normalize_path_segment("test/", true), "/test/");
    }

    #[test]
    fn empty_input_never_drops_below_root() {
        assert_eq!(normalize_path_segment("", false), "/");
        assert_eq!(normalize_path_segment("", true), "/");
        assert_eq!(normalize_path_segment("  ", false), "/");
    }

    #[test]
    fn whitespace_is_trimmed_first() {
        assert_eq!(normalize_path_segment("  docs  ", true), "/docs/");
    }
}
