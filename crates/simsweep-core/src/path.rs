//! Path hierarchy predicates for remote directory paths.
//!
//! Paths here belong to the backend's filesystem, not the local one, so they
//! are plain strings compared exactly (case-sensitive) with `/` as the only
//! separator. Nothing is resolved: `.`, `..` and symlinks are the backend's
//! business.

/// The path separator used by the backend.
pub const SEPARATOR: char = '/';

/// The filesystem root.
pub const ROOT: &str = "/";

/// Check whether a path starts with the separator.
pub fn is_absolute(path: &str) -> bool {
    path.starts_with(SEPARATOR)
}

/// Strip the trailing separator from a path.
///
/// The root stays `/`. Repeated trailing separators are stripped together so
/// that `normalize(normalize(p)) == normalize(p)` for every input.
pub fn normalize(path: &str) -> String {
    let trimmed = path.trim_end_matches(SEPARATOR);
    if trimmed.is_empty() && path.starts_with(SEPARATOR) {
        ROOT.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Check whether `parent` is a proper ancestor of `child`.
///
/// The match must be separator aligned: `/foo` is not an ancestor of
/// `/foobar`, and a path is never its own ancestor.
pub fn is_ancestor(parent: &str, child: &str) -> bool {
    if parent == child {
        return false;
    }
    if parent == ROOT {
        return child.len() > 1 && is_absolute(child) && !child[1..].starts_with(SEPARATOR);
    }
    match child.strip_prefix(parent) {
        Some(rest) => match rest.strip_prefix(SEPARATOR) {
            Some(tail) => !tail.is_empty() && !tail.starts_with(SEPARATOR),
            None => false,
        },
        None => false,
    }
}

/// Check whether any of `candidates` is an ancestor of `path`.
pub fn is_descendant_of_any<I, S>(path: &str, candidates: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    candidates
        .into_iter()
        .any(|candidate| is_ancestor(candidate.as_ref(), path))
}

/// Last component of a path, or `/` for the root.
pub fn display_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches(SEPARATOR);
    if trimmed.is_empty() {
        return if path.is_empty() { "" } else { ROOT };
    }
    trimmed
        .rsplit(SEPARATOR)
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_trailing_separator() {
        assert_eq!(normalize("/photos/"), "/photos");
        assert_eq!(normalize("/photos"), "/photos");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize("//"), "/");
    }

    #[test]
    fn test_normalize_idempotent() {
        for path in ["", "/", "//", "/a", "/a/", "/a//", "relative/", "/a/b/c///"] {
            let once = normalize(path);
            assert_eq!(normalize(&once), once, "not idempotent for {path:?}");
        }
    }

    #[test]
    fn test_normalize_leaves_dots_alone() {
        assert_eq!(normalize("/a/../b/"), "/a/../b");
        assert_eq!(normalize("/a/./"), "/a/.");
    }

    #[test]
    fn test_is_ancestor() {
        assert!(is_ancestor("/a", "/a/b"));
        assert!(is_ancestor("/a", "/a/b/c"));
        assert!(!is_ancestor("/a", "/ab"));
        assert!(!is_ancestor("/a", "/a"));
        assert!(!is_ancestor("/a/b", "/a"));
        assert!(!is_ancestor("/foo", "/foobar"));
    }

    #[test]
    fn test_is_ancestor_root() {
        assert!(is_ancestor("/", "/a"));
        assert!(is_ancestor("/", "/a/b"));
        assert!(!is_ancestor("/", "/"));
        assert!(!is_ancestor("/", "relative"));
    }

    #[test]
    fn test_is_ancestor_case_sensitive() {
        assert!(!is_ancestor("/Photos", "/photos/2021"));
    }

    #[test]
    fn test_is_descendant_of_any() {
        let selected = ["/a", "/c"];
        assert!(is_descendant_of_any("/a/b", selected));
        assert!(!is_descendant_of_any("/a", selected));
        assert!(!is_descendant_of_any("/b", selected));
        assert!(!is_descendant_of_any("/a/b", Vec::<String>::new()));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("/photos/2021"), "2021");
        assert_eq!(display_name("/photos/2021/"), "2021");
        assert_eq!(display_name("/"), "/");
        assert_eq!(display_name("photos"), "photos");
    }
}
