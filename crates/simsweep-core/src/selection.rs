//! The set of directories chosen for scanning.

use indexmap::IndexSet;

use crate::error::SelectionError;
use crate::path::{self, SEPARATOR};

/// Directories the operator has chosen to scan.
///
/// Paths are normalized on insert and kept unique. Redundant entries (paths
/// nested under another selected path) are kept as well, so the operator can
/// still see and remove them; they are only dropped from the list produced by
/// [`SelectionStore::snapshot_for_submit`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionStore {
    paths: IndexSet<String>,
}

/// One row of the selection display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionRow {
    /// The selected path.
    pub path: String,
    /// Number of selected ancestors of this path.
    pub depth: usize,
    /// Whether an ancestor is selected too (rendered dimmed).
    pub redundant: bool,
}

impl SelectionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directory.
    pub fn add(&mut self, raw: &str) -> Result<(), SelectionError> {
        if !path::is_absolute(raw) {
            return Err(SelectionError::NotAbsolute {
                path: raw.to_string(),
            });
        }
        let normalized = path::normalize(raw);
        if self.paths.contains(&normalized) {
            return Err(SelectionError::Duplicate { path: normalized });
        }
        self.paths.insert(normalized);
        Ok(())
    }

    /// Remove a directory. Removing an absent path is not an error.
    pub fn remove(&mut self, raw: &str) {
        self.paths.shift_remove(&path::normalize(raw));
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.paths.clear();
    }

    /// Check whether a path is selected.
    pub fn contains(&self, raw: &str) -> bool {
        self.paths.contains(&path::normalize(raw))
    }

    /// Number of selected paths, redundant ones included.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Whether the submit action is available.
    pub fn can_submit(&self) -> bool {
        !self.is_empty()
    }

    /// Iterate selected paths in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    /// The list handed to the settings submission.
    ///
    /// Every path nested under another selected path is dropped. The store
    /// itself is left untouched.
    pub fn snapshot_for_submit(&self) -> Vec<String> {
        self.paths
            .iter()
            .filter(|p| !path::is_descendant_of_any(p, &self.paths))
            .cloned()
            .collect()
    }

    /// Rows for the selection display, grouped by ancestry.
    ///
    /// Descendants directly follow their selected ancestor and carry the
    /// nesting depth. This is only a display aid.
    pub fn display_rows(&self) -> Vec<SelectionRow> {
        let mut sorted: Vec<&String> = self.paths.iter().collect();
        sorted.sort_by(|a, b| a.split(SEPARATOR).cmp(b.split(SEPARATOR)));

        sorted
            .into_iter()
            .map(|p| {
                let depth = self
                    .paths
                    .iter()
                    .filter(|other| path::is_ancestor(other, p))
                    .count();
                SelectionRow {
                    path: p.clone(),
                    depth,
                    redundant: depth > 0,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_normalizes() {
        let mut store = SelectionStore::new();
        store.add("/photos/").unwrap();
        assert!(store.contains("/photos"));
        assert_eq!(store.iter().collect::<Vec<_>>(), vec!["/photos"]);
    }

    #[test]
    fn test_add_rejects_relative() {
        let mut store = SelectionStore::new();
        let err = store.add("photos").unwrap_err();
        assert!(matches!(err, SelectionError::NotAbsolute { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_rejects_duplicate() {
        let mut store = SelectionStore::new();
        store.add("/photos").unwrap();
        let err = store.add("/photos/").unwrap_err();
        assert_eq!(
            err,
            SelectionError::Duplicate {
                path: "/photos".to_string()
            }
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut store = SelectionStore::new();
        store.add("/a").unwrap();
        store.remove("/b");
        assert_eq!(store.len(), 1);
        store.remove("/a/");
        assert!(store.is_empty());
        assert!(!store.can_submit());
    }

    #[test]
    fn test_snapshot_drops_descendants() {
        let mut store = SelectionStore::new();
        store.add("/a/b").unwrap();
        store.add("/c").unwrap();
        store.add("/a").unwrap();

        assert_eq!(store.snapshot_for_submit(), vec!["/c", "/a"]);
        // The store keeps the redundant entry.
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_display_rows_nest_descendants() {
        let mut store = SelectionStore::new();
        store.add("/b").unwrap();
        store.add("/a/x/y").unwrap();
        store.add("/a").unwrap();
        store.add("/a/x").unwrap();
        store.add("/ab").unwrap();

        let rows = store.display_rows();
        let summary: Vec<(&str, usize)> =
            rows.iter().map(|r| (r.path.as_str(), r.depth)).collect();
        assert_eq!(
            summary,
            vec![("/a", 0), ("/a/x", 1), ("/a/x/y", 2), ("/ab", 0), ("/b", 0)]
        );
        assert!(rows[1].redundant);
        assert!(!rows[3].redundant);
    }
}
