//! Duplicate groups rendered as grabbable tiles.

use simsweep_core::{CandidateFile, DragGesture, DuplicateGroup};

use crate::app::navigation::ListNavigator;

/// Position of one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRef {
    pub group: usize,
    pub file: usize,
}

/// The tile currently picked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grab {
    pub group: usize,
    pub path: String,
}

/// Groups of candidate files with a tile cursor and a grab slot.
#[derive(Debug, Clone, Default)]
pub struct DuplicateGroupView {
    groups: Vec<DuplicateGroup>,
    tiles: Vec<TileRef>,
    selected: usize,
    grabbed: Option<Grab>,
}

impl DuplicateGroupView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all groups wholesale. Drops the grab and keeps the cursor in
    /// range.
    pub fn replace(&mut self, groups: Vec<DuplicateGroup>) {
        self.tiles = groups
            .iter()
            .enumerate()
            .flat_map(|(g, group)| (0..group.len()).map(move |f| TileRef { group: g, file: f }))
            .collect();
        self.groups = groups;
        self.grabbed = None;
        self.selected = self.selected.min(self.last_index());
    }

    pub fn groups(&self) -> &[DuplicateGroup] {
        &self.groups
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Tile under the cursor.
    pub fn current(&self) -> Option<TileRef> {
        self.tiles.get(self.selected).copied()
    }

    pub fn file(&self, tile: TileRef) -> Option<&CandidateFile> {
        self.groups.get(tile.group)?.files.get(tile.file)
    }

    pub fn current_file(&self) -> Option<&CandidateFile> {
        self.file(self.current()?)
    }

    pub fn grabbed(&self) -> Option<&Grab> {
        self.grabbed.as_ref()
    }

    pub fn is_grabbed(&self, tile: TileRef) -> bool {
        match (&self.grabbed, self.file(tile)) {
            (Some(grab), Some(file)) => grab.group == tile.group && grab.path == file.canonical_path(),
            _ => false,
        }
    }

    /// Pick up the tile under the cursor, or put it back if it is already
    /// held.
    pub fn toggle_grab(&mut self) {
        let Some(tile) = self.current() else {
            return;
        };
        if self.is_grabbed(tile) {
            self.grabbed = None;
            return;
        }
        self.grabbed = self.file(tile).map(|file| Grab {
            group: tile.group,
            path: file.canonical_path().to_string(),
        });
    }

    pub fn release(&mut self) {
        self.grabbed = None;
    }

    /// Drop the held tile onto the tile under the cursor.
    ///
    /// Releases the grab. The gesture may still be invalid (different group
    /// or same file); validation is up to the caller.
    pub fn drop_gesture(&mut self) -> Option<DragGesture> {
        let target = self.current()?;
        let target_path = self.file(target)?.canonical_path().to_string();
        let grab = self.grabbed.take()?;
        Some(DragGesture::new(grab.path, grab.group, target_path, target.group))
    }

    /// Move the cursor to the first tile of the next group.
    pub fn next_group(&mut self) {
        let Some(current) = self.current() else {
            return;
        };
        if let Some(index) = self.tiles.iter().position(|t| t.group > current.group) {
            self.selected = index;
        }
    }

    /// Move the cursor to the first tile of the previous group, or to the
    /// start of the current one.
    pub fn prev_group(&mut self) {
        let Some(current) = self.current() else {
            return;
        };
        let target_group = if current.file == 0 {
            current.group.saturating_sub(1)
        } else {
            current.group
        };
        if let Some(index) = self.tiles.iter().position(|t| t.group == target_group) {
            self.selected = index;
        }
    }

    /// All tiles in display order.
    pub fn tiles(&self) -> &[TileRef] {
        &self.tiles
    }
}

impl ListNavigator for DuplicateGroupView {
    fn selected(&self) -> usize {
        self.selected
    }

    fn store_selected(&mut self, index: usize) {
        self.selected = index;
    }

    fn row_count(&self) -> usize {
        self.tiles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::test_support::{file, group};
    use crate::event::KeyAction;

    fn view() -> DuplicateGroupView {
        let mut view = DuplicateGroupView::new();
        view.replace(vec![
            group(&[file("/a1.jpg"), file("/a2.jpg")]),
            group(&[file("/b1.jpg"), file("/b2.jpg"), file("/b3.jpg")]),
        ]);
        view
    }

    #[test]
    fn test_tiles_flatten_groups() {
        let view = view();
        assert_eq!(view.tile_count(), 5);
        assert_eq!(view.current(), Some(TileRef { group: 0, file: 0 }));
    }

    #[test]
    fn test_grab_and_drop_within_group() {
        let mut view = view();
        view.toggle_grab();
        view.navigate(KeyAction::MoveDown);
        let gesture = view.drop_gesture().unwrap();
        assert_eq!(gesture, DragGesture::new("/a1.jpg", 0, "/a2.jpg", 0));
        assert!(gesture.is_valid());
        assert!(view.grabbed().is_none());
    }

    #[test]
    fn test_drop_across_groups_builds_invalid_gesture() {
        let mut view = view();
        view.toggle_grab();
        view.next_group();
        let gesture = view.drop_gesture().unwrap();
        assert_eq!(gesture.target_group, 1);
        assert!(!gesture.is_valid());
    }

    #[test]
    fn test_drop_without_grab() {
        let mut view = view();
        assert!(view.drop_gesture().is_none());
    }

    #[test]
    fn test_toggle_grab_releases() {
        let mut view = view();
        view.toggle_grab();
        assert!(view.is_grabbed(TileRef { group: 0, file: 0 }));
        view.toggle_grab();
        assert!(view.grabbed().is_none());
    }

    #[test]
    fn test_replace_clamps_cursor_and_drops_grab() {
        let mut view = view();
        view.navigate(KeyAction::JumpToBottom);
        view.toggle_grab();
        view.replace(vec![group(&[file("/a1.jpg"), file("/a2.jpg")])]);
        assert_eq!(view.selected(), 1);
        assert!(view.grabbed().is_none());
    }

    #[test]
    fn test_group_jumps() {
        let mut view = view();
        view.select(3);
        assert_eq!(view.current(), Some(TileRef { group: 1, file: 1 }));
        view.prev_group();
        assert_eq!(view.current(), Some(TileRef { group: 1, file: 0 }));
        view.prev_group();
        assert_eq!(view.current(), Some(TileRef { group: 0, file: 0 }));
        view.next_group();
        assert_eq!(view.current(), Some(TileRef { group: 1, file: 0 }));
    }
}
