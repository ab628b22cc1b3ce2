//! Cursor movement shared by the picker tree and the group tiles.

use super::constants::PAGE_SIZE;
use crate::event::KeyAction;

/// A list with one highlighted row.
pub trait ListNavigator {
    fn selected(&self) -> usize;

    /// Store the cursor. Callers pass an index already clamped to the rows.
    fn store_selected(&mut self, index: usize);

    fn row_count(&self) -> usize;

    /// Index of the last row, or 0 when the list is empty.
    fn last_index(&self) -> usize {
        self.row_count().saturating_sub(1)
    }

    fn select(&mut self, index: usize) {
        let index = index.min(self.last_index());
        self.store_selected(index);
    }

    /// Apply a movement key. Returns `false` when `action` does not move
    /// the cursor, leaving it for the caller.
    fn navigate(&mut self, action: KeyAction) -> bool {
        let current = self.selected();
        let target = match action {
            KeyAction::MoveUp => current.saturating_sub(1),
            KeyAction::MoveDown => current.saturating_add(1),
            KeyAction::PageUp => current.saturating_sub(PAGE_SIZE),
            KeyAction::PageDown => current.saturating_add(PAGE_SIZE),
            KeyAction::JumpToTop => 0,
            KeyAction::JumpToBottom => usize::MAX,
            _ => return false,
        };
        self.select(target);
        true
    }
}
