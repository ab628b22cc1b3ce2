//! Error suppression once the operator leaves the settings screen.

/// One-way latch set when the settings submission succeeds.
///
/// Listing failures that resolve after the latch is set are swallowed: the
/// operator has already moved on and the tree is about to be discarded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigationGuard {
    leaving: bool,
}

impl NavigationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the screen as being left. Cannot be undone.
    pub fn commit(&mut self) {
        self.leaving = true;
    }

    pub fn is_leaving(&self) -> bool {
        self.leaving
    }
}
