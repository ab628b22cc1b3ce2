//! Expandable directory nodes.

use compact_str::CompactString;

use simsweep_core::DirEntry;

/// Expansion state of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeState {
    #[default]
    Collapsed,
    /// A listing request is in flight; further expand requests are ignored.
    Expanding,
    Expanded,
}

/// Identifies one listing request so its result can be matched against the
/// node that is still waiting for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpandTicket {
    /// Path of the node being expanded. Empty for the root listing.
    pub path: String,
    /// Child indices from the roots down to the node. Empty for the root
    /// listing. Paths are not unique in the tree: allowed roots may nest.
    pub position: Vec<usize>,
    pub generation: u64,
}

/// What applying a listing result did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpandOutcome {
    /// Children were attached.
    Expanded { children: usize },
    /// The result was stale and ignored.
    Discarded,
    /// The fetch failed and the error should be shown.
    Failed(String),
    /// The fetch failed while leaving the screen; nothing is shown.
    Swallowed,
}

/// One directory in the picker tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub path: String,
    pub name: CompactString,
    pub state: NodeState,
    /// `Some` only while expanded.
    pub children: Option<Vec<TreeNode>>,
    /// Generation of the listing this node is waiting for.
    pending: Option<u64>,
}

impl TreeNode {
    /// Create a collapsed node.
    pub fn new(path: impl Into<String>, name: impl Into<CompactString>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            state: NodeState::Collapsed,
            children: None,
            pending: None,
        }
    }

    /// Whether the expand affordance is available.
    pub fn can_expand(&self) -> bool {
        self.state == NodeState::Collapsed
    }

    /// Whether a listing result for `generation` may still be applied.
    pub fn awaits(&self, generation: u64) -> bool {
        self.state == NodeState::Expanding && self.pending == Some(generation)
    }

    pub(crate) fn begin_expand(&mut self, generation: u64) -> bool {
        if !self.can_expand() {
            return false;
        }
        self.state = NodeState::Expanding;
        self.pending = Some(generation);
        true
    }

    pub(crate) fn finish_expand(&mut self, entries: Vec<DirEntry>) -> usize {
        let children: Vec<TreeNode> = sorted(entries).into_iter().map(TreeNode::from).collect();
        let count = children.len();
        self.state = NodeState::Expanded;
        self.children = Some(children);
        self.pending = None;
        count
    }

    /// Drop children and pending interest. Returns false if already collapsed.
    pub(crate) fn collapse(&mut self) -> bool {
        if self.state == NodeState::Collapsed {
            return false;
        }
        self.state = NodeState::Collapsed;
        self.children = None;
        self.pending = None;
        true
    }

    /// The loaded descendant at `position`, given as child indices. An empty
    /// position is this node.
    pub fn descendant(&self, position: &[usize]) -> Option<&TreeNode> {
        match position.split_first() {
            None => Some(self),
            Some((index, rest)) => self.children.as_ref()?.get(*index)?.descendant(rest),
        }
    }

    pub(crate) fn descendant_mut(&mut self, position: &[usize]) -> Option<&mut TreeNode> {
        match position.split_first() {
            None => Some(self),
            Some((index, rest)) => self.children.as_mut()?.get_mut(*index)?.descendant_mut(rest),
        }
    }
}

impl From<DirEntry> for TreeNode {
    fn from(entry: DirEntry) -> Self {
        Self::new(entry.path, entry.name)
    }
}

/// Sort listing entries by display name, ignoring case.
pub fn sorted(mut entries: Vec<DirEntry>) -> Vec<DirEntry> {
    entries.sort_by_cached_key(|entry| (entry.name.to_lowercase(), entry.name.clone()));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> DirEntry {
        DirEntry::new(name, format!("/root/{name}"))
    }

    #[test]
    fn test_sorted_ignores_case() {
        let names: Vec<_> = sorted(vec![entry("beta"), entry("Alpha"), entry("alpha2"), entry("Gamma")])
            .into_iter()
            .map(|e| e.name.to_string())
            .collect();
        assert_eq!(names, vec!["Alpha", "alpha2", "beta", "Gamma"]);
    }

    #[test]
    fn test_state_machine() {
        let mut node = TreeNode::new("/root", "root");
        assert!(node.begin_expand(1));
        assert!(!node.begin_expand(2));
        assert!(node.awaits(1));
        assert!(!node.awaits(2));

        assert_eq!(node.finish_expand(vec![entry("b"), entry("a")]), 2);
        assert_eq!(node.state, NodeState::Expanded);
        assert_eq!(node.children.as_ref().unwrap()[0].name, "a");

        assert!(node.collapse());
        assert!(node.children.is_none());
        assert!(!node.collapse());
    }

    #[test]
    fn test_descendant_by_position() {
        let mut node = TreeNode::new("/root", "root");
        assert_eq!(node.descendant(&[]).map(|n| n.path.as_str()), Some("/root"));
        assert!(node.descendant(&[0]).is_none());

        node.begin_expand(1);
        node.finish_expand(vec![entry("b"), entry("a")]);
        assert_eq!(node.descendant(&[1]).map(|n| n.path.as_str()), Some("/root/b"));
        assert!(node.descendant(&[2]).is_none());
        assert!(node.descendant(&[0, 0]).is_none());
    }
}
