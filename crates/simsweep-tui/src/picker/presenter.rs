//! The directory picker overlay.

use tracing::{debug, warn};

use simsweep_client::ClientResult;
use simsweep_core::DirEntry;

use super::guard::NavigationGuard;
use super::node::{ExpandOutcome, ExpandTicket, NodeState, TreeNode, sorted};
use crate::app::navigation::ListNavigator;

/// Root listing lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RootState {
    #[default]
    Idle,
    Loading { generation: u64 },
    Loaded,
    Failed(String),
}

/// What a flattened row shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Node(NodeState),
    /// Placeholder under a node whose listing is in flight.
    Loading,
}

/// A flattened visible row of the picker tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerRow {
    pub path: String,
    /// Child indices of the node this row belongs to.
    pub position: Vec<usize>,
    pub name: String,
    pub kind: RowKind,
    pub depth: usize,
    pub is_last_sibling: bool,
    pub parent_last_siblings: Vec<bool>,
}

/// Tree of remote directories shown inside the picker overlay.
#[derive(Debug, Clone, Default)]
pub struct DirectoryTreePresenter {
    roots: Vec<TreeNode>,
    root_state: RootState,
    visible: bool,
    /// Monotonic across the presenter's life so re-created nodes never match
    /// an old ticket.
    next_generation: u64,
    selected: usize,
}

impl DirectoryTreePresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty presenter that continues this one's generation counter, so
    /// listings issued by this one can never match the successor's nodes.
    pub fn successor(&self) -> Self {
        Self {
            next_generation: self.next_generation,
            ..Self::default()
        }
    }

    fn bump(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    /// Show the overlay and restart the root listing.
    ///
    /// Returns the ticket for the root listing request (empty path).
    pub fn open(&mut self) -> ExpandTicket {
        let generation = self.bump();
        self.roots.clear();
        self.root_state = RootState::Loading { generation };
        self.visible = true;
        self.selected = 0;
        debug!(generation, "Opening directory picker");
        ExpandTicket {
            path: String::new(),
            position: Vec::new(),
            generation,
        }
    }

    /// Apply the root listing.
    pub fn complete_open(
        &mut self,
        ticket: &ExpandTicket,
        result: ClientResult<Vec<DirEntry>>,
        guard: &NavigationGuard,
    ) -> ExpandOutcome {
        if self.root_state != (RootState::Loading { generation: ticket.generation }) {
            debug!(generation = ticket.generation, "Discarding stale root listing");
            return ExpandOutcome::Discarded;
        }
        match result {
            Ok(entries) => {
                self.roots = sorted(entries).into_iter().map(TreeNode::from).collect();
                self.root_state = RootState::Loaded;
                ExpandOutcome::Expanded {
                    children: self.roots.len(),
                }
            }
            Err(err) => {
                let message = err.summary();
                self.root_state = RootState::Failed(message.clone());
                report_failure("", message, guard)
            }
        }
    }

    /// Hide the overlay. The tree is kept until the next [`open`](Self::open).
    pub fn close(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn root_state(&self) -> &RootState {
        &self.root_state
    }

    pub fn roots(&self) -> &[TreeNode] {
        &self.roots
    }

    /// The loaded node at `position` (child indices from the roots).
    pub fn node_at(&self, position: &[usize]) -> Option<&TreeNode> {
        let (index, rest) = position.split_first()?;
        self.roots.get(*index)?.descendant(rest)
    }

    fn node_at_mut(&mut self, position: &[usize]) -> Option<&mut TreeNode> {
        let (index, rest) = position.split_first()?;
        self.roots.get_mut(*index)?.descendant_mut(rest)
    }

    /// Start expanding the collapsed node at `position`.
    ///
    /// Returns `None` when the node is missing or not collapsed, in which
    /// case no request must be issued.
    pub fn begin_expand(&mut self, position: &[usize]) -> Option<ExpandTicket> {
        let generation = self.next_generation + 1;
        let node = self.node_at_mut(position)?;
        if !node.begin_expand(generation) {
            return None;
        }
        let path = node.path.clone();
        self.next_generation = generation;
        debug!(path, ?position, generation, "Expanding node");
        Some(ExpandTicket {
            path,
            position: position.to_vec(),
            generation,
        })
    }

    /// Collapse the node at `position`. Any listing still in flight for it
    /// is ignored when it resolves.
    pub fn collapse(&mut self, position: &[usize]) -> bool {
        let collapsed = self.node_at_mut(position).is_some_and(TreeNode::collapse);
        if collapsed {
            self.clamp_selection();
        }
        collapsed
    }

    /// Apply a listing result for a node.
    pub fn complete_expand(
        &mut self,
        ticket: &ExpandTicket,
        result: ClientResult<Vec<DirEntry>>,
        guard: &NavigationGuard,
    ) -> ExpandOutcome {
        let Some(node) = self
            .node_at_mut(&ticket.position)
            .filter(|node| node.path == ticket.path)
        else {
            debug!(path = %ticket.path, "Discarding listing for a node that is gone");
            return ExpandOutcome::Discarded;
        };
        if !node.awaits(ticket.generation) {
            debug!(path = %ticket.path, generation = ticket.generation, "Discarding stale listing");
            return ExpandOutcome::Discarded;
        }
        match result {
            Ok(entries) => ExpandOutcome::Expanded {
                children: node.finish_expand(entries),
            },
            Err(err) => {
                node.collapse();
                report_failure(&ticket.path, err.summary(), guard)
            }
        }
    }

    /// Flatten the loaded tree into display rows.
    pub fn visible_rows(&self) -> Vec<PickerRow> {
        let mut rows = Vec::new();
        let count = self.roots.len();
        for (i, root) in self.roots.iter().enumerate() {
            flatten(root, vec![i], i + 1 == count, &[], &mut rows);
        }
        rows
    }

    /// Row under the cursor.
    pub fn selected_row(&self) -> Option<PickerRow> {
        self.visible_rows().into_iter().nth(self.selected)
    }

    /// Path of the directory under the cursor. Loading rows have none.
    pub fn selected_path(&self) -> Option<String> {
        self.selected_row()
            .filter(|row| matches!(row.kind, RowKind::Node(_)))
            .map(|row| row.path)
    }

    /// Position of the directory under the cursor. Loading rows have none.
    pub fn selected_position(&self) -> Option<Vec<usize>> {
        self.selected_row()
            .filter(|row| matches!(row.kind, RowKind::Node(_)))
            .map(|row| row.position)
    }

    pub fn expand_selected(&mut self) -> Option<ExpandTicket> {
        let position = self.selected_position()?;
        self.begin_expand(&position)
    }

    /// Collapse the node under the cursor, or move to its parent if it is
    /// already collapsed.
    pub fn collapse_selected(&mut self) {
        let Some(position) = self.selected_position() else {
            return;
        };
        if self.collapse(&position) {
            return;
        }
        let rows = self.visible_rows();
        let Some(depth) = rows.get(self.selected).map(|row| row.depth) else {
            return;
        };
        if depth == 0 {
            return;
        }
        if let Some(parent) = rows[..self.selected]
            .iter()
            .rposition(|row| row.depth + 1 == depth)
        {
            self.selected = parent;
        }
    }

    pub fn toggle_selected(&mut self) -> Option<ExpandTicket> {
        let position = self.selected_position()?;
        if self.node_at(&position)?.can_expand() {
            self.begin_expand(&position)
        } else {
            self.collapse(&position);
            None
        }
    }

    fn clamp_selection(&mut self) {
        let max = self.last_index();
        if self.selected > max {
            self.selected = max;
        }
    }
}

impl ListNavigator for DirectoryTreePresenter {
    fn selected(&self) -> usize {
        self.selected
    }

    fn store_selected(&mut self, index: usize) {
        self.selected = index;
    }

    fn row_count(&self) -> usize {
        self.visible_rows().len()
    }
}

fn report_failure(path: &str, message: String, guard: &NavigationGuard) -> ExpandOutcome {
    if guard.is_leaving() {
        debug!(path, %message, "Swallowing listing failure while leaving");
        ExpandOutcome::Swallowed
    } else {
        warn!(path, %message, "Listing failed");
        ExpandOutcome::Failed(message)
    }
}

fn flatten(
    node: &TreeNode,
    position: Vec<usize>,
    is_last: bool,
    parent_last_siblings: &[bool],
    rows: &mut Vec<PickerRow>,
) {
    let depth = position.len().saturating_sub(1);
    rows.push(PickerRow {
        path: node.path.clone(),
        position: position.clone(),
        name: node.name.to_string(),
        kind: RowKind::Node(node.state),
        depth,
        is_last_sibling: is_last,
        parent_last_siblings: parent_last_siblings.to_vec(),
    });

    let mut child_lasts = parent_last_siblings.to_vec();
    child_lasts.push(is_last);

    match (node.state, &node.children) {
        (NodeState::Expanding, _) => rows.push(PickerRow {
            path: node.path.clone(),
            position,
            name: "loading…".to_string(),
            kind: RowKind::Loading,
            depth: depth + 1,
            is_last_sibling: true,
            parent_last_siblings: child_lasts,
        }),
        (NodeState::Expanded, Some(children)) => {
            let count = children.len();
            for (i, child) in children.iter().enumerate() {
                let mut child_position = position.clone();
                child_position.push(i);
                flatten(child, child_position, i + 1 == count, &child_lasts, rows);
            }
        }
        _ => {}
    }
}
