//! Remote directory picker: lazily expanded tree shown in an overlay.

pub mod guard;
mod node;
mod presenter;

pub use guard::NavigationGuard;
pub use node::{ExpandOutcome, ExpandTicket, NodeState, TreeNode};
pub use presenter::{DirectoryTreePresenter, PickerRow, RootState, RowKind};
