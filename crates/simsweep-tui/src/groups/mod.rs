//! Duplicate group tiles and the grab/drop action resolver.

mod resolver;
mod view;

pub use resolver::{ActionChoice, ActionMenu, ActionResolver, ResolverState};
pub use view::{DuplicateGroupView, Grab, TileRef};
