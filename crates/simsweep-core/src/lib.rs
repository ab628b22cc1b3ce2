//! Core types and path logic for simsweep.
//!
//! This crate holds everything that does not need a terminal or a network:
//! path hierarchy predicates, the directory selection set, the duplicate
//! group model and the client configuration.

mod config;
mod error;
mod group;
pub mod path;
mod progress;
mod selection;

pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{ConfigError, SelectionError};
pub use group::{
    ActionRequest, Algorithm, CandidateFile, DateSource, DirEntry, DragGesture, DuplicateGroup,
    GroupAction, SettingsSubmission,
};
pub use progress::{ProgressSnapshot, ProgressStep, Screen, StepProgress};
pub use selection::{SelectionRow, SelectionStore};
