//! The backend seam used by the terminal client.

use std::future::Future;

use simsweep_core::{ActionRequest, DirEntry, DuplicateGroup, ProgressSnapshot, SettingsSubmission};

use crate::error::ClientResult;

/// Operations the client needs from the duplicate detection backend.
///
/// Implementations are cheap to clone so each request can run on its own
/// task.
pub trait Backend: Clone + Send + Sync + 'static {
    /// List the subdirectories of `path`. The empty path lists the roots the
    /// backend allows.
    fn list_directories(
        &self,
        path: &str,
    ) -> impl Future<Output = ClientResult<Vec<DirEntry>>> + Send;

    /// Start a scan.
    fn submit_settings(
        &self,
        submission: &SettingsSubmission,
    ) -> impl Future<Output = ClientResult<()>> + Send;

    /// Fetch the current scan progress.
    fn progress(&self) -> impl Future<Output = ClientResult<ProgressSnapshot>> + Send;

    /// Fetch every duplicate group.
    fn duplicate_groups(&self) -> impl Future<Output = ClientResult<Vec<DuplicateGroup>>> + Send;

    /// Apply an action to a pair of files within one group.
    fn group_action(&self, request: &ActionRequest)
    -> impl Future<Output = ClientResult<()>> + Send;
}
