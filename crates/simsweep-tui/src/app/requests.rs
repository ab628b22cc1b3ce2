//! Backend calls run on their own tasks and report over the event channel.

use std::future::Future;

use tokio::sync::mpsc;

use simsweep_client::Backend;
use simsweep_core::{ActionRequest, SettingsSubmission};

use super::state::BackendEvent;
use crate::picker::ExpandTicket;

/// Spawns backend requests for the UI loop.
#[derive(Debug, Clone)]
pub struct Requests<B> {
    backend: B,
    tx: mpsc::Sender<BackendEvent>,
}

impl<B: Backend> Requests<B> {
    pub fn new(backend: B, tx: mpsc::Sender<BackendEvent>) -> Self {
        Self { backend, tx }
    }

    fn spawn<F>(&self, request: F)
    where
        F: Future<Output = BackendEvent> + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let event = request.await;
            // The receiver is gone only when the app is shutting down.
            let _ = tx.send(event).await;
        });
    }

    /// List the backend's allowed roots.
    pub fn root_listing(&self, ticket: ExpandTicket) {
        let backend = self.backend.clone();
        self.spawn(async move {
            let result = backend.list_directories(&ticket.path).await;
            BackendEvent::RootListing { ticket, result }
        });
    }

    /// List the children of a node.
    pub fn listing(&self, ticket: ExpandTicket) {
        let backend = self.backend.clone();
        self.spawn(async move {
            let result = backend.list_directories(&ticket.path).await;
            BackendEvent::Listing { ticket, result }
        });
    }

    pub fn submit(&self, submission: SettingsSubmission) {
        let backend = self.backend.clone();
        self.spawn(async move { BackendEvent::Submitted(backend.submit_settings(&submission).await) });
    }

    pub fn progress(&self) {
        let backend = self.backend.clone();
        self.spawn(async move { BackendEvent::Progress(backend.progress().await) });
    }

    pub fn action(&self, request: ActionRequest) {
        let backend = self.backend.clone();
        self.spawn(async move { BackendEvent::ActionDone(backend.group_action(&request).await) });
    }

    pub fn groups(&self, generation: u64) {
        let backend = self.backend.clone();
        self.spawn(async move {
            let result = backend.duplicate_groups().await;
            BackendEvent::Groups { generation, result }
        });
    }
}
