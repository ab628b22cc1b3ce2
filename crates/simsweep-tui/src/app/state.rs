//! Application state types and enums.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use simsweep_client::ClientResult;
use simsweep_core::{
    Algorithm, DirEntry, DuplicateGroup, ProgressSnapshot, SelectionError, SelectionStore,
    SettingsSubmission,
};

use crate::picker::{DirectoryTreePresenter, ExpandTicket, NavigationGuard};
use crate::theme::ThemeVariant;

/// Application mode representing what receives key input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppMode {
    #[default]
    Normal,
    Help,
    /// Typing a directory path on the settings screen.
    EnteringPath,
    Quit,
}

/// Results of backend calls, delivered to the UI loop.
#[derive(Debug)]
pub enum BackendEvent {
    RootListing {
        ticket: ExpandTicket,
        result: ClientResult<Vec<DirEntry>>,
    },
    Listing {
        ticket: ExpandTicket,
        result: ClientResult<Vec<DirEntry>>,
    },
    Submitted(ClientResult<()>),
    Progress(ClientResult<ProgressSnapshot>),
    ActionDone(ClientResult<()>),
    /// `generation` numbers group fetches; only the latest one is applied.
    Groups {
        generation: u64,
        result: ClientResult<Vec<DuplicateGroup>>,
    },
}

/// A one-line message for the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub ok: bool,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            ok: true,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            ok: false,
            text: text.into(),
        }
    }
}

/// Everything owned by one settings screen.
///
/// A new screen gets fresh selection, guard and picker.
#[derive(Debug, Clone)]
pub struct SettingsScreen {
    pub selection: SelectionStore,
    pub guard: NavigationGuard,
    pub picker: DirectoryTreePresenter,
    pub algorithm: Algorithm,
    pub similarity: u8,
    /// Cursor into the selection rows.
    pub cursor: usize,
    /// A submission is in flight.
    pub submitting: bool,
}

impl SettingsScreen {
    pub fn new(algorithm: Algorithm, similarity: u8) -> Self {
        Self {
            selection: SelectionStore::new(),
            guard: NavigationGuard::new(),
            picker: DirectoryTreePresenter::new(),
            algorithm,
            similarity: similarity.min(SettingsSubmission::MAX_SIMILARITY),
            cursor: 0,
            submitting: false,
        }
    }

    /// A fresh screen for the next scan. Listings still in flight for this
    /// screen's picker are never applied to the new one.
    pub fn successor(&self, algorithm: Algorithm, similarity: u8) -> Self {
        Self {
            picker: self.picker.successor(),
            ..Self::new(algorithm, similarity)
        }
    }

    /// Add a directory and move the cursor onto it.
    pub fn add(&mut self, path: &str) -> Result<(), SelectionError> {
        self.selection.add(path)?;
        let normalized = simsweep_core::path::normalize(path);
        if let Some(index) = self
            .selection
            .display_rows()
            .iter()
            .position(|row| row.path == normalized)
        {
            self.cursor = index;
        }
        Ok(())
    }

    /// Remove the row under the cursor.
    pub fn remove_selected(&mut self) -> Option<String> {
        let row = self.selection.display_rows().into_iter().nth(self.cursor)?;
        self.selection.remove(&row.path);
        self.cursor = self.cursor.min(self.selection.len().saturating_sub(1));
        Some(row.path)
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let max = self.selection.len().saturating_sub(1) as isize;
        self.cursor = (self.cursor as isize + delta).clamp(0, max) as usize;
    }

    pub fn adjust_similarity(&mut self, delta: i16) {
        let value = (self.similarity as i16 + delta).clamp(0, SettingsSubmission::MAX_SIMILARITY as i16);
        self.similarity = value as u8;
    }

    pub fn can_submit(&self) -> bool {
        self.selection.can_submit() && !self.submitting
    }

    pub fn submission(&self) -> SettingsSubmission {
        SettingsSubmission::from_selection(&self.selection, self.algorithm, self.similarity)
    }
}

/// User preferences persisted between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    /// Backend base URL.
    pub server: String,
    /// Hash algorithm preselected on the settings screen.
    pub algorithm: Algorithm,
    /// Similarity threshold preselected on the settings screen.
    pub similarity: u8,
    /// `dark` or `light`.
    pub theme: String,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            server: simsweep_core::ClientConfig::default().base_url,
            algorithm: Algorithm::default(),
            similarity: SettingsSubmission::MAX_SIMILARITY,
            theme: "dark".to_string(),
        }
    }
}

impl UserSettings {
    /// Get the config file path.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("simsweep").join("settings.toml"))
    }

    /// Load settings from disk, or return defaults.
    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Load settings from a specific file, or return defaults.
    pub fn load_from(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|content| toml::from_str(&content).ok())
            .unwrap_or_default()
    }

    /// Save settings to disk.
    pub fn save(&self) -> std::io::Result<()> {
        let path = Self::config_path().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "No config directory")
        })?;
        self.save_to(&path)
    }

    /// Save settings to a specific file.
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        std::fs::write(path, content)
    }

    pub fn theme_variant(&self) -> ThemeVariant {
        match self.theme.as_str() {
            "light" => ThemeVariant::Light,
            _ => ThemeVariant::Dark,
        }
    }
}
