//! Terminal user interface for simsweep.
//!
//! This crate drives a remote similar-image duplicate backend from the
//! terminal, built with ratatui.
//!
//! # Overview
//!
//! The interface follows the backend through three screens:
//!
//! - **Settings** - pick directories on the server, choose the hash
//!   algorithm and similarity, start a scan
//! - **Progress** - poll the running scan
//! - **Results** - grab a file tile, drop it on another file of the same
//!   group and choose how to resolve the pair
//!
//! # Usage
//!
//! ```rust,no_run
//! use simsweep_client::HttpBackend;
//! use simsweep_core::ClientConfig;
//! use simsweep_tui::{TuiConfig, UserSettings};
//!
//! let config = ClientConfig::default();
//! let backend = HttpBackend::new(config.clone()).unwrap();
//! simsweep_tui::run(backend, TuiConfig::new(&config, UserSettings::load())).unwrap();
//! ```
//!
//! # Keyboard Navigation
//!
//! - `o` - Browse server directories
//! - `Space` - Add a directory / grab a tile
//! - `Enter` - Start the scan / drop a tile / apply an action
//! - `R` - Refresh groups
//! - `?` - Help
//! - `q` - Quit

pub mod app;
mod event;
pub mod groups;
pub mod picker;
mod theme;
mod ui;

use std::time::Duration;

use simsweep_client::Backend;
use simsweep_core::ClientConfig;

pub use app::state::UserSettings;
pub use app::{App, AppResult};
pub use theme::Theme;

/// Settings for one interactive session.
#[derive(Debug, Clone)]
pub struct TuiConfig {
    /// Base URL shown in the header.
    pub server: String,
    /// Delay between progress polls.
    pub poll_interval: Duration,
    /// Persisted preferences.
    pub settings: UserSettings,
}

impl TuiConfig {
    pub fn new(client: &ClientConfig, settings: UserSettings) -> Self {
        Self {
            server: client.base_url.clone(),
            poll_interval: client.poll_interval(),
            settings,
        }
    }
}

/// Run the TUI application against `backend`.
pub fn run<B: Backend>(backend: B, config: TuiConfig) -> AppResult<()> {
    // Create tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new()?;

    let terminal = ratatui::init();
    let result = rt.block_on(App::new(backend, config).run(terminal));
    ratatui::restore();

    // Shutdown runtime immediately to cancel in-flight requests
    rt.shutdown_timeout(Duration::from_millis(100));

    result
}
