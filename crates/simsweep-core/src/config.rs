//! Client configuration types.

use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default server the backend listens on.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Configuration for talking to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ClientConfig {
    /// Base URL of the backend, without a trailing slash.
    pub base_url: String,

    /// Directory listing endpoint.
    #[builder(default = "default_listing_endpoint()")]
    #[serde(default = "default_listing_endpoint")]
    pub listing_endpoint: String,

    /// Settings submission endpoint.
    #[builder(default = "default_settings_endpoint()")]
    #[serde(default = "default_settings_endpoint")]
    pub settings_endpoint: String,

    /// Progress polling endpoint.
    #[builder(default = "default_progress_endpoint()")]
    #[serde(default = "default_progress_endpoint")]
    pub progress_endpoint: String,

    /// Endpoint returning the duplicate group list.
    #[builder(default = "default_progress_endpoint()")]
    #[serde(default = "default_progress_endpoint")]
    pub groups_endpoint: String,

    /// Duplicate group action endpoint.
    #[builder(default = "default_action_endpoint()")]
    #[serde(default = "default_action_endpoint")]
    pub action_endpoint: String,

    /// Progress poll interval in milliseconds.
    #[builder(default = "1000")]
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_listing_endpoint() -> String {
    "/list_directories".to_string()
}

fn default_settings_endpoint() -> String {
    "/settings".to_string()
}

fn default_progress_endpoint() -> String {
    "/progress/data".to_string()
}

fn default_action_endpoint() -> String {
    "/api/duplicate_group_action".to_string()
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn is_http_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"));
    rest.is_some_and(|host| !host.is_empty())
}

impl ClientConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match &self.base_url {
            Some(url) if is_http_url(url) => {}
            Some(url) => return Err(format!("Base URL must be http(s): {url:?}")),
            None => return Err("Base URL is required".to_string()),
        }
        if self.poll_interval_ms == Some(0) {
            return Err("Poll interval must be positive".to_string());
        }
        Ok(())
    }
}

impl ClientConfig {
    /// Create a new config builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Create a config with default endpoints for a server.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let base_url = base_url.into();
        if !is_http_url(&base_url) {
            return Err(ConfigError::InvalidBaseUrl { url: base_url });
        }
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            listing_endpoint: default_listing_endpoint(),
            settings_endpoint: default_settings_endpoint(),
            progress_endpoint: default_progress_endpoint(),
            groups_endpoint: default_progress_endpoint(),
            action_endpoint: default_action_endpoint(),
            poll_interval_ms: default_poll_interval_ms(),
        })
    }

    /// Join an endpoint path onto the base URL.
    pub fn url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    /// Progress poll interval.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            listing_endpoint: default_listing_endpoint(),
            settings_endpoint: default_settings_endpoint(),
            progress_endpoint: default_progress_endpoint(),
            groups_endpoint: default_progress_endpoint(),
            action_endpoint: default_action_endpoint(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}
