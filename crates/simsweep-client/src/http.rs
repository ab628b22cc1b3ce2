//! reqwest implementation of [`Backend`].

use std::sync::Arc;

use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use simsweep_core::{
    ActionRequest, ClientConfig, DirEntry, DuplicateGroup, ProgressSnapshot, SettingsSubmission,
};

use crate::backend::Backend;
use crate::error::{ClientError, ClientResult};

/// Backend reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    config: Arc<ClientConfig>,
}

/// Body of the directory listing endpoint.
#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum ListingEnvelope {
    Success {
        #[serde(default)]
        directories: Vec<DirEntry>,
    },
    Error {
        #[serde(default)]
        message: String,
    },
}

#[derive(Debug, Deserialize)]
struct GroupsEnvelope {
    #[serde(default)]
    group_list: Vec<DuplicateGroup>,
}

impl HttpBackend {
    /// Create a backend for the given configuration.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("simsweep/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| ClientError::Transport {
                url: config.base_url.clone(),
                source,
            })?;
        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    /// The configuration this backend was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn send(&self, url: &str, request: reqwest::RequestBuilder) -> ClientResult<Response> {
        request.send().await.map_err(|source| ClientError::Transport {
            url: url.to_string(),
            source,
        })
    }

    async fn read(&self, url: &str, response: Response) -> ClientResult<(StatusCode, String)> {
        let status = response.status();
        let body = response.text().await.map_err(|source| ClientError::Transport {
            url: url.to_string(),
            source,
        })?;
        Ok((status, body))
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> ClientResult<T> {
        let url = self.config.url(endpoint);
        let response = self.send(&url, self.client.get(&url)).await?;
        let (status, body) = self.read(&url, response).await?;
        decode_json(&url, status, &body)
    }
}

impl Backend for HttpBackend {
    async fn list_directories(&self, path: &str) -> ClientResult<Vec<DirEntry>> {
        let url = self.config.url(&self.config.listing_endpoint);
        debug!(%url, path, "Listing directories");
        let request = self.client.get(&url).query(&[("path", path)]);
        let response = self.send(&url, request).await?;
        let (status, body) = self.read(&url, response).await?;
        decode_listing(&url, status, &body)
    }

    async fn submit_settings(&self, submission: &SettingsSubmission) -> ClientResult<()> {
        let url = self.config.url(&self.config.settings_endpoint);
        let fields = form_fields(submission).map_err(|err| ClientError::Decode {
            url: url.clone(),
            message: err.to_string(),
        })?;
        debug!(%url, directories = submission.directories.len(), "Submitting settings");
        let response = self.send(&url, self.client.post(&url).form(&fields)).await?;
        check_status(&url, response.status())
    }

    async fn progress(&self) -> ClientResult<ProgressSnapshot> {
        self.get_json(&self.config.progress_endpoint).await
    }

    async fn duplicate_groups(&self) -> ClientResult<Vec<DuplicateGroup>> {
        let envelope: GroupsEnvelope = self.get_json(&self.config.groups_endpoint).await?;
        Ok(envelope.group_list)
    }

    async fn group_action(&self, request: &ActionRequest) -> ClientResult<()> {
        let url = self.config.url(&self.config.action_endpoint);
        debug!(%url, action = %request.action, source = %request.source, target = %request.target, "Issuing group action");
        let response = self.send(&url, self.client.post(&url).json(request)).await?;
        check_status(&url, response.status())
    }
}

/// Form fields of a settings submission. `directories` travels as a JSON
/// encoded string.
pub fn form_fields(
    submission: &SettingsSubmission,
) -> Result<Vec<(&'static str, String)>, serde_json::Error> {
    Ok(vec![
        ("directories", serde_json::to_string(&submission.directories)?),
        ("algorithm", submission.algorithm.to_string()),
        ("similarity", submission.similarity.to_string()),
    ])
}

fn reason(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or("Unknown").to_string()
}

fn check_status(url: &str, status: StatusCode) -> ClientResult<()> {
    if status.is_success() {
        Ok(())
    } else {
        warn!(url, status = status.as_u16(), "Request rejected");
        Err(ClientError::Rejected {
            url: url.to_string(),
            status: status.as_u16(),
            reason: reason(status),
        })
    }
}

fn decode_json<T: DeserializeOwned>(url: &str, status: StatusCode, body: &str) -> ClientResult<T> {
    check_status(url, status)?;
    serde_json::from_str(body).map_err(|err| ClientError::Decode {
        url: url.to_string(),
        message: err.to_string(),
    })
}

/// Interpret a listing response.
///
/// The error envelope wins over the status code so its message reaches the
/// operator even on non-2xx responses.
pub fn decode_listing(url: &str, status: StatusCode, body: &str) -> ClientResult<Vec<DirEntry>> {
    match serde_json::from_str::<ListingEnvelope>(body) {
        Ok(ListingEnvelope::Error { message }) => Err(ClientError::Server { message }),
        Ok(ListingEnvelope::Success { directories }) if status.is_success() => Ok(directories),
        Ok(ListingEnvelope::Success { .. }) => check_status(url, status).map(|()| Vec::new()),
        Err(err) => {
            check_status(url, status)?;
            Err(ClientError::Decode {
                url: url.to_string(),
                message: err.to_string(),
            })
        }
    }
}
