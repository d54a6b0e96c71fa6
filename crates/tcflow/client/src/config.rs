//! Configuration for the Trimble Connect client

use crate::error::{ClientError, ClientResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Production REST base path
pub const DEFAULT_BASE_URL: &str = "https://app.connect.trimble.com/tc/api/3.0";

/// Folder that receives fully approved documentation
pub const DEFAULT_APPROVED_FOLDER_NAME: &str = "Schválené";

/// Client configuration.
///
/// Plain serde value: the embedding application builds it or deserializes
/// it from its own settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// REST base URL, without a trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bound on the workspace bridge handshake, in seconds
    #[serde(default = "default_handshake_timeout")]
    pub handshake_timeout_secs: u64,

    /// Per-request timeout in seconds; `None` keeps the transport default
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Name of the folder approved documentation is moved into
    #[serde(default = "default_approved_folder_name")]
    pub approved_folder_name: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            handshake_timeout_secs: default_handshake_timeout(),
            request_timeout_secs: None,
            approved_folder_name: default_approved_folder_name(),
        }
    }
}

impl ClientConfig {
    /// Default configuration against another host (tests, regional endpoints)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Check the configuration and normalize the base URL
    pub fn validate(mut self) -> ClientResult<Self> {
        let parsed = Url::parse(&self.base_url)
            .map_err(|e| ClientError::Config(format!("invalid base_url {:?}: {}", self.base_url, e)))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::Config(format!(
                "base_url must be http(s), got {}",
                parsed.scheme()
            )));
        }
        if self.handshake_timeout_secs == 0 {
            return Err(ClientError::Config(
                "handshake_timeout_secs must be greater than zero".into(),
            ));
        }
        if self.request_timeout_secs == Some(0) {
            return Err(ClientError::Config(
                "request_timeout_secs must be greater than zero when set".into(),
            ));
        }
        if self.approved_folder_name.trim().is_empty() {
            return Err(ClientError::Config(
                "approved_folder_name must not be empty".into(),
            ));
        }

        self.base_url = self.base_url.trim_end_matches('/').to_string();
        Ok(self)
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.handshake_timeout_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_handshake_timeout() -> u64 {
    30
}

fn default_approved_folder_name() -> String {
    DEFAULT_APPROVED_FOLDER_NAME.to_string()
}
