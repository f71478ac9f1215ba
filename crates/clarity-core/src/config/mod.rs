//! Client configuration shared by every Clarity front end.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::{is_http_url, normalize_text_option};

/// Backend used when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";
/// How long a successful probe is trusted, and the background re-check period.
pub const CACHE_DURATION: Duration = Duration::from_secs(5 * 60);
/// Fixed delay between failed foreground probes.
pub const RETRY_DELAY: Duration = Duration::from_millis(2000);

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Where task mutations are persisted.
///
/// A deployment picks exactly one mode; the reconciler never mixes them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceMode {
    /// Mutations only touch the in-memory collection.
    Local,
    /// Mutations are sent to the backend before the collection changes.
    #[default]
    Remote,
}

impl fmt::Display for PersistenceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Remote => f.write_str("remote"),
        }
    }
}

impl FromStr for PersistenceMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "remote" => Ok(Self::Remote),
            other => Err(Error::InvalidInput(format!(
                "Unknown persistence mode '{other}' (expected local or remote)"
            ))),
        }
    }
}

/// Runtime configuration for the backend client, prober and reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub persistence: PersistenceMode,
    pub cache_duration: Duration,
    pub retry_delay: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            persistence: PersistenceMode::default(),
            cache_duration: CACHE_DURATION,
            retry_delay: RETRY_DELAY,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Build a config for `api_base_url`, falling back to the default URL when blank.
    pub fn new(api_base_url: Option<String>, persistence: PersistenceMode) -> Result<Self> {
        let api_base_url = match normalize_text_option(api_base_url) {
            Some(url) => normalize_base_url(&url)?,
            None => {
                tracing::debug!("No API base URL configured, using {DEFAULT_API_BASE_URL}");
                DEFAULT_API_BASE_URL.to_string()
            }
        };
        Ok(Self {
            api_base_url,
            persistence,
            ..Self::default()
        })
    }

    #[must_use]
    pub const fn with_cache_duration(mut self, cache_duration: Duration) -> Self {
        self.cache_duration = cache_duration;
        self
    }

    #[must_use]
    pub const fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self.persistence, PersistenceMode::Remote)
    }
}

/// Trim, validate the scheme and strip trailing slashes from a base URL.
pub fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(Error::InvalidInput(
            "API base URL must not be empty".to_string(),
        ));
    }
    if !is_http_url(trimmed) {
        return Err(Error::InvalidInput(
            "API base URL must include http:// or https://".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}
