//! Usage: Client configuration (backend base URL, timeouts, data directory).

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::infra::session_file::SessionFile;
use crate::shared::error::StorageError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8090";
const DEFAULT_REQUEST_TIMEOUT_SECONDS: u32 = 30;
const MAX_REQUEST_TIMEOUT_SECONDS: u32 = 600;
const DATA_DIR_NAME: &str = ".senvanda";

/// Configuration for the console client.
///
/// Values come from the embedder or from the environment; `sanitize` repairs
/// out-of-range values instead of failing startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend origin, no trailing slash.
    pub base_url: String,
    pub request_timeout_seconds: u32,
    /// Explicit data directory for the durable session record. When absent,
    /// `SENVANDA_DATA_DIR` and then `$HOME/.senvanda` are used.
    pub data_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECONDS,
            data_dir: None,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_env_get(|key| env::var(key).ok())
    }

    fn from_env_get(mut get: impl FnMut(&str) -> Option<String>) -> Self {
        let base_url = get("SENVANDA_BASE_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let request_timeout_seconds = get("SENVANDA_REQUEST_TIMEOUT_SECONDS")
            .as_deref()
            .and_then(parse_u32_trimmed)
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECONDS);

        let data_dir = get("SENVANDA_DATA_DIR")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let mut config = Self {
            base_url,
            request_timeout_seconds,
            data_dir,
        };
        config.sanitize();
        config
    }

    /// Repair out-of-range values in place. Returns `true` when anything changed.
    pub fn sanitize(&mut self) -> bool {
        let mut changed = false;

        let trimmed = self.base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            self.base_url = DEFAULT_BASE_URL.to_string();
            changed = true;
        } else if trimmed != self.base_url {
            self.base_url = trimmed.to_string();
            changed = true;
        }

        if self.request_timeout_seconds == 0 {
            self.request_timeout_seconds = DEFAULT_REQUEST_TIMEOUT_SECONDS;
            changed = true;
        }
        if self.request_timeout_seconds > MAX_REQUEST_TIMEOUT_SECONDS {
            self.request_timeout_seconds = MAX_REQUEST_TIMEOUT_SECONDS;
            changed = true;
        }

        changed
    }

    pub(crate) fn request_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.request_timeout_seconds.max(1)))
    }

    /// Shared HTTP client honoring the configured timeout.
    pub fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.request_timeout())
            .build()
    }

    /// Durable session record location under the resolved data directory.
    pub fn session_file(&self) -> Result<SessionFile, StorageError> {
        Ok(SessionFile::in_dir(&self.resolve_data_dir()?))
    }

    fn resolve_data_dir(&self) -> Result<PathBuf, StorageError> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        if let Some(dir) = env::var_os("SENVANDA_DATA_DIR").filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(dir));
        }
        match env::var_os("HOME").filter(|v| !v.is_empty()) {
            Some(home) => Ok(PathBuf::from(home).join(DATA_DIR_NAME)),
            None => Err(StorageError::DataDir(
                "set data_dir, SENVANDA_DATA_DIR, or HOME".to_string(),
            )),
        }
    }
}

fn parse_u32_trimmed(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<u32>().ok()
}
