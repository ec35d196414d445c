//! Backend selection
//!
//! The hosted collection is used when both a token and an endpoint are
//! configured; it is always paired with a local tier. Without hosted
//! credentials the local tier serves everything.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{StoreError, StoreResult};
use crate::failover::FailoverStore;
use crate::file::JsonFileStore;
use crate::hosted::{DataApiClient, HostedCharities, HostedStore};
use crate::memory::MemoryStore;
use crate::store::{CharitySource, DonationStore, StaticCharities};

/// Environment variable holding the hosted database token
pub const ENV_TOKEN: &str = "ASTRA_DB_TOKEN";
/// Environment variable holding the hosted database endpoint
pub const ENV_ENDPOINT: &str = "ASTRA_DB_ENDPOINT";
/// Environment variable overriding the keyspace
pub const ENV_KEYSPACE: &str = "ASTRA_DB_KEYSPACE";
/// Environment variable overriding the local data directory
pub const ENV_DATA_DIR: &str = "TTC_DATA_DIR";

/// Hosted collection credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostedConfig {
    /// Database API endpoint (`https://<id>-<region>.apps.astra.datastax.com`)
    pub endpoint: String,
    /// Application token
    pub token: String,
    /// Keyspace holding the collections
    pub keyspace: String,
    /// Request timeout
    pub timeout_secs: u64,
    /// Charity listing cache lifetime
    pub charity_cache_secs: u64,
}

impl Default for HostedConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            token: String::new(),
            keyspace: "default_keyspace".to_string(),
            timeout_secs: 10,
            charity_cache_secs: 300,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the local fallback file
    pub data_dir: PathBuf,
    /// Keep the local tier in memory only
    pub memory_only: bool,
    /// Hosted collection, if configured
    pub hosted: Option<HostedConfig>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            memory_only: false,
            hosted: None,
        }
    }
}

impl StoreConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With hosted credentials
    #[inline]
    #[must_use]
    pub fn with_hosted(mut self, hosted: HostedConfig) -> Self {
        self.hosted = Some(hosted);
        self
    }

    /// With local data directory
    #[inline]
    #[must_use]
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// With memory-only local tier
    #[inline]
    #[must_use]
    pub fn with_memory_only(mut self, memory_only: bool) -> Self {
        self.memory_only = memory_only;
        self
    }

    /// Path of the local fallback file
    #[inline]
    #[must_use]
    pub fn data_file(&self) -> PathBuf {
        self.data_dir.join("donations.json")
    }

    /// Overlay values from the process environment
    #[must_use]
    pub fn apply_env(self) -> Self {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay values from an arbitrary lookup
    ///
    /// Hosted mode needs both token and endpoint; either one alone is ignored.
    #[must_use]
    pub fn apply_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let (Some(token), Some(endpoint)) = (non_empty(ENV_TOKEN), non_empty(ENV_ENDPOINT)) {
            let mut hosted = self.hosted.take().unwrap_or_default();
            hosted.token = token;
            hosted.endpoint = endpoint;
            if let Some(keyspace) = non_empty(ENV_KEYSPACE) {
                hosted.keyspace = keyspace;
            }
            self.hosted = Some(hosted);
        }
        if let Some(dir) = non_empty(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(dir);
        }
        self
    }

    /// Hosted credentials, if both halves are present
    #[must_use]
    pub fn hosted(&self) -> Option<&HostedConfig> {
        self.hosted
            .as_ref()
            .filter(|h| !h.token.is_empty() && !h.endpoint.is_empty())
    }

    /// Check configuration consistency
    ///
    /// # Errors
    /// - `StoreError::Config` on an unusable endpoint, keyspace or timeout
    pub fn validate(&self) -> StoreResult<()> {
        if let Some(hosted) = self.hosted() {
            if !hosted.endpoint.starts_with("http://") && !hosted.endpoint.starts_with("https://") {
                return Err(StoreError::Config(format!(
                    "endpoint must be an http(s) URL: '{}'",
                    hosted.endpoint
                )));
            }
            if hosted.keyspace.trim().is_empty() {
                return Err(StoreError::Config("keyspace must not be empty".to_string()));
            }
            if hosted.timeout_secs == 0 {
                return Err(StoreError::Config("timeout_secs must be positive".to_string()));
            }
        }
        Ok(())
    }

    /// Open the configured backends
    ///
    /// # Errors
    /// - `StoreError::Config` if validation fails
    /// - Errors from opening the local file
    pub async fn open(&self) -> StoreResult<Backends> {
        self.validate()?;

        let local: Arc<dyn DonationStore> = if self.memory_only {
            Arc::new(MemoryStore::new())
        } else {
            Arc::new(JsonFileStore::open(self.data_file()).await?)
        };

        let backends = match self.hosted() {
            Some(hosted) => {
                let client = DataApiClient::new(hosted)?;
                let primary: Arc<dyn DonationStore> = Arc::new(HostedStore::new(client.clone()));
                let charities = Arc::new(HostedCharities::new(
                    client,
                    Duration::from_secs(hosted.charity_cache_secs),
                ));
                Backends {
                    donations: Arc::new(FailoverStore::new(primary, local)),
                    charities: charities.clone(),
                    seeder: Some(charities),
                }
            }
            None => Backends {
                donations: local,
                charities: Arc::new(StaticCharities),
                seeder: None,
            },
        };

        tracing::info!(
            "Storage ready: donations={} charities={}",
            backends.donations.backend(),
            backends.charities.backend()
        );
        Ok(backends)
    }
}

/// Opened storage backends
#[derive(Clone)]
pub struct Backends {
    /// Donation records
    pub donations: Arc<dyn DonationStore>,
    /// Charity reference data
    pub charities: Arc<dyn CharitySource>,
    /// Hosted charity collection, when seeding is possible
    pub seeder: Option<Arc<HostedCharities>>,
}

impl std::fmt::Debug for Backends {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backends")
            .field("donations", &self.donations.backend())
            .field("charities", &self.charities.backend())
            .field("seeder", &self.seeder.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn hosted_requires_token_and_endpoint() {
        let config = StoreConfig::new().apply_env_from(env(&[(ENV_TOKEN, "AstraCS:abc")]));
        assert!(config.hosted().is_none());

        let config = StoreConfig::new().apply_env_from(env(&[
            (ENV_TOKEN, "AstraCS:abc"),
            (ENV_ENDPOINT, "https://db.example.com"),
            (ENV_KEYSPACE, "donations_ks"),
        ]));
        let hosted = config.hosted().unwrap();
        assert_eq!(hosted.keyspace, "donations_ks");
        assert_eq!(hosted.timeout_secs, 10);
    }

    #[test]
    fn data_dir_override() {
        let config = StoreConfig::new().apply_env_from(env(&[(ENV_DATA_DIR, "/var/lib/ttc")]));
        assert_eq!(config.data_file(), PathBuf::from("/var/lib/ttc/donations.json"));
    }

    #[test]
    fn validate_rejects_bad_endpoint() {
        let config = StoreConfig::new().with_hosted(HostedConfig {
            endpoint: "db.example.com".to_string(),
            token: "t".to_string(),
            ..HostedConfig::default()
        });
        assert!(matches!(config.validate(), Err(StoreError::Config(_))));
    }

    #[tokio::test]
    async fn local_only_backends() {
        let dir = tempfile::tempdir().unwrap();
        let backends = StoreConfig::new()
            .with_data_dir(dir.path())
            .open()
            .await
            .unwrap();
        assert_eq!(backends.donations.backend(), "json-file");
        assert_eq!(backends.charities.backend(), "static");
        assert!(backends.seeder.is_none());

        let backends = StoreConfig::new().with_memory_only(true).open().await.unwrap();
        assert_eq!(backends.donations.backend(), "memory");
    }

    #[tokio::test]
    async fn hosted_backends_wrap_local_tier() {
        let config = StoreConfig::new().with_memory_only(true).with_hosted(HostedConfig {
            endpoint: "http://127.0.0.1:9".to_string(),
            token: "t".to_string(),
            ..HostedConfig::default()
        });
        let backends = config.open().await.unwrap();
        assert_eq!(backends.donations.backend(), "failover");
        assert_eq!(backends.charities.backend(), "hosted");
        assert!(backends.seeder.is_some());
    }
}
