//! Configuration types for rmd-orchestrator

use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::Path, path::PathBuf, time::Duration};
use utoipa::ToSchema;

/// Where downloaded files live
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct OutputConfig {
    /// Output root (default: "./download"); every file path must resolve inside it
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
        }
    }
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PersistenceConfig {
    /// Record store path (default: "./manifest.sqlite")
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

/// Event relay configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RelayConfig {
    /// Sleep between drain cycles when there is nothing to forward (default: 250 ms)
    #[serde(default = "default_poll_interval", with = "duration_millis_serde")]
    pub poll_interval: Duration,

    /// Per-observer buffer before a slow observer starts missing events (default: 1000)
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// Settings for the built-in URL fetch job
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct JobConfig {
    /// Per-request timeout in seconds (default: 30)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,

    /// User agent sent with each request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Main configuration
///
/// Only the orchestration keys are read here; the rest of the settings file
/// belongs to the settings collaborator and is ignored.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Output root settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Record store settings
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Event relay settings
    #[serde(default)]
    pub relay: RelayConfig,

    /// Built-in fetch job settings
    #[serde(default)]
    pub job: JobConfig,

    /// API and external server integration
    #[serde(flatten)]
    pub server: ServerIntegrationConfig,
}

impl Config {
    /// Output root
    pub fn base_dir(&self) -> &PathBuf {
        &self.output.base_dir
    }

    /// Load configuration from a JSON settings file
    pub fn from_json_file(path: &Path) -> crate::Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| crate::Error::Config {
            message: format!("failed to read settings file {}: {}", path.display(), e),
            key: None,
        })?;
        let config: Config = serde_json::from_str(&raw).map_err(|e| crate::Error::Config {
            message: format!("invalid settings file {}: {}", path.display(), e),
            key: None,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the orchestrator cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        if self.output.base_dir.as_os_str().is_empty() {
            return Err(crate::Error::Config {
                message: "output root must not be empty".into(),
                key: Some("output.base_dir".into()),
            });
        }
        if self.relay.poll_interval.is_zero() {
            return Err(crate::Error::Config {
                message: "relay poll interval must be greater than zero".into(),
                key: Some("relay.poll_interval".into()),
            });
        }
        if self.relay.channel_capacity == 0 {
            return Err(crate::Error::Config {
                message: "relay channel capacity must be greater than zero".into(),
                key: Some("relay.channel_capacity".into()),
            });
        }
        Ok(())
    }
}

/// API and external server integration configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ServerIntegrationConfig {
    /// REST API configuration
    #[serde(default)]
    pub api: ApiConfig,
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:7505)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

// Default value functions
fn default_base_dir() -> PathBuf {
    PathBuf::from("download")
}

fn default_database_path() -> PathBuf {
    PathBuf::from("manifest.sqlite")
}

fn default_poll_interval() -> Duration {
    Duration::from_millis(250)
}

fn default_channel_capacity() -> usize {
    1000
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    format!("rmd-orchestrator/{}", env!("CARGO_PKG_VERSION"))
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 7505))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".into()]
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Millisecond Duration serialization helper
mod duration_millis_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
