//! Settings file management

use std::path::PathBuf;

use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use tracing::warn;

use crate::errors::ConsoleError;
use crate::filesys::file::File;
use crate::logs::LogLevel;
use crate::ui::alert::AlertPolicies;
use crate::ui::busy::BusyTimings;

/// Default location of the settings file
pub const DEFAULT_SETTINGS_PATH: &str = "/etc/lambda-console/settings.json";

/// Console settings
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Directory for rolling log files
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Emit JSON log lines on stderr
    #[serde(default)]
    pub json_logs: bool,

    /// Backend configuration
    #[serde(default)]
    pub backend: BackendSettings,

    /// Authorization configuration
    #[serde(default)]
    pub auth: AuthSettings,

    /// Banner and busy-flag timings
    #[serde(default)]
    pub ui: UiSettings,

    /// Deployment poller configuration
    #[serde(default)]
    pub poller: PollerSettings,

    /// Instance list configuration
    #[serde(default)]
    pub pagination: PaginationSettings,
}

impl Settings {
    /// Load settings, falling back to defaults when the file does not exist
    pub async fn load(file: &File) -> Result<Self, ConsoleError> {
        if !file.exists().await {
            warn!(
                "Settings file {} not found, using defaults",
                file.path().display()
            );
            return Ok(Self::default());
        }
        file.read_json().await
    }
}

/// Backend API settings
#[derive(Debug, Clone, Deserialize)]
pub struct BackendSettings {
    /// Host the console talks to, without trailing slash
    #[serde(default = "default_backend_host")]
    pub host: String,

    /// Namespace of the application endpoints, joined to the host with `/`
    #[serde(default = "default_app_namespace")]
    pub app_namespace: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_backend_host() -> String {
    "http://localhost:8000".to_string()
}

fn default_app_namespace() -> String {
    "api/apps/".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            host: default_backend_host(),
            app_namespace: default_app_namespace(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Authorization settings
#[derive(Debug, Deserialize)]
pub struct AuthSettings {
    /// Authorizer scheme passed to the provider
    #[serde(default = "default_auth_scheme")]
    pub scheme: String,

    /// Session token, absent for anonymous access
    #[serde(default, deserialize_with = "deserialize_token")]
    pub token: Option<SecretString>,
}

fn default_auth_scheme() -> String {
    crate::authn::authorizer::DJANGO_SCHEME.to_string()
}

fn deserialize_token<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|t| !t.is_empty()).map(SecretString::from))
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            scheme: default_auth_scheme(),
            token: None,
        }
    }
}

/// Banner and busy-flag timings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UiSettings {
    #[serde(default)]
    pub alerts: AlertPolicies,

    #[serde(default)]
    pub busy: BusyTimings,
}

/// Deployment poller settings
#[derive(Debug, Clone, Deserialize)]
pub struct PollerSettings {
    /// Delay between a deploy and the store re-evaluation
    #[serde(default = "default_evaluation_delay_ms")]
    pub evaluation_delay_ms: u64,

    /// Maximum number of tracked instance IDs
    #[serde(default = "default_pending_capacity")]
    pub capacity: usize,

    /// Stop tracking an instance once it is observed ready
    #[serde(default = "default_true")]
    pub prune_ready: bool,
}

fn default_evaluation_delay_ms() -> u64 {
    1000
}

fn default_pending_capacity() -> usize {
    256
}

fn default_true() -> bool {
    true
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            evaluation_delay_ms: default_evaluation_delay_ms(),
            capacity: default_pending_capacity(),
            prune_ready: true,
        }
    }
}

/// Instance list settings
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationSettings {
    #[serde(default = "default_per_page")]
    pub per_page: usize,
}

fn default_per_page() -> usize {
    crate::controllers::pagination::DEFAULT_PER_PAGE
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
        }
    }
}

/// `Duration` as integer milliseconds
pub mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
