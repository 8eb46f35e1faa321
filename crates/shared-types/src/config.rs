use serde::{Deserialize, Serialize};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Identity-provider project settings (Firebase web app config).
///
/// Every field defaults to `None` so a missing or partial config file yields
/// an unconfigured provider rather than an error.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct IdentityConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub auth_domain: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub storage_bucket: Option<String>,
    #[serde(default)]
    pub messaging_sender_id: Option<String>,
    #[serde(default)]
    pub app_id: Option<String>,
    /// `host:port` of a local auth emulator. Replaces the Google endpoints.
    #[serde(default)]
    pub emulator_host: Option<String>,
}

impl IdentityConfig {
    /// True when an API key is present; without one the hosted provider
    /// cannot be reached.
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// Top-level client configuration matching `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    #[serde(default)]
    pub identity: IdentityConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            identity: IdentityConfig::default(),
        }
    }
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}
