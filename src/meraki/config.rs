use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

/// Default Dashboard API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.meraki.com/api/v1";
/// Default Workflows API base URL.
pub const DEFAULT_WORKFLOWS_BASE_URL: &str = "https://us.workflows.meraki.com/api/v1";

/// Required API key.
pub const ENV_API_KEY: &str = "MERAKI_API_KEY";
/// Organization id for organization scoped operations.
pub const ENV_ORG_ID: &str = "MERAKI_ORG_ID";
/// Override for [`DEFAULT_BASE_URL`].
pub const ENV_BASE_URL: &str = "MERAKI_BASE_URL";
/// Override for [`DEFAULT_WORKFLOWS_BASE_URL`].
pub const ENV_WORKFLOWS_BASE_URL: &str = "MERAKI_WORKFLOWS_BASE_URL";
/// Request timeout in whole seconds.
pub const ENV_TIMEOUT_SECS: &str = "MERAKI_TIMEOUT_SECS";
/// Set to a true value to skip TLS certificate verification.
pub const ENV_INSECURE_TLS: &str = "MERAKI_INSECURE_TLS";

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Validated credentials for the Meraki APIs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// The API key, never empty
    pub api_key: String,
    /// The organization id, if configured
    pub org_id: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("org_id", &self.org_id)
            .finish()
    }
}

/// Configuration for the Meraki client and tools.
#[derive(Clone)]
pub struct MerakiConfig {
    /// API key used for both authentication methods
    pub api_key: Option<String>,
    /// Organization id for organization scoped operations
    pub org_id: Option<String>,
    /// Dashboard API base URL
    pub base_url: String,
    /// Workflows API base URL
    pub workflows_base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Skip TLS certificate verification
    pub accept_invalid_certs: bool,
}

impl Default for MerakiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            org_id: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            workflows_base_url: DEFAULT_WORKFLOWS_BASE_URL.to_string(),
            timeout: default_timeout(),
            accept_invalid_certs: false,
        }
    }
}

impl fmt::Debug for MerakiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MerakiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("org_id", &self.org_id)
            .field("base_url", &self.base_url)
            .field("workflows_base_url", &self.workflows_base_url)
            .field("timeout", &self.timeout)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}

impl MerakiConfig {
    /// Creates a new builder.
    pub fn builder() -> MerakiConfigBuilder {
        MerakiConfigBuilder::new()
    }

    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration from the process environment, falling back to
    /// the variables of a `.env` file. A missing file is not an error.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file_vars = read_env_file(path.as_ref())?;
        Self::from_lookup(|name| {
            std::env::var(name)
                .ok()
                .filter(|value| !value.is_empty())
                .or_else(|| file_vars.get(name).cloned())
        })
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset. A missing API key is not an error
    /// here; it surfaces when credentials are requested.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let mut config = Self {
            api_key: get(ENV_API_KEY),
            org_id: get(ENV_ORG_ID),
            ..Self::default()
        };

        if let Some(url) = get(ENV_BASE_URL) {
            config.base_url = url;
        }
        if let Some(url) = get(ENV_WORKFLOWS_BASE_URL) {
            config.workflows_base_url = url;
        }
        if let Some(value) = get(ENV_TIMEOUT_SECS) {
            let secs = value.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                name: ENV_TIMEOUT_SECS,
                value: value.clone(),
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(value) = get(ENV_INSECURE_TLS) {
            config.accept_invalid_certs = parse_flag(&value).ok_or(ConfigError::InvalidValue {
                name: ENV_INSECURE_TLS,
                value,
            })?;
        }

        Ok(config)
    }

    /// Returns the validated credentials.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        Ok(Credentials {
            api_key: api_key.to_string(),
            org_id: self.org_id.clone().filter(|id| !id.is_empty()),
        })
    }
}

fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(e) if e.not_found() => return Ok(HashMap::new()),
        Err(e) => return Err(ConfigError::EnvFile(e.to_string())),
    };

    iter.map(|item| item.map_err(|e| ConfigError::EnvFile(e.to_string())))
        .collect()
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Builder for [`MerakiConfig`].
#[derive(Debug, Default)]
pub struct MerakiConfigBuilder {
    config: MerakiConfig,
}

impl MerakiConfigBuilder {
    /// Creates a new builder with default endpoints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing configuration.
    pub fn from_config(config: MerakiConfig) -> Self {
        Self { config }
    }

    /// Sets the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.api_key = Some(api_key.into());
        self
    }

    /// Sets the organization id.
    pub fn with_org_id(mut self, org_id: impl Into<String>) -> Self {
        self.config.org_id = Some(org_id.into());
        self
    }

    /// Sets the Dashboard API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Sets the Workflows API base URL.
    pub fn with_workflows_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.workflows_base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Disables TLS certificate verification.
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.config.accept_invalid_certs = accept;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> MerakiConfig {
        self.config
    }
}
