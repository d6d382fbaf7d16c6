//! Error types for the meraki-tools library.

use thiserror::Error;

/// Errors raised while loading configuration or building the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No API key was configured
    #[error("Missing MERAKI_API_KEY in environment or .env file.")]
    MissingApiKey,

    /// The operation is organization scoped but no organization id is set
    #[error("MERAKI_ORG_ID is required for this operation (organization id not configured).")]
    MissingOrgId,

    /// A credential could not be encoded as an HTTP header value
    #[error("Invalid header value for {0}")]
    InvalidHeader(&'static str),

    /// The underlying HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),

    /// The .env file exists but could not be read
    #[error("Failed to load env file: {0}")]
    EnvFile(String),

    /// An override variable held a value that could not be parsed
    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

/// Errors returned by Meraki API operations.
#[derive(Debug, Error)]
pub enum MerakiError {
    /// Missing or invalid configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The upstream API answered with a non-2xx status
    #[error("{status} error for url: {url}: {body}")]
    Upstream {
        status: u16,
        url: String,
        body: String,
    },

    /// The request failed before any response was received
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not valid JSON
    #[error("Invalid JSON response: {0}")]
    Decode(String),
}

impl MerakiError {
    /// Returns the HTTP status for upstream failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            MerakiError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_message_carries_status_and_body() {
        let err = MerakiError::Upstream {
            status: 500,
            url: "https://api.meraki.com/api/v1/organizations".to_string(),
            body: "boom".to_string(),
        };
        let message = err.to_string();
        assert!(message.starts_with("500 error"));
        assert!(message.contains("/organizations"));
        assert!(message.ends_with("boom"));
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_config_error_is_transparent() {
        let err = MerakiError::from(ConfigError::MissingOrgId);
        assert_eq!(err.to_string(), ConfigError::MissingOrgId.to_string());
        assert_eq!(err.status(), None);
    }
}
