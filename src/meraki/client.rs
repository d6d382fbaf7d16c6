use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ConfigError, MerakiError};
use crate::meraki::config::{Credentials, MerakiConfig};

/// Header carrying the Dashboard API key.
pub const API_KEY_HEADER: &str = "X-Cisco-Meraki-API-Key";

/// How a single request authenticates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    /// `X-Cisco-Meraki-API-Key: <key>`
    ApiKey,
    /// `Authorization: Bearer <key>`
    Bearer,
}

/// Outcome of the bearer step of the workflows listing.
#[derive(Debug)]
pub enum AuthAttempt {
    /// The request succeeded with this body
    Success(Value),
    /// The auth method was rejected, the request never completed or the
    /// body could not be read
    Retry,
    /// A terminal failure
    Failure(MerakiError),
}

/// A client for the Meraki Dashboard and Workflows APIs.
#[derive(Debug, Clone)]
pub struct MerakiClient {
    client: Client,
    credentials: Credentials,
    api_key_header: HeaderValue,
    bearer_header: HeaderValue,
    base_url: String,
    workflows_base_url: String,
}

impl MerakiClient {
    /// Creates a new client from the given configuration.
    pub fn new(config: &MerakiConfig) -> Result<Self, ConfigError> {
        let credentials = config.credentials()?;

        let mut api_key_header = HeaderValue::from_str(&credentials.api_key)
            .map_err(|_| ConfigError::InvalidHeader(API_KEY_HEADER))?;
        api_key_header.set_sensitive(true);
        let mut bearer_header = HeaderValue::from_str(&format!("Bearer {}", credentials.api_key))
            .map_err(|_| ConfigError::InvalidHeader("Authorization"))?;
        bearer_header.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        if config.accept_invalid_certs {
            warn!("TLS certificate verification is disabled for Meraki API requests");
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            credentials,
            api_key_header,
            bearer_header,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            workflows_base_url: config.workflows_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Returns the configured organization id, if any.
    pub fn org_id(&self) -> Option<&str> {
        self.credentials.org_id.as_deref()
    }

    /// Lists the organizations accessible by the API key.
    pub async fn list_organizations(&self) -> Result<Value, MerakiError> {
        let url = format!("{}/organizations", self.base_url);
        self.get_json(&url, AuthMethod::ApiKey).await
    }

    /// Lists the networks of the configured organization.
    pub async fn list_networks(&self) -> Result<Value, MerakiError> {
        let org_id = self.require_org_id()?;
        let url = format!("{}/organizations/{}/networks", self.base_url, org_id);
        self.get_json(&url, AuthMethod::ApiKey).await
    }

    /// Lists the workflows of the configured organization.
    ///
    /// Bearer authentication is tried first. A 401, a transport failure or a
    /// success body that is not JSON falls back to API-key authentication;
    /// any other failure is final.
    pub async fn list_workflows(&self) -> Result<Value, MerakiError> {
        let org_id = self.require_org_id()?;
        let url = format!(
            "{}/organizations/{}/workflows",
            self.workflows_base_url, org_id
        );

        match self.try_bearer(&url).await {
            AuthAttempt::Success(body) => Ok(body),
            AuthAttempt::Failure(err) => Err(err),
            AuthAttempt::Retry => self.get_json(&url, AuthMethod::ApiKey).await,
        }
    }

    /// Runs the bearer step of the workflows listing.
    pub async fn try_bearer(&self, url: &str) -> AuthAttempt {
        let response = match self.send(url, AuthMethod::Bearer).await {
            Ok(response) => response,
            Err(err) => {
                warn!(url = %url, error = %err, "Bearer auth failed, trying API key");
                return AuthAttempt::Retry;
            }
        };

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            debug!(url = %url, "Bearer auth rejected, trying API key");
            return AuthAttempt::Retry;
        }

        match Self::parse_response(url, response).await {
            Ok(body) => AuthAttempt::Success(body),
            Err(err @ MerakiError::Decode(_)) => {
                warn!(url = %url, error = %err, "Bearer auth returned an unreadable body, trying API key");
                AuthAttempt::Retry
            }
            Err(err) => AuthAttempt::Failure(err),
        }
    }

    fn require_org_id(&self) -> Result<&str, ConfigError> {
        self.org_id().ok_or(ConfigError::MissingOrgId)
    }

    fn auth_header(&self, auth: AuthMethod) -> (HeaderName, HeaderValue) {
        match auth {
            AuthMethod::ApiKey => (
                HeaderName::from_static("x-cisco-meraki-api-key"),
                self.api_key_header.clone(),
            ),
            AuthMethod::Bearer => (header::AUTHORIZATION, self.bearer_header.clone()),
        }
    }

    /// Sends a GET request with the given auth header on top of the defaults.
    async fn send(&self, url: &str, auth: AuthMethod) -> Result<Response, MerakiError> {
        debug!(url = %url, auth = ?auth, "Sending request to Meraki");

        let (name, value) = self.auth_header(auth);
        let response = self.client.get(url).header(name, value).send().await?;

        debug!(url = %url, status = %response.status(), "Received response from Meraki");
        Ok(response)
    }

    async fn get_json(&self, url: &str, auth: AuthMethod) -> Result<Value, MerakiError> {
        let response = self.send(url, auth).await?;
        Self::parse_response(url, response).await
    }

    /// Checks the status and parses the body as JSON.
    async fn parse_response(url: &str, response: Response) -> Result<Value, MerakiError> {
        let status = response.status();
        if !status.is_success() {
            return Err(MerakiError::Upstream {
                status: status.as_u16(),
                url: url.to_string(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| MerakiError::Decode(e.to_string()))
    }
}
