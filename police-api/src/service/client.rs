//! HTTP transport backed by reqwest.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;
use tracing::debug;

use crate::error::{PoliceError, Result};

use super::{Transport, Verb};

/// Default base URL for the police data API.
const DEFAULT_BASE_URL: &str = "https://data.police.uk/api/";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Configuration for the HTTP transport.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Base URL every method path is appended to
    pub base_url: String,
    /// Optional basic-auth username
    pub username: Option<String>,
    /// Optional basic-auth password
    pub password: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Value of the User-Agent header
    pub user_agent: String,
}

impl ServiceConfig {
    /// Create a config pointing at the public API.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            username: None,
            password: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: concat!("police-api-rs/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Build a config from `POLICE_API_*` environment variables.
    ///
    /// Unset variables keep their defaults. Credentials are only applied
    /// when both username and password are present.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::new();

        if let Some(url) = lookup("POLICE_API_BASE_URL") {
            config = config.with_base_url(url);
        }

        if let (Some(username), Some(password)) = (
            lookup("POLICE_API_USERNAME"),
            lookup("POLICE_API_PASSWORD"),
        ) {
            config = config.with_credentials(username, password);
        }

        if let Some(timeout) = lookup("POLICE_API_TIMEOUT_SECS") {
            let secs = timeout.trim().parse().map_err(|_| {
                PoliceError::InvalidConfig(format!("POLICE_API_TIMEOUT_SECS: {timeout}"))
            })?;
            config = config.with_timeout(secs);
        }

        Ok(config)
    }

    /// Set a custom base URL (for testing or mirrors).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Attach basic-auth credentials to every request.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Override the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Transport that talks to the live API over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    credentials: Option<(String, String)>,
}

impl HttpTransport {
    /// Create a new transport with the given configuration.
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();

        let user_agent = HeaderValue::from_str(&config.user_agent).map_err(|_| {
            PoliceError::InvalidConfig(format!("user agent {:?}", config.user_agent))
        })?;
        headers.insert(USER_AGENT, user_agent);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let credentials = match (config.username, config.password) {
            (Some(username), Some(password)) if !username.is_empty() => {
                Some((username, password))
            }
            _ => None,
        };

        Ok(Self {
            http,
            base_url: normalize_base_url(config.base_url),
            credentials,
        })
    }

    /// The base URL method paths are resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, method: &str) -> String {
        format!("{}{}", self.base_url, method.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(&self, verb: Verb, method: &str, params: &[(&str, String)]) -> Result<Value> {
        let url = self.url(method);
        debug!(%verb, %url, params = params.len(), "police api request");

        let mut request = match verb {
            Verb::Get => self.http.get(&url).query(params),
            Verb::Post => self.http.post(&url).form(params),
        };

        if let Some((username, password)) = &self.credentials {
            request = request.basic_auth(username, Some(password));
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(%verb, %url, status = status.as_u16(), "police api error response");
            return Err(PoliceError::Api {
                status: status.as_u16(),
                message: body,
                method: method.to_string(),
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| PoliceError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }
}

/// Ensure the base URL ends with exactly one slash.
fn normalize_base_url(url: String) -> String {
    if url.ends_with('/') {
        url
    } else {
        format!("{url}/")
    }
}
