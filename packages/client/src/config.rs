use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::{ClientError, Result};

pub const DEFAULT_API_BASE_URL: &str = "https://dummy-1.hiublue.com/api";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_PAGE_SIZE: usize = 5;
pub const DEFAULT_SESSION_PATH: &str = "./.offerdesk-session.json";

/// Settings for the offer client and the query pipeline.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the offers API. Always ends with a slash so endpoint
    /// paths can be joined onto it.
    pub api_base_url: Url,
    pub http_timeout: Duration,
    /// Quiet period before search text is committed.
    pub search_debounce: Duration,
    pub page_size: usize,
    pub session_path: PathBuf,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let api_base_url = std::env::var("OFFERDESK_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.into());

        let http_timeout_secs = std::env::var("OFFERDESK_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);

        let search_debounce_ms = std::env::var("OFFERDESK_SEARCH_DEBOUNCE_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_SEARCH_DEBOUNCE_MS);

        let page_size = std::env::var("OFFERDESK_PAGE_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PAGE_SIZE);

        let session_path: PathBuf = std::env::var("OFFERDESK_SESSION_PATH")
            .unwrap_or_else(|_| DEFAULT_SESSION_PATH.into())
            .into();

        Self::builder()
            .api_base_url(api_base_url)
            .http_timeout(Duration::from_secs(http_timeout_secs))
            .search_debounce(Duration::from_millis(search_debounce_ms))
            .page_size(page_size)
            .session_path(session_path)
            .build()
    }

    /// Create a config builder, starting from the defaults.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            search_debounce: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
            page_size: DEFAULT_PAGE_SIZE,
            session_path: DEFAULT_SESSION_PATH.into(),
        }
    }
}

/// Builder for constructing a `ClientConfig`.
pub struct ClientConfigBuilder {
    api_base_url: String,
    http_timeout: Duration,
    search_debounce: Duration,
    page_size: usize,
    session_path: PathBuf,
}

impl ClientConfigBuilder {
    pub fn api_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = api_base_url.into();
        self
    }

    pub fn http_timeout(mut self, http_timeout: Duration) -> Self {
        self.http_timeout = http_timeout;
        self
    }

    pub fn search_debounce(mut self, search_debounce: Duration) -> Self {
        self.search_debounce = search_debounce;
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn session_path(mut self, session_path: impl Into<PathBuf>) -> Self {
        self.session_path = session_path.into();
        self
    }

    pub fn build(self) -> Result<ClientConfig> {
        if self.page_size == 0 {
            return Err(ClientError::Config("page size must be greater than zero".into()));
        }

        Ok(ClientConfig {
            api_base_url: parse_base_url(&self.api_base_url)?,
            http_timeout: self.http_timeout,
            search_debounce: self.search_debounce,
            page_size: self.page_size,
            session_path: self.session_path,
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let mut normalized = raw.trim().to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }

    let url = Url::parse(&normalized)
        .map_err(|e| ClientError::Config(format!("invalid API base URL '{raw}': {e}")))?;

    if url.cannot_be_a_base() {
        return Err(ClientError::Config(format!(
            "API base URL '{raw}' cannot be used as a base"
        )));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::builder().build().unwrap();
        assert_eq!(config.api_base_url.as_str(), "https://dummy-1.hiublue.com/api/");
        assert_eq!(config.search_debounce, Duration::from_millis(500));
        assert_eq!(config.page_size, 5);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let err = ClientConfig::builder().page_size(0).build().unwrap_err();
        assert!(err.to_string().contains("page size"));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let err = ClientConfig::builder()
            .api_base_url("not a url")
            .build()
            .unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn test_base_url_keeps_path_when_joining() {
        let config = ClientConfig::builder()
            .api_base_url("http://localhost:8080/api")
            .build()
            .unwrap();
        let joined = config.api_base_url.join("offers").unwrap();
        assert_eq!(joined.as_str(), "http://localhost:8080/api/offers");
    }
}
