//! Page fetching for recipe imports.

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use async_trait::async_trait;

use super::charset::decode_html;
use crate::error::FetchError;

/// Trait for HTTP clients, enabling mockability in tests.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Fetch a page and return its markup decoded to UTF-8.
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError>;
}

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; Larder/0.1)";

/// Parse `url`, require http(s), and apply the optional host allow-list.
///
/// `allowed_hosts` entries match either the bare host or `host:port`.
/// An empty list allows every host.
pub fn check_url(url: &str, allowed_hosts: &[String]) -> Result<url::Url, FetchError> {
    let parsed = url::Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(FetchError::InvalidUrl(format!(
            "Unsupported scheme: {}",
            parsed.scheme()
        )));
    }

    let host = parsed
        .host_str()
        .ok_or_else(|| FetchError::InvalidUrl("No host in URL".to_string()))?;

    if !allowed_hosts.is_empty() {
        let host_with_port = match parsed.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        if !allowed_hosts
            .iter()
            .any(|h| *h == host_with_port || h == host)
        {
            return Err(FetchError::HostNotAllowed(host_with_port));
        }
    }

    Ok(parsed)
}

/// Production client: a single GET with a timeout, no caching.
#[derive(Debug, Clone)]
pub struct FetchClient {
    inner: reqwest::Client,
    allowed_hosts: Vec<String>,
}

impl FetchClient {
    pub fn new(timeout: Duration, allowed_hosts: Vec<String>) -> Result<Self, FetchError> {
        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            inner,
            allowed_hosts,
        })
    }

    /// Build from environment variables.
    ///
    /// - `LARDER_FETCH_TIMEOUT_SECS`: request timeout (default: 30)
    /// - `LARDER_FETCH_ALLOWED_HOSTS`: comma-separated allow-list; unset allows all
    pub fn from_env() -> Result<Self, FetchError> {
        let timeout = env::var("LARDER_FETCH_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS);

        let allowed_hosts = env::var("LARDER_FETCH_ALLOWED_HOSTS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self::new(Duration::from_secs(timeout), allowed_hosts)
    }

    pub fn allowed_hosts(&self) -> &[String] {
        &self.allowed_hosts
    }
}

#[async_trait]
impl HttpClient for FetchClient {
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        let parsed = check_url(url, &self.allowed_hosts)?;

        tracing::debug!(url, "network: fetching page");
        let response = self.inner.get(parsed).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(url, status = %status, "network: request failed");
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let bytes = response.bytes().await?;
        tracing::debug!(url, bytes = bytes.len(), "network: fetched successfully");

        Ok(decode_html(&bytes, content_type.as_deref()))
    }
}

/// Mock response for testing.
#[derive(Clone)]
pub enum MockResponse {
    Html(String),
    Status(u16),
    Error(String),
}

/// Mock HTTP client for testing.
#[derive(Default)]
pub struct MockClient {
    responses: HashMap<String, MockResponse>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, url: &str, response: MockResponse) -> Self {
        self.responses.insert(url.to_string(), response);
        self
    }

    pub fn with_html(self, url: &str, html: &str) -> Self {
        self.with_response(url, MockResponse::Html(html.to_string()))
    }

    pub fn with_status(self, url: &str, status: u16) -> Self {
        self.with_response(url, MockResponse::Status(status))
    }

    pub fn with_error(self, url: &str, error: &str) -> Self {
        self.with_response(url, MockResponse::Error(error.to_string()))
    }
}

#[async_trait]
impl HttpClient for MockClient {
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        match self.responses.get(url) {
            Some(MockResponse::Html(html)) => Ok(html.clone()),
            Some(MockResponse::Status(status)) => Err(FetchError::Status {
                status: *status,
                url: url.to_string(),
            }),
            Some(MockResponse::Error(e)) => Err(FetchError::InvalidUrl(e.clone())),
            None => Err(FetchError::InvalidUrl(format!(
                "No mock response for URL: {}",
                url
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_http_schemes() {
        let err = check_url("ftp://example.com/recipe", &[]).unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }

    #[test]
    fn empty_allow_list_allows_everything() {
        assert!(check_url("https://example.com/pasta", &[]).is_ok());
    }

    #[test]
    fn allow_list_matches_host_or_host_with_port() {
        let allowed = vec!["localhost:8080".to_string(), "example.com".to_string()];

        assert!(check_url("http://localhost:8080/a", &allowed).is_ok());
        assert!(check_url("https://example.com:443/b", &allowed).is_ok());
        assert!(matches!(
            check_url("http://localhost:9090/a", &allowed),
            Err(FetchError::HostNotAllowed(h)) if h == "localhost:9090"
        ));
    }

    #[tokio::test]
    async fn mock_client_serves_registered_pages() {
        let client = MockClient::new()
            .with_html("https://a.test/soup", "<body>soup</body>")
            .with_status("https://a.test/gone", 404);

        assert_eq!(
            client.fetch_html("https://a.test/soup").await.unwrap(),
            "<body>soup</body>"
        );
        assert!(matches!(
            client.fetch_html("https://a.test/gone").await,
            Err(FetchError::Status { status: 404, .. })
        ));
        assert!(client.fetch_html("https://a.test/other").await.is_err());
    }
}
