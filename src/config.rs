//! Configuration consumed by the request executor.

use serde::Deserialize;
use std::time::Duration;

/// User agent sent when the configuration does not name one.
pub const DEFAULT_USER_AGENT: &str = concat!("hrex/", env!("HREX_VERSION"));

/// Settings for one executor instance.
///
/// Equal configurations are interchangeable, which is what lets
/// [`HttpClientFactory`](crate::http::HttpClientFactory) key its cache on them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(default)]
pub struct HttpClientConfiguration {
    /// Attempts made after the first one fails with a retryable error.
    pub http_retry_count: u32,
    /// Fixed delay between attempts.
    pub http_retry_interval_seconds: u64,
    /// Connect timeout in milliseconds.
    pub http_connection_timeout: u64,
    /// Read timeout in milliseconds.
    pub http_read_timeout: u64,
    pub http_proxy_host: Option<String>,
    pub http_proxy_port: Option<u16>,
    pub http_proxy_user: Option<String>,
    pub http_proxy_password: Option<String>,
    pub user_agent: Option<String>,
}

impl Default for HttpClientConfiguration {
    fn default() -> Self {
        Self {
            http_retry_count: 0,
            http_retry_interval_seconds: 5,
            http_connection_timeout: 20_000,
            http_read_timeout: 120_000,
            http_proxy_host: None,
            http_proxy_port: None,
            http_proxy_user: None,
            http_proxy_password: None,
            user_agent: None,
        }
    }
}

impl HttpClientConfiguration {
    /// Total number of attempts one request may take.
    pub fn max_attempts(&self) -> u32 {
        self.http_retry_count.saturating_add(1)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.http_retry_interval_seconds)
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.http_connection_timeout)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.http_read_timeout)
    }

    /// A proxy is only used when both host and port are present.
    pub fn is_proxy_configured(&self) -> bool {
        matches!(
            (&self.http_proxy_host, self.http_proxy_port),
            (Some(host), Some(port)) if !host.is_empty() && port > 0
        )
    }

    /// Proxy URL in `http://host:port` form, if configured.
    pub fn proxy_url(&self) -> Option<String> {
        if !self.is_proxy_configured() {
            return None;
        }
        let host = self.http_proxy_host.as_deref()?;
        let port = self.http_proxy_port?;
        Some(format!("http://{}:{}", host, port))
    }

    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }
}
