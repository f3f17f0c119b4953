//! Request executor with bounded retry and fixed backoff.

use std::sync::Arc;

use log::debug;

use super::error::HttpError;
use super::request::{HttpParameter, HttpRequest, RequestMethod};
use super::response::Response;
use super::retry::{RetryState, StatusClass, classify_status};
use super::transport::{ReqwestTransport, Transport};
use crate::config::HttpClientConfiguration;

/// Executes requests, retrying server errors and transport failures.
///
/// Holds no per-request state, so one instance can serve any number of
/// concurrent callers. Cloning is cheap.
#[derive(Clone)]
pub struct HttpClient {
    conf: Arc<HttpClientConfiguration>,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("conf", &self.conf)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Creates a client that talks HTTP through `reqwest`.
    pub fn new(conf: HttpClientConfiguration) -> Self {
        let transport = ReqwestTransport::new(conf.clone());
        Self::with_transport(conf, transport)
    }

    pub fn with_transport(conf: HttpClientConfiguration, transport: impl Transport + 'static) -> Self {
        Self {
            conf: Arc::new(conf),
            transport: Arc::new(transport),
        }
    }

    pub fn configuration(&self) -> &HttpClientConfiguration {
        &self.conf
    }

    pub async fn get(&self, url: &str) -> Result<Response, HttpError> {
        self.execute(&HttpRequest::builder(RequestMethod::Get, url).build())
            .await
    }

    pub async fn post(&self, url: &str, params: Vec<HttpParameter>) -> Result<Response, HttpError> {
        self.execute(
            &HttpRequest::builder(RequestMethod::Post, url)
                .parameters(params)
                .build(),
        )
        .await
    }

    /// Performs `request`, making up to `http_retry_count + 1` attempts.
    ///
    /// 2xx and 302 succeed. Statuses below 500 (400 and 420 included) fail
    /// at once. 5xx and transport failures are retried after
    /// `http_retry_interval_seconds`; the last one is returned as the error.
    #[tracing::instrument(skip(self, request), fields(method = %request.method(), url = request.url()))]
    pub async fn execute(&self, request: &HttpRequest) -> Result<Response, HttpError> {
        let mut state = RetryState::new(self.conf.max_attempts());

        loop {
            match self.attempt(request).await {
                Ok(response) => return Ok(response),
                Err((error, retryable)) => state.fail(error, retryable)?,
            }

            if let Some(error) = state.last_error() {
                debug!(
                    "{} {}: attempt {}/{} failed ({}), retrying in {}s...",
                    request.method(),
                    request.url(),
                    state.attempt() + 1,
                    state.max_attempts(),
                    error,
                    self.conf.http_retry_interval_seconds
                );
            }
            debug!(
                "Sleeping {} seconds until the next retry.",
                self.conf.http_retry_interval_seconds
            );
            tokio::time::sleep(self.conf.retry_interval()).await;
            state.advance();
        }
    }

    /// One exchange. On failure also reports whether a retry may help.
    async fn attempt(&self, request: &HttpRequest) -> Result<Response, (HttpError, bool)> {
        let exchange = match self.transport.send(request).await {
            Ok(exchange) => exchange,
            Err(e) => {
                debug!("Transport failure: {}", e);
                let error = HttpError::transport(e);
                let retryable = error.is_retryable();
                return Err((error, retryable));
            }
        };

        let mut response = Response::new(exchange);
        let status = response.status_code();
        debug!("Response status: {}", status);

        let class = classify_status(status);
        if class == StatusClass::Success {
            return Ok(response);
        }

        let body = match response.as_string().await {
            Ok(body) => body.to_string(),
            Err(e) => {
                debug!("Failed to read error body: {}", e);
                String::new()
            }
        };
        // Release the connection before any backoff.
        response.close();

        Err((
            HttpError::from_status(status, body),
            class == StatusClass::Retryable,
        ))
    }
}
