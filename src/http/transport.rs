//! The wire seam: one request in, one raw exchange out.

use std::io;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Proxy, RequestBuilder};

use super::request::{FORM_URLENCODED, HttpRequest, contains_file};
use crate::auth::mask_string;
use crate::config::HttpClientConfiguration;

/// Performs a single attempt of a request.
///
/// Any failure to produce a response (DNS, connect, timeout, reset) is
/// reported as an [`io::Error`]; HTTP error statuses are not failures here.
/// A request that cannot be built (bad URL, header or proxy) is reported with
/// [`io::ErrorKind::InvalidInput`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &HttpRequest) -> io::Result<reqwest::Response>;
}

/// [`Transport`] backed by `reqwest`.
///
/// Every attempt gets a freshly built client, so a broken connection from one
/// attempt never leaks into the next.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    conf: HttpClientConfiguration,
}

impl ReqwestTransport {
    pub fn new(conf: HttpClientConfiguration) -> Self {
        if conf.is_proxy_configured() {
            debug!("Using HTTP proxy {:?}", conf.proxy_url());
        }
        Self { conf }
    }

    fn build_client(&self) -> reqwest::Result<Client> {
        let mut builder = Client::builder()
            .user_agent(self.conf.user_agent())
            .connect_timeout(self.conf.connection_timeout())
            .read_timeout(self.conf.read_timeout())
            // 302 is handed back to the caller, not followed.
            .redirect(reqwest::redirect::Policy::none());

        if let Some(proxy_url) = self.conf.proxy_url() {
            let mut proxy = Proxy::all(&proxy_url)?;
            if let (Some(user), Some(password)) =
                (&self.conf.http_proxy_user, &self.conf.http_proxy_password)
            {
                proxy = proxy.basic_auth(user, password);
            }
            builder = builder.proxy(proxy);
        }

        builder.build()
    }

    fn prepare(&self, client: &Client, request: &HttpRequest) -> RequestBuilder {
        let url = request.url_with_query();
        debug!("Request: {} {}", request.method(), url);

        let mut builder = client.request(request.method().into(), url);

        if let Some(header) = request
            .authorization()
            .and_then(|auth| auth.authorization_header(request))
        {
            debug!("Authorization: {}", mask_string(&header));
            builder = builder.header(AUTHORIZATION, header);
        }

        for (name, value) in request.request_headers() {
            debug!("{}: {}", name, value);
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = request.form_body() {
            if contains_file(request.parameters()) {
                warn!("File parameters are not uploaded; sending the remaining form fields only");
            }
            debug!("Post Params: {}", body);
            builder = builder.header(CONTENT_TYPE, FORM_URLENCODED).body(body);
        }

        builder
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[tracing::instrument(skip(self, request), fields(method = %request.method(), url = request.url()))]
    async fn send(&self, request: &HttpRequest) -> io::Result<reqwest::Response> {
        let client = self.build_client().map_err(into_io_error)?;
        self.prepare(&client, request)
            .send()
            .await
            .map_err(into_io_error)
    }
}

/// Maps a `reqwest` failure onto an [`io::Error`].
///
/// Errors raised while building the client or the request come back as
/// `InvalidInput`: nothing was sent and resending cannot help.
pub(super) fn into_io_error(error: reqwest::Error) -> io::Error {
    let kind = if error.is_builder() {
        io::ErrorKind::InvalidInput
    } else if error.is_timeout() {
        io::ErrorKind::TimedOut
    } else if error.is_connect() {
        io::ErrorKind::ConnectionRefused
    } else {
        io::ErrorKind::Other
    };
    io::Error::new(kind, error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::BearerAuthorization;
    use crate::http::RequestMethod;
    use mockito::Matcher;
    use std::sync::Arc;
    use std::time::Duration;

    fn transport() -> ReqwestTransport {
        ReqwestTransport::new(HttpClientConfiguration::default())
    }

    #[tokio::test]
    async fn test_send_post_form_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/statuses/update")
            .match_header("content-type", FORM_URLENCODED)
            .match_body("status=hello+world")
            .with_status(200)
            .create_async()
            .await;

        let request = HttpRequest::builder(
            RequestMethod::Post,
            format!("{}/statuses/update", server.url()),
        )
        .parameter("status", "hello world")
        .build();

        let response = transport().send(&request).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.status().as_u16(), 200);
    }

    #[tokio::test]
    async fn test_send_get_with_query_and_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "rust lang".into()),
                Matcher::UrlEncoded("count".into(), "5".into()),
            ]))
            .match_header("authorization", "Bearer t0ken")
            .match_header("x-client", "sdk")
            .match_header("user-agent", "test-agent")
            .with_status(200)
            .create_async()
            .await;

        let request = HttpRequest::builder(RequestMethod::Get, format!("{}/search", server.url()))
            .parameter("q", "rust lang")
            .parameter("count", "5")
            .authorization(Arc::new(BearerAuthorization::new("t0ken")))
            .header("X-Client", "sdk")
            .build();

        let conf = HttpClientConfiguration {
            user_agent: Some("test-agent".to_string()),
            ..Default::default()
        };
        ReqwestTransport::new(conf).send(&request).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_does_not_follow_redirects() {
        let mut server = mockito::Server::new_async().await;
        let redirect = server
            .mock("GET", "/old")
            .with_status(302)
            .with_header("location", "/new")
            .create_async()
            .await;
        let target = server
            .mock("GET", "/new")
            .expect(0)
            .create_async()
            .await;

        let request =
            HttpRequest::builder(RequestMethod::Get, format!("{}/old", server.url())).build();
        let response = transport().send(&request).await.unwrap();

        redirect.assert_async().await;
        target.assert_async().await;
        assert_eq!(response.status().as_u16(), 302);
    }

    #[tokio::test]
    async fn test_send_connection_refused_is_io_error() {
        // Bind then drop to get a port nobody listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let conf = HttpClientConfiguration {
            http_connection_timeout: Duration::from_secs(2).as_millis() as u64,
            ..Default::default()
        };
        let request =
            HttpRequest::builder(RequestMethod::Get, format!("http://{}/", addr)).build();

        let err = ReqwestTransport::new(conf).send(&request).await.unwrap_err();
        assert_ne!(err.kind(), io::ErrorKind::TimedOut);
        assert_ne!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_send_unbuildable_request_is_invalid_input() {
        let bad_url = HttpRequest::builder(RequestMethod::Get, "not a url at all").build();
        let err = transport().send(&bad_url).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);

        let bad_header = HttpRequest::builder(RequestMethod::Get, "http://127.0.0.1:1/")
            .header("bad header name", "v")
            .build();
        let err = transport().send(&bad_header).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_send_with_bad_proxy_is_invalid_input() {
        let conf = HttpClientConfiguration {
            http_proxy_host: Some("bad host".to_string()),
            http_proxy_port: Some(3128),
            ..Default::default()
        };
        let request = HttpRequest::builder(RequestMethod::Get, "http://127.0.0.1:1/").build();

        let err = ReqwestTransport::new(conf).send(&request).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_build_client_with_proxy() {
        let conf = HttpClientConfiguration {
            http_proxy_host: Some("127.0.0.1".to_string()),
            http_proxy_port: Some(3128),
            http_proxy_user: Some("user".to_string()),
            http_proxy_password: Some("pass".to_string()),
            ..Default::default()
        };
        assert!(ReqwestTransport::new(conf).build_client().is_ok());
    }
}
