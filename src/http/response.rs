//! Uniform access to a completed exchange.

use std::collections::HashMap;
use std::io::{self, Cursor, Read};

use flate2::read::GzDecoder;
use log::debug;
use reqwest::header::{CONTENT_ENCODING, HeaderMap};
use serde::de::DeserializeOwned;

use super::header::parse_elements;
use super::transport::into_io_error;

pub type BodyReader = Box<dyn Read + Send>;

/// Response of a successful (or finally failed) exchange.
///
/// Owns the exchange until the body is drained or [`close`](Self::close) is
/// called. The status code and headers are captured at construction and
/// stay available after that.
#[derive(Debug)]
pub struct Response {
    status_code: u16,
    headers: HeaderMap,
    gzip: bool,
    exchange: Option<reqwest::Response>,
    response_as_string: Option<String>,
    body_error: Option<(io::ErrorKind, String)>,
}

impl Response {
    pub fn new(exchange: reqwest::Response) -> Self {
        let headers = exchange.headers().clone();
        let gzip = headers
            .get(CONTENT_ENCODING)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("gzip"));

        Self {
            status_code: exchange.status().as_u16(),
            headers,
            gzip,
            exchange: Some(exchange),
            response_as_string: None,
            body_error: None,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// First value of header `name`, `None` if absent or not valid text.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Header elements grouped by element name.
    ///
    /// Each raw header value is split into elements (see
    /// [`parse_elements`]); a value that cannot be parsed is skipped.
    pub fn headers(&self) -> HashMap<String, Vec<String>> {
        let mut ret: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in &self.headers {
            match parse_elements(value.as_bytes()) {
                Ok(elements) => {
                    for (element, element_value) in elements {
                        ret.entry(element).or_default().push(element_value);
                    }
                }
                Err(e) => debug!("Skipping malformed header {}: {}", name, e),
            }
        }
        ret
    }

    /// Raw header map as received.
    pub fn raw_headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The body, decompressed when the response is gzip-encoded.
    ///
    /// The body can only be read once; later calls yield an empty stream.
    /// If reading it failed, later calls fail as well.
    pub async fn body_stream(&mut self) -> io::Result<BodyReader> {
        if let Some(error) = self.body_failure() {
            return Err(error);
        }
        let Some(mut exchange) = self.exchange.take() else {
            return Ok(Box::new(io::empty()));
        };

        let mut raw = Vec::new();
        loop {
            match exchange.chunk().await {
                Ok(Some(chunk)) => raw.extend_from_slice(&chunk),
                Ok(None) => break,
                Err(e) => return Err(self.record_failure(into_io_error(e))),
            }
        }

        let reader = Cursor::new(raw);
        if self.gzip && !reader.get_ref().is_empty() {
            Ok(Box::new(GzDecoder::new(reader)))
        } else {
            Ok(Box::new(reader))
        }
    }

    /// The body as text, read once and cached.
    pub async fn as_string(&mut self) -> io::Result<&str> {
        if self.response_as_string.is_none() {
            let mut reader = self.body_stream().await?;
            let mut bytes = Vec::new();
            if let Err(e) = reader.read_to_end(&mut bytes) {
                return Err(self.record_failure(e));
            }
            self.response_as_string = Some(String::from_utf8_lossy(&bytes).into_owned());
        }
        Ok(self.response_as_string.as_deref().unwrap_or_default())
    }

    pub async fn as_json<T: DeserializeOwned>(&mut self) -> serde_json::Result<T> {
        let text = self.as_string().await.map_err(serde_json::Error::io)?;
        serde_json::from_str(text)
    }

    /// Releases the underlying connection. Safe to call repeatedly.
    pub fn close(&mut self) {
        if self.exchange.take().is_some() {
            debug!("Closed response with status {}", self.status_code);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.exchange.is_none()
    }

    fn record_failure(&mut self, error: io::Error) -> io::Error {
        debug!("Failed to read response body: {}", error);
        self.body_error = Some((error.kind(), error.to_string()));
        error
    }

    fn body_failure(&self) -> Option<io::Error> {
        self.body_error.as_ref().map(|(kind, message)| {
            io::Error::new(
                *kind,
                format!("body already consumed after error: {}", message),
            )
        })
    }
}
