//! Authorization providers.
//!
//! Computing real signatures (OAuth and friends) belongs to the API client
//! built on top of this crate. It plugs in by implementing [`Authorization`].

use std::fmt;

use crate::http::HttpRequest;

/// Yields the `Authorization` header value for a request.
pub trait Authorization: Send + Sync + fmt::Debug {
    /// Header value for `request`, or `None` to send no Authorization header.
    fn authorization_header(&self, request: &HttpRequest) -> Option<String>;

    fn is_enabled(&self) -> bool {
        true
    }
}

/// Provider that never authorizes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAuthorization;

impl Authorization for NullAuthorization {
    fn authorization_header(&self, _request: &HttpRequest) -> Option<String> {
        None
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// Static bearer token.
#[derive(Clone)]
pub struct BearerAuthorization {
    token: String,
}

impl BearerAuthorization {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl fmt::Debug for BearerAuthorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerAuthorization")
            .field("token", &mask_string(&self.token))
            .finish()
    }
}

impl Authorization for BearerAuthorization {
    fn authorization_header(&self, _request: &HttpRequest) -> Option<String> {
        Some(format!("Bearer {}", self.token))
    }
}

/// Masks credentials for logging.
///
/// A leading auth scheme (`Bearer`, `OAuth`, ...) is kept so logs stay
/// readable; everything after it is replaced with `*`.
pub fn mask_string(value: &str) -> String {
    match value.split_once(' ') {
        Some((scheme, rest)) if !scheme.is_empty() => {
            format!("{} {}", scheme, "*".repeat(rest.chars().count()))
        }
        _ => "*".repeat(value.chars().count()),
    }
}
