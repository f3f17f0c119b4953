//! Retrying HTTP transport for API client libraries.
//!
//! [`HttpClient`] issues requests described by [`HttpRequest`], retrying
//! server errors and transport failures with a fixed backoff, and hands back
//! a [`Response`] that decodes gzip bodies and exposes headers uniformly.

pub mod auth;
pub mod config;
pub mod http;

pub use auth::{Authorization, BearerAuthorization, NullAuthorization};
pub use config::HttpClientConfiguration;
pub use http::{
    HttpClient, HttpClientFactory, HttpError, HttpParameter, HttpRequest, RequestMethod, Response,
};
