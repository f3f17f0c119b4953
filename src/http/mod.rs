//! HTTP request executor with retry logic and a transport-agnostic response.

mod client;
mod error;
mod factory;
pub mod header;
mod request;
mod response;
pub mod retry;
mod transport;

pub use client::HttpClient;
pub use error::HttpError;
pub use factory::HttpClientFactory;
pub use request::{
    FORM_URLENCODED, HttpParameter, HttpRequest, HttpRequestBuilder, ParameterValue,
    RequestMethod, contains_file, encode_parameters,
};
pub use response::{BodyReader, Response};
pub use transport::{ReqwestTransport, Transport};
