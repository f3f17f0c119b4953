//! Request descriptors: method, URL, parameters, authorization, headers.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use url::form_urlencoded;

use crate::auth::Authorization;

pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestMethod {
    Get,
    Post,
    Put,
    Delete,
    Head,
}

impl RequestMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestMethod::Get => "GET",
            RequestMethod::Post => "POST",
            RequestMethod::Put => "PUT",
            RequestMethod::Delete => "DELETE",
            RequestMethod::Head => "HEAD",
        }
    }

    /// Whether parameters travel in a form-encoded body rather than the query.
    pub fn has_body(&self) -> bool {
        matches!(self, RequestMethod::Post | RequestMethod::Put)
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RequestMethod> for reqwest::Method {
    fn from(method: RequestMethod) -> Self {
        match method {
            RequestMethod::Get => reqwest::Method::GET,
            RequestMethod::Post => reqwest::Method::POST,
            RequestMethod::Put => reqwest::Method::PUT,
            RequestMethod::Delete => reqwest::Method::DELETE,
            RequestMethod::Head => reqwest::Method::HEAD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterValue {
    Text(String),
    /// Upload payload. Multipart encoding is not implemented, so these are
    /// skipped when a body is encoded.
    File { path: PathBuf, content_type: String },
}

/// A single named request parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpParameter {
    name: String,
    value: ParameterValue,
}

impl HttpParameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: ParameterValue::Text(value.into()),
        }
    }

    /// File parameter with a content type guessed from the extension.
    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let content_type = guess_content_type(&path).to_string();
        Self {
            name: name.into(),
            value: ParameterValue::File { path, content_type },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Text value, `None` for file parameters.
    pub fn value(&self) -> Option<&str> {
        match &self.value {
            ParameterValue::Text(value) => Some(value),
            ParameterValue::File { .. } => None,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self.value, ParameterValue::File { .. })
    }

    pub fn file_path(&self) -> Option<&Path> {
        match &self.value {
            ParameterValue::File { path, .. } => Some(path),
            ParameterValue::Text(_) => None,
        }
    }

    pub fn content_type(&self) -> Option<&str> {
        match &self.value {
            ParameterValue::File { content_type, .. } => Some(content_type),
            ParameterValue::Text(_) => None,
        }
    }
}

fn guess_content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "gif" => "image/gif",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        _ => "application/octet-stream",
    }
}

pub fn contains_file(params: &[HttpParameter]) -> bool {
    params.iter().any(HttpParameter::is_file)
}

/// Encodes the text parameters as `application/x-www-form-urlencoded`.
///
/// Spaces become `+`; alphanumerics and `*-._` are left as is. File
/// parameters are skipped.
pub fn encode_parameters(params: &[HttpParameter]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for param in params {
        if let Some(value) = param.value() {
            serializer.append_pair(param.name(), value);
        }
    }
    serializer.finish()
}

/// Everything needed to issue one logical request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: RequestMethod,
    url: String,
    parameters: Vec<HttpParameter>,
    authorization: Option<Arc<dyn Authorization>>,
    request_headers: HashMap<String, String>,
}

impl HttpRequest {
    pub fn builder(method: RequestMethod, url: impl Into<String>) -> HttpRequestBuilder {
        HttpRequestBuilder {
            request: HttpRequest {
                method,
                url: url.into(),
                parameters: Vec::new(),
                authorization: None,
                request_headers: HashMap::new(),
            },
        }
    }

    pub fn method(&self) -> RequestMethod {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn parameters(&self) -> &[HttpParameter] {
        &self.parameters
    }

    pub fn authorization(&self) -> Option<&dyn Authorization> {
        self.authorization.as_deref()
    }

    pub fn request_headers(&self) -> &HashMap<String, String> {
        &self.request_headers
    }

    /// Target URL with the parameters appended as a query string for
    /// methods that carry no body.
    pub fn url_with_query(&self) -> String {
        if self.method.has_body() {
            return self.url.clone();
        }
        let query = encode_parameters(&self.parameters);
        if query.is_empty() {
            return self.url.clone();
        }
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.url, separator, query)
    }

    /// Form body for methods that carry one.
    pub fn form_body(&self) -> Option<String> {
        self.method
            .has_body()
            .then(|| encode_parameters(&self.parameters))
    }
}

pub struct HttpRequestBuilder {
    request: HttpRequest,
}

impl HttpRequestBuilder {
    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.parameters.push(HttpParameter::new(name, value));
        self
    }

    pub fn parameters(mut self, params: impl IntoIterator<Item = HttpParameter>) -> Self {
        self.request.parameters.extend(params);
        self
    }

    pub fn authorization(mut self, authorization: Arc<dyn Authorization>) -> Self {
        self.request.authorization = Some(authorization);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request
            .request_headers
            .insert(name.into(), value.into());
        self
    }

    pub fn build(self) -> HttpRequest {
        self.request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_parameters_form_style() {
        let params = vec![HttpParameter::new("status", "hello world")];
        assert_eq!(encode_parameters(&params), "status=hello+world");
    }

    #[test]
    fn test_encode_parameters_reserved_characters() {
        let params = vec![
            HttpParameter::new("q", "a&b=c"),
            HttpParameter::new("unreserved", "*-._~"),
            HttpParameter::new("utf8", "ü"),
        ];
        assert_eq!(
            encode_parameters(&params),
            "q=a%26b%3Dc&unreserved=*-._%7E&utf8=%C3%BC"
        );
    }

    #[test]
    fn test_encode_parameters_skips_files() {
        let params = vec![
            HttpParameter::new("status", "hi"),
            HttpParameter::file("media", "/tmp/cat.png"),
        ];
        assert!(contains_file(&params));
        assert_eq!(encode_parameters(&params), "status=hi");
    }

    #[test]
    fn test_file_parameter_content_type() {
        assert_eq!(
            HttpParameter::file("m", "a.JPG").content_type(),
            Some("image/jpeg")
        );
        assert_eq!(
            HttpParameter::file("m", "a.gif").content_type(),
            Some("image/gif")
        );
        assert_eq!(
            HttpParameter::file("m", "a.bin").content_type(),
            Some("application/octet-stream")
        );
        assert_eq!(HttpParameter::new("m", "v").content_type(), None);
    }

    #[test]
    fn test_url_with_query_for_get() {
        let req = HttpRequest::builder(RequestMethod::Get, "https://api.example.com/search")
            .parameter("q", "rust lang")
            .parameter("count", "5")
            .build();
        assert_eq!(
            req.url_with_query(),
            "https://api.example.com/search?q=rust+lang&count=5"
        );
        assert_eq!(req.form_body(), None);
    }

    #[test]
    fn test_url_with_query_appends_to_existing_query() {
        let req = HttpRequest::builder(RequestMethod::Delete, "https://h/x?a=1")
            .parameter("b", "2")
            .build();
        assert_eq!(req.url_with_query(), "https://h/x?a=1&b=2");
    }

    #[test]
    fn test_post_keeps_url_and_builds_body() {
        let req = HttpRequest::builder(RequestMethod::Post, "https://h/update")
            .parameter("status", "hello world")
            .build();
        assert_eq!(req.url_with_query(), "https://h/update");
        assert_eq!(req.form_body().as_deref(), Some("status=hello+world"));
    }

    #[test]
    fn test_method_conversion() {
        assert_eq!(reqwest::Method::from(RequestMethod::Head), reqwest::Method::HEAD);
        assert_eq!(RequestMethod::Put.to_string(), "PUT");
        assert!(RequestMethod::Put.has_body());
        assert!(!RequestMethod::Delete.has_body());
    }
}
