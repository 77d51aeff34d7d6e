//! HTTP transport capability consumed by the measurement core
//!
//! The core only sees [`HttpTransport`]. [`NetworkClient`] is the reqwest
//! implementation with connect/read timeouts and a [`RetryPolicy`] applied at
//! this boundary.

#[cfg(test)]
pub(crate) mod fake;
#[cfg(test)]
mod integration_tests;

use crate::{
    error::{AppError, Result, RetryPolicy},
    models::Config,
};
use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use std::time::Duration;

/// HTTP transport abstraction for the measurement core and for tests
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Execute a request and return the fully read response
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// HTTP request description
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: Method,
    pub query: Vec<(String, String)>,
    /// Form-encoded body fields; only sent when present
    pub form: Option<Vec<(String, String)>>,
    /// Overrides the client-wide request timeout
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn new(url: impl Into<String>, method: Method) -> Self {
        Self {
            url: url.into(),
            method,
            query: Vec::new(),
            form: None,
            timeout: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(url, Method::GET)
    }

    /// A POST carrying the given form fields
    pub fn post_form<K, V>(url: impl Into<String>, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut request = Self::new(url, Method::POST);
        request.form = Some(fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        request
    }

    /// Append a query parameter
    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The request URL with the query parameters appended
    pub fn full_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.url)?;
        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

/// Join a server root and a relative path with exactly one slash
pub fn endpoint(root: &str, path: &str) -> String {
    format!("{}/{}", root.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// HTTP response with the body read to completion
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status_code: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status_code: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status_code,
            body: body.into(),
        }
    }

    /// Check if the response indicates success
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    pub fn body_size(&self) -> usize {
        self.body.len()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Turn a non-2xx answer into an [`AppError::HttpRequest`]
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(AppError::http_request(format!(
                "server answered with status {}",
                self.status_code
            )))
        }
    }
}

/// reqwest-backed transport
pub struct NetworkClient {
    client: Client,
    retry_policy: RetryPolicy,
}

impl NetworkClient {
    /// Create a client with explicit timeouts
    pub fn new(connect_timeout: Duration, read_timeout: Duration, request_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .read_timeout(read_timeout)
            .timeout(request_timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            retry_policy: RetryPolicy::none(),
        })
    }

    /// Create a client from the application configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Self::new(config.connect_timeout(), config.read_timeout(), config.request_timeout())?;
        Ok(client.with_retry_policy(RetryPolicy::transient(config.retry_attempts)))
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    async fn execute_once(&self, request: &HttpRequest, url: &Url) -> Result<HttpResponse> {
        let mut builder = self.client.request(request.method.clone(), url.clone());

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(ref form) = request.form {
            builder = builder.form(form);
        }

        let response = builder.send().await?;
        let status_code = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(AppError::from)?;

        Ok(HttpResponse::new(status_code, body.to_vec()))
    }
}

#[async_trait]
impl HttpTransport for NetworkClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = request.full_url()?;
        self.retry_policy
            .run(|| self.execute_once(&request, &url))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = HttpRequest::get("http://speedtest.example.net/speedtest/latency.txt")
            .with_query("x", 1_700_000_000_000i64)
            .with_timeout(Duration::from_millis(500));

        assert_eq!(request.method, Method::GET);
        assert_eq!(request.timeout, Some(Duration::from_millis(500)));
        assert!(request.form.is_none());
        assert_eq!(
            request.full_url().unwrap().as_str(),
            "http://speedtest.example.net/speedtest/latency.txt?x=1700000000000"
        );
    }

    #[test]
    fn test_query_pairs_are_appended_in_order() {
        let request = HttpRequest::get("http://h.example/speedtest/random750x750.jpg")
            .with_query("x", 42)
            .with_query("y", 2);
        assert_eq!(request.full_url().unwrap().query(), Some("x=42&y=2"));
    }

    #[test]
    fn test_post_form_request() {
        let request = HttpRequest::post_form("http://h.example/speedtest/upload.php", [("content0", "ABC")]);
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.form, Some(vec![("content0".to_string(), "ABC".to_string())]));
    }

    #[test]
    fn test_endpoint_joins_with_single_slash() {
        assert_eq!(endpoint("http://h.example", "speedtest/latency.txt"), "http://h.example/speedtest/latency.txt");
        assert_eq!(endpoint("http://h.example/", "/speedtest/upload.php"), "http://h.example/speedtest/upload.php");
    }

    #[test]
    fn test_invalid_url_is_parse_error() {
        let err = HttpRequest::get("no scheme here").full_url().unwrap_err();
        assert_eq!(err.category(), "PARSE");
    }

    #[test]
    fn test_response_status_helpers() {
        let ok = HttpResponse::new(200, "size=10");
        assert!(ok.is_success());
        assert_eq!(ok.body_size(), 7);
        assert_eq!(ok.text(), "size=10");
        assert!(ok.error_for_status().is_ok());

        let missing = HttpResponse::new(404, "nope");
        assert!(!missing.is_success());
        assert!(matches!(missing.error_for_status(), Err(AppError::HttpRequest(_))));
    }

    #[test]
    fn test_client_from_default_config() {
        let client = NetworkClient::from_config(&Config::default()).unwrap();
        assert_eq!(client.retry_policy().max_attempts(), 1);
    }
}
