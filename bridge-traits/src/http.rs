//! HTTP Client Abstraction
//!
//! Provides async HTTP operations with Basic authentication, WebDAV verbs and
//! retry logic.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::error::{BridgeError, Result};

/// HTTP method types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Put,
    Delete,
    Head,
    /// WebDAV property listing (RFC 4918).
    Propfind,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Propfind => "PROPFIND",
        }
    }
}

/// HTTP request builder
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Bytes>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Attach an `Authorization: Basic ...` header (RFC 7617).
    pub fn basic_auth(self, username: &str, password: &str) -> Self {
        let encoded = STANDARD.encode(format!("{}:{}", username, password));
        self.header("Authorization", format!("Basic {}", encoded))
    }

    pub fn body(mut self, body: Bytes) -> Self {
        self.body = Some(body);
        self
    }

    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }
}

/// HTTP response
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl HttpResponse {
    /// Parse response body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            BridgeError::OperationFailed(format!("JSON deserialization failed: {}", e))
        })
    }

    /// Get response body as UTF-8 string
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| BridgeError::OperationFailed(format!("Invalid UTF-8: {}", e)))
    }

    /// Check if response status is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// WebDAV `207 Multi-Status`
    pub fn is_multi_status(&self) -> bool {
        self.status == 207
    }

    /// Check if response status indicates a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Check if response status indicates a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    /// 429 and 5xx are worth another attempt; other statuses are final.
    pub fn is_retryable(&self) -> bool {
        self.status == 429 || self.is_server_error()
    }
}

/// Retry policy configuration
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    /// Base delay between retries
    pub base_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Whether to use exponential backoff
    pub use_exponential_backoff: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            use_exponential_backoff: true,
        }
    }
}

impl RetryPolicy {
    /// Policy that performs exactly one attempt.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay to wait before attempt number `attempt + 1` (`attempt` is 1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if !self.use_exponential_backoff {
            return self.base_delay.min(self.max_delay);
        }
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// What happened on one attempt of a retried request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptReport {
    /// 1-based
    pub attempt: u32,
    pub max_attempts: u32,
    pub elapsed: Duration,
    /// Response status, `None` when no response arrived
    pub status: Option<u16>,
    /// Transport error when no response arrived
    pub error: Option<String>,
    /// Whether another attempt follows after backoff
    pub will_retry: bool,
}

/// Async HTTP client trait
///
/// This trait abstracts HTTP operations to allow platform-specific implementations.
/// Implementations should handle:
/// - TLS certificate validation
/// - Connection pooling and keep-alive
/// - Non-standard verbs such as `PROPFIND`
///
/// # Example
///
/// ```ignore
/// use bridge_traits::http::{HttpClient, HttpRequest, HttpMethod};
///
/// async fn list(client: &dyn HttpClient) -> Result<String> {
///     let request = HttpRequest::new(HttpMethod::Propfind, "https://cloud.example.com/remote.php/dav/files/me")
///         .header("Depth", "1")
///         .basic_auth("me", "secret");
///
///     let response = client.execute(request).await?;
///     response.text()
/// }
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Execute an HTTP request once
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Network connection fails
    /// - TLS validation fails
    /// - Request times out
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;

    /// Execute an HTTP request with a retry policy
    ///
    /// Transport failures, 429 and 5xx responses are retried with backoff.
    /// The last response (or error) is returned once attempts run out.
    async fn execute_with_retry(
        &self,
        request: HttpRequest,
        policy: RetryPolicy,
    ) -> Result<HttpResponse> {
        self.execute_with_retry_observed(request, policy, &|_: &AttemptReport| {})
            .await
    }

    /// Same as [`execute_with_retry`](Self::execute_with_retry), calling
    /// `observer` after every attempt.
    async fn execute_with_retry_observed(
        &self,
        request: HttpRequest,
        policy: RetryPolicy,
        observer: &(dyn for<'a> Fn(&'a AttemptReport) + Send + Sync),
    ) -> Result<HttpResponse> {
        let max_attempts = policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let started = Instant::now();
            let outcome = self.execute(request.clone()).await;
            let retryable = match &outcome {
                Ok(response) => response.is_retryable(),
                Err(error) => error.is_transient(),
            };
            let will_retry = retryable && attempt < max_attempts;

            observer(&AttemptReport {
                attempt,
                max_attempts,
                elapsed: started.elapsed(),
                status: outcome.as_ref().ok().map(|response| response.status),
                error: outcome.as_ref().err().map(|error| error.to_string()),
                will_retry,
            });

            if !will_retry {
                return outcome;
            }

            tokio::time::sleep(policy.delay_for(attempt)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_http_request_builder() {
        let request = HttpRequest::new(HttpMethod::Propfind, "https://example.com")
            .header("Depth", "1")
            .basic_auth("alice", "secret")
            .timeout(Duration::from_secs(30));

        assert_eq!(request.url, "https://example.com");
        assert_eq!(request.headers.get("Depth"), Some(&"1".to_string()));
        assert_eq!(
            request.headers.get("Authorization"),
            Some(&"Basic YWxpY2U6c2VjcmV0".to_string())
        );
        assert_eq!(request.method.as_str(), "PROPFIND");
    }

    #[test]
    fn test_http_response_status_checks() {
        let response = HttpResponse {
            status: 207,
            headers: HashMap::new(),
            body: Bytes::from("test"),
        };

        assert!(response.is_success());
        assert!(response.is_multi_status());
        assert!(!response.is_client_error());
        assert!(!response.is_retryable());
    }

    #[test]
    fn test_backoff_delays() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(300),
            use_exponential_backoff: true,
        };

        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(300));
    }

    struct FlakyClient {
        calls: AtomicU32,
        statuses: Vec<u16>,
    }

    #[async_trait]
    impl HttpClient for FlakyClient {
        async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
            let status = self.statuses[call.min(self.statuses.len() - 1)];
            Ok(HttpResponse {
                status,
                headers: HashMap::new(),
                body: Bytes::new(),
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_retry_recovers_from_server_error() {
        let client = FlakyClient {
            calls: AtomicU32::new(0),
            statuses: vec![503, 201],
        };
        let request = HttpRequest::new(HttpMethod::Put, "https://example.com/a.jpg");

        let response = client
            .execute_with_retry(request, RetryPolicy::default())
            .await
            .unwrap();

        assert_eq!(response.status, 201);
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_retry_does_not_retry_client_errors() {
        let client = FlakyClient {
            calls: AtomicU32::new(0),
            statuses: vec![403, 201],
        };
        let request = HttpRequest::new(HttpMethod::Put, "https://example.com/a.jpg");

        let response = client
            .execute_with_retry(request, RetryPolicy::default())
            .await
            .unwrap();

        assert_eq!(response.status, 403);
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_observer_sees_every_attempt() {
        let client = FlakyClient {
            calls: AtomicU32::new(0),
            statuses: vec![503, 502, 201],
        };
        let request = HttpRequest::new(HttpMethod::Put, "https://example.com/a.jpg");
        let reports = std::sync::Mutex::new(Vec::new());

        let response = client
            .execute_with_retry_observed(request, RetryPolicy::default(), &|report: &AttemptReport| {
                reports
                    .lock()
                    .unwrap()
                    .push((report.attempt, report.status, report.will_retry));
            })
            .await
            .unwrap();

        assert_eq!(response.status, 201);
        assert_eq!(
            reports.into_inner().unwrap(),
            vec![(1, Some(503), true), (2, Some(502), true), (3, Some(201), false)]
        );
    }
}
