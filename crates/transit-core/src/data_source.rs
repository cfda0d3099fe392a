//! Source adapter contract and its error type.
//!
//! Every upstream is reached through a [`SourceAdapter`]: `fetch` performs the
//! single GET described by the adapter's [`SourceSpec`], `summarize` reduces
//! the untrusted payload into a [`SummaryData`]. Both report failures as
//! [`SourceError`] values; the pipeline turns those into per-source error
//! summaries instead of aborting the run.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use crate::domain::SummaryData;
use crate::http_client::{HttpClient, HttpError, HttpRequest};
use crate::source::{SourceKind, SourceSpec};

/// Untrusted JSON payload as returned by an upstream API.
pub type RawResponse = Value;

/// Which pipeline step failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// Transport failure, timeout, or non-2xx response.
    Fetch,
    /// Payload did not have the expected shape.
    Summarize,
}

/// Structured per-source failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn fetch(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Fetch,
            message: message.into(),
        }
    }

    pub fn summarize(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Summarize,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Fetch => "source.fetch",
            SourceErrorKind::Summarize => "source.summarize",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

impl From<HttpError> for SourceError {
    fn from(error: HttpError) -> Self {
        if error.is_timeout() {
            Self::fetch(format!("request timeout: {}", error.message()))
        } else {
            Self::fetch(format!("transport error: {}", error.message()))
        }
    }
}

/// Source adapter contract.
///
/// Implementations must be `Send + Sync`; the pipeline holds them behind
/// `Arc<dyn SourceAdapter>`.
pub trait SourceAdapter: Send + Sync {
    fn spec(&self) -> &SourceSpec;

    fn kind(&self) -> SourceKind {
        self.spec().kind
    }

    fn name(&self) -> &str {
        self.spec().name.as_str()
    }

    /// Performs the upstream GET and decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// [`SourceErrorKind::Fetch`] on transport failure, timeout or non-2xx
    /// status; [`SourceErrorKind::Summarize`] when the body is not JSON.
    fn fetch<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<RawResponse, SourceError>> + Send + 'a>>;

    /// Reduces a raw payload. Never panics on malformed input.
    ///
    /// # Errors
    ///
    /// [`SourceErrorKind::Summarize`] when the payload shape is unexpected.
    fn summarize(&self, raw: &RawResponse) -> Result<SummaryData, SourceError>;
}

/// Shared fetch used by every built-in adapter.
pub async fn fetch_json(
    client: &dyn HttpClient,
    spec: &SourceSpec,
    timeout_ms: u64,
) -> Result<RawResponse, SourceError> {
    let request = HttpRequest::get(spec.endpoint.as_str())
        .with_query(&spec.params)
        .with_header("accept", "application/json")
        .with_timeout_ms(timeout_ms);

    let response = client.execute(request).await?;
    if !response.is_success() {
        return Err(SourceError::fetch(format!(
            "{} upstream returned status {}",
            spec.name, response.status
        )));
    }

    serde_json::from_str(&response.body).map_err(|e| {
        SourceError::summarize(format!("{} returned a non-JSON body: {e}", spec.name))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::HttpResponse;
    use std::sync::Mutex;

    struct CannedHttpClient {
        response: Result<HttpResponse, HttpError>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl CannedHttpClient {
        fn new(response: Result<HttpResponse, HttpError>) -> Self {
            Self {
                response,
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    impl HttpClient for CannedHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .push(request);
            let response = self.response.clone();
            Box::pin(async move { response })
        }
    }

    fn spec() -> SourceSpec {
        SourceSpec::new("NYC_Traffic", SourceKind::Traffic, "https://data.example.test/t.json")
            .expect("valid spec")
            .with_param("$limit", "10")
    }

    #[tokio::test]
    async fn fetch_sends_params_and_timeout() {
        let client = CannedHttpClient::new(Ok(HttpResponse::ok_json("[]")));

        let raw = fetch_json(&client, &spec(), 2_500).await.expect("fetch");
        assert_eq!(raw, Value::Array(Vec::new()));

        let requests = client.requests.lock().expect("lock");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].timeout_ms, 2_500);
        assert_eq!(requests[0].query.get("$limit").map(String::as_str), Some("10"));
    }

    #[tokio::test]
    async fn non_success_status_is_a_fetch_error() {
        let client = CannedHttpClient::new(Ok(HttpResponse {
            status: 503,
            body: String::from("unavailable"),
        }));

        let error = fetch_json(&client, &spec(), 1_000).await.expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::Fetch);
        assert!(error.message().contains("503"));
    }

    #[tokio::test]
    async fn timeout_is_labelled() {
        let client = CannedHttpClient::new(Err(HttpError::timeout("deadline elapsed")));

        let error = fetch_json(&client, &spec(), 1_000).await.expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::Fetch);
        assert!(error.message().starts_with("request timeout"));
        assert_eq!(error.code(), "source.fetch");
    }

    #[tokio::test]
    async fn invalid_json_is_a_summarize_error() {
        let client = CannedHttpClient::new(Ok(HttpResponse::ok_json("<html>")));

        let error = fetch_json(&client, &spec(), 1_000).await.expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::Summarize);
    }
}
