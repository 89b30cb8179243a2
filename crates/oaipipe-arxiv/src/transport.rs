//! HTTP transport for the OAI-PMH endpoint

use std::time::Duration;

use oaipipe_core::{HttpError, SHARED_RUNTIME, http_client};

use crate::request::HarvestRequest;

/// Wait applied when a 503 arrives without a usable Retry-After header.
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(30);

/// Outcome of one ListRecords round trip.
#[derive(Debug)]
pub enum ListResponse {
    /// 200 with the raw OAI-PMH payload.
    Page(String),
    /// 503 asking us to come back after the given wait.
    RetryAfter(Duration),
}

/// One request/response cycle against the metadata endpoint.
///
/// The harvester is generic over this so tests can script response
/// sequences without a network.
pub trait Transport {
    fn list_records(&mut self, request: &HarvestRequest) -> Result<ListResponse, HttpError>;
}

/// reqwest-backed transport issuing form-encoded POST requests.
pub struct HttpTransport {
    url: String,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Transport for HttpTransport {
    fn list_records(&mut self, request: &HarvestRequest) -> Result<ListResponse, HttpError> {
        let fields = request.form_fields();
        SHARED_RUNTIME.handle().block_on(async {
            let response = http_client()
                .post(&self.url)
                .form(&fields)
                .send()
                .await
                .map_err(|e| HttpError::from_reqwest(&e))?;

            let status = response.status();
            if status == reqwest::StatusCode::SERVICE_UNAVAILABLE {
                return Ok(ListResponse::RetryAfter(retry_after(response.headers())));
            }
            if !status.is_success() {
                return Err(HttpError::status(
                    status.as_u16(),
                    format!("unexpected status from {}", self.url),
                ));
            }

            let body = response
                .text()
                .await
                .map_err(|e| HttpError::from_reqwest(&e))?;
            Ok(ListResponse::Page(body))
        })
    }
}

/// Parse a delta-seconds Retry-After header.
fn retry_after(headers: &reqwest::header::HeaderMap) -> Duration {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or_else(|| {
            log::warn!(
                "503 without a usable Retry-After header, waiting {}s",
                DEFAULT_RETRY_AFTER.as_secs()
            );
            DEFAULT_RETRY_AFTER
        })
}
