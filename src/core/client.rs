//! Client for the remote scanning service.
//!
//! One `POST /scan` per call, no retries.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::core::{
    error::ScanError,
    report::ScanReport,
    request::ScanRequest,
};

/// Anything that can turn a validated request into a report.
#[async_trait]
pub trait ScanService: Send + Sync {
    async fn scan(&self, request: &ScanRequest) -> Result<ScanReport, ScanError>;
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// `detail` is usually a string; validation errors send a list.
    fn message(self) -> Option<String> {
        match self.detail? {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

/// reqwest-backed [`ScanService`].
pub struct HttpScanService {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpScanService {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ScanError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                warn!(error = %e, "failed to create HTTP client");
                ScanError::request_failed(None, None)
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/scan", self.base_url)
    }
}

#[async_trait]
impl ScanService for HttpScanService {
    async fn scan(&self, request: &ScanRequest) -> Result<ScanReport, ScanError> {
        let url = self.endpoint();
        info!(
            host = request.target(),
            ports = request.port_range(),
            url = %url,
            "submitting scan"
        );

        let resp = match self.client.post(&url).json(request).send().await {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                warn!(error = %e, "scan request timed out");
                return Err(ScanError::Timeout {
                    secs: self.timeout.as_secs(),
                });
            }
            Err(e) => {
                warn!(error = %e, "scan request failed");
                return Err(ScanError::request_failed(None, None));
            }
        };

        let status = resp.status();
        let body = match resp.bytes().await {
            Ok(b) => b,
            Err(e) if e.is_timeout() => {
                warn!(error = %e, "timed out reading scan response");
                return Err(ScanError::Timeout {
                    secs: self.timeout.as_secs(),
                });
            }
            Err(e) => {
                warn!(error = %e, status = %status, "failed to read scan response");
                return Err(ScanError::request_failed(None, Some(status.as_u16())));
            }
        };

        if !status.is_success() {
            let detail = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(ErrorBody::message);
            warn!(status = %status, detail = ?detail, "scanning service returned error");
            return Err(ScanError::request_failed(detail, Some(status.as_u16())));
        }

        debug!(bytes = body.len(), "scan response received");
        ScanReport::from_json(&body).map_err(|e| {
            warn!(error = %e, "scan response did not decode");
            ScanError::Malformed(e)
        })
    }
}
