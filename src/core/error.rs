/// Fallback shown when the scanning service gives no `detail`.
pub const GENERIC_SCAN_FAILURE: &str = "Scan failed. Please try again.";

/// Operator input rejected before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Target IP/Domain is required")]
    MissingTarget,
    #[error("Please enter a valid IP address or domain name")]
    InvalidTarget,
    #[error("Please enter a valid port range (e.g., 1-1000 or 22,80,443)")]
    InvalidPortRange,
}

/// A 2xx report that cannot be turned into a view model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportError {
    #[error("malformed scan report: {0}")]
    Malformed(String),
}

/// Failure of a submitted scan. `Display` is the operator-facing message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    /// Transport failure or non-2xx response.
    #[error("{message}")]
    RequestFailed {
        message: String,
        status: Option<u16>,
    },
    #[error("Scan timed out after {secs}s")]
    Timeout { secs: u64 },
    #[error("Scan aborted")]
    Cancelled,
    #[error(transparent)]
    Malformed(#[from] ReportError),
}

impl ScanError {
    /// Build a request failure, preferring the service's `detail` message.
    pub fn request_failed(detail: Option<String>, status: Option<u16>) -> Self {
        let message = detail
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| GENERIC_SCAN_FAILURE.to_string());
        Self::RequestFailed { message, status }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("A scan is already running")]
    Busy,
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
