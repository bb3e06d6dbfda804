use thiserror::Error;

/// Transport-level failure for a single fetch attempt.
#[derive(Error, Debug, Clone)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),
}

impl FetchError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

/// Failure modes of the document fetch resolver.
///
/// `DownloadOnly` is deliberately distinct from the generic failure so
/// callers can switch the UI to a download action instead of reporting
/// an error.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Document is configured for download only")]
    DownloadOnly,

    #[error("Failed to load document from all available sources. Last error: {last_error}")]
    AllSourcesFailed { last_error: String },
}

/// Failure modes of the retrying proxy passthrough.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// The backend answered with a non-success status. Not retried.
    #[error("backend responded with status {status}")]
    Status { status: u16 },

    /// Every attempt timed out or failed at the transport level.
    #[error("request failed after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: FetchError },
}

impl ProxyError {
    /// HTTP status a route should answer with: the backend status when
    /// there is one, 504 when retries were exhausted without a response.
    pub fn http_status(&self) -> u16 {
        match self {
            ProxyError::Status { status } => *status,
            ProxyError::Exhausted { .. } => 504,
        }
    }
}
