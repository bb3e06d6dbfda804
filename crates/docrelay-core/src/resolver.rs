//! Multi-source document fetch resolver.
//!
//! Given a file name (or an absolute URL), tries an ordered list of
//! candidate endpoints, each with bounded retries, and returns the first
//! successful binary payload. A resource the backend marks as an
//! attachment fails with the distinguished `DownloadOnly` error so the
//! caller can offer a download instead of an inline view.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::Endpoints;
use crate::error::ResolveError;
use crate::fetch::{FetchRequest, HttpFetch};

pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_VIEW_TIMEOUT: Duration = Duration::from_secs(10);

const VIEW_ACCEPT: &str = "application/pdf";
const FALLBACK_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Clone)]
pub struct ViewOptions {
    pub retry_attempts: u32,
    pub timeout: Duration,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            timeout: DEFAULT_VIEW_TIMEOUT,
        }
    }
}

/// A successfully resolved document.
#[derive(Debug, Clone)]
pub enum ResolvedDocument {
    /// Binary payload suitable for inline display. The caller owns the
    /// bytes and their lifetime.
    Inline { bytes: Vec<u8>, content_type: String },
    /// Last-resort direct reference to the original absolute URL
    /// (best-effort, unauthenticated).
    Remote { url: String },
}

pub struct DocumentResolver<F> {
    fetch: F,
    endpoints: Endpoints,
}

impl<F: HttpFetch> DocumentResolver<F> {
    pub fn new(fetch: F, endpoints: Endpoints) -> Self {
        Self { fetch, endpoints }
    }

    /// Try every candidate endpoint in order; retries stay on one
    /// candidate until its attempts are exhausted before moving on.
    pub async fn resolve(
        &self,
        file_name: &str,
        options: &ViewOptions,
    ) -> Result<ResolvedDocument, ResolveError> {
        let candidates = self.endpoints.view_candidates(file_name);
        let mut last_error: Option<String> = None;

        for endpoint in &candidates {
            for attempt in 0..options.retry_attempts {
                debug!(endpoint, attempt = attempt + 1, "attempting document fetch");
                let request =
                    FetchRequest::new(endpoint.clone(), options.timeout).with_accept(VIEW_ACCEPT);
                match self.fetch.fetch(request).await {
                    Ok(response) if response.is_ok() => {
                        if response.is_attachment() {
                            debug!(endpoint, "resource is download-only");
                            return Err(ResolveError::DownloadOnly);
                        }
                        let content_type = response
                            .content_type
                            .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());
                        info!(endpoint, content_type, "document loaded");
                        return Ok(ResolvedDocument::Inline {
                            bytes: response.body,
                            content_type,
                        });
                    }
                    Ok(response) => {
                        warn!(
                            endpoint,
                            attempt = attempt + 1,
                            status = response.status,
                            "document fetch failed"
                        );
                        last_error =
                            Some(format!("failed with status {}", response.status));
                    }
                    Err(error) => {
                        warn!(endpoint, attempt = attempt + 1, error = %error, "document fetch failed");
                        last_error = Some(error.to_string());
                    }
                }
            }
        }

        if file_name.starts_with("http") {
            info!(url = file_name, "all candidates failed, falling back to direct URL");
            return Ok(ResolvedDocument::Remote {
                url: file_name.to_string(),
            });
        }

        Err(ResolveError::AllSourcesFailed {
            last_error: last_error.unwrap_or_else(|| "no candidate endpoints".to_string()),
        })
    }
}
