//! The single seam through which all backend I/O flows.
//!
//! Production code uses `ReqwestFetcher`; tests substitute a programmable
//! fake so cache and resolver behavior can be exercised deterministically.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client};

use crate::error::FetchError;

/// One outgoing request. A `Some` body makes it a JSON POST, otherwise GET.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub accept: Option<String>,
    pub timeout: Duration,
    pub body: Option<serde_json::Value>,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            accept: None,
            timeout,
            body: None,
        }
    }

    pub fn post_json(url: impl Into<String>, body: serde_json::Value, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            accept: Some("application/json".to_string()),
            timeout,
            body: Some(body),
        }
    }

    pub fn with_accept(mut self, accept: &str) -> Self {
        self.accept = Some(accept.to_string());
        self
    }
}

/// What came back from one attempt. Non-success statuses are returned
/// here rather than as errors; callers decide whether to retry.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether the backend marked this resource for saving rather than
    /// inline display.
    pub fn is_attachment(&self) -> bool {
        self.content_disposition
            .as_deref()
            .is_some_and(|d| d.contains("attachment"))
    }
}

pub trait HttpFetch: Send + Sync {
    fn fetch(
        &self,
        request: FetchRequest,
    ) -> impl Future<Output = Result<FetchResponse, FetchError>> + Send;
}

impl<F: HttpFetch> HttpFetch for Arc<F> {
    fn fetch(
        &self,
        request: FetchRequest,
    ) -> impl Future<Output = Result<FetchResponse, FetchError>> + Send {
        (**self).fetch(request)
    }
}

/// HTTP fetcher backed by reqwest.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    /// Timeouts are supplied per request, so the client carries none.
    pub fn new() -> anyhow::Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self { client })
    }
}

fn header_value(response: &reqwest::Response, name: header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

impl HttpFetch for ReqwestFetcher {
    fn fetch(
        &self,
        request: FetchRequest,
    ) -> impl Future<Output = Result<FetchResponse, FetchError>> + Send {
        let client = self.client.clone();
        async move {
            let mut builder = match &request.body {
                Some(body) => client.post(&request.url).json(body),
                None => client.get(&request.url),
            };
            builder = builder.timeout(request.timeout);
            if let Some(accept) = &request.accept {
                builder = builder.header(header::ACCEPT, accept);
            }

            let response = builder.send().await.map_err(FetchError::from_reqwest)?;
            let status = response.status().as_u16();
            let content_type = header_value(&response, header::CONTENT_TYPE);
            let content_disposition = header_value(&response, header::CONTENT_DISPOSITION);
            let body = response
                .bytes()
                .await
                .map_err(FetchError::from_reqwest)?
                .to_vec();

            Ok(FetchResponse {
                status,
                content_type,
                content_disposition,
                body,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachment_detection() {
        let response = FetchResponse {
            status: 200,
            content_type: Some("application/pdf".to_string()),
            content_disposition: Some("attachment; filename=\"report.pdf\"".to_string()),
            body: vec![],
        };
        assert!(response.is_attachment());

        let inline = FetchResponse {
            content_disposition: Some("inline".to_string()),
            ..response.clone()
        };
        assert!(!inline.is_attachment());

        let missing = FetchResponse {
            content_disposition: None,
            ..response
        };
        assert!(!missing.is_attachment());
    }

    #[test]
    fn status_classification() {
        let ok = FetchResponse {
            status: 204,
            content_type: None,
            content_disposition: None,
            body: vec![],
        };
        assert!(ok.is_ok());

        let redirect = FetchResponse { status: 304, ..ok.clone() };
        assert!(!redirect.is_ok());

        let server_error = FetchResponse { status: 500, ..ok };
        assert!(!server_error.is_ok());
    }
}
