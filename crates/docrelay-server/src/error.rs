use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use docrelay_core::{ProxyError, ResolveError};

/// Route-level failures. Each variant maps to the response shape its
/// route promises, so handlers can just use `?`.
#[derive(Debug)]
pub enum AppError {
    /// The inline view fetch failed; answered as JSON with details.
    View { details: String },
    /// The download passthrough failed; answered as plain text.
    Download,
    /// The multi-source resolver gave up or refused.
    Resolve(ResolveError),
    /// The retrying proxy passthrough failed.
    Proxy(ProxyError),
}

impl From<ResolveError> for AppError {
    fn from(error: ResolveError) -> Self {
        AppError::Resolve(error)
    }
}

impl From<ProxyError> for AppError {
    fn from(error: ProxyError) -> Self {
        AppError::Proxy(error)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::View { details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to fetch document",
                    "details": details,
                })),
            )
                .into_response(),
            AppError::Download => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to download document",
            )
                .into_response(),
            AppError::Resolve(error @ ResolveError::DownloadOnly) => (
                StatusCode::CONFLICT,
                Json(json!({ "error": error.to_string() })),
            )
                .into_response(),
            AppError::Resolve(error @ ResolveError::AllSourcesFailed { .. }) => (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": error.to_string() })),
            )
                .into_response(),
            AppError::Proxy(error) => {
                let status = error.http_status();
                (
                    StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                    Json(json!({
                        "error": "Failed to fetch document from backend",
                        "message": error.to_string(),
                        "status": status,
                    })),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docrelay_core::FetchError;

    #[test]
    fn download_only_maps_to_conflict() {
        let response = AppError::from(ResolveError::DownloadOnly).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn all_sources_failed_maps_to_bad_gateway() {
        let error = ResolveError::AllSourcesFailed {
            last_error: "failed with status 404".to_string(),
        };
        let response = AppError::from(error).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn proxy_errors_carry_the_backend_status() {
        let response = AppError::from(ProxyError::Status { status: 404 }).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let exhausted = ProxyError::Exhausted {
            attempts: 5,
            last: FetchError::Timeout,
        };
        let response = AppError::from(exhausted).into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }
}
