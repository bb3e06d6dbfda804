//! HTTP surface of the relay.
//!
//! Binary routes answer with CORS and cache headers so the admin frontend
//! can embed documents directly; list routes tag each response with an
//! `x-docrelay-source` header naming where the data came from.

use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use tracing::info;

use docrelay_core::{
    proxy_fetch, FetchRequest, FetchResponse, HttpFetch, ListSource, LoginRequest,
    ResolvedDocument, ViewOptions, PROXY_ACCEPT,
};

use crate::error::AppError;
use crate::state::AppState;

/// Header naming which source produced a list response.
const SOURCE_HEADER: HeaderName = HeaderName::from_static("x-docrelay-source");

/// Timeout for the single-shot view and download passthroughs.
const PASSTHROUGH_TIMEOUT: Duration = Duration::from_secs(30);

const BINARY_CACHE_CONTROL: &str = "public, max-age=3600";

/// Accept header for the view/download passthroughs. Unlike
/// [`PROXY_ACCEPT`] it ends in `*/*` so documents of any type survive
/// content negotiation.
const VIEW_ACCEPT: &str = "application/pdf,application/octet-stream,*/*";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/documents", get(list_documents))
        .route(
            "/api/documents/view/:file_name",
            get(view_document).options(preflight),
        )
        .route("/api/documents/download/:id", get(download_document))
        .route("/api/documents/resolve/:file_name", get(resolve_document))
        .route(
            "/api/documents/proxy/*path",
            get(proxy_document).options(preflight),
        )
        .route("/api/categories", get(list_categories))
        .route("/api/news", get(list_news))
        .route("/api/users/all", get(list_users))
        .route("/api/auth/login", post(login).options(preflight))
        .with_state(state)
}

async fn list_documents(State(state): State<AppState>) -> Response {
    let list = state.cache.get().await;
    list_response(list.documents, list.source)
}

async fn list_categories(State(state): State<AppState>) -> Response {
    let (items, source) = state.relay.categories().await;
    list_response(items, source)
}

async fn list_news(State(state): State<AppState>) -> Response {
    let (items, source) = state.relay.news().await;
    list_response(items, source)
}

async fn list_users(State(state): State<AppState>) -> Response {
    let (items, source) = state.relay.users().await;
    list_response(items, source)
}

fn list_response(items: Vec<Value>, source: ListSource) -> Response {
    let mut response = Json(items).into_response();
    response
        .headers_mut()
        .insert(SOURCE_HEADER, HeaderValue::from_static(source.as_str()));
    response
}

/// Single-shot inline view passthrough. This is also the first candidate
/// the resolver tries, so it must stay cheap: one fetch, no retries.
async fn view_document(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Result<Response, AppError> {
    let url = state.endpoints.backend_view(&file_name);
    let request =
        FetchRequest::new(url.as_str(), PASSTHROUGH_TIMEOUT).with_accept(VIEW_ACCEPT);
    match state.fetch.fetch(request).await {
        Ok(response) if response.is_ok() => {
            info!(file_name, "serving document view");
            Ok(binary_response(
                response,
                &format!("inline; filename=\"{file_name}\""),
            ))
        }
        Ok(response) => Err(AppError::View {
            details: format!("backend responded with status {}", response.status),
        }),
        Err(error) => Err(AppError::View {
            details: error.to_string(),
        }),
    }
}

async fn download_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let url = state.endpoints.backend_download(&id);
    let request =
        FetchRequest::new(url.as_str(), PASSTHROUGH_TIMEOUT).with_accept(VIEW_ACCEPT);
    match state.fetch.fetch(request).await {
        Ok(response) if response.is_ok() => {
            info!(id, "serving document download");
            Ok(binary_response(
                response,
                &format!("attachment; filename=\"{id}\""),
            ))
        }
        _ => Err(AppError::Download),
    }
}

/// Multi-source resolution: inline bytes when a candidate succeeds, a
/// redirect when only the original absolute URL is left.
async fn resolve_document(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Result<Response, AppError> {
    match state
        .resolver
        .resolve(&file_name, &ViewOptions::default())
        .await?
    {
        ResolvedDocument::Inline { bytes, content_type } => {
            let response = FetchResponse {
                status: 200,
                content_type: Some(content_type),
                content_disposition: None,
                body: bytes,
            };
            Ok(binary_response(
                response,
                &format!("inline; filename=\"{file_name}\""),
            ))
        }
        ResolvedDocument::Remote { url } => Ok(Redirect::temporary(&url).into_response()),
    }
}

async fn proxy_document(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Response, AppError> {
    let url = state.endpoints.proxy_target(&path);
    let response =
        proxy_fetch(&state.fetch, &state.proxy_policy, url.as_str(), PROXY_ACCEPT).await?;
    info!(path, "serving proxied document");
    Ok(binary_response(response, "inline"))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Response {
    let (status, outcome) = state.relay.login(&request).await;
    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(outcome),
    )
        .into_response()
}

async fn preflight() -> Response {
    let mut response = StatusCode::NO_CONTENT.into_response();
    cors_headers(response.headers_mut());
    response
}

/// Relay a binary payload, preferring the backend's headers and filling
/// in `fallback_disposition` when it sent none.
fn binary_response(upstream: FetchResponse, fallback_disposition: &str) -> Response {
    let mut response = upstream.body.into_response();
    let headers = response.headers_mut();

    let content_type = upstream
        .content_type
        .as_deref()
        .unwrap_or("application/pdf");
    headers.insert(header::CONTENT_TYPE, header_value(content_type));

    let disposition = upstream
        .content_disposition
        .as_deref()
        .unwrap_or(fallback_disposition);
    headers.insert(header::CONTENT_DISPOSITION, header_value(disposition));

    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(BINARY_CACHE_CONTROL),
    );
    cors_headers(headers);
    response
}

fn cors_headers(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
}

fn header_value(value: &str) -> HeaderValue {
    HeaderValue::from_str(value)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_accept_admits_any_content_type() {
        // The view and download passthroughs must not narrow negotiation
        // to text; only the proxy route restricts itself to text/*.
        assert!(VIEW_ACCEPT.ends_with("*/*"));
        assert!(PROXY_ACCEPT.ends_with("text/*"));
    }
}
