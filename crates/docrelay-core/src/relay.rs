//! Thin relays for the list endpoints and login.
//!
//! List relays never fail: on any backend problem they serve fixture data
//! and mark the result `ListSource::Fixture`. Login forwards credentials
//! and normalizes whatever shape the backend answers with.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

use crate::cache::{parse_json_array, ListSource, LIST_FETCH_TIMEOUT};
use crate::config::Endpoints;
use crate::fetch::{FetchRequest, HttpFetch};
use crate::fixtures;
use crate::models::User;

const LOGIN_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Normalized login response, whatever the backend answered with.
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

pub struct BackendRelay<F> {
    fetch: F,
    endpoints: Endpoints,
}

impl<F: HttpFetch> BackendRelay<F> {
    pub fn new(fetch: F, endpoints: Endpoints) -> Self {
        Self { fetch, endpoints }
    }

    pub async fn categories(&self) -> (Vec<Value>, ListSource) {
        self.list_or_fixture(self.endpoints.categories(), "categories", fixtures::sample_categories_json)
            .await
    }

    pub async fn news(&self) -> (Vec<Value>, ListSource) {
        self.list_or_fixture(self.endpoints.news(), "news", fixtures::sample_news_json)
            .await
    }

    pub async fn users(&self) -> (Vec<Value>, ListSource) {
        self.list_or_fixture(self.endpoints.users(), "users", fixtures::sample_users_json)
            .await
    }

    async fn list_or_fixture(
        &self,
        url: &Url,
        what: &str,
        fixture: fn() -> Vec<Value>,
    ) -> (Vec<Value>, ListSource) {
        let request =
            FetchRequest::new(url.as_str(), LIST_FETCH_TIMEOUT).with_accept("application/json");
        match self.fetch.fetch(request).await {
            Ok(response) if response.is_ok() => match parse_json_array(&response.body) {
                Some(items) => (items, ListSource::Backend),
                None => {
                    warn!(what, "backend returned a non-array payload, serving fixture data");
                    (fixture(), ListSource::Fixture)
                }
            },
            Ok(response) => {
                warn!(what, status = response.status, "backend list fetch failed, serving fixture data");
                (fixture(), ListSource::Fixture)
            }
            Err(error) => {
                warn!(what, error = %error, "backend list fetch failed, serving fixture data");
                (fixture(), ListSource::Fixture)
            }
        }
    }

    /// Forward a login and normalize the result to `{success, message,
    /// user}`. Returns the HTTP status the route should answer with.
    pub async fn login(&self, request: &LoginRequest) -> (u16, LoginOutcome) {
        let email = request.email.as_deref().map(str::trim).unwrap_or_default();
        let password = request.password.as_deref().map(str::trim).unwrap_or_default();
        if email.is_empty() || password.is_empty() {
            return (
                400,
                LoginOutcome {
                    success: false,
                    message: "Email and password are required".to_string(),
                    user: None,
                },
            );
        }

        debug!(email, "forwarding login to backend");
        let body = json!({ "email": email, "password": password });
        let request =
            FetchRequest::post_json(self.endpoints.login().as_str(), body, LOGIN_TIMEOUT);

        match self.fetch.fetch(request).await {
            Ok(response) => {
                let status = response.status;
                let outcome = normalize_login_response(&response.body, response.is_ok(), email);
                (if outcome.success { 200 } else { status.max(400) }, outcome)
            }
            Err(error) => {
                warn!(error = %error, "login request failed");
                (
                    500,
                    LoginOutcome {
                        success: false,
                        message: format!("Could not connect to the backend server: {error}"),
                        user: None,
                    },
                )
            }
        }
    }
}

/// Backends have answered login with a JSON object, a bare JSON string,
/// and plain text. Fold all of them into one shape.
fn normalize_login_response(body: &[u8], succeeded: bool, email: &str) -> LoginOutcome {
    let parsed: Option<Value> = serde_json::from_slice(body).ok();
    let text = String::from_utf8_lossy(body);

    let message = match &parsed {
        Some(Value::Object(fields)) => fields
            .get("message")
            .or_else(|| fields.get("error"))
            .and_then(Value::as_str)
            .map(str::to_string),
        Some(Value::String(s)) => Some(s.clone()),
        _ => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
    };

    if !succeeded {
        return LoginOutcome {
            success: false,
            message: message.unwrap_or_else(|| "Invalid credentials or server error".to_string()),
            user: None,
        };
    }

    let fields = parsed.as_ref().and_then(Value::as_object);
    let user = User {
        id: fields
            .and_then(|f| f.get("id"))
            .and_then(Value::as_i64)
            .unwrap_or(1),
        name: fields
            .and_then(|f| f.get("name"))
            .and_then(Value::as_str)
            .unwrap_or("Admin User")
            .to_string(),
        email: fields
            .and_then(|f| f.get("email"))
            .and_then(Value::as_str)
            .unwrap_or(email)
            .to_string(),
    };

    LoginOutcome {
        success: true,
        message: message.unwrap_or_else(|| "Login successful".to_string()),
        user: Some(user),
    }
}
