//! Client for the hosted backend.
//!
//! The backend is an opaque remote service: Postgres tables behind a REST
//! surface, token auth, object storage, and a realtime change feed. This
//! module wraps all four behind one [`Backend`] handle that the pages share.

mod auth;
mod error;
mod query;
mod realtime;
mod storage;

pub use auth::{decode_claims, AuthUser, JwtClaims, Session};
pub use error::BackendError;
pub use query::QueryBuilder;
pub use realtime::{ChangeEvent, ChangeKind, RealtimeHandle};

use std::cell::RefCell;

use serde::de::DeserializeOwned;

use crate::config;

/// HTTP client for the hosted backend. Cheap to share behind an `Rc`.
pub struct Backend {
    http: reqwest::Client,
    api_url: String,
    anon_key: String,
    token: RefCell<Option<String>>,
}

impl Backend {
    /// Build a client from the startup configuration.
    pub fn new() -> Self {
        let cfg = config::get();
        Self::with_endpoint(cfg.api_url, cfg.anon_key)
    }

    pub fn with_endpoint(api_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        let mut api_url = api_url.into();
        while api_url.ends_with('/') {
            api_url.pop();
        }
        Self {
            http: reqwest::Client::new(),
            api_url,
            anon_key: anon_key.into(),
            token: RefCell::new(None),
        }
    }

    /// Set the bearer token applied to subsequent requests.
    pub fn set_token(&self, token: Option<String>) {
        *self.token.borrow_mut() = token;
    }

    /// Start a query against a table.
    pub fn table(&self, name: &str) -> QueryBuilder<'_> {
        QueryBuilder::new(self, name)
    }

    pub(crate) fn api_url(&self) -> &str {
        &self.api_url
    }

    pub(crate) fn anon_key(&self) -> &str {
        &self.anon_key
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn token(&self) -> Option<String> {
        self.token.borrow().clone()
    }

    /// Apply the `apikey` and `Authorization` headers. Anonymous requests
    /// still authenticate as the public role via the anon key.
    pub(crate) fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let req = req.header("apikey", self.anon_key.clone());
        match self.token() {
            Some(token) => req.header("Authorization", format!("Bearer {token}")),
            None => req.header("Authorization", format!("Bearer {}", self.anon_key)),
        }
    }
}

impl Default for Backend {
    fn default() -> Self {
        Self::new()
    }
}

/// Check the response status, decoding the backend's error body if any.
pub(crate) async fn ensure_ok(resp: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(BackendError::Api {
        status: status.as_u16(),
        message: extract_message(&body),
    })
}

/// Decode a successful JSON response body.
pub(crate) async fn decode_json<T: DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, BackendError> {
    let resp = ensure_ok(resp).await?;
    let body = resp.text().await?;
    Ok(serde_json::from_str(&body)?)
}

/// Pull a human-readable message out of a backend error body.
fn extract_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "msg", "error_description", "error"] {
            if let Some(message) = value.get(key).and_then(|v| v.as_str()) {
                return message.to_owned();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "request failed".to_owned()
    } else {
        trimmed.chars().take(200).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_message_prefers_structured_body() {
        assert_eq!(
            extract_message(r#"{"message":"row not found"}"#),
            "row not found"
        );
        assert_eq!(
            extract_message(r#"{"error_description":"bad credentials"}"#),
            "bad credentials"
        );
    }

    #[test]
    fn extract_message_falls_back_to_raw_body() {
        assert_eq!(extract_message("plain failure"), "plain failure");
        assert_eq!(extract_message("  "), "request failed");
    }

    #[test]
    fn endpoint_trailing_slash_is_trimmed() {
        let backend = Backend::with_endpoint("https://api.example/", "key");
        assert_eq!(backend.api_url(), "https://api.example");
    }
}
