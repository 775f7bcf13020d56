//! Auth endpoints and session types.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::{decode_json, ensure_ok, Backend, BackendError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix timestamp after which the access token is dead.
    pub expires_at: i64,
    pub user: AuthUser,
}

impl Session {
    pub fn is_live(&self, now: i64) -> bool {
        self.expires_at > now
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    user: AuthUser,
}

impl From<TokenResponse> for Session {
    fn from(token: TokenResponse) -> Self {
        Session {
            expires_at: Utc::now().timestamp() + token.expires_in,
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            user: token.user,
        }
    }
}

impl Backend {
    /// Password sign-in. On success the client's bearer token is updated.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.api_url());
        let resp = self
            .http()
            .post(url)
            .header("apikey", self.anon_key().to_owned())
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let token: TokenResponse = decode_json(resp).await?;
        let session = Session::from(token);
        self.set_token(Some(session.access_token.clone()));
        Ok(session)
    }

    /// Create an account. The backend signs the user in immediately, so this
    /// also returns a session and updates the bearer token.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        let url = format!("{}/auth/v1/signup", self.api_url());
        let resp = self
            .http()
            .post(url)
            .header("apikey", self.anon_key().to_owned())
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let token: TokenResponse = decode_json(resp).await?;
        let session = Session::from(token);
        self.set_token(Some(session.access_token.clone()));
        Ok(session)
    }

    /// Revoke the current session. The local token is cleared even if the
    /// backend call fails; the caller is signing out either way.
    pub async fn sign_out(&self) -> Result<(), BackendError> {
        let token = self.token();
        self.set_token(None);
        let Some(token) = token else {
            return Ok(());
        };
        let url = format!("{}/auth/v1/logout", self.api_url());
        let resp = self
            .http()
            .post(url)
            .header("apikey", self.anon_key().to_owned())
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await?;
        ensure_ok(resp).await?;
        Ok(())
    }

    /// Exchange a refresh token for a fresh session.
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<Session, BackendError> {
        let url = format!("{}/auth/v1/token?grant_type=refresh_token", self.api_url());
        let resp = self
            .http()
            .post(url)
            .header("apikey", self.anon_key().to_owned())
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        let token: TokenResponse = decode_json(resp).await?;
        let session = Session::from(token);
        self.set_token(Some(session.access_token.clone()));
        Ok(session)
    }
}

/// Claims the frontend cares about from the access token payload.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: i64,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Decode the payload segment of a JWT without verifying the signature.
/// The token is only inspected for expiry and role, never trusted locally.
pub fn decode_claims(token: &str) -> Result<JwtClaims, BackendError> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| BackendError::Token("missing payload segment".to_owned()))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|err| BackendError::Token(err.to_string()))?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_with_payload(payload: serde_json::Value) -> String {
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("header.{body}.signature")
    }

    #[test]
    fn claims_decode_from_unpadded_payload() {
        let token = token_with_payload(json!({
            "sub": "4b4b6e24-9c49-4b73-9b64-7397d54c8a1e",
            "exp": 1_900_000_000_i64,
            "role": "authenticated",
            "email": "a@example.com",
        }));
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.role.as_deref(), Some("authenticated"));
        assert_eq!(claims.exp, 1_900_000_000);
    }

    #[test]
    fn claims_tolerate_missing_optional_fields() {
        let token = token_with_payload(json!({ "sub": "x", "exp": 1 }));
        let claims = decode_claims(&token).unwrap();
        assert!(claims.role.is_none());
        assert!(claims.email.is_none());
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        assert!(matches!(
            decode_claims("not-a-jwt"),
            Err(BackendError::Token(_))
        ));
        assert!(matches!(
            decode_claims("a.!!!.c"),
            Err(BackendError::Token(_))
        ));
    }

    #[test]
    fn session_liveness_checks_expiry() {
        let session = Session {
            access_token: "t".into(),
            refresh_token: "r".into(),
            expires_at: 100,
            user: AuthUser {
                id: Uuid::nil(),
                email: "a@example.com".into(),
            },
        };
        assert!(session.is_live(99));
        assert!(!session.is_live(100));
    }
}
