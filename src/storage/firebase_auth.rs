use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AuthProvider, AuthSession, StorageError};

pub const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";
pub const SECURE_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1";

/// Email/password accounts through the Identity Toolkit REST API.
#[derive(Clone)]
pub struct FirebaseAuth {
    client: reqwest::Client,
    base_url: String,
    token_url: String,
    api_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    local_id: String,
    email: String,
    id_token: String,
    refresh_token: String,
    /// Seconds, sent as a string.
    expires_in: String,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    grant_type: &'static str,
    refresh_token: &'a str,
}

/// The token endpoint answers in snake_case.
#[derive(Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl FirebaseAuth {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_urls(api_key, IDENTITY_TOOLKIT_URL, SECURE_TOKEN_URL)
    }

    /// Serves both the account and the token endpoints from `base_url`.
    #[must_use]
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self::with_urls(api_key, base_url.clone(), base_url)
    }

    #[must_use]
    pub fn with_urls(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token_url: token_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    async fn error_from(resp: reqwest::Response, op: &str) -> StorageError {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| format!("{op} failed with status {status}"));
        StorageError::new(message)
    }

    async fn password_call(
        &self,
        endpoint: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, StorageError> {
        let url = format!("{}/accounts:{endpoint}?key={}", self.base_url, self.api_key);
        let resp = self
            .client
            .post(url)
            .json(&PasswordRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(|e| StorageError::new(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Self::error_from(resp, endpoint).await);
        }

        let body: PasswordResponse = resp
            .json()
            .await
            .map_err(|e| StorageError::new(e.to_string()))?;
        Ok(AuthSession {
            user_id: body.local_id,
            email: body.email,
            id_token: body.id_token,
            refresh_token: body.refresh_token,
            expires_at: expiry(&body.expires_in, Utc::now()),
        })
    }
}

/// Absolute expiry for an `expiresIn` value. Unparseable values are treated
/// as already expired so the next remote call refreshes.
fn expiry(expires_in: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let secs = expires_in.trim().parse::<i64>().unwrap_or(0);
    Some(now + TimeDelta::try_seconds(secs).unwrap_or_default())
}

#[async_trait]
impl AuthProvider for FirebaseAuth {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, StorageError> {
        self.password_call("signUp", email, password).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, StorageError> {
        self.password_call("signInWithPassword", email, password)
            .await
    }

    async fn refresh(&self, session: &AuthSession) -> Result<AuthSession, StorageError> {
        let url = format!("{}/token?key={}", self.token_url, self.api_key);
        let resp = self
            .client
            .post(url)
            .form(&RefreshRequest {
                grant_type: "refresh_token",
                refresh_token: &session.refresh_token,
            })
            .send()
            .await
            .map_err(|e| StorageError::new(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(Self::error_from(resp, "token refresh").await);
        }
        let body: RefreshResponse = resp
            .json()
            .await
            .map_err(|e| StorageError::new(e.to_string()))?;
        debug!(user = %session.email, "id token refreshed");
        Ok(AuthSession {
            id_token: body.id_token,
            refresh_token: body.refresh_token,
            expires_at: expiry(&body.expires_in, Utc::now()),
            ..session.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn expiry_counts_from_now() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(
            expiry("3600", now),
            Some(Utc.with_ymd_and_hms(2025, 6, 1, 13, 0, 0).unwrap())
        );
        assert_eq!(expiry("soon", now), Some(now));
    }
}
