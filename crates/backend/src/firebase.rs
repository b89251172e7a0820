//! Firebase-flavored REST implementations of the collaborator traits.
//!
//! `FirebaseAuth` speaks the Identity Toolkit accounts API; `RtdbStore` reads
//! Realtime-Database documents as plain JSON over GET.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::identity::{AuthError, Identity, IdentityProvider};
use crate::records::{RawRecord, RecordStore, StoreError};

const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";

//
// ─── AUTH ──────────────────────────────────────────────────────────────────────
//

/// Identity provider backed by the Firebase accounts REST API.
///
/// Holds the current identity locally and publishes transitions on a `watch`
/// channel; the remote API is only consulted for sign-in and reset requests.
pub struct FirebaseAuth {
    client: Client,
    base_url: String,
    api_key: String,
    current: watch::Sender<Option<Identity>>,
}

impl FirebaseAuth {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, IDENTITY_TOOLKIT_URL)
    }

    /// Point the provider at a non-default endpoint (local emulator).
    #[must_use]
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            current,
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/accounts:{action}?key={}",
            self.base_url.trim_end_matches('/'),
            self.api_key
        )
    }
}

#[async_trait]
impl IdentityProvider for FirebaseAuth {
    fn current_identity(&self) -> Option<Identity> {
        self.current.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.current.subscribe()
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let payload = SignInRequest {
            email,
            password,
            return_secure_token: true,
        };

        let response = self
            .client
            .post(self.endpoint("signInWithPassword"))
            .json(&payload)
            .send()
            .await
            .map_err(|e| AuthError::Other(e.to_string()))?;

        if !response.status().is_success() {
            return Err(decode_auth_error(response).await);
        }

        let body: SignInResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Other(e.to_string()))?;

        let identity = Identity::new(body.local_id.as_str(), body.email);
        self.current.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        // Token revocation is not part of the accounts API; forgetting the
        // identity locally is the whole operation.
        self.current.send_replace(None);
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let payload = OobCodeRequest {
            request_type: "PASSWORD_RESET",
            email,
        };

        let response = self
            .client
            .post(self.endpoint("sendOobCode"))
            .json(&payload)
            .send()
            .await
            .map_err(|e| AuthError::Other(e.to_string()))?;

        if !response.status().is_success() {
            return Err(decode_auth_error(response).await);
        }
        Ok(())
    }
}

async fn decode_auth_error(response: reqwest::Response) -> AuthError {
    let status = response.status();
    let code = match response.json::<ErrorResponse>().await {
        Ok(body) => body.error.message,
        Err(_) => return AuthError::Other(format!("auth request failed with status {status}")),
    };

    // Codes may carry a suffix, e.g. "TOO_MANY_ATTEMPTS_TRY_LATER : ...".
    match code.split_whitespace().next().unwrap_or(code.as_str()) {
        "EMAIL_NOT_FOUND" => AuthError::UserNotFound,
        "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => AuthError::WrongPassword,
        "INVALID_EMAIL" | "MISSING_EMAIL" => AuthError::InvalidEmail,
        _ => AuthError::Other(code),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OobCodeRequest<'a> {
    request_type: &'static str,
    email: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

//
// ─── RECORD STORE ──────────────────────────────────────────────────────────────
//

/// Record store reading Realtime-Database documents over REST.
///
/// A document read is `GET {base_url}{path}.json`; the database answers
/// literal `null` for paths that hold no record.
pub struct RtdbStore {
    client: Client,
    base_url: String,
}

impl RtdbStore {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl RecordStore for RtdbStore {
    async fn read_once(&self, path: &str) -> Result<Option<RawRecord>, StoreError> {
        let url = format!("{}{path}.json", self.base_url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StoreError::Transport(format!(
                "read of {path} failed with status {}",
                response.status()
            )));
        }

        let value: RawRecord = response
            .json()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        if value.is_null() {
            Ok(None)
        } else {
            Ok(Some(value))
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
