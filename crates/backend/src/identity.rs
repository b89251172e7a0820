use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;

use mathe_core::UserId;

//
// ─── IDENTITY ──────────────────────────────────────────────────────────────────
//

/// An authenticated-session handle issued by the identity provider.
///
/// Created and destroyed by the provider; everything downstream only observes
/// it through the change stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: UserId,
    pub email: Option<String>,
}

impl Identity {
    #[must_use]
    pub fn new(uid: impl Into<UserId>, email: Option<String>) -> Self {
        Self {
            uid: uid.into(),
            email,
        }
    }
}

/// Errors surfaced by identity-provider operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AuthError {
    #[error("no account matches this email")]
    UserNotFound,

    #[error("wrong password")]
    WrongPassword,

    #[error("invalid email address")]
    InvalidEmail,

    #[error("authentication failed: {0}")]
    Other(String),
}

//
// ─── PROVIDER CONTRACT ─────────────────────────────────────────────────────────
//

/// Contract for the external authentication collaborator.
///
/// Identity transitions are published on a `watch` channel: subscribers see
/// emissions in order, and a receiver that falls behind observes only the
/// newest value, which is exactly the supersession rule the session
/// coordinator needs. Dropping the receiver ends the subscription.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The identity signed in right now, if any.
    fn current_identity(&self) -> Option<Identity>;

    /// Subscribe to identity-change events. The receiver's initial value is
    /// the current identity.
    fn subscribe(&self) -> watch::Receiver<Option<Identity>>;

    /// Authenticate with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` or `AuthError::WrongPassword` for
    /// rejected credentials, `AuthError::Other` for transport failures.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    /// End the current session. The resulting `None` emission on the change
    /// stream drives the application back to the unauthenticated state.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Other` for transport failures.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Request a password-reset email.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if no account matches, or
    /// `AuthError::Other` for transport failures.
    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError>;
}

//
// ─── IN-MEMORY PROVIDER ────────────────────────────────────────────────────────
//

/// In-memory identity provider for tests and credential-free demo runs.
///
/// Registered users are fixed at construction; `emit` drives raw identity
/// transitions so tests can exercise the change stream directly.
pub struct InMemoryIdentityProvider {
    users: HashMap<String, (String, Identity)>,
    current: watch::Sender<Option<Identity>>,
    reset_requests: Mutex<Vec<String>>,
}

impl InMemoryIdentityProvider {
    #[must_use]
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self {
            users: HashMap::new(),
            current,
            reset_requests: Mutex::new(Vec::new()),
        }
    }

    /// Register an account the provider will accept.
    #[must_use]
    pub fn with_user(mut self, email: &str, password: &str, uid: &str) -> Self {
        let identity = Identity::new(uid, Some(email.to_string()));
        self.users
            .insert(email.to_string(), (password.to_string(), identity));
        self
    }

    /// Publish an identity transition without going through `sign_in`.
    pub fn emit(&self, identity: Option<Identity>) {
        self.current.send_replace(identity);
    }

    /// Emails that password resets were requested for, in request order.
    #[must_use]
    pub fn reset_requests(&self) -> Vec<String> {
        self.reset_requests
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl Default for InMemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    fn current_identity(&self) -> Option<Identity> {
        self.current.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.current.subscribe()
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let (expected, identity) = self.users.get(email).ok_or(AuthError::UserNotFound)?;
        if expected != password {
            return Err(AuthError::WrongPassword);
        }

        self.current.send_replace(Some(identity.clone()));
        Ok(identity.clone())
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.current.send_replace(None);
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let mut requests = self
            .reset_requests
            .lock()
            .map_err(|e| AuthError::Other(e.to_string()))?;
        requests.push(email.to_string());

        if self.users.contains_key(email) {
            Ok(())
        } else {
            Err(AuthError::UserNotFound)
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
