use std::sync::Arc;

use backend::{AuthError, Identity, IdentityProvider};

/// Validation boundary in front of the identity provider.
///
/// Syntactically hopeless input is rejected locally so the provider is never
/// contacted for it; everything else is delegated untouched. The structured
/// `AuthError` kinds pass through for the view layer to translate.
pub struct AuthService {
    provider: Arc<dyn IdentityProvider>,
}

impl AuthService {
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    /// Authenticate with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` for an empty or at-sign-less email
    /// without contacting the provider; otherwise propagates provider errors.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let email = validated_email(email)?;
        self.provider.sign_in(email, password).await
    }

    /// End the current session.
    ///
    /// # Errors
    ///
    /// Propagates provider errors.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.provider.sign_out().await
    }

    /// Request a password-reset email.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` for an empty or at-sign-less email
    /// without contacting the provider; otherwise propagates provider errors.
    pub async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let email = validated_email(email)?;
        self.provider.send_password_reset(email).await
    }
}

fn validated_email(email: &str) -> Result<&str, AuthError> {
    let trimmed = email.trim();
    if trimmed.is_empty() || !trimmed.contains('@') {
        return Err(AuthError::InvalidEmail);
    }
    Ok(trimmed)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use backend::InMemoryIdentityProvider;

    fn service(provider: &Arc<InMemoryIdentityProvider>) -> AuthService {
        AuthService::new(Arc::clone(provider) as Arc<dyn IdentityProvider>)
    }

    #[tokio::test]
    async fn empty_email_reset_fails_without_contacting_the_provider() {
        let provider = Arc::new(InMemoryIdentityProvider::new());

        let err = service(&provider)
            .send_password_reset("")
            .await
            .unwrap_err();

        assert_eq!(err, AuthError::InvalidEmail);
        assert!(provider.reset_requests().is_empty());
    }

    #[tokio::test]
    async fn email_without_at_sign_is_rejected_locally() {
        let provider = Arc::new(InMemoryIdentityProvider::new());

        let err = service(&provider)
            .sign_in("not-an-email", "pw")
            .await
            .unwrap_err();

        assert_eq!(err, AuthError::InvalidEmail);
        assert!(provider.current_identity().is_none());
    }

    #[tokio::test]
    async fn valid_email_is_trimmed_and_delegated() {
        let provider =
            Arc::new(InMemoryIdentityProvider::new().with_user("marie@example.com", "pw", "p1"));

        let identity = service(&provider)
            .sign_in("  marie@example.com ", "pw")
            .await
            .unwrap();

        assert_eq!(identity.uid.as_str(), "p1");
    }

    #[tokio::test]
    async fn provider_errors_pass_through_structured() {
        let provider =
            Arc::new(InMemoryIdentityProvider::new().with_user("marie@example.com", "pw", "p1"));
        let service = service(&provider);

        let err = service
            .sign_in("marie@example.com", "wrong")
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::WrongPassword);

        let err = service
            .send_password_reset("nobody@example.com")
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::UserNotFound);
    }
}
