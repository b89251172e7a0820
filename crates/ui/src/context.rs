use std::sync::Arc;

use services::{AuthService, SessionHandle};

/// What the composition root must provide for the UI to run.
pub trait UiApp: Send + Sync {
    fn session(&self) -> SessionHandle;
    fn auth(&self) -> Arc<AuthService>;
}

#[derive(Clone)]
pub struct AppContext {
    session: SessionHandle,
    auth: Arc<AuthService>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            session: app.session(),
            auth: app.auth(),
        }
    }

    #[must_use]
    pub fn session(&self) -> SessionHandle {
        self.session.clone()
    }

    #[must_use]
    pub fn auth(&self) -> Arc<AuthService> {
        Arc::clone(&self.auth)
    }
}

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
