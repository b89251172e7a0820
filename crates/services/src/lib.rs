#![forbid(unsafe_code)]

pub mod auth_service;
pub mod error;
pub mod profile_service;
pub mod session;

pub use auth_service::AuthService;
pub use error::ProfileError;
pub use profile_service::{LoadedProfile, ProfileService};
pub use session::{CoordinatorGuard, SessionCoordinator, SessionHandle, SessionPhase, SessionState};
