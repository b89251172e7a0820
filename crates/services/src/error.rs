//! Shared error types for the services crate.

use thiserror::Error;

use backend::StoreError;

/// Errors emitted by `ProfileService::load_profile`.
///
/// A dependent reference that resolves to no record is not represented here:
/// missing dependents are silently dropped from the result, never surfaced.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ProfileError {
    #[error("not signed in")]
    NotSignedIn,

    #[error("profile record not found")]
    RecordNotFound,

    #[error("failed to fetch a dependent record: {0}")]
    DependentFetchFailed(#[source] StoreError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("malformed profile record: {0}")]
    Malformed(String),
}
