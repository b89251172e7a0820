use std::sync::Arc;

use backend::{Identity, RecordStore, user_path};
use mathe_core::{ChildRef, StudentRecord, UserRecord};

use crate::error::ProfileError;

//
// ─── LOADED PROFILE ────────────────────────────────────────────────────────────
//

/// The resolved profile for one identity: the owning record plus, for
/// parents, the dependent student records in source-reference order.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedProfile {
    pub user: UserRecord,
    pub children: Vec<StudentRecord>,
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Loads the profile hierarchy for an identity from the record store.
///
/// A pure read: repeatable, no shared mutable state, and safe to run
/// concurrently. Every call stands alone.
pub struct ProfileService {
    store: Arc<dyn RecordStore>,
}

impl ProfileService {
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Resolve the profile for `identity`.
    ///
    /// Reads the owning record, then, for the parent role only, fans out
    /// to each dependent reference sequentially, preserving list order. A
    /// dependent whose record is missing is dropped from the result; a
    /// dependent whose read fails aborts the whole load.
    ///
    /// # Errors
    ///
    /// - `ProfileError::NotSignedIn` when `identity` is absent.
    /// - `ProfileError::RecordNotFound` when the owning record is missing.
    /// - `ProfileError::DependentFetchFailed` when any dependent read fails.
    /// - `ProfileError::Store` when the owning read fails.
    /// - `ProfileError::Malformed` when a fetched document does not decode.
    pub async fn load_profile(
        &self,
        identity: Option<&Identity>,
    ) -> Result<LoadedProfile, ProfileError> {
        let identity = identity.ok_or(ProfileError::NotSignedIn)?;

        let raw = self
            .store
            .read_once(&user_path(&identity.uid))
            .await?
            .ok_or(ProfileError::RecordNotFound)?;

        let user: UserRecord =
            serde_json::from_value(raw).map_err(|e| ProfileError::Malformed(e.to_string()))?;

        let children = match &user {
            UserRecord::Parent(parent) => self.resolve_children(&parent.children).await?,
            // Only the parent role owns dependents; no fan-out for anyone else.
            UserRecord::Teacher(_) | UserRecord::Student(_) => Vec::new(),
        };

        Ok(LoadedProfile { user, children })
    }

    // Sequential, in-order fan-out. Not fault-isolated per item: one failing
    // read fails the batch, while a missing record is simply skipped.
    async fn resolve_children(
        &self,
        refs: &[ChildRef],
    ) -> Result<Vec<StudentRecord>, ProfileError> {
        let mut resolved = Vec::with_capacity(refs.len());

        for child in refs {
            match child {
                ChildRef::Embedded(student) => resolved.push((**student).clone()),
                ChildRef::Id(uid) => {
                    let raw = self
                        .store
                        .read_once(&user_path(uid))
                        .await
                        .map_err(ProfileError::DependentFetchFailed)?;

                    let Some(raw) = raw else {
                        continue;
                    };

                    let student: StudentRecord = serde_json::from_value(raw)
                        .map_err(|e| ProfileError::Malformed(e.to_string()))?;
                    resolved.push(student);
                }
            }
        }

        Ok(resolved)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
