use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use backend::{AuthError, Identity, IdentityProvider};

use crate::error::ProfileError;
use crate::profile_service::{LoadedProfile, ProfileService};

//
// ─── SESSION STATE ─────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// The first identity emission has not been resolved yet.
    Initializing,
    /// No identity is signed in.
    Unauthenticated,
    /// The latest identity emission has been resolved, successfully or not.
    Ready,
}

/// The coordinator's published state, one snapshot per resolved emission.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub identity: Option<Identity>,
    pub profile: Option<Arc<LoadedProfile>>,
    pub error: Option<ProfileError>,
}

impl SessionState {
    #[must_use]
    pub fn initializing() -> Self {
        Self {
            phase: SessionPhase::Initializing,
            identity: None,
            profile: None,
            error: None,
        }
    }

    fn unauthenticated() -> Self {
        Self {
            phase: SessionPhase::Unauthenticated,
            identity: None,
            profile: None,
            error: None,
        }
    }

    fn ready(identity: Identity, outcome: Result<LoadedProfile, ProfileError>) -> Self {
        let (profile, error) = match outcome {
            Ok(profile) => (Some(Arc::new(profile)), None),
            Err(err) => (None, Some(err)),
        };
        Self {
            phase: SessionPhase::Ready,
            identity: Some(identity),
            profile,
            error,
        }
    }
}

//
// ─── COORDINATOR ───────────────────────────────────────────────────────────────
//

/// Drives profile resolution from the identity-change stream.
///
/// The driver task is the single writer of the published state. Emissions are
/// consumed in order through a `watch` receiver; a resolution that finishes
/// after a newer emission has arrived is discarded, never published, so the
/// state always reflects the newest emission. There is no cancellation: a
/// stale in-flight load simply runs to completion and is thrown away.
pub struct SessionCoordinator {
    identities: watch::Receiver<Option<Identity>>,
    profiles: ProfileService,
    state: watch::Sender<SessionState>,
}

impl SessionCoordinator {
    /// Wire a coordinator to a provider's change stream.
    ///
    /// The handle is valid immediately; its state reads `Initializing` until
    /// the driver resolves the first emission.
    #[must_use]
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        profiles: ProfileService,
    ) -> (Self, SessionHandle) {
        let identities = provider.subscribe();
        let (state, state_rx) = watch::channel(SessionState::initializing());

        let coordinator = Self {
            identities,
            profiles,
            state,
        };
        let handle = SessionHandle {
            state: state_rx,
            provider,
        };
        (coordinator, handle)
    }

    /// Convenience: wire up and spawn the driver task in one step.
    ///
    /// Dropping the guard aborts the driver; no state is written afterwards.
    #[must_use]
    pub fn spawn(
        provider: Arc<dyn IdentityProvider>,
        profiles: ProfileService,
    ) -> (SessionHandle, CoordinatorGuard) {
        let (coordinator, handle) = Self::new(provider, profiles);
        let task = tokio::spawn(coordinator.run());
        (handle, CoordinatorGuard { task: Some(task) })
    }

    /// Consume identity emissions until the provider's stream closes.
    pub async fn run(mut self) {
        loop {
            let identity = self.identities.borrow_and_update().clone();
            let resolved = self.resolve(identity).await;

            // Superseded: a newer emission arrived while resolving. Discard
            // this result and resolve the newer identity instead.
            if self.identities.has_changed().unwrap_or(false) {
                continue;
            }

            self.state.send_replace(resolved);

            if self.identities.changed().await.is_err() {
                // Provider gone; the loop ends and no further writes occur.
                break;
            }
        }
    }

    async fn resolve(&self, identity: Option<Identity>) -> SessionState {
        let Some(identity) = identity else {
            // Absent identity resolves locally; the record store is not hit.
            return SessionState::unauthenticated();
        };

        let outcome = self.profiles.load_profile(Some(&identity)).await;
        SessionState::ready(identity, outcome)
    }
}

//
// ─── HANDLE & GUARD ────────────────────────────────────────────────────────────
//

/// Read-side of the coordinator, cheap to clone into the view layer.
#[derive(Clone)]
pub struct SessionHandle {
    state: watch::Receiver<SessionState>,
    provider: Arc<dyn IdentityProvider>,
}

impl SessionHandle {
    /// Snapshot of the current session state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// A receiver for observing state transitions.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    /// Delegate sign-out to the provider. The coordinator does not touch its
    /// state here; the provider's `None` emission drives the transition.
    ///
    /// # Errors
    ///
    /// Propagates provider errors.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.provider.sign_out().await
    }
}

/// Scoped ownership of the driver task: dropping it aborts the driver.
pub struct CoordinatorGuard {
    task: Option<JoinHandle<()>>,
}

impl CoordinatorGuard {
    /// Abort the driver and wait for it to wind down.
    pub async fn shutdown(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
    }
}

impl Drop for CoordinatorGuard {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use backend::{
        InMemoryIdentityProvider, InMemoryRecordStore, RawRecord, RecordStore, StoreError,
        user_path,
    };
    use mathe_core::{ChildRef, ParentRecord, StudentRecord, UserDoc, UserId, UserRecord};
    use std::time::Duration;
    use tokio::sync::Notify;

    fn doc(id: &str, first: &str) -> UserDoc {
        UserDoc {
            id: UserId::new(id),
            first_name: first.to_string(),
            last_name: "Durand".to_string(),
            gender: "female".to_string(),
            email: format!("{first}@example.com"),
            date_of_birth: "1985-03-12".to_string(),
        }
    }

    fn student(id: &str, first: &str) -> StudentRecord {
        StudentRecord {
            doc: doc(id, first),
            grade: "CE2".to_string(),
            parent_id: UserId::new("p1"),
            teacher_id: UserId::new("t1"),
            player_profile: None,
            achievements: Vec::new(),
            game_progress: Vec::new(),
            history_math_level: None,
        }
    }

    fn parent(id: &str, first: &str, children: Vec<ChildRef>) -> UserRecord {
        UserRecord::Parent(ParentRecord {
            doc: doc(id, first),
            children,
        })
    }

    async fn wait_for_phase(
        rx: &mut watch::Receiver<SessionState>,
        phase: SessionPhase,
    ) -> SessionState {
        tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| s.phase == phase))
            .await
            .expect("timed out waiting for phase")
            .expect("coordinator dropped")
            .clone()
    }

    #[tokio::test]
    async fn absent_identity_resolves_to_unauthenticated_without_store_reads() {
        let provider = Arc::new(InMemoryIdentityProvider::new());
        let store = Arc::new(InMemoryRecordStore::new());
        let profiles = ProfileService::new(Arc::clone(&store) as Arc<dyn RecordStore>);

        let (handle, guard) = SessionCoordinator::spawn(provider, profiles);
        let mut rx = handle.watch();

        let state = wait_for_phase(&mut rx, SessionPhase::Unauthenticated).await;
        assert!(state.identity.is_none());
        assert!(state.error.is_none());
        assert_eq!(store.reads(), 0);

        guard.shutdown().await;
    }

    #[tokio::test]
    async fn identity_emission_resolves_the_profile() {
        let provider = Arc::new(InMemoryIdentityProvider::new());
        let store = Arc::new(InMemoryRecordStore::new());
        store
            .insert_user(&UserRecord::Student(Box::new(student("c1", "Lea"))))
            .unwrap();
        store
            .insert_user(&parent("p1", "Marie", vec![ChildRef::Id(UserId::new("c1"))]))
            .unwrap();
        let profiles = ProfileService::new(Arc::clone(&store) as Arc<dyn RecordStore>);

        let (handle, guard) = SessionCoordinator::spawn(Arc::clone(&provider) as _, profiles);
        let mut rx = handle.watch();
        wait_for_phase(&mut rx, SessionPhase::Unauthenticated).await;

        provider.emit(Some(Identity::new("p1", None)));
        let state = wait_for_phase(&mut rx, SessionPhase::Ready).await;

        let profile = state.profile.expect("profile should be loaded");
        assert_eq!(profile.user.doc().id.as_str(), "p1");
        assert_eq!(profile.children.len(), 1);
        assert!(state.error.is_none());

        guard.shutdown().await;
    }

    #[tokio::test]
    async fn load_failure_surfaces_as_error_state() {
        let provider = Arc::new(InMemoryIdentityProvider::new());
        let store = Arc::new(InMemoryRecordStore::new());
        let profiles = ProfileService::new(Arc::clone(&store) as Arc<dyn RecordStore>);

        let (handle, guard) = SessionCoordinator::spawn(Arc::clone(&provider) as _, profiles);
        let mut rx = handle.watch();

        provider.emit(Some(Identity::new("ghost", None)));
        let state = wait_for_phase(&mut rx, SessionPhase::Ready).await;

        assert!(state.profile.is_none());
        assert_eq!(state.error, Some(ProfileError::RecordNotFound));

        guard.shutdown().await;
    }

    #[tokio::test]
    async fn sign_out_emission_returns_to_unauthenticated() {
        let provider =
            Arc::new(InMemoryIdentityProvider::new().with_user("marie@example.com", "pw", "p1"));
        let store = Arc::new(InMemoryRecordStore::new());
        store.insert_user(&parent("p1", "Marie", Vec::new())).unwrap();
        let profiles = ProfileService::new(Arc::clone(&store) as Arc<dyn RecordStore>);

        let (handle, guard) = SessionCoordinator::spawn(Arc::clone(&provider) as _, profiles);
        let mut rx = handle.watch();

        provider.sign_in("marie@example.com", "pw").await.unwrap();
        wait_for_phase(&mut rx, SessionPhase::Ready).await;

        handle.sign_out().await.unwrap();
        let state = wait_for_phase(&mut rx, SessionPhase::Unauthenticated).await;
        assert!(state.profile.is_none());

        guard.shutdown().await;
    }

    // Record store that parks reads of one path until released, so a test
    // can hold a resolution in flight while emitting a newer identity.
    struct GatedStore {
        inner: InMemoryRecordStore,
        gated_path: String,
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl RecordStore for GatedStore {
        async fn read_once(&self, path: &str) -> Result<Option<RawRecord>, StoreError> {
            if path == self.gated_path {
                self.entered.notify_one();
                self.release.notified().await;
            }
            self.inner.read_once(path).await
        }
    }

    #[tokio::test]
    async fn stale_resolution_is_superseded_by_a_newer_emission() {
        let provider = Arc::new(InMemoryIdentityProvider::new());
        let store = Arc::new(GatedStore {
            inner: InMemoryRecordStore::new(),
            gated_path: user_path(&UserId::new("p1")),
            entered: Notify::new(),
            release: Notify::new(),
        });
        store.inner.insert_user(&parent("p1", "Marie", Vec::new())).unwrap();
        store.inner.insert_user(&parent("p2", "Anne", Vec::new())).unwrap();
        let profiles = ProfileService::new(Arc::clone(&store) as Arc<dyn RecordStore>);

        // E1 is already current when the driver starts; its load blocks on
        // the gate.
        provider.emit(Some(Identity::new("p1", None)));
        let (handle, guard) = SessionCoordinator::spawn(Arc::clone(&provider) as _, profiles);
        let mut rx = handle.watch();

        tokio::time::timeout(Duration::from_secs(5), store.entered.notified())
            .await
            .expect("load of p1 never started");

        // E2 arrives before E1's resolution completes, then E1 is released.
        provider.emit(Some(Identity::new("p2", None)));
        store.release.notify_one();

        let state = wait_for_phase(&mut rx, SessionPhase::Ready).await;
        let profile = state.profile.expect("profile should be loaded");
        assert_eq!(profile.user.doc().id.as_str(), "p2");

        // The discarded p1 result must never surface, even after settling.
        tokio::task::yield_now().await;
        assert_eq!(
            handle.state().profile.unwrap().user.doc().id.as_str(),
            "p2"
        );

        guard.shutdown().await;
    }

    #[tokio::test]
    async fn no_state_writes_after_teardown() {
        let provider = Arc::new(InMemoryIdentityProvider::new());
        let store = Arc::new(InMemoryRecordStore::new());
        store.insert_user(&parent("p1", "Marie", Vec::new())).unwrap();
        let profiles = ProfileService::new(Arc::clone(&store) as Arc<dyn RecordStore>);

        let (handle, guard) = SessionCoordinator::spawn(Arc::clone(&provider) as _, profiles);
        let mut rx = handle.watch();
        wait_for_phase(&mut rx, SessionPhase::Unauthenticated).await;

        guard.shutdown().await;

        provider.emit(Some(Identity::new("p1", None)));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(handle.state().phase, SessionPhase::Unauthenticated);
    }
}
