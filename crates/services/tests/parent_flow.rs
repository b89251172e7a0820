use std::sync::Arc;
use std::time::Duration;

use backend::{InMemoryIdentityProvider, InMemoryRecordStore, RecordStore};
use mathe_core::{ChildRef, ParentRecord, StudentRecord, UserDoc, UserId, UserRecord};
use services::{AuthService, ProfileService, SessionCoordinator, SessionPhase, SessionState};
use tokio::sync::watch;

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
async fn parent_flow_sign_in_resolve_children_sign_out() {
    let provider =
        Arc::new(InMemoryIdentityProvider::new().with_user("marie@example.com", "pw", "p1"));
    let store = Arc::new(InMemoryRecordStore::new());
    store
        .insert_user(&UserRecord::Parent(ParentRecord {
            doc: doc("p1", "Marie"),
            children: vec![
                ChildRef::Id(UserId::new("c1")),
                // No record exists for c2; the reference is dropped silently.
                ChildRef::Id(UserId::new("c2")),
            ],
        }))
        .expect("seed parent");
    store
        .insert_user(&UserRecord::Student(Box::new(student("c1", "Lea"))))
        .expect("seed child");

    let profiles = ProfileService::new(Arc::clone(&store) as Arc<dyn RecordStore>);
    let (handle, guard) = SessionCoordinator::spawn(Arc::clone(&provider) as _, profiles);
    let auth = AuthService::new(provider);

    let mut rx = handle.watch();
    wait_for_phase(&mut rx, SessionPhase::Unauthenticated).await;
    assert_eq!(store.reads(), 0);

    auth.sign_in("marie@example.com", "pw")
        .await
        .expect("sign in");
    let state = wait_for_phase(&mut rx, SessionPhase::Ready).await;

    let profile = state.profile.expect("profile should be loaded");
    assert_eq!(profile.user.doc().id.as_str(), "p1");
    assert_eq!(profile.user.doc().full_name(), "Marie Durand");
    assert_eq!(profile.children.len(), 1);
    assert_eq!(profile.children[0].doc.id.as_str(), "c1");
    assert!(state.error.is_none());
    // One read for the parent, one per referenced child.
    assert_eq!(store.reads(), 3);

    handle.sign_out().await.expect("sign out");
    let state = wait_for_phase(&mut rx, SessionPhase::Unauthenticated).await;
    assert!(state.identity.is_none());
    assert!(state.profile.is_none());

    guard.shutdown().await;
}
