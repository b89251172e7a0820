#![forbid(unsafe_code)]

pub mod firebase;
pub mod identity;
pub mod records;

pub use firebase::{FirebaseAuth, RtdbStore};
pub use identity::{AuthError, Identity, IdentityProvider, InMemoryIdentityProvider};
pub use records::{InMemoryRecordStore, RawRecord, RecordStore, StoreError, user_path};
