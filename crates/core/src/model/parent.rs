use serde::{Deserialize, Serialize};

use crate::model::ids::UserId;
use crate::model::student::StudentRecord;
use crate::model::user::UserDoc;

/// A parent profile: the base document plus an ordered list of dependents.
///
/// The list order is display-relevant and must survive resolution untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentRecord {
    #[serde(flatten)]
    pub doc: UserDoc,
    #[serde(default)]
    pub children: Vec<ChildRef>,
}

/// A reference to a dependent student.
///
/// Stored documents carry either the bare uid (which needs a follow-up read)
/// or an embedded student summary (which does not). Variant order matters for
/// untagged deserialization: a JSON string is an id, an object is a summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChildRef {
    Id(UserId),
    Embedded(Box<StudentRecord>),
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
