use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::ids::UserId;
use crate::model::parent::ParentRecord;
use crate::model::student::StudentRecord;

//
// ─── BASE USER DOCUMENT ────────────────────────────────────────────────────────
//

/// Fields shared by every stored profile document, regardless of role.
///
/// Documents are immutable snapshots as read; nothing in this crate mutates
/// them after decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDoc {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub email: String,
    pub date_of_birth: String,
}

impl UserDoc {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

//
// ─── ROLE-TAGGED RECORD ────────────────────────────────────────────────────────
//

/// A stored profile, discriminated by the `role` field of the document.
///
/// The role tag is authoritative: dependent fan-out is only ever performed on
/// the `Parent` variant, and the exhaustive match makes that rule checkable at
/// compile time instead of relying on optional-field probing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum UserRecord {
    Parent(ParentRecord),
    Teacher(TeacherRecord),
    Student(Box<StudentRecord>),
}

impl UserRecord {
    /// The base document shared by all roles.
    #[must_use]
    pub fn doc(&self) -> &UserDoc {
        match self {
            UserRecord::Parent(parent) => &parent.doc,
            UserRecord::Teacher(teacher) => &teacher.doc,
            UserRecord::Student(student) => &student.doc,
        }
    }

    #[must_use]
    pub fn role(&self) -> Role {
        match self {
            UserRecord::Parent(_) => Role::Parent,
            UserRecord::Teacher(_) => Role::Teacher,
            UserRecord::Student(_) => Role::Student,
        }
    }
}

/// A teacher profile carries no extra payload beyond the base document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherRecord {
    #[serde(flatten)]
    pub doc: UserDoc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Parent,
    Teacher,
    Student,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Parent => "parent",
            Role::Teacher => "teacher",
            Role::Student => "student",
        };
        write!(f, "{name}")
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
