mod ids;
mod parent;
mod student;
mod user;

pub use ids::{GameId, UserId};
pub use parent::{ChildRef, ParentRecord};
pub use student::{GameProgress, MathLevelEntry, PlayerProfile, RewardProfile, StudentRecord};
pub use user::{Role, TeacherRecord, UserDoc, UserRecord};
