#![forbid(unsafe_code)]

pub mod model;
pub mod progress;

pub use model::{
    ChildRef, GameProgress, MathLevelEntry, ParentRecord, PlayerProfile, RewardProfile, Role,
    StudentRecord, TeacherRecord, UserDoc, UserRecord,
};
pub use model::{GameId, UserId};
pub use progress::{
    HistoryRow, format_history, latest_activity_label, math_level_percent, progress_percent,
    solved_count_estimate,
};
