use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::model::ids::{GameId, UserId};
use crate::model::user::UserDoc;

//
// ─── STUDENT RECORD ────────────────────────────────────────────────────────────
//

/// A student profile: base document plus schooling links and game state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    #[serde(flatten)]
    pub doc: UserDoc,
    pub grade: String,
    pub parent_id: UserId,
    pub teacher_id: UserId,
    #[serde(default)]
    pub player_profile: Option<PlayerProfile>,
    #[serde(default)]
    pub achievements: Vec<String>,
    #[serde(default, deserialize_with = "game_progress_map_or_seq")]
    pub game_progress: Vec<GameProgress>,
    #[serde(default)]
    pub history_math_level: Option<Vec<MathLevelEntry>>,
}

impl StudentRecord {
    /// Current math level, when a player profile exists.
    #[must_use]
    pub fn math_level(&self) -> Option<u32> {
        self.player_profile.as_ref().map(|p| p.math_level)
    }

    #[must_use]
    pub fn coins(&self) -> u32 {
        self.player_profile.as_ref().map_or(0, |p| p.coins)
    }

    #[must_use]
    pub fn reward_score(&self) -> Option<u32> {
        self.player_profile.as_ref().map(|p| p.reward_profile.score)
    }

    /// Progress entry for one mini-game, if the student has played it.
    #[must_use]
    pub fn game(&self, id: &GameId) -> Option<&GameProgress> {
        self.game_progress.iter().find(|entry| &entry.game_id == id)
    }

    /// Math-level history rows, oldest first as stored. Absent history reads
    /// as an empty slice rather than an error.
    #[must_use]
    pub fn history(&self) -> &[MathLevelEntry] {
        self.history_math_level.as_deref().unwrap_or(&[])
    }
}

/// In-game identity and counters for a student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub player_name: String,
    pub game_level: u32,
    pub math_level: u32,
    pub coins: u32,
    pub questions_solved: u32,
    pub reward_profile: RewardProfile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardProfile {
    pub score: u32,
    pub rank: u32,
    pub i_score: u32,
    pub reward_count: u32,
    pub positives: u32,
    pub negatives: u32,
}

//
// ─── GAME PROGRESS ─────────────────────────────────────────────────────────────
//

/// Per-game progress snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameProgress {
    pub game_id: GameId,
    pub last_score: f64,
    pub best_score: f64,
    pub completed_at: DateTime<Utc>,
}

/// One step of a student's math-level history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MathLevelEntry {
    pub date: DateTime<Utc>,
    pub level: u32,
}

// Stored documents carry game progress either as a list of entries or as an
// object keyed by game id; both decode to the list form. The keyed form sorts
// by game id, which is stable across reads.
fn game_progress_map_or_seq<'de, D>(deserializer: D) -> Result<Vec<GameProgress>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct KeyedEntry {
        last_score: f64,
        best_score: f64,
        completed_at: DateTime<Utc>,
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Seq(Vec<GameProgress>),
        Keyed(BTreeMap<GameId, KeyedEntry>),
    }

    Ok(match Repr::deserialize(deserializer)? {
        Repr::Seq(entries) => entries,
        Repr::Keyed(map) => map
            .into_iter()
            .map(|(game_id, entry)| GameProgress {
                game_id,
                last_score: entry.last_score,
                best_score: entry.best_score,
                completed_at: entry.completed_at,
            })
            .collect(),
    })
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base_doc() -> serde_json::Value {
        json!({
            "id": "c1",
            "firstName": "Léa",
            "lastName": "Durand",
            "gender": "female",
            "email": "lea@example.com",
            "dateOfBirth": "2015-06-20",
            "grade": "CE2",
            "parentId": "p1",
            "teacherId": "t1"
        })
    }

    #[test]
    fn minimal_student_decodes_with_defaults() {
        let student: StudentRecord = serde_json::from_value(base_doc()).unwrap();
        assert!(student.player_profile.is_none());
        assert!(student.achievements.is_empty());
        assert!(student.game_progress.is_empty());
        assert!(student.history().is_empty());
        assert_eq!(student.math_level(), None);
        assert_eq!(student.coins(), 0);
    }

    #[test]
    fn game_progress_decodes_from_list_form() {
        let mut doc = base_doc();
        doc["gameProgress"] = json!([
            {
                "gameId": "vertical_operations",
                "lastScore": 40.0,
                "bestScore": 85.0,
                "completedAt": "2024-02-01T10:00:00Z"
            }
        ]);

        let student: StudentRecord = serde_json::from_value(doc).unwrap();
        assert_eq!(student.game_progress.len(), 1);
        let entry = student.game(&GameId::from("vertical_operations")).unwrap();
        assert_eq!(entry.best_score, 85.0);
    }

    #[test]
    fn game_progress_decodes_from_keyed_form() {
        let mut doc = base_doc();
        doc["gameProgress"] = json!({
            "vertical_operations": {
                "lastScore": 40.0,
                "bestScore": 85.0,
                "completedAt": "2024-02-01T10:00:00Z"
            },
            "choose_answer": {
                "lastScore": 10.0,
                "bestScore": 30.0,
                "completedAt": "2024-02-03T09:30:00Z"
            }
        });

        let student: StudentRecord = serde_json::from_value(doc).unwrap();
        assert_eq!(student.game_progress.len(), 2);
        assert!(student.game(&GameId::from("choose_answer")).is_some());
        assert!(student.game(&GameId::from("find_compositions")).is_none());
    }

    #[test]
    fn player_profile_and_history_decode() {
        let mut doc = base_doc();
        doc["playerProfile"] = json!({
            "playerName": "lea42",
            "gameLevel": 3,
            "mathLevel": 7,
            "coins": 120,
            "questionsSolved": 54,
            "rewardProfile": {
                "score": 60,
                "rank": 2,
                "iScore": 15,
                "rewardCount": 4,
                "positives": 50,
                "negatives": 10
            }
        });
        doc["historyMathLevel"] = json!([
            { "date": "2024-01-01T00:00:00Z", "level": 5 },
            { "date": "2024-02-01T00:00:00Z", "level": 7 }
        ]);

        let student: StudentRecord = serde_json::from_value(doc).unwrap();
        assert_eq!(student.math_level(), Some(7));
        assert_eq!(student.coins(), 120);
        assert_eq!(student.reward_score(), Some(60));
        assert_eq!(student.history().len(), 2);
        assert_eq!(student.history()[1].level, 7);
    }
}
