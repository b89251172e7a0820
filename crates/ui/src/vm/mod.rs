//! View models: domain records mapped to display-ready values.
//!
//! All derived numbers come from `mathe_core::progress`; this module only
//! attaches labels and the French user-facing strings. Structured error kinds
//! stay in the services layer; they are translated to text here and nowhere
//! else.

use backend::AuthError;
use mathe_core::{
    GameId, HistoryRow, Role, StudentRecord, format_history, latest_activity_label,
    math_level_percent, progress_percent, solved_count_estimate,
};
use services::ProfileError;

/// The three mini-games the drill-down knows how to label.
const KNOWN_GAMES: [(&str, &str); 3] = [
    ("vertical_operations", "Opérations Verticales"),
    ("find_compositions", "Trouver les Compositions"),
    ("choose_answer", "Choisir la Réponse"),
];

//
// ─── CHILD SUMMARY CARD ────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq)]
pub struct ChildVm {
    pub id: String,
    pub full_name: String,
    pub grade: String,
    pub math_level_label: String,
    pub math_level_percent: f64,
    pub coins: u32,
    pub solved: u32,
}

#[must_use]
pub fn map_child(student: &StudentRecord) -> ChildVm {
    ChildVm {
        id: student.doc.id.to_string(),
        full_name: student.doc.full_name(),
        grade: student.grade.clone(),
        math_level_label: level_label(student.math_level()),
        math_level_percent: math_level_percent(student.math_level()),
        coins: student.coins(),
        solved: solved_count_estimate(student.reward_score()),
    }
}

//
// ─── CHILD DRILL-DOWN ──────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq)]
pub struct GameVm {
    pub title: String,
    pub percent: f64,
    pub score_label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChildDetailVm {
    pub full_name: String,
    pub math_level_label: String,
    pub total_score: u32,
    pub history: Vec<HistoryRow>,
    pub games: Vec<GameVm>,
    pub activities: Vec<String>,
}

#[must_use]
pub fn map_child_detail(student: &StudentRecord) -> ChildDetailVm {
    let mut games = Vec::new();
    let mut activities = Vec::new();

    for (game_id, title) in KNOWN_GAMES {
        let entry = student.game(&GameId::from(game_id));
        if let Some(entry) = entry {
            games.push(GameVm {
                title: title.to_string(),
                percent: progress_percent(Some(entry.best_score)),
                score_label: format!("Score: {}", entry.best_score),
            });
        }
        if let Some(label) = latest_activity_label(entry) {
            activities.push(format!("{title}: {label}"));
        }
    }

    ChildDetailVm {
        full_name: student.doc.full_name(),
        math_level_label: level_label(student.math_level()),
        total_score: student.reward_score().unwrap_or(0),
        history: format_history(student.history()),
        games,
        activities,
    }
}

fn level_label(level: Option<u32>) -> String {
    level.map_or_else(|| "Non défini".to_string(), |l| l.to_string())
}

//
// ─── USER-FACING STRINGS ───────────────────────────────────────────────────────
//

#[must_use]
pub fn role_label(role: Role) -> &'static str {
    match role {
        Role::Parent => "Parent",
        Role::Teacher => "Enseignant",
        Role::Student => "Élève",
    }
}

#[must_use]
pub fn auth_error_message(error: &AuthError) -> &'static str {
    match error {
        AuthError::UserNotFound => "Aucun compte ne correspond à cet email.",
        AuthError::WrongPassword => "Mot de passe incorrect.",
        AuthError::InvalidEmail => "Adresse email invalide.",
        AuthError::Other(_) => "La connexion a échoué. Veuillez réessayer.",
    }
}

#[must_use]
pub fn profile_error_message(error: &ProfileError) -> &'static str {
    match error {
        ProfileError::NotSignedIn => "Aucun utilisateur connecté",
        ProfileError::RecordNotFound => "Données utilisateur non trouvées",
        _ => "Erreur lors du chargement des données utilisateur",
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
