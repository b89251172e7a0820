//! Pure presentation metrics derived from a student's progress records.
//!
//! No I/O and no shared state: every function maps raw record values to
//! display-ready numbers or strings, so the view layer stays declarative.

use chrono::{DateTime, Utc};

use crate::model::{GameProgress, MathLevelEntry};

/// One row of the math-level history table, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    pub display_date: String,
    pub level: u32,
}

/// Fill percentage for a per-game progress bar, clamped to `[0, 100]`.
///
/// A missing entry reads as zero progress.
#[must_use]
pub fn progress_percent(best_score: Option<f64>) -> f64 {
    best_score.unwrap_or(0.0).clamp(0.0, 100.0)
}

/// Fill percentage for the math-level bar: `level * 10`.
///
/// Not clamped: the live display can exceed 100% past level 10. Kept as-is
/// pending product clarification.
#[must_use]
pub fn math_level_percent(math_level: Option<u32>) -> f64 {
    f64::from(math_level.unwrap_or(0)) * 10.0
}

/// Estimated solved-problem count shown on the child summary card.
///
/// The home screen has always rendered this as reward score times two.
#[must_use]
pub fn solved_count_estimate(reward_score: Option<u32>) -> u32 {
    reward_score.unwrap_or(0).saturating_mul(2)
}

/// Map a math-level history to display rows, preserving input order.
///
/// The stored history is already sorted by the writer; re-sorting here would
/// hide writer bugs, so the rows come out exactly as they went in.
#[must_use]
pub fn format_history(entries: &[MathLevelEntry]) -> Vec<HistoryRow> {
    entries
        .iter()
        .map(|entry| HistoryRow {
            display_date: format_date_fr(entry.date),
            level: entry.level,
        })
        .collect()
}

/// Last-activity date label for one game, when the student has played it.
#[must_use]
pub fn latest_activity_label(entry: Option<&GameProgress>) -> Option<String> {
    entry.map(|progress| format_date_fr(progress.completed_at))
}

// fr-FR short date, matching the original display locale.
fn format_date_fr(value: DateTime<Utc>) -> String {
    value.format("%d/%m/%Y").to_string()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
