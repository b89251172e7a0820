use dioxus::prelude::*;

use crate::vm::ChildDetailVm;

/// Drill-down overlay for one child: level summary, math-level history and
/// per-game progress.
#[component]
pub fn ChildDetail(detail: ChildDetailVm, on_close: EventHandler<()>) -> Element {
    rsx! {
        div { class: "modal-overlay",
            div { class: "modal",
                header { class: "modal-header",
                    h3 { "Progression de {detail.full_name}" }
                    button { class: "close", onclick: move |_| on_close.call(()), "✕" }
                }

                div { class: "modal-body",
                    div { class: "student-summary",
                        p { class: "student-name", "{detail.full_name}" }
                        p { "Niveau actuel: " span { class: "value", "{detail.math_level_label}" } }
                        p { "Score total: " span { class: "value", "{detail.total_score}" } }
                    }

                    if detail.history.is_empty() {
                        div { class: "no-history",
                            p { "Aucun historique de progression disponible pour cet élève." }
                        }
                    } else {
                        section { class: "history",
                            h4 { "Historique des niveaux" }
                            table { class: "history-table",
                                thead {
                                    tr {
                                        th { "Date" }
                                        th { "Niveau" }
                                    }
                                }
                                tbody {
                                    for row in detail.history.iter() {
                                        tr { key: "{row.display_date}-{row.level}",
                                            td { "{row.display_date}" }
                                            td { "{row.level}" }
                                        }
                                    }
                                }
                            }
                        }
                    }

                    section { class: "games",
                        h4 { "Progression dans les jeux" }
                        for game in detail.games.iter() {
                            div { class: "game", key: "{game.title}",
                                p { class: "game-name", "{game.title}" }
                                div { class: "progress-bar",
                                    div {
                                        class: "progress-fill",
                                        style: "width: {game.percent}%",
                                    }
                                }
                                p { class: "game-score", "{game.score_label}" }
                            }
                        }

                        if !detail.activities.is_empty() {
                            div { class: "activities",
                                h5 { "Dernières activités" }
                                for activity in detail.activities.iter() {
                                    p { key: "{activity}", class: "activity", "{activity}" }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
