use dioxus::prelude::*;

use mathe_core::{StudentRecord, UserRecord};
use services::LoadedProfile;

use crate::context::AppContext;
use crate::views::ChildDetail;
use crate::vm::{ChildVm, map_child, map_child_detail, role_label};

#[component]
pub fn HomeView(profile: LoadedProfile) -> Element {
    let ctx = use_context::<AppContext>();
    let mut selected = use_signal(|| None::<StudentRecord>);

    let session = ctx.session();
    let on_sign_out = move |_| {
        let session = session.clone();
        spawn(async move {
            let _ = session.sign_out().await;
        });
    };

    let doc = profile.user.doc().clone();
    let role = profile.user.role();
    let is_parent = matches!(profile.user, UserRecord::Parent(_));
    let children = profile.children.clone();

    rsx! {
        div { class: "main",
            header { class: "top-header",
                span { class: "app-title", "MathéMagique" }
                button { class: "sign-out", onclick: on_sign_out, "Déconnexion" }
            }

            div { class: "content",
                div { class: "welcome",
                    h2 { "Bienvenue {doc.full_name()}" }
                    p { class: "role", "{role_label(role)}" }
                }

                section { class: "card",
                    h3 { class: "card-title", "Informations personnelles" }
                    InfoRow { label: "Nom:", value: doc.last_name.clone() }
                    InfoRow { label: "Prénom:", value: doc.first_name.clone() }
                    InfoRow { label: "Email:", value: doc.email.clone() }
                    InfoRow { label: "Date de naissance:", value: doc.date_of_birth.clone() }
                    InfoRow { label: "Rôle:", value: role_label(role).to_string() }
                }

                if is_parent {
                    section { class: "card",
                        h3 { class: "card-title", "Mes enfants" }
                        if children.is_empty() {
                            div { class: "no-children",
                                p { class: "no-children-title", "Aucun enfant enregistré" }
                                p { class: "no-children-text",
                                    "Vous n'avez pas encore d'enfants associés à votre compte."
                                }
                            }
                        } else {
                            for child in children.iter() {
                                ChildCard {
                                    key: "{child.doc.id}",
                                    child: map_child(child),
                                    on_open: {
                                        let child = child.clone();
                                        move |_| selected.set(Some(child.clone()))
                                    },
                                }
                            }
                        }
                    }
                }
            }

            if let Some(child) = selected() {
                ChildDetail {
                    detail: map_child_detail(&child),
                    on_close: move |_| selected.set(None),
                }
            }
        }
    }
}

#[component]
fn InfoRow(label: &'static str, value: String) -> Element {
    rsx! {
        div { class: "info-row",
            span { class: "info-label", "{label}" }
            span { class: "info-value", "{value}" }
        }
    }
}

#[component]
fn ChildCard(child: ChildVm, on_open: EventHandler<()>) -> Element {
    rsx! {
        div { class: "child-card", onclick: move |_| on_open.call(()),
            div { class: "child-header",
                span { class: "child-name", "{child.full_name}" }
            }
            div { class: "child-info",
                InfoRow { label: "Classe:", value: child.grade.clone() }
                InfoRow { label: "Niveau math:", value: child.math_level_label.clone() }

                div { class: "progress-bar",
                    div {
                        class: "progress-fill",
                        style: "width: {child.math_level_percent}%",
                    }
                }

                div { class: "stats-row",
                    span { class: "stat", "{child.coins} pièces" }
                    span { class: "stat", "{child.solved} problèmes résolus" }
                }
            }
        }
    }
}
