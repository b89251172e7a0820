use dioxus::prelude::*;
use services::SessionPhase;

use crate::context::AppContext;
use crate::views::{HomeView, LoginView};
use crate::vm::profile_error_message;

/// Root component: mirrors the coordinator's published state into a signal
/// and switches the screen on the session phase, the way the mobile app
/// swaps navigation stacks on auth state.
#[component]
pub fn App() -> Element {
    let ctx = use_context::<AppContext>();
    let session = ctx.session();
    let mut state = use_signal(|| session.state());

    let stream = session.clone();
    use_future(move || {
        let mut rx = stream.watch();
        async move {
            while rx.changed().await.is_ok() {
                let next = rx.borrow().clone();
                state.set(next);
            }
        }
    });

    let current = state();
    let body = match current.phase {
        SessionPhase::Initializing => rsx! {
            div { class: "centered",
                p { class: "loading", "Chargement des données..." }
            }
        },
        SessionPhase::Unauthenticated => rsx! {
            LoginView {}
        },
        SessionPhase::Ready => {
            if let Some(error) = &current.error {
                rsx! {
                    div { class: "centered",
                        p { class: "error", "{profile_error_message(error)}" }
                    }
                }
            } else if let Some(profile) = &current.profile {
                rsx! {
                    HomeView { profile: (**profile).clone() }
                }
            } else {
                // Ready always carries a profile or an error; render nothing
                // for the unreachable combination rather than panicking.
                rsx! {}
            }
        }
    };

    rsx! {
        document::Title { "MathéMagique" }

        div { class: "app-root", {body} }
    }
}
