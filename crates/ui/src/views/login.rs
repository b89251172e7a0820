use dioxus::prelude::*;

use crate::context::AppContext;
use crate::vm::auth_error_message;

#[component]
pub fn LoginView() -> Element {
    let ctx = use_context::<AppContext>();
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut feedback = use_signal(|| None::<String>);
    let mut busy = use_signal(|| false);

    let auth_for_sign_in = ctx.auth();
    let on_sign_in = move |_| {
        let auth = auth_for_sign_in.clone();
        let email_value = email();
        let password_value = password();
        spawn(async move {
            busy.set(true);
            feedback.set(None);
            // A successful sign-in needs no handling here: the provider's
            // identity emission moves the whole app to the home screen.
            if let Err(err) = auth.sign_in(&email_value, &password_value).await {
                feedback.set(Some(auth_error_message(&err).to_string()));
            }
            busy.set(false);
        });
    };

    let auth_for_reset = ctx.auth();
    let on_reset = move |_| {
        let auth = auth_for_reset.clone();
        let email_value = email();
        spawn(async move {
            match auth.send_password_reset(&email_value).await {
                Ok(()) => feedback.set(Some("Email de réinitialisation envoyé.".to_string())),
                Err(err) => feedback.set(Some(auth_error_message(&err).to_string())),
            }
        });
    };

    rsx! {
        div { class: "login",
            h1 { class: "login-title", "MathéMagique" }
            p { class: "login-subtitle", "Espace parents" }

            input {
                class: "login-input",
                r#type: "email",
                placeholder: "Email",
                value: "{email}",
                oninput: move |evt| email.set(evt.value()),
            }
            input {
                class: "login-input",
                r#type: "password",
                placeholder: "Mot de passe",
                value: "{password}",
                oninput: move |evt| password.set(evt.value()),
            }

            button {
                class: "login-button",
                disabled: busy(),
                onclick: on_sign_in,
                if busy() { "Connexion..." } else { "Se connecter" }
            }
            button {
                class: "login-link",
                onclick: on_reset,
                "Mot de passe oublié ?"
            }

            if let Some(message) = feedback() {
                p { class: "login-feedback", "{message}" }
            }
        }
    }
}
