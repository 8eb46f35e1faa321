use crate::auth::use_auth;
use crate::routes::Route;
use auth_core::IdentityError;
use dioxus::prelude::*;

/// Login page with email/password sign-in.
///
/// On success it replaces itself with `/`, where the role router picks the
/// landing page.
#[component]
pub fn Login() -> Element {
    let auth = use_auth();
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut error_msg = use_signal(|| Option::<String>::None);
    let mut loading = use_signal(|| false);

    let handle_login = move |evt: FormEvent| {
        let sign_in = auth.sign_in.clone();
        async move {
            evt.prevent_default();
            loading.set(true);
            error_msg.set(None);

            match sign_in.sign_in_with_password(&email(), &password()).await {
                Ok(uid) => {
                    tracing::info!(uid = %uid, "signed in");
                    navigator().replace(Route::Home {});
                    return;
                }
                Err(err) => {
                    tracing::warn!(error = %err, "sign-in failed");
                    error_msg.set(Some(friendly_message(&err)));
                }
            }
            loading.set(false);
        }
    };

    rsx! {
        div { class: "auth-page",
            form { class: "auth-card", onsubmit: handle_login,
                h2 { "Sign In" }

                if let Some(err) = error_msg() {
                    div { class: "auth-error", "{err}" }
                }

                div { class: "auth-field",
                    label { r#for: "email", "Email" }
                    input {
                        id: "email",
                        r#type: "email",
                        value: email(),
                        oninput: move |e: FormEvent| email.set(e.value()),
                    }
                }
                div { class: "auth-field",
                    label { r#for: "password", "Password" }
                    input {
                        id: "password",
                        r#type: "password",
                        value: password(),
                        oninput: move |e: FormEvent| password.set(e.value()),
                    }
                }
                button {
                    r#type: "submit",
                    disabled: loading(),
                    if loading() { "Signing in..." } else { "Sign In" }
                }
            }
        }
    }
}

/// Turn a sign-in error into something a user can act on.
fn friendly_message(err: &IdentityError) -> String {
    let message = match err {
        IdentityError::Rejected { code } => match code.as_str() {
            "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
                "Invalid email or password."
            }
            "USER_DISABLED" => "This account has been disabled.",
            "TOO_MANY_ATTEMPTS_TRY_LATER" => "Too many attempts. Try again later.",
            "MISSING_EMAIL" | "INVALID_EMAIL" => "Enter a valid email address.",
            "MISSING_PASSWORD" => "Enter your password.",
            _ => "Sign-in failed.",
        },
        IdentityError::Transport(_) => "Could not reach the sign-in service.",
        IdentityError::NotConfigured(_) => "Sign-in is not configured.",
        IdentityError::SignedOut | IdentityError::Malformed(_) => "Sign-in failed.",
    };
    message.to_string()
}
