use crate::auth::{use_auth, use_redirect};
use auth_core::RoleRouter;
use dioxus::prelude::*;

/// Root route: waits for the identity provider, looks up the user's role and
/// replaces itself with that role's landing page.
#[component]
pub fn Home() -> Element {
    let auth = use_auth();
    let redirect = use_redirect();
    let router = use_hook(move || {
        RoleRouter::activate(auth.identity.as_ref(), auth.profiles.clone(), redirect)
    });

    use_hook(|| {
        let router = router.clone();
        spawn(async move {
            let outcome = router.run().await;
            tracing::debug!(?outcome, "role router finished");
        })
    });

    use_drop(move || router.teardown());

    rsx! {
        div { class: "auth-guard-loading",
            p { "Loading..." }
        }
    }
}
