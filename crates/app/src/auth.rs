use auth_core::{
    FirebaseIdentityClient, HttpProfileResolver, IdentityClient, MemoryIdentityClient,
    PasswordSignIn, ProfileResolver, Redirect,
};
use dioxus::prelude::*;
use dioxus::router::Navigator;
use shared_types::{ClientConfig, Destination};
use std::rc::Rc;

use crate::routes::Route;

/// Identity and profile services shared by every route.
///
/// Built once at the application root; every gate, router and navbar gets
/// the same instances through context.
#[derive(Clone)]
pub struct AuthServices {
    pub identity: Rc<dyn IdentityClient>,
    pub sign_in: Rc<dyn PasswordSignIn>,
    pub profiles: Rc<dyn ProfileResolver>,
}

impl AuthServices {
    pub fn from_config(config: &ClientConfig) -> Self {
        let profiles: Rc<dyn ProfileResolver> =
            Rc::new(HttpProfileResolver::new(config.backend_url.clone()));

        match FirebaseIdentityClient::from_config(&config.identity) {
            Ok(client) => {
                let client = Rc::new(client);
                Self {
                    identity: client.clone(),
                    sign_in: client,
                    profiles,
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "identity provider unavailable, using local sign-in");
                let client = Rc::new(MemoryIdentityClient::signed_out());
                Self {
                    identity: client.clone(),
                    sign_in: client,
                    profiles,
                }
            }
        }
    }
}

/// Hook to access the shared auth services.
pub fn use_auth() -> AuthServices {
    use_context::<AuthServices>()
}

/// Redirects through the Dioxus router with replace semantics.
#[derive(Clone, Copy)]
pub struct RouteRedirect {
    navigator: Navigator,
}

impl Redirect for RouteRedirect {
    fn replace(&self, destination: Destination) {
        let _ = self.navigator.replace(Route::from(destination));
    }
}

/// Hook returning a redirect bound to the current router.
pub fn use_redirect() -> Rc<dyn Redirect> {
    let navigator = navigator();
    use_hook(move || Rc::new(RouteRedirect { navigator }) as Rc<dyn Redirect>)
}
