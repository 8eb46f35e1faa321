use std::cell::Cell;
use std::rc::Rc;

use crate::identity::IdentityClient;
use crate::navigation::Redirect;
use shared_types::Destination;

/// Sign-out action for the navbar.
///
/// Signs out of the identity provider, then redirects to login whatever the
/// result. A failed provider sign-out is logged and otherwise ignored, which
/// can leave a stale provider session behind.
pub struct SessionController {
    identity: Rc<dyn IdentityClient>,
    redirect: Rc<dyn Redirect>,
    signing_out: Cell<bool>,
}

impl SessionController {
    pub fn new(identity: Rc<dyn IdentityClient>, redirect: Rc<dyn Redirect>) -> Self {
        Self {
            identity,
            redirect,
            signing_out: Cell::new(false),
        }
    }

    /// Only the first call on a controller does anything; later calls
    /// return immediately.
    pub async fn sign_out(&self) {
        if self.signing_out.replace(true) {
            tracing::debug!("sign-out already requested");
            return;
        }
        if let Err(err) = self.identity.sign_out().await {
            tracing::warn!(error = %err, "identity sign-out failed, redirecting anyway");
        }
        self.redirect.replace(Destination::Login);
    }

    pub fn has_signed_out(&self) -> bool {
        self.signing_out.get()
    }
}
