//! Identity-provider boundary.
//!
//! An [`IdentityClient`] knows *who* is signed in and hands out short-lived
//! bearer credentials. Views subscribe to its snapshots through owned
//! [`Subscription`] handles.

pub mod firebase;
pub mod memory;
mod subscribers;

pub use firebase::{FirebaseEndpoints, FirebaseIdentityClient};
pub use memory::MemoryIdentityClient;
pub use subscribers::{Subscribers, Subscription};

use async_trait::async_trait;
use std::fmt;
use std::rc::Rc;

use crate::error::IdentityError;

/// A bearer credential. Expires; mint a fresh one per request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token for the `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Capability that yields a fresh credential for one signed-in user.
#[async_trait(?Send)]
pub trait TokenProvider {
    async fn fresh_token(&self) -> Result<Credential, IdentityError>;
}

/// Current authentication state.
#[derive(Clone)]
pub enum IdentitySnapshot {
    Absent,
    Present {
        uid: String,
        tokens: Rc<dyn TokenProvider>,
    },
}

impl IdentitySnapshot {
    pub fn present(uid: impl Into<String>, tokens: Rc<dyn TokenProvider>) -> Self {
        IdentitySnapshot::Present {
            uid: uid.into(),
            tokens,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, IdentitySnapshot::Present { .. })
    }

    pub fn uid(&self) -> Option<&str> {
        match self {
            IdentitySnapshot::Present { uid, .. } => Some(uid),
            IdentitySnapshot::Absent => None,
        }
    }
}

impl fmt::Debug for IdentitySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentitySnapshot::Absent => f.write_str("Absent"),
            IdentitySnapshot::Present { uid, .. } => {
                f.debug_struct("Present").field("uid", uid).finish_non_exhaustive()
            }
        }
    }
}

/// Source of identity snapshots, credentials and sign-out.
///
/// `subscribe` never fails: a client with no user reports `Absent`. Once the
/// client has resolved its initial state, a new subscriber receives the
/// current snapshot immediately, then every change in order.
#[async_trait(?Send)]
pub trait IdentityClient {
    fn subscribe(&self, on_change: Box<dyn FnMut(&IdentitySnapshot)>) -> Subscription;

    async fn current_token(&self) -> Result<Credential, IdentityError>;

    async fn sign_out(&self) -> Result<(), IdentityError>;
}

/// Email/password sign-in, used by the login page.
#[async_trait(?Send)]
pub trait PasswordSignIn {
    /// Returns the uid of the signed-in user.
    async fn sign_in_with_password(&self, email: &str, password: &str)
        -> Result<String, IdentityError>;
}
