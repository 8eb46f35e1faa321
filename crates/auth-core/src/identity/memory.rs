use async_trait::async_trait;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::{
    Credential, IdentityClient, IdentitySnapshot, PasswordSignIn, Subscribers, Subscription,
    TokenProvider,
};
use crate::error::IdentityError;

/// In-process identity source.
///
/// Backs the offline app mode (no identity provider configured) and gives
/// every test its own fresh identity state. Starts either unresolved (no
/// snapshot delivered until [`publish`](Self::publish)) or resolved.
pub struct MemoryIdentityClient {
    subscribers: Subscribers,
    current: RefCell<Option<IdentitySnapshot>>,
    sign_out_calls: Cell<usize>,
}

impl MemoryIdentityClient {
    /// No state known yet; subscribers wait for the first `publish`.
    pub fn unresolved() -> Self {
        Self {
            subscribers: Subscribers::new(),
            current: RefCell::new(None),
            sign_out_calls: Cell::new(0),
        }
    }

    pub fn signed_out() -> Self {
        let client = Self::unresolved();
        client.current.replace(Some(IdentitySnapshot::Absent));
        client
    }

    pub fn signed_in(uid: impl Into<String>, tokens: Rc<dyn TokenProvider>) -> Self {
        let client = Self::unresolved();
        client
            .current
            .replace(Some(IdentitySnapshot::present(uid, tokens)));
        client
    }

    /// Replace the current snapshot and notify every subscriber.
    pub fn publish(&self, snapshot: IdentitySnapshot) {
        self.current.replace(Some(snapshot.clone()));
        self.subscribers.notify(snapshot);
    }

    pub fn snapshot(&self) -> Option<IdentitySnapshot> {
        self.current.borrow().clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn sign_out_calls(&self) -> usize {
        self.sign_out_calls.get()
    }
}

#[async_trait(?Send)]
impl IdentityClient for MemoryIdentityClient {
    fn subscribe(&self, on_change: Box<dyn FnMut(&IdentitySnapshot)>) -> Subscription {
        let current = self.current.borrow().clone();
        match current {
            Some(snapshot) => self.subscribers.add_with_replay(on_change, snapshot),
            None => self.subscribers.add(on_change),
        }
    }

    async fn current_token(&self) -> Result<Credential, IdentityError> {
        let tokens = match &*self.current.borrow() {
            Some(IdentitySnapshot::Present { tokens, .. }) => Rc::clone(tokens),
            _ => return Err(IdentityError::SignedOut),
        };
        tokens.fresh_token().await
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        self.sign_out_calls.set(self.sign_out_calls.get() + 1);
        let already_absent = matches!(*self.current.borrow(), Some(IdentitySnapshot::Absent));
        if !already_absent {
            self.publish(IdentitySnapshot::Absent);
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl PasswordSignIn for MemoryIdentityClient {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<String, IdentityError> {
        if email.trim().is_empty() {
            return Err(IdentityError::Rejected {
                code: "MISSING_EMAIL".into(),
            });
        }
        if password.is_empty() {
            return Err(IdentityError::Rejected {
                code: "MISSING_PASSWORD".into(),
            });
        }
        let uid = email.trim().to_lowercase();
        let tokens = Rc::new(LocalToken { uid: uid.clone() });
        self.publish(IdentitySnapshot::present(uid.clone(), tokens));
        Ok(uid)
    }
}

/// Token provider for locally signed-in users. The credential is only
/// meaningful to a backend running in a matching local mode.
#[derive(Debug, Clone)]
pub struct LocalToken {
    uid: String,
}

#[async_trait(?Send)]
impl TokenProvider for LocalToken {
    async fn fresh_token(&self) -> Result<Credential, IdentityError> {
        Ok(Credential::new(format!("local:{}", self.uid)))
    }
}
