//! Fake collaborators for exercising the gate, router and session
//! controller without a browser, an identity provider or a backend.
//!
//! Enabled with the `testing` feature; always available to this crate's own
//! unit tests.

use async_trait::async_trait;
use futures::channel::oneshot;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use crate::error::{IdentityError, ProfileError};
use crate::identity::{Credential, IdentitySnapshot, TokenProvider};
use crate::navigation::Redirect;
use crate::profile::ProfileResolver;
use shared_types::{Destination, Profile};

/// Records every redirect instead of navigating.
#[derive(Debug, Default)]
pub struct RecordingRedirect {
    history: RefCell<Vec<Destination>>,
}

impl RecordingRedirect {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn history(&self) -> Vec<Destination> {
        self.history.borrow().clone()
    }

    pub fn count(&self) -> usize {
        self.history.borrow().len()
    }

    pub fn last(&self) -> Option<Destination> {
        self.history.borrow().last().copied()
    }
}

impl Redirect for RecordingRedirect {
    fn replace(&self, destination: Destination) {
        self.history.borrow_mut().push(destination);
    }
}

/// Always mints the same credential and counts how often it was asked.
#[derive(Debug)]
pub struct StaticToken {
    credential: Credential,
    mints: Cell<usize>,
}

impl StaticToken {
    pub fn new(token: &str) -> Rc<Self> {
        Rc::new(Self {
            credential: Credential::new(token),
            mints: Cell::new(0),
        })
    }

    pub fn mints(&self) -> usize {
        self.mints.get()
    }
}

#[async_trait(?Send)]
impl TokenProvider for StaticToken {
    async fn fresh_token(&self) -> Result<Credential, IdentityError> {
        self.mints.set(self.mints.get() + 1);
        Ok(self.credential.clone())
    }
}

/// Fails every mint with the given error.
#[derive(Debug)]
pub struct FailingToken(pub IdentityError);

#[async_trait(?Send)]
impl TokenProvider for FailingToken {
    async fn fresh_token(&self) -> Result<Credential, IdentityError> {
        Err(self.0.clone())
    }
}

/// Snapshot for `uid` backed by a [`StaticToken`].
pub fn present(uid: &str, token: &str) -> IdentitySnapshot {
    IdentitySnapshot::present(uid, StaticToken::new(token))
}

/// Resolves immediately with a fixed outcome.
#[derive(Debug)]
pub struct ScriptedResolver {
    outcome: Result<Profile, ProfileError>,
    credentials: RefCell<Vec<String>>,
}

impl ScriptedResolver {
    pub fn returning(profile: Profile) -> Rc<Self> {
        Self::with_outcome(Ok(profile))
    }

    pub fn with_role(role: &str) -> Rc<Self> {
        Self::returning(Profile::with_role(role))
    }

    pub fn failing(error: ProfileError) -> Rc<Self> {
        Self::with_outcome(Err(error))
    }

    fn with_outcome(outcome: Result<Profile, ProfileError>) -> Rc<Self> {
        Rc::new(Self {
            outcome,
            credentials: RefCell::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.credentials.borrow().len()
    }

    /// Credentials presented, in call order.
    pub fn seen_credentials(&self) -> Vec<String> {
        self.credentials.borrow().clone()
    }
}

#[async_trait(?Send)]
impl ProfileResolver for ScriptedResolver {
    async fn fetch_profile(&self, credential: &Credential) -> Result<Profile, ProfileError> {
        self.credentials
            .borrow_mut()
            .push(credential.expose().to_string());
        self.outcome.clone()
    }
}

/// Holds each call open until the test completes it.
///
/// Register a pending call with [`expect_call`](Self::expect_call) before
/// the router reaches the profile lookup, then send the outcome through the
/// returned sender. A dropped sender completes the call with a transport
/// error.
#[derive(Debug, Default)]
pub struct GatedResolver {
    pending: RefCell<VecDeque<oneshot::Receiver<Result<Profile, ProfileError>>>>,
    calls: Cell<usize>,
}

impl GatedResolver {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn expect_call(&self) -> oneshot::Sender<Result<Profile, ProfileError>> {
        let (tx, rx) = oneshot::channel();
        self.pending.borrow_mut().push_back(rx);
        tx
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

#[async_trait(?Send)]
impl ProfileResolver for GatedResolver {
    async fn fetch_profile(&self, _credential: &Credential) -> Result<Profile, ProfileError> {
        self.calls.set(self.calls.get() + 1);
        let next = self.pending.borrow_mut().pop_front();
        let Some(rx) = next else {
            return Err(ProfileError::Transport("unexpected profile call".into()));
        };
        rx.await
            .unwrap_or_else(|_| Err(ProfileError::Transport("call abandoned".into())))
    }
}
