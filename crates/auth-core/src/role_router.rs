//! Entry-point dispatcher: wait for identity, resolve the role from the
//! backend profile, redirect to the matching landing view.
//!
//! ```text
//! AwaitingIdentity -> Absent  -> Redirected(Login)
//!                  -> Present -> ResolvingProfile -> Ok(profile) -> Redirected(landing)
//!                                                 -> Err(_)      -> Redirected(Login)
//! ```
//!
//! The subscription callback only enqueues notifications. [`RoleRouter::run`]
//! handles them one at a time and acts on a result only if no newer
//! notification arrived and the activation was not torn down meanwhile.

use futures::channel::mpsc::{self, UnboundedReceiver};
use futures::StreamExt;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::activation::{Liveness, Ticket};
use crate::error::ResolutionFailure;
use crate::identity::{IdentityClient, IdentitySnapshot, Subscription};
use crate::navigation::Redirect;
use crate::profile::ProfileResolver;
use shared_types::{Destination, Profile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterPhase {
    AwaitingIdentity,
    ResolvingProfile,
    Redirected(Destination),
    TornDown,
}

/// Result of handling one identity notification.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Absent,
    Failed(ResolutionFailure),
    Resolved(Profile),
}

/// Landing destination for a resolution. Unrecognized and missing roles
/// land on the employee view.
pub fn destination_for(resolution: &Resolution) -> Destination {
    match resolution {
        Resolution::Absent | Resolution::Failed(_) => Destination::Login,
        Resolution::Resolved(profile) => Destination::landing_for(profile.role()),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RouterOutcome {
    Redirected {
        destination: Destination,
        failure: Option<ResolutionFailure>,
    },
    /// Torn down (or already run) before any redirect.
    Cancelled,
}

type Inbox = UnboundedReceiver<(Ticket, IdentitySnapshot)>;

pub struct RoleRouter {
    resolver: Rc<dyn ProfileResolver>,
    redirect: Rc<dyn Redirect>,
    liveness: Liveness,
    phase: Cell<RouterPhase>,
    subscription: RefCell<Option<Subscription>>,
    inbox: RefCell<Option<Inbox>>,
}

impl RoleRouter {
    pub fn activate(
        identity: &dyn IdentityClient,
        resolver: Rc<dyn ProfileResolver>,
        redirect: Rc<dyn Redirect>,
    ) -> Rc<Self> {
        let liveness = Liveness::new();
        let (tx, rx) = mpsc::unbounded();

        let scope = liveness.clone();
        let subscription = identity.subscribe(Box::new(move |snapshot| {
            if !scope.is_alive() {
                return;
            }
            let ticket = scope.advance();
            // The receiver only goes away with the router itself.
            let _ = tx.unbounded_send((ticket, snapshot.clone()));
        }));

        Rc::new(Self {
            resolver,
            redirect,
            liveness,
            phase: Cell::new(RouterPhase::AwaitingIdentity),
            subscription: RefCell::new(Some(subscription)),
            inbox: RefCell::new(Some(rx)),
        })
    }

    pub fn phase(&self) -> RouterPhase {
        self.phase.get()
    }

    /// Drive the activation to its single redirect.
    ///
    /// Returns `Cancelled` if the router is torn down first or if `run` was
    /// already called.
    pub async fn run(self: Rc<Self>) -> RouterOutcome {
        let inbox = self.inbox.borrow_mut().take();
        let Some(mut inbox) = inbox else {
            tracing::debug!("role router already running");
            return RouterOutcome::Cancelled;
        };

        while let Some((ticket, snapshot)) = inbox.next().await {
            if !self.liveness.is_current(ticket) {
                continue;
            }
            let resolution = self.resolve(snapshot).await;
            if !self.liveness.is_current(ticket) {
                tracing::debug!("discarding role resolution for a superseded notification");
                continue;
            }
            return self.finish(resolution);
        }
        RouterOutcome::Cancelled
    }

    /// Release the subscription and invalidate in-flight work. Idempotent.
    pub fn teardown(&self) {
        let was_alive = self.liveness.is_alive();
        self.liveness.end();
        self.release_subscription();
        if was_alive {
            self.phase.set(RouterPhase::TornDown);
        }
    }

    async fn resolve(&self, snapshot: IdentitySnapshot) -> Resolution {
        let IdentitySnapshot::Present { uid, tokens } = snapshot else {
            return Resolution::Absent;
        };
        self.phase.set(RouterPhase::ResolvingProfile);

        let result = match tokens.fresh_token().await {
            Ok(credential) => self
                .resolver
                .fetch_profile(&credential)
                .await
                .map_err(ResolutionFailure::ProfileFetch),
            Err(err) => Err(ResolutionFailure::CredentialMint(err)),
        };

        match result {
            Ok(profile) => {
                if !profile.has_recognized_role() {
                    tracing::warn!(
                        uid = %uid,
                        role = ?profile.role,
                        "unrecognized profile role, treating as employee"
                    );
                }
                Resolution::Resolved(profile)
            }
            Err(failure) => {
                tracing::error!(uid = %uid, error = %failure, "role resolution failed");
                Resolution::Failed(failure)
            }
        }
    }

    fn finish(&self, resolution: Resolution) -> RouterOutcome {
        let destination = destination_for(&resolution);
        self.phase.set(RouterPhase::Redirected(destination));
        self.liveness.end();
        self.release_subscription();

        tracing::info!(destination = destination.path(), "role router redirecting");
        self.redirect.replace(destination);

        let failure = match resolution {
            Resolution::Failed(failure) => Some(failure),
            Resolution::Absent | Resolution::Resolved(_) => None,
        };
        RouterOutcome::Redirected {
            destination,
            failure,
        }
    }

    fn release_subscription(&self) {
        let subscription = self.subscription.borrow_mut().take();
        if let Some(subscription) = subscription {
            subscription.release();
        }
    }
}

impl Drop for RoleRouter {
    fn drop(&mut self) {
        self.liveness.end();
        self.release_subscription();
    }
}
