use std::cell::RefCell;
use std::rc::Rc;

use crate::activation::Liveness;
use crate::identity::{IdentityClient, IdentitySnapshot, Subscription};
use crate::navigation::Redirect;
use shared_types::Destination;

/// What a gated view should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateView {
    /// Identity not known yet: neutral indicator only.
    Pending,
    /// No identity: a login redirect has been requested.
    Redirecting,
    /// Identity present: render the protected children.
    Render,
}

/// Per-mount gate state.
///
/// `resolving` starts `true` and flips to `false` exactly once, on the first
/// notification. Protected content renders only when `resolving` is `false`
/// and the snapshot is present.
#[derive(Debug, Clone)]
pub struct GateState {
    resolving: bool,
    snapshot: IdentitySnapshot,
}

impl Default for GateState {
    fn default() -> Self {
        Self::new()
    }
}

impl GateState {
    pub fn new() -> Self {
        Self {
            resolving: true,
            snapshot: IdentitySnapshot::Absent,
        }
    }

    pub fn is_resolving(&self) -> bool {
        self.resolving
    }

    pub fn snapshot(&self) -> &IdentitySnapshot {
        &self.snapshot
    }

    pub fn view(&self) -> GateView {
        if self.resolving {
            GateView::Pending
        } else if self.snapshot.is_present() {
            GateView::Render
        } else {
            GateView::Redirecting
        }
    }

    pub fn renders_protected(&self) -> bool {
        self.view() == GateView::Render
    }

    /// Apply a notification. Returns `true` when it calls for a login
    /// redirect: the first resolution is absent, or a present identity went
    /// away. Repeated absences do not ask again.
    pub fn apply(&mut self, snapshot: IdentitySnapshot) -> bool {
        let before = self.view();
        self.resolving = false;
        self.snapshot = snapshot;
        self.view() == GateView::Redirecting && before != GateView::Redirecting
    }
}

struct GateInner {
    state: RefCell<GateState>,
    redirect: Rc<dyn Redirect>,
    on_view: RefCell<Box<dyn FnMut(GateView)>>,
    liveness: Liveness,
}

impl GateInner {
    fn handle(&self, snapshot: IdentitySnapshot) {
        if !self.liveness.is_alive() {
            return;
        }
        let (before, after, wants_login) = {
            let mut state = self.state.borrow_mut();
            let before = state.view();
            let wants_login = state.apply(snapshot);
            (before, state.view(), wants_login)
        };

        if before != after {
            (self.on_view.borrow_mut())(after);
        }
        if wants_login && self.liveness.is_alive() {
            tracing::info!(destination = Destination::Login.path(), "no signed-in user, redirecting");
            self.redirect.replace(Destination::Login);
        }
    }
}

/// Guard for a protected view.
///
/// Subscribes on activation and reports every view change through
/// `on_view`. The subscription is released exactly once, by
/// [`teardown`](Self::teardown) or on drop.
pub struct AuthGate {
    inner: Rc<GateInner>,
    subscription: RefCell<Option<Subscription>>,
}

impl AuthGate {
    pub fn activate(
        identity: &dyn IdentityClient,
        redirect: Rc<dyn Redirect>,
        on_view: impl FnMut(GateView) + 'static,
    ) -> Self {
        let inner = Rc::new(GateInner {
            state: RefCell::new(GateState::new()),
            redirect,
            on_view: RefCell::new(Box::new(on_view)),
            liveness: Liveness::new(),
        });

        let weak = Rc::downgrade(&inner);
        let subscription = identity.subscribe(Box::new(move |snapshot| {
            if let Some(inner) = weak.upgrade() {
                inner.handle(snapshot.clone());
            }
        }));

        Self {
            inner,
            subscription: RefCell::new(Some(subscription)),
        }
    }

    pub fn view(&self) -> GateView {
        self.inner.state.borrow().view()
    }

    pub fn state(&self) -> GateState {
        self.inner.state.borrow().clone()
    }

    pub fn is_active(&self) -> bool {
        self.inner.liveness.is_alive()
    }

    pub fn teardown(&self) {
        self.inner.liveness.end();
        let subscription = self.subscription.borrow_mut().take();
        if let Some(subscription) = subscription {
            subscription.release();
            tracing::debug!("auth gate released its identity subscription");
        }
    }
}

impl Drop for AuthGate {
    fn drop(&mut self) {
        self.teardown();
    }
}
