//! Authentication gate, role-based dispatch and sign-out for the dashboard
//! client, independent of any UI framework.
//!
//! Everything here is single-threaded: collaborators are shared through
//! `Rc` and traits are `?Send`, matching the browser event loop the client
//! runs on.

pub mod activation;
pub mod config;
pub mod error;
pub mod gate;
pub mod identity;
pub mod navigation;
pub mod profile;
pub mod role_router;
pub mod session;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use activation::{Liveness, Ticket};
pub use error::{IdentityError, ProfileError, ResolutionFailure};
pub use gate::{AuthGate, GateState, GateView};
pub use identity::{
    Credential, FirebaseIdentityClient, IdentityClient, IdentitySnapshot, MemoryIdentityClient,
    PasswordSignIn, Subscription, TokenProvider,
};
pub use navigation::Redirect;
pub use profile::{HttpProfileResolver, ProfileResolver};
pub use role_router::{destination_for, Resolution, RoleRouter, RouterOutcome, RouterPhase};
pub use session::SessionController;
