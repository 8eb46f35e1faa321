use shared_types::Destination;

/// Imperative navigation with replace semantics, so gate and login screens
/// are not reachable through back-navigation after a redirect.
///
/// A redirect is a request; callers must not assume the current view is gone
/// when `replace` returns.
pub trait Redirect {
    fn replace(&self, destination: Destination);
}
