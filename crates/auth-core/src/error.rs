use thiserror::Error;

/// Failures reported by an identity client.
///
/// Transport errors are captured as strings so outcomes stay `Clone` and can
/// be compared in tests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("no signed-in user")]
    SignedOut,
    #[error("identity provider request failed: {0}")]
    Transport(String),
    #[error("identity provider rejected the request: {code}")]
    Rejected { code: String },
    #[error("malformed identity provider response: {0}")]
    Malformed(String),
    #[error("identity provider is not configured: {0}")]
    NotConfigured(String),
}

/// Failures from the backend profile endpoint.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("profile request failed: {0}")]
    Transport(String),
    #[error("profile endpoint returned HTTP {status}")]
    Status { status: u16 },
    #[error("malformed profile payload: {0}")]
    Malformed(String),
}

/// Why a present identity could not be turned into a landing destination.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolutionFailure {
    #[error("could not mint a bearer credential: {0}")]
    CredentialMint(IdentityError),
    #[error("could not fetch the user profile: {0}")]
    ProfileFetch(ProfileError),
}

impl From<reqwest::Error> for ProfileError {
    fn from(err: reqwest::Error) -> Self {
        ProfileError::Transport(err.to_string())
    }
}

impl From<reqwest::Error> for IdentityError {
    fn from(err: reqwest::Error) -> Self {
        IdentityError::Transport(err.to_string())
    }
}
