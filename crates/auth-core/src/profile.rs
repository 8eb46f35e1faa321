use async_trait::async_trait;
use std::time::Duration;

use crate::error::ProfileError;
use crate::identity::Credential;
use shared_types::Profile;

pub const PROFILE_PATH: &str = "/users/me";

/// Upper bound on one profile request, so a stalled backend ends in a login
/// redirect instead of an endless loading screen. Native builds only; the
/// browser fetch used on wasm has no client-side timeout here.
pub const PROFILE_TIMEOUT: Duration = Duration::from_secs(10);

/// Looks up the signed-in user's profile (and so their role).
#[async_trait(?Send)]
pub trait ProfileResolver {
    async fn fetch_profile(&self, credential: &Credential) -> Result<Profile, ProfileError>;
}

/// `GET {backend_url}/users/me` with a bearer credential.
///
/// Any non-2xx status or a body that is not a JSON object is an error; no
/// retries.
#[derive(Debug, Clone)]
pub struct HttpProfileResolver {
    http: reqwest::Client,
    base_url: String,
}

impl HttpProfileResolver {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, PROFILE_TIMEOUT)
    }

    /// Resolver whose requests fail with a transport error after `timeout`.
    /// The timeout is not applied on wasm.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self::with_client(bounded_client(timeout), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), PROFILE_PATH)
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn bounded_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not build profile client, requests are unbounded");
            reqwest::Client::new()
        })
}

#[cfg(target_arch = "wasm32")]
fn bounded_client(_timeout: Duration) -> reqwest::Client {
    reqwest::Client::new()
}

#[async_trait(?Send)]
impl ProfileResolver for HttpProfileResolver {
    async fn fetch_profile(&self, credential: &Credential) -> Result<Profile, ProfileError> {
        let response = self
            .http
            .get(self.endpoint())
            .bearer_auth(credential.expose())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProfileError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ProfileError::Malformed(e.to_string()))
    }
}
