//! Identity client backed by the Firebase Auth REST API.
//!
//! Covers what the dashboard needs from the hosted provider: password
//! sign-in, ID-token refresh and local sign-out. Sessions live in memory
//! only; a reload starts signed out.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::{
    Credential, IdentityClient, IdentitySnapshot, PasswordSignIn, Subscribers, Subscription,
    TokenProvider,
};
use crate::error::IdentityError;
use shared_types::IdentityConfig;

const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const SECURE_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1";

/// A cached ID token is re-minted once it is this close to expiry.
const REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// Base URLs of the two Firebase Auth services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirebaseEndpoints {
    pub identity_toolkit: String,
    pub secure_token: String,
}

impl FirebaseEndpoints {
    pub fn hosted() -> Self {
        Self {
            identity_toolkit: IDENTITY_TOOLKIT_URL.to_string(),
            secure_token: SECURE_TOKEN_URL.to_string(),
        }
    }

    /// Local auth emulator at `host:port`.
    pub fn emulator(host: &str) -> Self {
        let host = host.trim_end_matches('/');
        Self {
            identity_toolkit: format!("http://{host}/identitytoolkit.googleapis.com/v1"),
            secure_token: format!("http://{host}/securetoken.googleapis.com/v1"),
        }
    }

    pub fn sign_in_url(&self) -> String {
        format!("{}/accounts:signInWithPassword", self.identity_toolkit)
    }

    pub fn refresh_url(&self) -> String {
        format!("{}/token", self.secure_token)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

#[derive(Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Clone)]
struct TokenSet {
    id_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

impl TokenSet {
    fn new(
        id_token: String,
        refresh_token: String,
        expires_in: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, IdentityError> {
        let secs: i64 = expires_in.trim().parse().map_err(|_| {
            IdentityError::Malformed(format!("expires_in is not a number: {expires_in:?}"))
        })?;
        let expires_at = Duration::try_seconds(secs)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                IdentityError::Malformed(format!("expires_in is out of range: {expires_in:?}"))
            })?;
        Ok(Self {
            id_token,
            refresh_token,
            expires_at,
        })
    }

    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(REFRESH_MARGIN_SECS) < self.expires_at
    }
}

/// One signed-in user's token source. Revoked on sign-out so snapshots
/// still held elsewhere stop minting credentials.
struct FirebaseSession {
    uid: String,
    http: reqwest::Client,
    api_key: String,
    refresh_url: String,
    tokens: RefCell<TokenSet>,
    revoked: Cell<bool>,
}

#[async_trait(?Send)]
impl TokenProvider for FirebaseSession {
    async fn fresh_token(&self) -> Result<Credential, IdentityError> {
        if self.revoked.get() {
            return Err(IdentityError::SignedOut);
        }
        let refresh_token = {
            let tokens = self.tokens.borrow();
            if tokens.is_fresh(Utc::now()) {
                return Ok(Credential::new(tokens.id_token.clone()));
            }
            tokens.refresh_token.clone()
        };

        tracing::debug!(uid = %self.uid, "refreshing identity token");
        let response = self
            .http
            .post(&self.refresh_url)
            .query(&[("key", self.api_key.as_str())])
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
            ])
            .send()
            .await?;
        let refreshed: RefreshResponse = read_json(response).await?;

        if self.revoked.get() {
            return Err(IdentityError::SignedOut);
        }
        let tokens = TokenSet::new(
            refreshed.id_token,
            refreshed.refresh_token,
            &refreshed.expires_in,
            Utc::now(),
        )?;
        let credential = Credential::new(tokens.id_token.clone());
        self.tokens.replace(tokens);
        Ok(credential)
    }
}

/// Firebase Auth client for a single web app.
pub struct FirebaseIdentityClient {
    http: reqwest::Client,
    api_key: String,
    endpoints: FirebaseEndpoints,
    subscribers: Subscribers,
    session: RefCell<Option<Rc<FirebaseSession>>>,
}

impl FirebaseIdentityClient {
    pub fn new(api_key: impl Into<String>, endpoints: FirebaseEndpoints) -> Self {
        Self::with_client(reqwest::Client::new(), api_key, endpoints)
    }

    pub fn with_client(
        http: reqwest::Client,
        api_key: impl Into<String>,
        endpoints: FirebaseEndpoints,
    ) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            endpoints,
            subscribers: Subscribers::new(),
            session: RefCell::new(None),
        }
    }

    /// Build from project settings. Uses the emulator when one is configured.
    pub fn from_config(config: &IdentityConfig) -> Result<Self, IdentityError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| IdentityError::NotConfigured("api_key is missing".into()))?;
        let endpoints = match config.emulator_host.as_deref() {
            Some(host) if !host.trim().is_empty() => FirebaseEndpoints::emulator(host.trim()),
            _ => FirebaseEndpoints::hosted(),
        };
        Ok(Self::new(api_key, endpoints))
    }

    pub fn endpoints(&self) -> &FirebaseEndpoints {
        &self.endpoints
    }

    fn snapshot(&self) -> IdentitySnapshot {
        match &*self.session.borrow() {
            Some(session) => {
                let tokens: Rc<dyn TokenProvider> = session.clone();
                IdentitySnapshot::present(session.uid.clone(), tokens)
            }
            None => IdentitySnapshot::Absent,
        }
    }
}

#[async_trait(?Send)]
impl IdentityClient for FirebaseIdentityClient {
    fn subscribe(&self, on_change: Box<dyn FnMut(&IdentitySnapshot)>) -> Subscription {
        self.subscribers.add_with_replay(on_change, self.snapshot())
    }

    async fn current_token(&self) -> Result<Credential, IdentityError> {
        let session = self.session.borrow().clone();
        match session {
            Some(session) => session.fresh_token().await,
            None => Err(IdentityError::SignedOut),
        }
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        let previous = self.session.borrow_mut().take();
        if let Some(session) = previous {
            session.revoked.set(true);
            tracing::info!(uid = %session.uid, "signed out");
            self.subscribers.notify(IdentitySnapshot::Absent);
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl PasswordSignIn for FirebaseIdentityClient {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<String, IdentityError> {
        let response = self
            .http
            .post(self.endpoints.sign_in_url())
            .query(&[("key", self.api_key.as_str())])
            .json(&SignInRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await?;
        let signed_in: SignInResponse = read_json(response).await?;

        let tokens = TokenSet::new(
            signed_in.id_token,
            signed_in.refresh_token,
            &signed_in.expires_in,
            Utc::now(),
        )?;
        let session = Rc::new(FirebaseSession {
            uid: signed_in.local_id.clone(),
            http: self.http.clone(),
            api_key: self.api_key.clone(),
            refresh_url: self.endpoints.refresh_url(),
            tokens: RefCell::new(tokens),
            revoked: Cell::new(false),
        });

        if let Some(old) = self.session.borrow_mut().replace(session) {
            old.revoked.set(true);
        }
        tracing::info!(uid = %signed_in.local_id, "signed in");
        self.subscribers.notify(self.snapshot());
        Ok(signed_in.local_id)
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, IdentityError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(rejection(status.as_u16(), &body));
    }
    serde_json::from_str(&body).map_err(|e| IdentityError::Malformed(e.to_string()))
}

/// Firebase reports errors as `{"error": {"message": "CODE : detail"}}`.
fn rejection(status: u16, body: &str) -> IdentityError {
    let code = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| {
            envelope
                .error
                .message
                .split(" : ")
                .next()
                .map(|code| code.trim().to_string())
        })
        .filter(|code| !code.is_empty())
        .unwrap_or_else(|| format!("HTTP_{status}"));
    IdentityError::Rejected { code }
}
