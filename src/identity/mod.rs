//! Identity resolution.
//!
//! Flow Overview: pull the session token off the request (cookie first, then a
//! bearer `Authorization` header), hand it to an [`IdentityResolver`] and keep
//! the resulting [`UserId`] in an [`AuthState`] for downstream handlers.
//! Tokens are never inspected locally; the identity provider owns them.

pub mod remote;

pub use remote::RemoteIdentity;

use axum::http::{
    header::{AUTHORIZATION, COOKIE},
    HeaderMap,
};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, future::Future, pin::Pin};
use thiserror::Error;

pub const DEFAULT_SESSION_COOKIE: &str = "__session";

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("empty user id")]
    EmptyUserId,
    #[error("invalid identity provider url: {0}")]
    InvalidUrl(String),
    #[error("identity provider request failed")]
    Transport(#[from] reqwest::Error),
    #[error("identity provider returned unexpected status: {0}")]
    UnexpectedStatus(u16),
    #[error("invalid identity provider response")]
    InvalidResponse(#[from] serde_json::Error),
}

/// Identifier of a signed-in user, as issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// # Errors
    /// Returns an error if the identifier is empty or only whitespace.
    pub fn parse(value: impl Into<String>) -> Result<Self, IdentityError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(IdentityError::EmptyUserId);
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Authentication result attached to every request that passed the gate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    user_id: Option<UserId>,
}

impl AuthState {
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { user_id: None }
    }

    #[must_use]
    pub const fn signed_in(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }

    #[must_use]
    pub const fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }
}

impl From<Option<UserId>> for AuthState {
    fn from(user_id: Option<UserId>) -> Self {
        Self { user_id }
    }
}

/// Opaque session token taken from the request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    token: String,
}

impl Credentials {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"***")
            .finish()
    }
}

/// Find the session token in the request headers.
///
/// The named cookie wins over a bearer token. Empty values are ignored.
#[must_use]
pub fn extract_credentials(headers: &HeaderMap, cookie_name: &str) -> Option<Credentials> {
    let from_cookie = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| value.to_string());

    from_cookie
        .or_else(|| {
            headers
                .get(AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "))
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(ToString::to_string)
        })
        .map(Credentials::new)
}

pub type ResolveFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Option<UserId>, IdentityError>> + Send + 'a>>;

/// Resolves credentials into a user, or `None` when the session is not valid.
pub trait IdentityResolver: Send + Sync {
    fn resolve<'a>(&'a self, credentials: &'a Credentials) -> ResolveFuture<'a>;
}

/// Fixed token table, for local development and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    users: HashMap<String, UserId>,
}

impl StaticIdentity {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_user(mut self, token: impl Into<String>, user_id: UserId) -> Self {
        self.users.insert(token.into(), user_id);
        self
    }
}

impl IdentityResolver for StaticIdentity {
    fn resolve<'a>(&'a self, credentials: &'a Credentials) -> ResolveFuture<'a> {
        Box::pin(async move { Ok(self.users.get(credentials.token()).cloned()) })
    }
}
