//! Gate middleware.
//!
//! Runs before every route handler: resolves the caller's identity, asks the
//! [`GatePolicy`] for a decision and either redirects or forwards the request
//! with an [`AuthState`] extension attached.

use crate::{
    gate::{request_path, Decision, GatePolicy, GateRequest, GateScope},
    identity::{extract_credentials, AuthState, Credentials, IdentityResolver},
};
use axum::{
    extract::{Request, State},
    http::{header::HOST, HeaderMap, Uri},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::{fmt, sync::Arc};
use tracing::{debug, warn};
use url::Url;

const FALLBACK_HOST: &str = "localhost";

/// Shared, read-only state for the gate middleware.
pub struct GateState {
    policy: GatePolicy,
    scope: GateScope,
    identity: Arc<dyn IdentityResolver>,
    session_cookie: String,
}

impl GateState {
    #[must_use]
    pub fn new(
        policy: GatePolicy,
        scope: GateScope,
        identity: Arc<dyn IdentityResolver>,
        session_cookie: String,
    ) -> Self {
        Self {
            policy,
            scope,
            identity,
            session_cookie,
        }
    }

    #[must_use]
    pub const fn policy(&self) -> &GatePolicy {
        &self.policy
    }

    #[must_use]
    pub const fn scope(&self) -> &GateScope {
        &self.scope
    }

    #[must_use]
    pub fn session_cookie(&self) -> &str {
        &self.session_cookie
    }

    /// Resolve credentials, failing closed: provider errors count as anonymous.
    async fn authenticate(&self, credentials: Option<Credentials>) -> AuthState {
        let Some(credentials) = credentials else {
            return AuthState::anonymous();
        };

        match self.identity.resolve(&credentials).await {
            Ok(user_id) => AuthState::from(user_id),
            Err(err) => {
                warn!("Identity resolution failed, treating request as anonymous: {err}");
                AuthState::anonymous()
            }
        }
    }
}

impl fmt::Debug for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateState")
            .field("policy", &self.policy)
            .field("scope", &self.scope)
            .field("identity", &"dyn IdentityResolver")
            .field("session_cookie", &self.session_cookie)
            .finish()
    }
}

/// axum middleware applying the gate to every in-scope request.
pub async fn gate(State(state): State<Arc<GateState>>, mut request: Request, next: Next) -> Response {
    let path = gate_path(request.uri());

    if !state.scope().applies_to(&path) {
        request.extensions_mut().insert(AuthState::anonymous());
        return next.run(request).await;
    }

    let credentials = extract_credentials(request.headers(), state.session_cookie());
    let auth = state.authenticate(credentials).await;

    let gate_request = GateRequest::new(path, auth.is_authenticated());
    let decision = state.policy().evaluate(&gate_request);

    debug!(
        path = gate_request.path(),
        authenticated = gate_request.is_authenticated(),
        decision = decision.as_str(),
        "gate decision"
    );

    match decision {
        Decision::Allow => {
            request.extensions_mut().insert(auth);
            next.run(request).await
        }
        Decision::RedirectHome | Decision::RedirectSignIn => {
            let target = state.policy().redirect_target(decision).unwrap_or("/");
            let url = request_url(request.uri(), request.headers());
            Redirect::temporary(&location(url.as_ref(), target)).into_response()
        }
    }
}

/// Path the gate decides on. Taken from the request target only, never from `Host`.
fn gate_path(uri: &Uri) -> String {
    let path_and_query = uri.path_and_query().map_or("/", |pq| pq.as_str());
    request_path(Some(&format!("http://{FALLBACK_HOST}{path_and_query}")))
}

/// Rebuild the absolute URL the client asked for.
fn request_url(uri: &Uri, headers: &HeaderMap) -> Option<Url> {
    let host = uri
        .authority()
        .map(ToString::to_string)
        .or_else(|| {
            headers
                .get(HOST)
                .and_then(|value| value.to_str().ok())
                .map(ToString::to_string)
        })
        .unwrap_or_else(|| FALLBACK_HOST.to_string());

    let scheme = uri
        .scheme_str()
        .or_else(|| {
            headers
                .get("x-forwarded-proto")
                .and_then(|value| value.to_str().ok())
                .filter(|proto| *proto == "https")
        })
        .unwrap_or("http");

    let path_and_query = uri.path_and_query().map_or("/", |pq| pq.as_str());

    Url::parse(&format!("{scheme}://{host}{path_and_query}")).ok()
}

/// Redirect location: `target` resolved against the request URL when there is one.
fn location(base: Option<&Url>, target: &str) -> String {
    base.and_then(|base| base.join(target).ok())
        .map_or_else(|| target.to_string(), String::from)
}
