//! Request gating policy.
//!
//! The gate never performs I/O. It receives a request path and an already
//! resolved authentication result, classifies the route and returns a
//! [`Decision`]. Acting on the decision is the caller's job.

pub mod matcher;
pub mod scope;

pub use matcher::{PatternError, RouteMatcher};
pub use scope::GateScope;

use url::Url;

pub const DEFAULT_PUBLIC_PAGES: &[&str] = &["/sign-in", "/sign-up", "/", "/home"];
pub const DEFAULT_PUBLIC_API: &[&str] = &["/api/video"];
pub const DEFAULT_HOME_PATH: &str = "/home";
pub const DEFAULT_SIGN_IN_PATH: &str = "/sign-in";
pub const DEFAULT_API_PREFIX: &str = "/api";

const ROOT_PATH: &str = "/";

/// Outcome of evaluating a request against the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectHome,
    RedirectSignIn,
}

impl Decision {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::RedirectHome => "redirect_home",
            Self::RedirectSignIn => "redirect_sign_in",
        }
    }
}

/// Facts about a route, derived from its path only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouteClassification {
    pub is_public_page: bool,
    pub is_public_api: bool,
    pub is_home: bool,
    pub is_api_request: bool,
}

/// A request as the gate sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateRequest {
    path: String,
    authenticated: bool,
}

impl GateRequest {
    #[must_use]
    pub fn new(path: impl Into<String>, authenticated: bool) -> Self {
        Self {
            path: path.into(),
            authenticated,
        }
    }

    /// Build from an absolute request URL. Missing or unparseable URLs fall back to `/`.
    #[must_use]
    pub fn from_url(url: Option<&str>, authenticated: bool) -> Self {
        Self::new(request_path(url), authenticated)
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}

/// Extract the normalized path from an absolute URL, or `/` if there is none.
#[must_use]
pub fn request_path(url: Option<&str>) -> String {
    url.and_then(|raw| Url::parse(raw).ok())
        .map(|parsed| parsed.path().to_string())
        .filter(|path| path.starts_with('/'))
        .unwrap_or_else(|| ROOT_PATH.to_string())
}

/// Core decision table. Rules are checked in order; the first match wins.
#[must_use]
pub const fn decide(authenticated: bool, route: RouteClassification) -> Decision {
    if authenticated && route.is_public_page && !route.is_home {
        Decision::RedirectHome
    } else if !authenticated && !route.is_public_page && !route.is_public_api {
        Decision::RedirectSignIn
    } else if !authenticated && route.is_api_request && !route.is_public_api {
        Decision::RedirectSignIn
    } else {
        Decision::Allow
    }
}

#[derive(Debug, Clone)]
pub struct GatePolicy {
    public_pages: RouteMatcher,
    public_api: RouteMatcher,
    home_path: String,
    sign_in_path: String,
    api_prefix: String,
}

impl GatePolicy {
    #[must_use]
    pub fn new(public_pages: RouteMatcher, public_api: RouteMatcher) -> Self {
        Self {
            public_pages,
            public_api,
            home_path: DEFAULT_HOME_PATH.to_string(),
            sign_in_path: DEFAULT_SIGN_IN_PATH.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
        }
    }

    /// Policy built from the default allow-lists.
    ///
    /// # Errors
    /// Returns an error if the default patterns fail to compile.
    pub fn standard() -> Result<Self, PatternError> {
        Ok(Self::new(
            RouteMatcher::new(DEFAULT_PUBLIC_PAGES)?,
            RouteMatcher::new(DEFAULT_PUBLIC_API)?,
        ))
    }

    #[must_use]
    pub fn with_home_path(mut self, path: String) -> Self {
        self.home_path = path;
        self
    }

    #[must_use]
    pub fn with_sign_in_path(mut self, path: String) -> Self {
        self.sign_in_path = path;
        self
    }

    #[must_use]
    pub fn with_api_prefix(mut self, prefix: String) -> Self {
        self.api_prefix = prefix;
        self
    }

    #[must_use]
    pub fn home_path(&self) -> &str {
        &self.home_path
    }

    #[must_use]
    pub fn sign_in_path(&self) -> &str {
        &self.sign_in_path
    }

    #[must_use]
    pub fn api_prefix(&self) -> &str {
        &self.api_prefix
    }

    #[must_use]
    pub fn classify(&self, path: &str) -> RouteClassification {
        RouteClassification {
            is_public_page: self.public_pages.matches(path),
            is_public_api: self.public_api.matches(path),
            is_home: path == self.home_path,
            is_api_request: path.starts_with(self.api_prefix.as_str()),
        }
    }

    #[must_use]
    pub fn evaluate(&self, request: &GateRequest) -> Decision {
        decide(request.is_authenticated(), self.classify(request.path()))
    }

    /// Path a decision redirects to, if any.
    #[must_use]
    pub fn redirect_target(&self, decision: Decision) -> Option<&str> {
        match decision {
            Decision::Allow => None,
            Decision::RedirectHome => Some(self.home_path.as_str()),
            Decision::RedirectSignIn => Some(self.sign_in_path.as_str()),
        }
    }
}
