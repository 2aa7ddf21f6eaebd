//! Which request paths the gate runs on.

use regex::Regex;

use super::PatternError;

pub const DEFAULT_ALWAYS_PREFIXES: &[&str] = &["/api", "/trpc"];
pub const DEFAULT_EXCLUDED_PREFIXES: &[&str] = &["/_next", "/health"];

const ASSET_EXTENSION: &str =
    r"\.(?:html?|css|js|jpe?g|webp|png|gif|svg|ttf|woff2?|ico|csv|docx?|xlsx?|zip|webmanifest)";

/// Decides whether a path is gated.
///
/// API routes are always gated, even when they look like a static file.
/// Excluded prefixes and static assets are never gated.
#[derive(Debug, Clone)]
pub struct GateScope {
    always_prefixes: Vec<String>,
    excluded_prefixes: Vec<String>,
    asset_extension: Regex,
}

impl GateScope {
    /// # Errors
    /// Returns an error if an excluded prefix is relative or covers every path
    /// (`/`), or if the asset extension expression fails to compile.
    pub fn new(
        always_prefixes: Vec<String>,
        excluded_prefixes: Vec<String>,
    ) -> Result<Self, PatternError> {
        for prefix in &excluded_prefixes {
            if !prefix.starts_with('/') {
                return Err(PatternError::NotAbsolute(prefix.clone()));
            }
            if prefix.trim_end_matches('/').is_empty() {
                return Err(PatternError::ExcludesEverything(prefix.clone()));
            }
        }

        Ok(Self {
            always_prefixes,
            excluded_prefixes,
            asset_extension: Regex::new(ASSET_EXTENSION)?,
        })
    }

    /// Scope with the default always-gated and excluded prefixes.
    ///
    /// # Errors
    /// Returns an error if the asset extension expression fails to compile.
    pub fn standard() -> Result<Self, PatternError> {
        Self::new(
            DEFAULT_ALWAYS_PREFIXES.iter().map(ToString::to_string).collect(),
            DEFAULT_EXCLUDED_PREFIXES.iter().map(ToString::to_string).collect(),
        )
    }

    #[must_use]
    pub fn applies_to(&self, path: &str) -> bool {
        if self
            .always_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
        {
            return true;
        }

        if self
            .excluded_prefixes
            .iter()
            .any(|prefix| has_segment_prefix(path, prefix))
        {
            return false;
        }

        !self.is_static_asset(path)
    }

    /// `.js` counts as an asset, `.json` does not.
    fn is_static_asset(&self, path: &str) -> bool {
        self.asset_extension
            .find_iter(path)
            .any(|found| !(found.as_str() == ".js" && path[found.end()..].starts_with("on")))
    }
}

fn has_segment_prefix(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn scope() -> GateScope {
        GateScope::standard().unwrap()
    }

    #[test]
    fn pages_are_gated() {
        let scope = scope();
        assert!(scope.applies_to("/"));
        assert!(scope.applies_to("/home"));
        assert!(scope.applies_to("/dashboard/settings"));
    }

    #[test]
    fn static_assets_are_not_gated() {
        let scope = scope();
        for path in [
            "/favicon.ico",
            "/styles/site.css",
            "/app.js",
            "/logo.png",
            "/photo.jpeg",
            "/font.woff2",
            "/report.docx",
            "/site.webmanifest",
            "/index.html",
        ] {
            assert!(!scope.applies_to(path), "{path} should not be gated");
        }
    }

    #[test]
    fn json_is_not_an_asset() {
        let scope = scope();
        assert!(scope.applies_to("/data.json"));
        assert!(!scope.applies_to("/bundle.jsx"));
    }

    #[test]
    fn api_routes_are_always_gated() {
        let scope = scope();
        assert!(scope.applies_to("/api/video"));
        assert!(scope.applies_to("/api/export.csv"));
        assert!(scope.applies_to("/trpc/user.list"));
    }

    #[test]
    fn excluded_prefixes_match_whole_segments() {
        let scope = scope();
        assert!(!scope.applies_to("/_next/static/chunk"));
        assert!(!scope.applies_to("/health"));
        assert!(scope.applies_to("/healthy"));
    }

    #[test]
    fn custom_scope() {
        let scope = GateScope::new(vec!["/rpc".to_string()], vec!["/assets/".to_string()]).unwrap();
        assert!(!scope.applies_to("/assets/logo.svg"));
        assert!(scope.applies_to("/rpc/file.png"));
        assert!(!scope.applies_to("/api/file.png"));
    }

    #[test]
    fn root_exclusion_is_rejected() {
        for prefix in ["/", "//"] {
            assert!(matches!(
                GateScope::new(Vec::new(), vec![prefix.to_string()]),
                Err(PatternError::ExcludesEverything(_))
            ));
        }
        assert!(matches!(
            GateScope::new(Vec::new(), vec!["health".to_string()]),
            Err(PatternError::NotAbsolute(_))
        ));
    }
}
