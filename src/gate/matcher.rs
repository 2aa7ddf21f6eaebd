//! Path allow-lists used by the gate.
//!
//! Only two pattern forms are understood: a literal path (`/sign-in`), which
//! also accepts a single trailing slash, and a literal prefix followed by the
//! `(.*)` wildcard (`/sign-in(.*)`).

use regex::RegexSet;
use thiserror::Error;

const WILDCARD: &str = "(.*)";

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("route pattern must start with '/': {0}")]
    NotAbsolute(String),
    #[error("excluded prefix would exclude every path: {0:?}")]
    ExcludesEverything(String),
    #[error("failed to compile route patterns")]
    Compile(#[from] regex::Error),
}

/// A compiled set of route patterns.
#[derive(Debug, Clone)]
pub struct RouteMatcher {
    patterns: Vec<String>,
    set: RegexSet,
}

impl RouteMatcher {
    /// Compile `patterns` into a matcher.
    ///
    /// # Errors
    /// Returns an error if a pattern is not an absolute path or the set fails to compile.
    pub fn new<I, S>(patterns: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns: Vec<String> = patterns
            .into_iter()
            .map(|pattern| pattern.as_ref().trim().to_string())
            .collect();

        let expressions = patterns
            .iter()
            .map(|pattern| to_expression(pattern))
            .collect::<Result<Vec<_>, _>>()?;

        let set = RegexSet::new(expressions)?;

        Ok(Self { patterns, set })
    }

    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.set.is_match(path)
    }

    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

fn to_expression(pattern: &str) -> Result<String, PatternError> {
    if !pattern.starts_with('/') {
        return Err(PatternError::NotAbsolute(pattern.to_string()));
    }

    if let Some(prefix) = pattern.strip_suffix(WILDCARD) {
        return Ok(format!("^{}.*$", regex::escape(prefix)));
    }

    // "/" trims to "" and becomes "^/?$"
    let literal = pattern.trim_end_matches('/');
    Ok(format!("^{}/?$", regex::escape(literal)))
}
