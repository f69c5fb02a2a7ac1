//! Path matching.
//!
//! # Responsibilities
//! - Match the whole request path against a compiled pattern
//! - Return capture groups as ordered positional strings
//! - Render a human-readable form for route listings
//!
//! # Design Decisions
//! - Patterns compile once at startup; a bad pattern is a startup error
//! - Matching is anchored at both ends
//! - Unmatched optional groups yield empty strings so positions stay stable

use std::fmt;

use regex::Regex;

/// Trait for matching request paths.
pub trait PathMatcher: Send + Sync + fmt::Debug {
    /// Ordered captures if `path` matches, `None` otherwise.
    fn captures(&self, path: &str) -> Option<Vec<String>>;

    /// Readable pattern, e.g. `/stacks/(d+)/file`.
    fn describe(&self) -> String;
}

/// Regex-backed matcher.
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    source: String,
    regex: Regex,
}

impl RegexMatcher {
    /// Compile `pattern`, anchoring it if the caller did not.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let source = pattern.strip_prefix('^').unwrap_or(pattern);
        let source = source.strip_suffix('$').unwrap_or(source).to_string();
        let regex = Regex::new(&format!("^(?:{source})$"))?;
        Ok(Self { source, regex })
    }
}

impl PathMatcher for RegexMatcher {
    fn captures(&self, path: &str) -> Option<Vec<String>> {
        let caps = self.regex.captures(path)?;
        Some(
            caps.iter()
                .skip(1)
                .map(|m| m.map_or_else(String::new, |m| m.as_str().to_string()))
                .collect(),
        )
    }

    fn describe(&self) -> String {
        self.source.replace('\\', "")
    }
}
