//! Expected failure message patterns.

use crate::error::{ActionFailure, ActionResult};
use regex::Regex;
use std::sync::LazyLock;

static MATCHER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@\s*(\w+)\s*(?:\(\s*'?(.*?)'?\s*\))?\s*@$").expect("matcher pattern is valid")
});

/// How an expected failure message is compared to the actual one
///
/// Plain text matches exactly. `@name('arg')@` selects a matcher by name and
/// `@ignore@` accepts any message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageMatcher {
    Exact(String),
    StartsWith(String),
    EndsWith(String),
    Contains(String),
    EqualsIgnoreCase(String),
    Ignore,
}

impl MessageMatcher {
    pub fn parse(expected: &str) -> ActionResult<Self> {
        if expected.len() < 2 || !expected.starts_with('@') || !expected.ends_with('@') {
            return Ok(Self::Exact(expected.to_string()));
        }

        let invalid =
            || ActionFailure::usage(format!("Invalid message matcher expression '{expected}'"));
        let captures = MATCHER_PATTERN.captures(expected).ok_or_else(invalid)?;
        let name = captures.get(1).map_or("", |m| m.as_str());
        let argument = captures.get(2).map(|m| m.as_str().to_string());

        match (name, argument) {
            ("ignore", None) => Ok(Self::Ignore),
            ("ignore", Some(argument)) if argument.is_empty() => Ok(Self::Ignore),
            ("startsWith", Some(argument)) => Ok(Self::StartsWith(argument)),
            ("endsWith", Some(argument)) => Ok(Self::EndsWith(argument)),
            ("contains", Some(argument)) => Ok(Self::Contains(argument)),
            ("equalsIgnoreCase", Some(argument)) => Ok(Self::EqualsIgnoreCase(argument)),
            ("startsWith" | "endsWith" | "contains" | "equalsIgnoreCase", None) => Err(invalid()),
            (other, _) => Err(ActionFailure::usage(format!(
                "Unknown message matcher '{other}'"
            ))),
        }
    }

    pub fn matches(&self, actual: &str) -> bool {
        match self {
            Self::Exact(expected) => actual == expected,
            Self::StartsWith(prefix) => actual.starts_with(prefix.as_str()),
            Self::EndsWith(suffix) => actual.ends_with(suffix.as_str()),
            Self::Contains(part) => actual.contains(part.as_str()),
            Self::EqualsIgnoreCase(expected) => actual.to_lowercase() == expected.to_lowercase(),
            Self::Ignore => true,
        }
    }
}
