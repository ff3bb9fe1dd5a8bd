//! Route pattern parsing and captured path parameters.
//!
//! # Syntax
//! ```text
//! /users            literal segments, matched exactly
//! /users/:id        capture, matches exactly one non-empty segment
//! /files/*path      wildcard, matches the rest of the path (last segment only)
//! ```
//!
//! # Design Decisions
//! - Leading and trailing slashes are not significant in patterns
//! - Parameter names must be unique within one pattern

use std::collections::HashSet;
use std::fmt;

use crate::routing::RouteError;

/// One `/`-delimited component of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Capture(String),
    Wildcard(String),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Literal(s) => f.write_str(s),
            Segment::Capture(name) => write!(f, ":{}", name),
            Segment::Wildcard(name) => write!(f, "*{}", name),
        }
    }
}

/// A parsed route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    segments: Vec<Segment>,
}

impl Pattern {
    /// Parse a pattern string such as `/router/request/path/require/:id`.
    pub fn parse(raw: &str) -> Result<Self, RouteError> {
        let trimmed = raw.trim_start_matches('/');
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);

        let mut segments = Vec::new();
        let mut names = HashSet::new();

        if trimmed.is_empty() {
            return Ok(Self { segments });
        }

        let parts: Vec<&str> = trimmed.split('/').collect();
        let last = parts.len() - 1;

        for (i, part) in parts.iter().enumerate() {
            let segment = if let Some(name) = part.strip_prefix(':') {
                Segment::Capture(name.to_string())
            } else if let Some(name) = part.strip_prefix('*') {
                if i != last {
                    return Err(RouteError::InvalidPattern {
                        pattern: raw.to_string(),
                        reason: "wildcard must be the last segment".to_string(),
                    });
                }
                Segment::Wildcard(name.to_string())
            } else if part.is_empty() {
                return Err(RouteError::InvalidPattern {
                    pattern: raw.to_string(),
                    reason: "empty path segment".to_string(),
                });
            } else {
                Segment::Literal(part.to_string())
            };

            if let Segment::Capture(name) | Segment::Wildcard(name) = &segment {
                if name.is_empty() {
                    return Err(RouteError::InvalidPattern {
                        pattern: raw.to_string(),
                        reason: "parameter name must not be empty".to_string(),
                    });
                }
                if !names.insert(name.clone()) {
                    return Err(RouteError::InvalidPattern {
                        pattern: raw.to_string(),
                        reason: format!("parameter '{}' appears more than once", name),
                    });
                }
            }

            segments.push(segment);
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

/// Join a group prefix and a route pattern with exactly one slash between them.
pub fn join_paths(prefix: &str, pattern: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let pattern = pattern.trim_start_matches('/');
    match (prefix.is_empty(), pattern.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => format!("/{}", pattern),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{}/{}", prefix, pattern),
    }
}

/// Path parameters captured while matching, in pattern order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, String)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn push(&mut self, name: &str, value: String) {
        self.entries.push((name.to_string(), value));
    }

    pub(crate) fn pop(&mut self) {
        self.entries.pop();
    }
}
