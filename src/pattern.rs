//! Route pattern parsing and segment matching
//!
//! A pattern is an ordered sequence of path segments:
//!
//! - Literal segments: `/users/settings`
//! - Parameter segments: `/:id` (matches any single non-empty segment)
//! - Trailing wildcard: `/*rest` (consumes all remaining segments as one value)
//!
//! This syntax is the wire contract between route table authors and the
//! matcher. Patterns are validated when parsed; a malformed pattern is a
//! [`ConfigError`] and must be rejected before the application starts.
//!
//! Matching here is per-pattern. Which pattern wins for a given path is the
//! route table's concern: the table checks patterns in registration order and
//! the first full match wins, regardless of specificity.

use crate::error::ConfigError;
use crate::params::{decode_uri_component, RouteParams};
use crate::QueryParams;
use std::collections::HashSet;

/// A single segment in a route pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Static text that must match exactly (case-sensitive)
    Literal(String),
    /// Parameter that captures one non-empty segment
    Param(String),
    /// Trailing wildcard that captures the joined remainder of the path
    Wildcard(String),
}

impl Segment {
    fn parse(s: &str) -> Result<Self, String> {
        if let Some(name) = s.strip_prefix(':') {
            validate_binding_name(name, "parameter")?;
            return Ok(Segment::Param(name.to_string()));
        }

        if let Some(name) = s.strip_prefix('*') {
            validate_binding_name(name, "wildcard")?;
            return Ok(Segment::Wildcard(name.to_string()));
        }

        Ok(Segment::Literal(s.to_string()))
    }
}

fn validate_binding_name(name: &str, kind: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err(format!("{} name cannot be empty", kind));
    }
    if !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(format!(
            "{} name '{}' must contain only alphanumeric characters and underscores",
            kind, name
        ));
    }
    Ok(())
}

/// A parsed route pattern
///
/// # Example
///
/// ```
/// use waypoint::RoutePattern;
///
/// let pattern = RoutePattern::parse("/users/:id").unwrap();
/// let params = pattern.matches("/users/42").unwrap();
/// assert_eq!(params.get("id"), Some(&"42".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Parse a pattern, validating it
    ///
    /// # Validation rules
    ///
    /// - Pattern must start with `/`
    /// - No consecutive slashes (`//`)
    /// - Parameter and wildcard names must be non-empty, alphanumeric or `_`
    /// - No duplicate binding names
    /// - A wildcard must be the final segment
    pub fn parse(pattern: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            reason,
        };

        if !pattern.starts_with('/') {
            return Err(invalid("pattern must start with '/'".to_string()));
        }
        if pattern.contains("//") {
            return Err(invalid(
                "pattern cannot contain consecutive slashes".to_string(),
            ));
        }

        let mut segments = Vec::new();
        let mut names = HashSet::new();

        let raw_segments: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
        for (idx, raw) in raw_segments.iter().enumerate() {
            let segment = Segment::parse(raw).map_err(&invalid)?;

            match &segment {
                Segment::Param(name) | Segment::Wildcard(name) => {
                    if !names.insert(name.clone()) {
                        return Err(invalid(format!("duplicate binding name '{}'", name)));
                    }
                }
                Segment::Literal(_) => {}
            }

            if matches!(segment, Segment::Wildcard(_)) && idx != raw_segments.len() - 1 {
                return Err(invalid("wildcard must be the final segment".to_string()));
            }

            segments.push(segment);
        }

        // Strip a trailing slash from the stored form so `/users/` and
        // `/users` describe the same route.
        let raw = normalize_path(pattern).0;

        Ok(Self { raw, segments })
    }

    /// The normalized pattern text this was parsed from
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Pattern segments in order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether the final segment is a wildcard
    pub fn has_wildcard(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::Wildcard(_)))
    }

    /// Match this pattern against a concrete path
    ///
    /// The path is normalized first (trailing slash stripped, query split
    /// off, segments percent-decoded). Returns the extracted parameters on a
    /// full match, `None` otherwise.
    pub fn matches(&self, path: &str) -> Option<RouteParams> {
        let (path, _query) = normalize_path(path);
        let path_segments: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(decode_uri_component)
            .collect();

        self.match_segments(&path_segments)
    }

    /// Match against already-normalized, decoded path segments
    pub(crate) fn match_segments(&self, path_segments: &[String]) -> Option<RouteParams> {
        let mut params = RouteParams::new();
        let mut path_idx = 0;

        for segment in &self.segments {
            match segment {
                Segment::Literal(expected) => {
                    if path_idx >= path_segments.len() || &path_segments[path_idx] != expected {
                        return None;
                    }
                    path_idx += 1;
                }
                Segment::Param(name) => {
                    if path_idx >= path_segments.len() {
                        return None;
                    }
                    params.insert(name.clone(), path_segments[path_idx].clone());
                    path_idx += 1;
                }
                Segment::Wildcard(name) => {
                    // Consumes everything that remains, including nothing.
                    let rest = path_segments[path_idx..].join("/");
                    params.insert(name.clone(), rest);
                    return Some(params);
                }
            }
        }

        // All segments matched - the path must be fully consumed too
        if path_idx == path_segments.len() {
            Some(params)
        } else {
            None
        }
    }
}

/// Normalize a concrete path for matching
///
/// Splits off the query string and strips a single trailing slash (except for
/// the root path `/`). Returns the path part and the raw query string, if any.
pub fn normalize_path(path: &str) -> (String, Option<String>) {
    let (path, query) = match path.split_once('?') {
        Some((p, q)) => (p, Some(q.to_string())),
        None => (path, None),
    };

    let path = if path.len() > 1 && path.ends_with('/') {
        &path[..path.len() - 1]
    } else {
        path
    };

    (path.to_string(), query)
}

/// Normalize a path and parse its query string
pub(crate) fn split_path(path: &str) -> (String, QueryParams) {
    let (path, query) = normalize_path(path);
    let query = query
        .map(|q| QueryParams::from_query_string(&q))
        .unwrap_or_default();
    (path, query)
}
