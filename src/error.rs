//! Error handling for the navigation engine
//!
//! Provides error types for table construction failures and navigation
//! outcomes, plus the per-request `NavigationResult`.

use crate::RouteId;
use std::fmt;

// ============================================================================
// Configuration Errors
// ============================================================================

/// Errors raised while registering a route table.
///
/// These are fatal: an application must not start with an invalid table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Two route definitions share the same identifier
    DuplicateRouteId {
        /// The offending identifier
        id: String,
    },

    /// A path pattern is malformed
    InvalidPattern {
        /// The offending pattern text
        pattern: String,
        /// Why the pattern was rejected
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::DuplicateRouteId { id } => {
                write!(f, "Duplicate route identifier: {}", id)
            }
            ConfigError::InvalidPattern { pattern, reason } => {
                write!(f, "Invalid route pattern '{}': {}", pattern, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Navigation Errors
// ============================================================================

/// Errors that can occur during navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// No route matched and no fallback route is configured
    RouteNotFound {
        /// The requested path
        path: String,
    },

    /// Guard redirects exceeded the hop limit
    RedirectLoop {
        /// The path that was being resolved when the limit was hit
        path: String,
        /// Number of redirect hops taken
        hops: u8,
    },

    /// The history host rejected a push or replace
    HistoryUnavailable {
        /// Host-supplied failure message
        message: String,
    },
}

impl fmt::Display for NavigationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationError::RouteNotFound { path } => {
                write!(f, "Route not found: {}", path)
            }
            NavigationError::RedirectLoop { path, hops } => {
                write!(f, "Redirect loop resolving '{}' after {} hops", path, hops)
            }
            NavigationError::HistoryUnavailable { message } => {
                write!(f, "History host unavailable: {}", message)
            }
        }
    }
}

impl std::error::Error for NavigationError {}

// ============================================================================
// Navigation Result
// ============================================================================

/// Outcome of a single navigation request.
///
/// `Pending` and `Superseded` are normal outcomes of the single-flight
/// pipeline: a request suspended on an async guard reports `Pending` until the
/// controller is pumped again, and an in-flight request cancelled by a newer
/// one reports `Superseded`.
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationResult {
    /// Navigation committed; the route is now current
    Committed {
        /// Identifier of the committed route
        route_id: RouteId,
        /// The committed (normalized) path
        path: String,
    },
    /// No route matched the requested path
    NotFound {
        /// The requested path
        path: String,
    },
    /// Navigation blocked by a guard
    Blocked {
        /// Reason supplied by the guard
        reason: String,
        /// Redirect target, if the guard issued one that itself failed
        redirect: Option<String>,
    },
    /// Resolution is suspended on an async guard
    Pending,
    /// A newer request cancelled this one before it resolved
    Superseded,
    /// Navigation failed
    Error(NavigationError),
}

impl NavigationResult {
    /// Check if navigation committed
    pub fn is_committed(&self) -> bool {
        matches!(self, NavigationResult::Committed { .. })
    }

    /// Check if no route matched
    pub fn is_not_found(&self) -> bool {
        matches!(self, NavigationResult::NotFound { .. })
    }

    /// Check if a guard blocked the navigation
    pub fn is_blocked(&self) -> bool {
        matches!(self, NavigationResult::Blocked { .. })
    }

    /// Check if resolution is still suspended on a guard
    pub fn is_pending(&self) -> bool {
        matches!(self, NavigationResult::Pending)
    }

    /// Check if a newer request cancelled this one
    pub fn is_superseded(&self) -> bool {
        matches!(self, NavigationResult::Superseded)
    }

    /// Check if navigation failed with an error
    pub fn is_error(&self) -> bool {
        matches!(self, NavigationResult::Error(_))
    }

    /// Get the committed route identifier, if any
    pub fn route_id(&self) -> Option<&RouteId> {
        match self {
            NavigationResult::Committed { route_id, .. } => Some(route_id),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
