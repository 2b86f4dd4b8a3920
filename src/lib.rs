//! # Waypoint
//!
//! A route resolution and navigation engine for URL-driven applications:
//!
//! - **Path Matching** - Literal, `:param`, and trailing `*wildcard` segments
//! - **Route Table** - Immutable, ordered registry with first-match-wins resolution
//! - **Navigation Controller** - Single-flight state machine over all transitions
//! - **Route Guards** - Allow, deny, or redirect navigations, sync or async
//! - **History Adapter** - Push/replace/pop bridged to a pluggable host stack
//! - **Reverse Navigation** - Generate URLs from route identifiers and params
//!
//! The engine owns resolution and state; rendering stays outside. Register an
//! observer with [`NavigationController::on_commit`] and map the committed
//! route identifier to whatever your view layer draws.
//!
//! # Quick Start
//!
//! ```
//! use waypoint::{HistoryAdapter, NavigationController, RouteDefinition, RouteTable};
//!
//! let table = RouteTable::register(vec![
//!     RouteDefinition::new("home", "/", "HomeView").unwrap(),
//!     RouteDefinition::new("user-detail", "/users/:id", "UserView").unwrap(),
//!     RouteDefinition::new("docs", "/docs/*path", "DocsView").unwrap(),
//! ])
//! .unwrap();
//!
//! let mut nav = NavigationController::new(table, HistoryAdapter::default(), "/");
//!
//! let result = nav.navigate("/users/42");
//! assert!(result.is_committed());
//!
//! let current = nav.current().unwrap();
//! assert_eq!(current.route_id.as_str(), "user-detail");
//! assert_eq!(current.params.get("id"), Some(&"42".to_string()));
//! ```
//!
//! # Route Guards
//!
//! Guards run in registration order before every commit; the first non-allow
//! result wins:
//!
//! ```
//! use waypoint::{
//!     HistoryAdapter, NavigationController, PredicateGuard, RouteDefinition, RouteTable,
//! };
//!
//! let table = RouteTable::register(vec![
//!     RouteDefinition::new("home", "/", ()).unwrap(),
//!     RouteDefinition::new("admin", "/admin", ()).unwrap(),
//!     RouteDefinition::new("login", "/login", ()).unwrap(),
//! ])
//! .unwrap();
//!
//! let mut nav = NavigationController::new(table, HistoryAdapter::default(), "/")
//!     .with_guard(
//!         PredicateGuard::new("auth", |ctx| !ctx.to.path.starts_with("/admin"))
//!             .redirect_to("/login"),
//!     );
//!
//! let result = nav.navigate("/admin");
//! assert!(result.is_committed());
//! assert_eq!(nav.current_path(), Some("/login"));
//! ```
//!
//! # History Pops
//!
//! Back/forward events from the host re-enter the engine through
//! [`NavigationController::handle_pop`], so popped entries pass the same
//! guards as any other navigation. See [`history`] for the host contract.
//!
//! # Feature Flags
//!
//! - `log` (default) - Uses the standard `log` crate for logging
//! - `tracing` - Uses the `tracing` crate for structured logging (mutually exclusive with `log`)
//! - `cache` (default) - LRU cache in front of route resolution

#![cfg_attr(docsrs, feature(doc_cfg))]
// Lints are configured in Cargo.toml [lints] section

// Logging abstraction
pub mod logging;

// Cache (optional)
#[cfg(feature = "cache")]
pub mod cache;

// Core routing modules
pub mod controller;
pub mod history;
pub mod pattern;
pub mod table;

// Error handling
pub mod error;

// Guards
pub mod guards;

// Parameters
pub mod params;

// Re-export main types for convenient access
#[cfg(feature = "cache")]
pub use cache::{CacheStats, RouteCache};
pub use controller::{NavigationController, NavigationState, Phase};
pub use error::{ConfigError, NavigationError, NavigationResult};
pub use guards::{
    boxed, guard_fn, BoxedGuard, FnGuard, Guard, GuardContext, GuardResult, PredicateGuard,
};
pub use history::{HistoryAdapter, HistoryEntry, HistoryHost, HistoryState, InMemoryHistory};
pub use params::{QueryParams, RouteParams};
pub use pattern::{normalize_path, RoutePattern, Segment};
pub use table::{RouteDefinition, RouteTable};

/// Stable identifier for a route definition.
///
/// Decouples navigation targets from URL shapes: rendering layers and
/// reverse navigation address routes by identifier, so paths can change
/// without touching call sites.
///
/// # Example
///
/// ```
/// use waypoint::RouteId;
///
/// let id = RouteId::new("user-detail");
/// assert_eq!(id.as_str(), "user-detail");
/// assert_eq!(id, "user-detail".into());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteId(String);

impl RouteId {
    /// Create a route identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RouteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RouteId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RouteId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Successful route resolution.
///
/// Produced by [`RouteTable::resolve`]: the winning route's identifier, the
/// normalized path, extracted parameters, and parsed query string.
///
/// # Example
///
/// ```
/// use waypoint::{RouteDefinition, RouteTable};
///
/// let table = RouteTable::register(vec![
///     RouteDefinition::new("user-detail", "/users/:id", ()).unwrap(),
/// ])
/// .unwrap();
///
/// let m = table.resolve("/users/123?tab=posts").unwrap();
/// assert_eq!(m.route_id.as_str(), "user-detail");
/// assert_eq!(m.path, "/users/123");
/// assert_eq!(m.params.get("id"), Some(&"123".to_string()));
/// assert_eq!(m.query.get("tab"), Some(&"posts".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    /// Identifier of the matched route definition
    pub route_id: RouteId,
    /// The normalized matched path, query stripped
    pub path: String,
    /// Extracted route parameters (e.g., `:id` -> "123")
    pub params: RouteParams,
    /// Parsed query string parameters
    pub query: QueryParams,
}

/// Navigation direction indicator.
///
/// Describes how a committed transition related to the history stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDirection {
    /// Navigating forward to a new route
    Forward,
    /// Navigating back in history
    Back,
    /// Replacing the current route without affecting history direction
    Replace,
}

/// Event emitted when the committed route changes.
///
/// Handed to commit observers; carries what the rendering layer needs to
/// draw the new route.
#[derive(Debug, Clone)]
pub struct RouteChangeEvent {
    /// The previous path (None if this is the first navigation)
    pub from: Option<String>,
    /// The new path being navigated to
    pub to: String,
    /// The direction of navigation
    pub direction: NavigationDirection,
    /// Identifier of the committed route
    pub route_id: RouteId,
    /// Parameters extracted from the committed path
    pub params: RouteParams,
}
