//! Route table: ordered, immutable collection of route definitions
//!
//! The table is built once at startup from an ordered list of definitions and
//! never mutated afterwards. Resolution walks the table in registration order
//! and the first definition whose pattern fully matches wins.
//!
//! Declaration order is a load-bearing invariant: the table deliberately does
//! NOT rank patterns by specificity. Given `/a/:x` registered before `/a/b`,
//! the path `/a/b` resolves to `/a/:x`.

use crate::error::ConfigError;
use crate::params::RouteParams;
use crate::pattern::{split_path, RoutePattern, Segment};
use crate::{debug_log, trace_log, RouteId, RouteMatch};
use std::collections::HashMap;

/// A single route definition: a pattern, a unique identifier, and an opaque
/// reference to the renderable unit for this route.
///
/// The engine never inspects `view`; it is handed back to the rendering layer
/// through [`RouteTable::lookup`] after a commit.
#[derive(Debug, Clone)]
pub struct RouteDefinition<V> {
    id: RouteId,
    pattern: RoutePattern,
    view: V,
}

impl<V> RouteDefinition<V> {
    /// Create a definition, validating the pattern
    ///
    /// # Example
    ///
    /// ```
    /// use waypoint::RouteDefinition;
    ///
    /// let def = RouteDefinition::new("user-detail", "/users/:id", "UserDetail").unwrap();
    /// assert_eq!(def.id().as_str(), "user-detail");
    /// ```
    pub fn new(
        id: impl Into<RouteId>,
        pattern: &str,
        view: V,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            id: id.into(),
            pattern: RoutePattern::parse(pattern)?,
            view,
        })
    }

    /// The route's unique identifier
    pub fn id(&self) -> &RouteId {
        &self.id
    }

    /// The route's parsed pattern
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    /// The opaque view reference
    pub fn view(&self) -> &V {
        &self.view
    }
}

/// Immutable, ordered route table
///
/// # Example
///
/// ```
/// use waypoint::{RouteDefinition, RouteTable};
///
/// let table = RouteTable::register(vec![
///     RouteDefinition::new("home", "/", "Home").unwrap(),
///     RouteDefinition::new("user-detail", "/users/:id", "UserDetail").unwrap(),
/// ])
/// .unwrap();
///
/// let m = table.resolve("/users/42").unwrap();
/// assert_eq!(m.route_id.as_str(), "user-detail");
/// assert_eq!(m.params.get("id"), Some(&"42".to_string()));
/// ```
#[derive(Debug, Clone)]
pub struct RouteTable<V> {
    routes: Vec<RouteDefinition<V>>,
    by_id: HashMap<RouteId, usize>,
}

impl<V> RouteTable<V> {
    /// Build a table from an ordered sequence of definitions
    ///
    /// Called once at startup. Fails with [`ConfigError::DuplicateRouteId`]
    /// if two definitions share an identifier. Pattern validity was already
    /// checked by [`RouteDefinition::new`].
    pub fn register(definitions: Vec<RouteDefinition<V>>) -> Result<Self, ConfigError> {
        let mut by_id = HashMap::with_capacity(definitions.len());

        for (idx, def) in definitions.iter().enumerate() {
            if by_id.insert(def.id.clone(), idx).is_some() {
                return Err(ConfigError::DuplicateRouteId {
                    id: def.id.to_string(),
                });
            }
        }

        debug_log!("Registered route table with {} routes", definitions.len());

        Ok(Self {
            routes: definitions,
            by_id,
        })
    }

    /// Look up a definition by identifier
    pub fn lookup(&self, id: &RouteId) -> Option<&RouteDefinition<V>> {
        self.by_id.get(id).map(|&idx| &self.routes[idx])
    }

    /// All definitions in registration order
    pub fn all(&self) -> &[RouteDefinition<V>] {
        &self.routes
    }

    /// Number of registered routes
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Resolve a concrete path to a route match
    ///
    /// Normalizes the path, splits off the query string, then checks each
    /// definition in registration order. First full match wins. Returns
    /// `None` when no definition matches; the caller decides whether to fall
    /// back or surface the miss.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch> {
        let (normalized, query) = split_path(path);
        let segments: Vec<String> = normalized
            .split('/')
            .filter(|s| !s.is_empty())
            .map(crate::params::decode_uri_component)
            .collect();

        for def in &self.routes {
            if let Some(params) = def.pattern.match_segments(&segments) {
                trace_log!("Resolved '{}' to route '{}'", path, def.id);
                return Some(RouteMatch {
                    route_id: def.id.clone(),
                    path: normalized,
                    params,
                    query,
                });
            }
        }

        trace_log!("No route matched '{}'", path);
        None
    }

    /// Generate a URL for a route by identifier (reverse navigation)
    ///
    /// Substitutes `:name` and `*name` bindings from `params`. Returns `None`
    /// if the identifier is unknown or a binding has no value.
    ///
    /// # Example
    ///
    /// ```
    /// use waypoint::{RouteDefinition, RouteTable, RouteParams};
    ///
    /// let table = RouteTable::register(vec![
    ///     RouteDefinition::new("user-detail", "/users/:id", ()).unwrap(),
    /// ])
    /// .unwrap();
    ///
    /// let mut params = RouteParams::new();
    /// params.insert("id".to_string(), "123".to_string());
    ///
    /// let url = table.url_for(&"user-detail".into(), &params);
    /// assert_eq!(url, Some("/users/123".to_string()));
    /// ```
    pub fn url_for(&self, id: &RouteId, params: &RouteParams) -> Option<String> {
        let def = self.lookup(id)?;

        let mut parts = Vec::new();
        for segment in def.pattern.segments() {
            match segment {
                Segment::Literal(text) => parts.push(text.clone()),
                Segment::Param(name) | Segment::Wildcard(name) => {
                    parts.push(params.get(name)?.clone());
                }
            }
        }

        if parts.is_empty() {
            Some("/".to_string())
        } else {
            Some(format!("/{}", parts.join("/")))
        }
    }
}
