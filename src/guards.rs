//! Navigation guards
//!
//! Guards are pluggable collaborators that approve, deny, or redirect a
//! pending navigation. The controller invokes them in registration order and
//! the first non-[`GuardResult::Allow`] result short-circuits the pipeline.
//!
//! Guards use an associated `Future` type so concrete guards avoid boxing
//! while the controller can still hold them as trait objects via
//! [`BoxedGuard`]. A guard's future may stay pending across controller
//! pumps; the engine awaits it on its single logical thread and discards the
//! result if a newer request supersedes the resolution.

use crate::controller::NavigationState;
use crate::RouteMatch;
use std::future::Future;
use std::pin::Pin;

/// Result of a guard check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardResult {
    /// Allow navigation to proceed
    Allow,

    /// Deny navigation with a reason
    Deny {
        /// Reason for denying navigation
        reason: String,
    },

    /// Redirect to a different path
    Redirect {
        /// Path to redirect to
        to: String,
        /// Reason for redirect (optional)
        reason: Option<String>,
    },
}

impl GuardResult {
    /// Create an allow result
    pub fn allow() -> Self {
        GuardResult::Allow
    }

    /// Create a deny result with reason
    pub fn deny(reason: impl Into<String>) -> Self {
        GuardResult::Deny {
            reason: reason.into(),
        }
    }

    /// Create a redirect result
    pub fn redirect(to: impl Into<String>) -> Self {
        GuardResult::Redirect {
            to: to.into(),
            reason: None,
        }
    }

    /// Create a redirect result with reason
    pub fn redirect_with_reason(to: impl Into<String>, reason: impl Into<String>) -> Self {
        GuardResult::Redirect {
            to: to.into(),
            reason: Some(reason.into()),
        }
    }

    /// Check if result is allow
    pub fn is_allow(&self) -> bool {
        matches!(self, GuardResult::Allow)
    }

    /// Check if result is deny
    pub fn is_deny(&self) -> bool {
        matches!(self, GuardResult::Deny { .. })
    }

    /// Check if result is redirect
    pub fn is_redirect(&self) -> bool {
        matches!(self, GuardResult::Redirect { .. })
    }

    /// Get redirect path if this is a redirect
    pub fn redirect_path(&self) -> Option<&str> {
        match self {
            GuardResult::Redirect { to, .. } => Some(to.as_str()),
            _ => None,
        }
    }
}

/// Everything a guard may inspect about a pending navigation
#[derive(Debug)]
pub struct GuardContext<'a> {
    /// The currently committed route, if any
    pub from: Option<&'a RouteMatch>,
    /// The candidate match being navigated to
    pub to: &'a RouteMatch,
    /// Index of the current history entry
    pub history_index: usize,
}

impl<'a> GuardContext<'a> {
    /// Build a context from the navigation state and the candidate match
    pub fn new(state: &'a NavigationState, to: &'a RouteMatch) -> Self {
        Self {
            from: state.current(),
            to,
            history_index: state.history_index(),
        }
    }

    /// Get a parameter from the candidate route
    pub fn param(&self, key: &str) -> Option<&String> {
        self.to.params.get(key)
    }

    /// Get a query parameter from the candidate route
    pub fn query(&self, key: &str) -> Option<&String> {
        self.to.query.get(key)
    }
}

/// Trait for navigation guards
///
/// # Example
///
/// ```
/// use waypoint::{Guard, GuardContext, GuardResult};
/// use std::future::Future;
/// use std::pin::Pin;
///
/// struct LoginGuard {
///     redirect_to: String,
/// }
///
/// impl Guard for LoginGuard {
///     type Future = Pin<Box<dyn Future<Output = GuardResult> + Send>>;
///
///     fn check(&self, _ctx: &GuardContext<'_>) -> Self::Future {
///         let redirect_to = self.redirect_to.clone();
///         let is_logged_in = true; // Replace with an actual check
///
///         Box::pin(async move {
///             if is_logged_in {
///                 GuardResult::allow()
///             } else {
///                 GuardResult::redirect(redirect_to)
///             }
///         })
///     }
/// }
/// ```
///
/// For simple guards, [`guard_fn`] builds one from a closure.
pub trait Guard: Send + Sync + 'static {
    /// The future returned by check
    type Future: Future<Output = GuardResult> + Send + 'static;

    /// Decide whether the pending navigation may proceed
    ///
    /// Returns a future resolving to [`GuardResult::Allow`],
    /// [`GuardResult::Deny`], or [`GuardResult::Redirect`]. The future must
    /// own everything it needs; the context borrow ends when `check` returns.
    fn check(&self, ctx: &GuardContext<'_>) -> Self::Future;

    /// Guard name for logs and error messages
    fn name(&self) -> &str {
        "Guard"
    }
}

/// Boxed guard for dynamic dispatch
pub type BoxedGuard = Box<dyn Guard<Future = Pin<Box<dyn Future<Output = GuardResult> + Send>>>>;

/// Box any guard, erasing its concrete future type
pub fn boxed<G: Guard>(guard: G) -> BoxedGuard {
    Box::new(BoxingGuard(guard))
}

/// Adapter that pins a guard's future behind a box
struct BoxingGuard<G>(G);

impl<G: Guard> Guard for BoxingGuard<G> {
    type Future = Pin<Box<dyn Future<Output = GuardResult> + Send>>;

    fn check(&self, ctx: &GuardContext<'_>) -> Self::Future {
        Box::pin(self.0.check(ctx))
    }

    fn name(&self) -> &str {
        self.0.name()
    }
}

/// Create a guard from an async closure
///
/// # Example
///
/// ```
/// use waypoint::{guard_fn, GuardResult};
///
/// let auth_guard = guard_fn(|_ctx| {
///     let is_authenticated = true; // Replace with an actual check
///     async move {
///         if is_authenticated {
///             GuardResult::allow()
///         } else {
///             GuardResult::redirect("/login")
///         }
///     }
/// });
/// ```
pub fn guard_fn<F, Fut>(f: F) -> FnGuard<F>
where
    F: Fn(&GuardContext<'_>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = GuardResult> + Send + 'static,
{
    FnGuard { f }
}

/// Guard created from a function or closure
pub struct FnGuard<F> {
    f: F,
}

impl<F, Fut> Guard for FnGuard<F>
where
    F: Fn(&GuardContext<'_>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = GuardResult> + Send + 'static,
{
    type Future = Fut;

    fn check(&self, ctx: &GuardContext<'_>) -> Self::Future {
        (self.f)(ctx)
    }
}

// ============================================================================
// Predicate guard
// ============================================================================

/// Type alias for a predicate over the pending navigation
pub type PredicateFn = Box<dyn Fn(&GuardContext<'_>) -> bool + Send + Sync>;

/// Guard driven by a synchronous predicate
///
/// Covers the common authentication-style case: a boolean check that either
/// redirects (login flow) or denies outright.
///
/// # Example
///
/// ```
/// use waypoint::PredicateGuard;
///
/// // Redirect unauthenticated users to the login view
/// let guard = PredicateGuard::new("auth", |_ctx| false).redirect_to("/login");
/// ```
pub struct PredicateGuard {
    name: String,
    predicate: PredicateFn,
    redirect: Option<String>,
}

impl PredicateGuard {
    /// Create a guard that denies when the predicate returns false
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&GuardContext<'_>) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Box::new(predicate),
            redirect: None,
        }
    }

    /// Redirect instead of denying when the predicate returns false
    #[must_use]
    pub fn redirect_to(mut self, path: impl Into<String>) -> Self {
        self.redirect = Some(path.into());
        self
    }
}

impl Guard for PredicateGuard {
    type Future = Pin<Box<dyn Future<Output = GuardResult> + Send>>;

    fn check(&self, ctx: &GuardContext<'_>) -> Self::Future {
        let result = if (self.predicate)(ctx) {
            GuardResult::allow()
        } else if let Some(redirect) = &self.redirect {
            GuardResult::redirect_with_reason(
                redirect,
                format!("'{}' guard rejected navigation", self.name),
            )
        } else {
            GuardResult::deny(format!("'{}' guard rejected navigation", self.name))
        };

        Box::pin(async move { result })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
