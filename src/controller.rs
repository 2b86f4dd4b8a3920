//! Navigation controller
//!
//! The single authority that transitions [`NavigationState`]. Every
//! navigation request (programmatic, link-driven, or a history pop) enters
//! here, is resolved against the route table, passes the guard pipeline, and
//! on success is committed: history is recorded, state is updated, and commit
//! observers are notified. Side effects happen only on the commit edge.
//!
//! # Single-flight pipeline
//!
//! The engine is single-threaded and event-driven. Requests are processed
//! one at a time in arrival order; a request arriving while another is
//! resolving supersedes the in-flight one (its guard result, even if it
//! arrives later, is discarded) and is queued behind any other waiting
//! requests. The only suspension point is an async guard; the controller
//! drives pending guard futures from [`pump`](NavigationController::pump),
//! which the host event loop calls whenever a guard may have made progress.

#[cfg(feature = "cache")]
use crate::cache::RouteCache;
use crate::error::{NavigationError, NavigationResult};
use crate::guards::{boxed, BoxedGuard, Guard, GuardContext, GuardResult};
use crate::history::{HistoryAdapter, HistoryEntry, HistoryState};
use crate::table::RouteTable;
use crate::{
    debug_log, error_log, info_log, warn_log, NavigationDirection, QueryParams, RouteChangeEvent,
    RouteId, RouteMatch, RouteParams,
};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll, Waker};

/// Maximum guard redirect hops before a resolution is abandoned
const MAX_REDIRECT_HOPS: u8 = 8;

/// Where the controller is in the transition cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No request in flight
    Idle,
    /// A request is being matched or awaiting guards
    Resolving,
    /// The latest request committed (transient, observable mid-pump)
    Committed,
    /// The latest request was rejected (transient, observable mid-pump)
    Rejected,
}

/// The committed navigation state
///
/// Process-wide singleton owned by the controller: initialized from the
/// starting URL, mutated only on commits, alive for the process's duration.
#[derive(Debug, Clone, Default)]
pub struct NavigationState {
    current: Option<RouteMatch>,
    history_index: usize,
}

impl NavigationState {
    /// The currently committed route, or `None` while unresolved
    pub fn current(&self) -> Option<&RouteMatch> {
        self.current.as_ref()
    }

    /// The committed path, if resolved
    pub fn current_path(&self) -> Option<&str> {
        self.current.as_ref().map(|m| m.path.as_str())
    }

    /// Index of the current entry in the history stack
    pub fn history_index(&self) -> usize {
        self.history_index
    }

    /// Whether a route has been committed
    pub fn is_resolved(&self) -> bool {
        self.current.is_some()
    }
}

/// How a committed transition interacts with the history stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestKind {
    /// In-app navigation: push a new entry
    Push,
    /// Redirect or replacement: overwrite the current entry
    Replace,
    /// History pop: the host already moved its cursor
    Pop,
}

struct Request {
    to: String,
    kind: RequestKind,
    state: HistoryState,
}

struct InFlight {
    matched: RouteMatch,
    kind: RequestKind,
    state: HistoryState,
    hops: u8,
    superseded: bool,
    future: Pin<Box<dyn Future<Output = GuardResult> + Send>>,
}

/// Orchestrates guarded transitions over an immutable route table
///
/// Generic over `V`, the opaque view reference stored in the table; the
/// controller never inspects it.
///
/// # Example
///
/// ```
/// use waypoint::{
///     HistoryAdapter, NavigationController, RouteDefinition, RouteTable,
/// };
///
/// let table = RouteTable::register(vec![
///     RouteDefinition::new("home", "/", "Home").unwrap(),
///     RouteDefinition::new("user-detail", "/users/:id", "UserDetail").unwrap(),
/// ])
/// .unwrap();
///
/// let mut controller = NavigationController::new(table, HistoryAdapter::default(), "/");
///
/// let result = controller.navigate("/users/42");
/// assert!(result.is_committed());
/// assert_eq!(controller.current_path(), Some("/users/42"));
/// ```
pub struct NavigationController<V> {
    table: RouteTable<V>,
    guards: Vec<BoxedGuard>,
    history: HistoryAdapter,
    state: NavigationState,
    phase: Phase,
    queue: VecDeque<Request>,
    in_flight: Option<InFlight>,
    fallback: Option<RouteId>,
    observers: Vec<Box<dyn Fn(&RouteChangeEvent)>>,
    last_result: NavigationResult,
    #[cfg(feature = "cache")]
    cache: RouteCache,
}

impl<V> NavigationController<V> {
    /// Create a controller, resolving the initial URL into the starting state
    ///
    /// The initial resolution does not run guards and writes no history; the
    /// host's stack is assumed to already hold the starting entry. If the
    /// initial path matches nothing, the state starts unresolved and the
    /// first committed navigation defines it.
    pub fn new(table: RouteTable<V>, history: HistoryAdapter, initial_path: &str) -> Self {
        let current = table.resolve(initial_path);
        let last_result = match &current {
            Some(m) => NavigationResult::Committed {
                route_id: m.route_id.clone(),
                path: m.path.clone(),
            },
            None => NavigationResult::NotFound {
                path: initial_path.to_string(),
            },
        };
        let history_index = history.index();

        debug_log!(
            "Navigation controller starting at '{}' ({})",
            initial_path,
            current
                .as_ref()
                .map_or("unresolved", |m| m.route_id.as_str())
        );

        Self {
            table,
            guards: Vec::new(),
            history,
            state: NavigationState {
                current,
                history_index,
            },
            phase: Phase::Idle,
            queue: VecDeque::new(),
            in_flight: None,
            fallback: None,
            observers: Vec::new(),
            last_result,
            #[cfg(feature = "cache")]
            cache: RouteCache::new(),
        }
    }

    /// Append a guard to the pipeline
    ///
    /// Guards run in registration order; the first non-allow result
    /// short-circuits.
    #[must_use]
    pub fn with_guard<G: Guard>(mut self, guard: G) -> Self {
        self.guards.push(boxed(guard));
        self
    }

    /// Designate the route committed when no definition matches
    ///
    /// The fallback commits with replace semantics and bypasses guards, so a
    /// miss always leaves the state resolved. The identifier should name a
    /// parameter-free route.
    #[must_use]
    pub fn with_fallback(mut self, id: impl Into<RouteId>) -> Self {
        self.fallback = Some(id.into());
        self
    }

    /// Register a commit observer
    ///
    /// The rendering layer's seam: observers receive `(route id, params)`
    /// via the [`RouteChangeEvent`] on every commit, in registration order.
    #[must_use]
    pub fn on_commit<F>(mut self, observer: F) -> Self
    where
        F: Fn(&RouteChangeEvent) + 'static,
    {
        self.observers.push(Box::new(observer));
        self
    }

    // ========================================================================
    // Navigation entry points
    // ========================================================================

    /// Navigate to a path (push semantics)
    pub fn navigate(&mut self, path: impl Into<String>) -> NavigationResult {
        self.submit(Request {
            to: path.into(),
            kind: RequestKind::Push,
            state: HistoryState::new(),
        })
    }

    /// Navigate to a path, attaching state to the new history entry
    pub fn navigate_with_state(
        &mut self,
        path: impl Into<String>,
        state: HistoryState,
    ) -> NavigationResult {
        self.submit(Request {
            to: path.into(),
            kind: RequestKind::Push,
            state,
        })
    }

    /// Navigate to a path, replacing the current history entry
    pub fn redirect(&mut self, path: impl Into<String>) -> NavigationResult {
        self.submit(Request {
            to: path.into(),
            kind: RequestKind::Replace,
            state: HistoryState::new(),
        })
    }

    /// Navigate to a route by identifier (reverse navigation)
    pub fn navigate_to(&mut self, id: &RouteId, params: &RouteParams) -> NavigationResult {
        match self.table.url_for(id, params) {
            Some(url) => self.navigate(url),
            None => NavigationResult::NotFound {
                path: format!("route '{}'", id),
            },
        }
    }

    /// Feed a host back/forward pop into the engine
    ///
    /// The host's history mechanism already moved its cursor; this constructs
    /// a synthetic request for the reconstructed entry and runs it through
    /// the normal matcher and guard pipeline. No history is written when it
    /// commits.
    pub fn handle_pop(&mut self, entry: HistoryEntry) -> NavigationResult {
        self.submit(Request {
            to: entry.path,
            kind: RequestKind::Pop,
            state: entry.state,
        })
    }

    fn submit(&mut self, request: Request) -> NavigationResult {
        if let Some(flight) = self.in_flight.as_mut() {
            debug_log!(
                "Navigation to '{}' supersedes in-flight resolution of '{}'",
                request.to,
                flight.matched.path
            );
            flight.superseded = true;
        }
        self.queue.push_back(request);
        self.pump()
    }

    // ========================================================================
    // Pipeline
    // ========================================================================

    /// Drive pending resolutions
    ///
    /// Call whenever an awaited guard may have made progress. Processes the
    /// queue until it drains or a guard future is still pending. Returns
    /// [`NavigationResult::Pending`] while suspended, otherwise the outcome
    /// of the most recently finalized request.
    pub fn pump(&mut self) -> NavigationResult {
        loop {
            if self.in_flight.as_ref().is_some_and(|f| f.superseded) {
                let flight = self.in_flight.take().expect("checked above");
                debug_log!(
                    "Discarding superseded resolution of '{}'",
                    flight.matched.path
                );
                self.last_result = NavigationResult::Superseded;
                continue;
            }

            if self.in_flight.is_some() {
                let poll = {
                    let flight = self.in_flight.as_mut().expect("checked above");
                    let mut cx = Context::from_waker(Waker::noop());
                    flight.future.as_mut().poll(&mut cx)
                };
                match poll {
                    Poll::Pending => {
                        self.phase = Phase::Resolving;
                        return NavigationResult::Pending;
                    }
                    Poll::Ready(result) => {
                        let flight = self.in_flight.take().expect("checked above");
                        self.last_result = self.finalize(flight, result);
                        continue;
                    }
                }
            }

            match self.queue.pop_front() {
                Some(request) => {
                    self.begin(request);
                }
                None => {
                    self.phase = Phase::Idle;
                    return self.last_result.clone();
                }
            }
        }
    }

    fn begin(&mut self, request: Request) {
        self.phase = Phase::Resolving;
        debug_log!("Resolving navigation to '{}'", request.to);

        match self.resolve_cached(&request.to) {
            Some(matched) => {
                self.start_guard_cycle(matched, request.kind, request.state, 0);
            }
            None => {
                self.last_result = self.reject_not_found(request.to);
            }
        }
    }

    /// Build the guard pipeline future for a candidate match
    ///
    /// Guard futures are collected up front (each `check` borrows the
    /// context only for the duration of the call), then awaited in
    /// registration order with first-non-allow short-circuit.
    fn start_guard_cycle(
        &mut self,
        matched: RouteMatch,
        kind: RequestKind,
        state: HistoryState,
        hops: u8,
    ) {
        let futures: Vec<_> = {
            let ctx = GuardContext::new(&self.state, &matched);
            self.guards.iter().map(|g| g.check(&ctx)).collect()
        };

        let future = Box::pin(async move {
            for fut in futures {
                match fut.await {
                    GuardResult::Allow => {}
                    other => return other,
                }
            }
            GuardResult::Allow
        });

        self.in_flight = Some(InFlight {
            matched,
            kind,
            state,
            hops,
            superseded: false,
            future,
        });
    }

    fn finalize(&mut self, flight: InFlight, result: GuardResult) -> NavigationResult {
        match result {
            GuardResult::Allow => {
                let route_id = flight.matched.route_id.clone();
                let path = flight.matched.path.clone();
                match self.commit(flight.matched, flight.kind, flight.state) {
                    Ok(()) => NavigationResult::Committed { route_id, path },
                    Err(err) => {
                        error_log!("Commit of '{}' failed: {}", path, err);
                        self.phase = Phase::Rejected;
                        NavigationResult::Error(err)
                    }
                }
            }
            GuardResult::Deny { reason } => {
                info_log!(
                    "Navigation to '{}' denied: {}",
                    flight.matched.path,
                    reason
                );
                self.phase = Phase::Rejected;
                NavigationResult::Blocked {
                    reason,
                    redirect: None,
                }
            }
            GuardResult::Redirect { to, reason } => {
                let hops = flight.hops + 1;
                if hops > MAX_REDIRECT_HOPS {
                    warn_log!("Redirect loop resolving '{}'", to);
                    self.phase = Phase::Rejected;
                    return NavigationResult::Error(NavigationError::RedirectLoop {
                        path: to,
                        hops,
                    });
                }

                info_log!(
                    "Guard redirected '{}' to '{}'{}",
                    flight.matched.path,
                    to,
                    reason.map(|r| format!(" ({})", r)).unwrap_or_default()
                );

                // A redirected push still records one pushed entry for the
                // whole chain; attempted intermediate paths are never
                // recorded. Pop-originated redirects replace, since the host
                // cursor already moved.
                let kind = match flight.kind {
                    RequestKind::Push => RequestKind::Push,
                    RequestKind::Replace | RequestKind::Pop => RequestKind::Replace,
                };

                match self.resolve_cached(&to) {
                    Some(matched) => {
                        self.start_guard_cycle(matched, kind, HistoryState::new(), hops);
                        NavigationResult::Pending
                    }
                    None => self.reject_not_found(to),
                }
            }
        }
    }

    fn reject_not_found(&mut self, requested: String) -> NavigationResult {
        warn_log!("No route matched '{}'", requested);
        self.phase = Phase::Rejected;

        let Some(fallback_id) = self.fallback.clone() else {
            return NavigationResult::NotFound { path: requested };
        };

        let Some(def) = self.table.lookup(&fallback_id) else {
            return NavigationResult::Error(NavigationError::RouteNotFound {
                path: format!("fallback route '{}'", fallback_id),
            });
        };

        // The fallback bypasses guards so a miss always leaves the state
        // resolved.
        let matched = RouteMatch {
            route_id: fallback_id,
            path: def.pattern().raw().to_string(),
            params: RouteParams::new(),
            query: QueryParams::new(),
        };

        match self.commit(matched, RequestKind::Replace, HistoryState::new()) {
            Ok(()) => NavigationResult::NotFound { path: requested },
            Err(err) => NavigationResult::Error(err),
        }
    }

    /// Apply a transition: record history, mutate state, notify observers
    ///
    /// History is written first; a failing host aborts the commit and leaves
    /// the previous committed state intact.
    fn commit(
        &mut self,
        matched: RouteMatch,
        kind: RequestKind,
        state: HistoryState,
    ) -> Result<(), NavigationError> {
        match kind {
            RequestKind::Push => self.history.record_forward(matched.path.clone(), state)?,
            RequestKind::Replace => self.history.record_replace(matched.path.clone(), state)?,
            RequestKind::Pop => {}
        }

        let direction = match kind {
            RequestKind::Push => NavigationDirection::Forward,
            RequestKind::Replace => NavigationDirection::Replace,
            RequestKind::Pop => NavigationDirection::Back,
        };

        let event = RouteChangeEvent {
            from: self.state.current.as_ref().map(|m| m.path.clone()),
            to: matched.path.clone(),
            direction,
            route_id: matched.route_id.clone(),
            params: matched.params.clone(),
        };

        self.state.current = Some(matched);
        self.state.history_index = self.history.index();
        self.phase = Phase::Committed;

        info_log!("Committed '{}' ({})", event.to, event.route_id);
        for observer in &self.observers {
            observer(&event);
        }

        Ok(())
    }

    fn resolve_cached(&mut self, path: &str) -> Option<RouteMatch> {
        #[cfg(feature = "cache")]
        {
            if let Some(cached) = self.cache.get(path) {
                return cached;
            }
            let result = self.table.resolve(path);
            self.cache.insert(path.to_string(), result.clone());
            result
        }

        #[cfg(not(feature = "cache"))]
        {
            self.table.resolve(path)
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The committed navigation state
    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    /// The currently committed route match
    pub fn current(&self) -> Option<&RouteMatch> {
        self.state.current()
    }

    /// The currently committed path
    pub fn current_path(&self) -> Option<&str> {
        self.state.current_path()
    }

    /// Where the controller is in the transition cycle
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether a resolution is suspended or queued
    pub fn has_pending(&self) -> bool {
        self.in_flight.is_some() || !self.queue.is_empty()
    }

    /// The route table
    pub fn table(&self) -> &RouteTable<V> {
        &self.table
    }

    /// The history adapter
    pub fn history(&self) -> &HistoryAdapter {
        &self.history
    }

    /// Resolution cache statistics
    #[cfg(feature = "cache")]
    pub fn cache_stats(&self) -> &crate::cache::CacheStats {
        self.cache.stats()
    }
}

impl<V> std::fmt::Debug for NavigationController<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationController")
            .field("phase", &self.phase)
            .field("state", &self.state)
            .field("queued", &self.queue.len())
            .field("guards", &self.guards.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guards::PredicateGuard;
    use crate::history::{HistoryHost, InMemoryHistory};
    use crate::table::RouteDefinition;
    use std::cell::RefCell;
    use std::future::poll_fn;
    use std::rc::Rc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn table(defs: Vec<(&str, &str)>) -> RouteTable<&'static str> {
        RouteTable::register(
            defs.into_iter()
                .map(|(id, pattern)| RouteDefinition::new(id, pattern, "view").unwrap())
                .collect(),
        )
        .unwrap()
    }

    fn controller(defs: Vec<(&str, &str)>) -> NavigationController<&'static str> {
        NavigationController::new(table(defs), HistoryAdapter::default(), "/")
    }

    /// Guard that allows, but stays pending until the gate opens.
    struct GateGuard {
        open: Arc<AtomicBool>,
    }

    impl GateGuard {
        fn new(open: Arc<AtomicBool>) -> Self {
            Self { open }
        }
    }

    impl Guard for GateGuard {
        type Future = Pin<Box<dyn Future<Output = GuardResult> + Send>>;

        fn check(&self, _ctx: &GuardContext<'_>) -> Self::Future {
            let open = Arc::clone(&self.open);
            Box::pin(poll_fn(move |_| {
                if open.load(Ordering::SeqCst) {
                    Poll::Ready(GuardResult::allow())
                } else {
                    Poll::Pending
                }
            }))
        }

        fn name(&self) -> &str {
            "gate"
        }
    }

    #[test]
    fn test_initial_state_resolves_start_url() {
        let ctrl = controller(vec![("home", "/"), ("users", "/users")]);
        assert_eq!(ctrl.current_path(), Some("/"));
        assert_eq!(ctrl.phase(), Phase::Idle);
        assert!(ctrl.state().is_resolved());
    }

    #[test]
    fn test_initial_state_may_be_unresolved() {
        let t = table(vec![("users", "/users")]);
        let ctrl = NavigationController::new(t, HistoryAdapter::default(), "/missing");
        assert!(!ctrl.state().is_resolved());
        assert_eq!(ctrl.current_path(), None);
    }

    #[test]
    fn test_navigate_commits_and_pushes_history() {
        let mut ctrl = controller(vec![("home", "/"), ("users", "/users")]);
        let depth_before = ctrl.history().depth();

        let result = ctrl.navigate("/users");
        assert!(result.is_committed());
        assert_eq!(result.route_id().unwrap().as_str(), "users");
        assert_eq!(ctrl.current_path(), Some("/users"));
        assert_eq!(ctrl.history().depth(), depth_before + 1);
        assert_eq!(ctrl.phase(), Phase::Idle);
    }

    #[test]
    fn test_redirect_replaces_history_entry() {
        let mut ctrl = controller(vec![("home", "/"), ("login", "/login")]);
        ctrl.navigate("/login");
        let depth_before = ctrl.history().depth();

        let result = ctrl.redirect("/");
        assert!(result.is_committed());
        assert_eq!(ctrl.history().depth(), depth_before);
    }

    #[test]
    fn test_not_found_without_fallback_keeps_prior_route() {
        let mut ctrl = controller(vec![("home", "/")]);

        let result = ctrl.navigate("/missing");
        assert!(result.is_not_found());
        assert_eq!(ctrl.current_path(), Some("/"));
    }

    #[test]
    fn test_not_found_commits_fallback() {
        let mut ctrl = NavigationController::new(
            table(vec![("home", "/"), ("lost", "/lost")]),
            HistoryAdapter::default(),
            "/",
        )
        .with_fallback("lost");

        let result = ctrl.navigate("/missing");
        assert!(result.is_not_found());
        assert_eq!(ctrl.current_path(), Some("/lost"));
        assert_eq!(
            ctrl.current().unwrap().route_id,
            RouteId::new("lost")
        );
    }

    #[test]
    fn test_deny_guard_blocks_and_retains_route() {
        let mut ctrl = NavigationController::new(
            table(vec![("home", "/"), ("admin", "/admin")]),
            HistoryAdapter::default(),
            "/",
        )
        .with_guard(PredicateGuard::new("admin-only", |ctx| {
            ctx.to.path != "/admin"
        }));

        let result = ctrl.navigate("/admin");
        assert!(result.is_blocked());
        assert_eq!(ctrl.current_path(), Some("/"));
        assert_eq!(ctrl.phase(), Phase::Idle);
    }

    #[test]
    fn test_redirect_guard_commits_target() {
        let mut ctrl = NavigationController::new(
            table(vec![("home", "/"), ("admin", "/admin"), ("login", "/login")]),
            HistoryAdapter::default(),
            "/",
        )
        .with_guard(
            PredicateGuard::new("auth", |ctx| ctx.to.path != "/admin").redirect_to("/login"),
        );

        let result = ctrl.navigate("/admin");
        assert!(result.is_committed());
        assert_eq!(result.route_id().unwrap().as_str(), "login");
        assert_eq!(ctrl.current_path(), Some("/login"));
    }

    #[test]
    fn test_redirect_loop_is_capped() {
        // Guard that redirects everything to itself.
        let mut ctrl = NavigationController::new(
            table(vec![("home", "/"), ("a", "/a")]),
            HistoryAdapter::default(),
            "/",
        )
        .with_guard(guard_loop());

        let result = ctrl.navigate("/a");
        assert!(matches!(
            result,
            NavigationResult::Error(NavigationError::RedirectLoop { .. })
        ));
        assert_eq!(ctrl.current_path(), Some("/"));
    }

    fn guard_loop() -> impl Guard {
        crate::guards::guard_fn(|_ctx| async { GuardResult::redirect("/a") })
    }

    #[test]
    fn test_first_non_allow_guard_short_circuits() {
        // The denying first guard must stop the second (a redirect) from
        // ever mattering.
        let mut ctrl = NavigationController::new(
            table(vec![("home", "/"), ("a", "/a")]),
            HistoryAdapter::default(),
            "/",
        )
        .with_guard(PredicateGuard::new("first", |_| false))
        .with_guard(PredicateGuard::new("second", |_| false).redirect_to("/"));

        let result = ctrl.navigate("/a");
        match result {
            NavigationResult::Blocked { reason, .. } => {
                assert!(reason.contains("first"));
            }
            other => panic!("expected Blocked, got {:?}", other),
        }
        assert_eq!(ctrl.current_path(), Some("/"));
    }

    #[test]
    fn test_async_guard_suspends_then_commits() {
        let open = Arc::new(AtomicBool::new(false));
        let mut ctrl = NavigationController::new(
            table(vec![("home", "/"), ("users", "/users")]),
            HistoryAdapter::default(),
            "/",
        )
        .with_guard(GateGuard::new(Arc::clone(&open)));

        let result = ctrl.navigate("/users");
        assert!(result.is_pending());
        assert_eq!(ctrl.phase(), Phase::Resolving);
        assert_eq!(ctrl.current_path(), Some("/"));

        // Nothing commits until the guard resolves
        assert!(ctrl.pump().is_pending());

        open.store(true, Ordering::SeqCst);
        let result = ctrl.pump();
        assert!(result.is_committed());
        assert_eq!(ctrl.current_path(), Some("/users"));
        assert_eq!(ctrl.phase(), Phase::Idle);
    }

    #[test]
    fn test_newer_request_supersedes_pending_resolution() {
        let open = Arc::new(AtomicBool::new(false));
        let mut ctrl = NavigationController::new(
            table(vec![("home", "/"), ("slow", "/slow"), ("fast", "/fast")]),
            HistoryAdapter::default(),
            "/",
        )
        .with_guard(GateGuard::new(Arc::clone(&open)));

        assert!(ctrl.navigate("/slow").is_pending());

        // The second request cancels the first; it is itself gated
        assert!(ctrl.navigate("/fast").is_pending());

        open.store(true, Ordering::SeqCst);
        let result = ctrl.pump();
        assert!(result.is_committed());
        assert_eq!(ctrl.current_path(), Some("/fast"));

        // The superseded navigation never committed
        assert_ne!(ctrl.current_path(), Some("/slow"));
    }

    #[test]
    fn test_stale_allow_result_is_discarded() {
        // The first request's guard would allow it, but a newer request
        // arrives before the gate opens; the stale allow must not commit.
        let open = Arc::new(AtomicBool::new(false));
        let mut ctrl = NavigationController::new(
            table(vec![("home", "/"), ("slow", "/slow"), ("fast", "/fast")]),
            HistoryAdapter::default(),
            "/",
        )
        .with_guard(GateGuard::new(Arc::clone(&open)));

        ctrl.navigate("/slow");
        ctrl.navigate("/fast");

        open.store(true, Ordering::SeqCst);
        ctrl.pump();

        assert_eq!(ctrl.current_path(), Some("/fast"));
        // Only the entries for "/" and "/fast" exist; "/slow" was never recorded
        assert_eq!(ctrl.history().depth(), 2);
    }

    #[test]
    fn test_commit_observers_receive_route_and_params() {
        let seen: Rc<RefCell<Vec<(String, Option<String>)>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let mut ctrl = NavigationController::new(
            table(vec![("home", "/"), ("user-detail", "/users/:id")]),
            HistoryAdapter::default(),
            "/",
        )
        .on_commit(move |event| {
            sink.borrow_mut().push((
                event.route_id.to_string(),
                event.params.get("id").cloned(),
            ));
        });

        ctrl.navigate("/users/42");

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "user-detail");
        assert_eq!(seen[0].1, Some("42".to_string()));
    }

    #[test]
    fn test_pop_re_enters_pipeline_without_history_write() {
        let host = Rc::new(RefCell::new(InMemoryHistory::new("/")));
        let mut ctrl = NavigationController::new(
            table(vec![("home", "/"), ("users", "/users")]),
            HistoryAdapter::new(Rc::clone(&host)),
            "/",
        );

        ctrl.navigate("/users");
        assert_eq!(host.borrow().depth(), 2);

        // Host back button: cursor moves, entry feeds back into the engine
        let entry = host.borrow_mut().back().unwrap();
        let result = ctrl.handle_pop(entry);

        assert!(result.is_committed());
        assert_eq!(ctrl.current_path(), Some("/"));
        // Pop writes nothing; depth unchanged
        assert_eq!(host.borrow().depth(), 2);
    }

    #[test]
    fn test_failing_history_host_aborts_commit() {
        struct FlakyHost {
            inner: InMemoryHistory,
            fail: Rc<RefCell<bool>>,
        }

        impl HistoryHost for FlakyHost {
            fn push(&mut self, entry: HistoryEntry) -> Result<(), NavigationError> {
                if *self.fail.borrow() {
                    return Err(NavigationError::HistoryUnavailable {
                        message: "host detached".to_string(),
                    });
                }
                self.inner.push(entry)
            }
            fn replace(&mut self, entry: HistoryEntry) -> Result<(), NavigationError> {
                self.inner.replace(entry)
            }
            fn depth(&self) -> usize {
                self.inner.depth()
            }
            fn index(&self) -> usize {
                self.inner.index()
            }
        }

        let fail = Rc::new(RefCell::new(false));
        let host = FlakyHost {
            inner: InMemoryHistory::new("/"),
            fail: Rc::clone(&fail),
        };
        let mut ctrl = NavigationController::new(
            table(vec![("home", "/"), ("users", "/users")]),
            HistoryAdapter::new(host),
            "/",
        );

        *fail.borrow_mut() = true;
        let result = ctrl.navigate("/users");

        assert!(matches!(
            result,
            NavigationResult::Error(NavigationError::HistoryUnavailable { .. })
        ));
        // No partial commit: prior state intact
        assert_eq!(ctrl.current_path(), Some("/"));

        *fail.borrow_mut() = false;
        assert!(ctrl.navigate("/users").is_committed());
    }

    #[test]
    fn test_navigate_to_uses_reverse_lookup() {
        let mut ctrl = controller(vec![("home", "/"), ("user-detail", "/users/:id")]);

        let mut params = RouteParams::new();
        params.insert("id".to_string(), "7".to_string());

        let result = ctrl.navigate_to(&"user-detail".into(), &params);
        assert!(result.is_committed());
        assert_eq!(ctrl.current_path(), Some("/users/7"));
    }

    #[cfg(feature = "cache")]
    #[test]
    fn test_repeated_resolution_hits_cache() {
        let mut ctrl = controller(vec![("home", "/"), ("users", "/users")]);

        ctrl.navigate("/users");
        ctrl.navigate("/");
        ctrl.navigate("/users");

        assert!(ctrl.cache_stats().hits >= 1);
    }
}
