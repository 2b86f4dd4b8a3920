//! History synchronization
//!
//! The engine treats the navigation stack as a host-provided capability:
//! a browser's `pushState`/`replaceState`, a desktop shell's view stack, or
//! the bundled [`InMemoryHistory`]. The [`HistoryHost`] trait abstracts the
//! push/replace/depth primitives; the [`HistoryAdapter`] is the only writer
//! to the underlying stack.
//!
//! The reverse channel (back/forward fired by the host) does not live here:
//! the host feeds the popped entry into
//! [`NavigationController::handle_pop`](crate::controller::NavigationController::handle_pop),
//! so pops pass through the same guard pipeline as every other navigation and
//! the adapter never mutates navigation state directly.

use crate::error::NavigationError;
use crate::{debug_log, trace_log};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// State data attached to a history entry
///
/// Can store arbitrary data for restoration (e.g., scroll position).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryState {
    data: HashMap<String, String>,
}

impl HistoryState {
    /// Create new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value
    pub fn set(&mut self, key: String, value: String) {
        self.data.insert(key, value);
    }

    /// Get a value
    pub fn get(&self, key: &str) -> Option<&String> {
        self.data.get(key)
    }

    /// Check if the state is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A single entry in the navigation stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Path for this entry
    pub path: String,
    /// State blob associated with this entry
    pub state: HistoryState,
}

impl HistoryEntry {
    /// Create an entry with empty state
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            state: HistoryState::new(),
        }
    }

    /// Create an entry with state
    pub fn with_state(path: impl Into<String>, state: HistoryState) -> Self {
        Self {
            path: path.into(),
            state,
        }
    }
}

/// Host-provided navigation stack primitives
///
/// Implement this for whatever the embedding environment offers. Operations
/// may fail (a browser may refuse a `pushState`); failures surface as
/// [`NavigationError::HistoryUnavailable`] and abort the commit that
/// requested them.
pub trait HistoryHost {
    /// Push a new entry, truncating any forward entries
    fn push(&mut self, entry: HistoryEntry) -> Result<(), NavigationError>;

    /// Replace the current entry without growing the stack
    fn replace(&mut self, entry: HistoryEntry) -> Result<(), NavigationError>;

    /// Number of entries currently in the stack
    fn depth(&self) -> usize;

    /// Index of the current entry
    fn index(&self) -> usize;
}

// Single-threaded embeddings share a host between the adapter and the event
// source that observes pops.
impl<H: HistoryHost> HistoryHost for Rc<RefCell<H>> {
    fn push(&mut self, entry: HistoryEntry) -> Result<(), NavigationError> {
        self.borrow_mut().push(entry)
    }

    fn replace(&mut self, entry: HistoryEntry) -> Result<(), NavigationError> {
        self.borrow_mut().replace(entry)
    }

    fn depth(&self) -> usize {
        self.borrow().depth()
    }

    fn index(&self) -> usize {
        self.borrow().index()
    }
}

// ============================================================================
// In-memory reference host
// ============================================================================

/// In-memory navigation stack
///
/// The reference [`HistoryHost`]: used by tests and by embeddings without a
/// native navigation stack. Supports truncation-on-push, a bounded size, and
/// back/forward cursors whose popped entries are meant to be fed into the
/// controller as synthetic navigation requests.
#[derive(Debug, Clone)]
pub struct InMemoryHistory {
    entries: Vec<HistoryEntry>,
    current: usize,
    /// Maximum stack size (0 = unlimited)
    max_size: usize,
}

impl InMemoryHistory {
    /// Create a new stack with an initial entry
    pub fn new(initial_path: impl Into<String>) -> Self {
        Self {
            entries: vec![HistoryEntry::new(initial_path)],
            current: 0,
            max_size: 1000,
        }
    }

    /// Create with a custom max size
    pub fn with_max_size(initial_path: impl Into<String>, max_size: usize) -> Self {
        Self {
            entries: vec![HistoryEntry::new(initial_path)],
            current: 0,
            max_size,
        }
    }

    /// The current entry
    pub fn current_entry(&self) -> &HistoryEntry {
        &self.entries[self.current]
    }

    /// The current path
    pub fn current_path(&self) -> &str {
        &self.entries[self.current].path
    }

    /// Check if a back traversal is possible
    pub fn can_go_back(&self) -> bool {
        self.current > 0
    }

    /// Check if a forward traversal is possible
    pub fn can_go_forward(&self) -> bool {
        self.current < self.entries.len() - 1
    }

    /// Move the cursor back one entry, returning the entry now current
    ///
    /// This is the host-side pop: feed the returned entry into
    /// `NavigationController::handle_pop` to re-enter the engine.
    pub fn back(&mut self) -> Option<HistoryEntry> {
        if self.can_go_back() {
            self.current -= 1;
            Some(self.entries[self.current].clone())
        } else {
            None
        }
    }

    /// Move the cursor forward one entry, returning the entry now current
    pub fn forward(&mut self) -> Option<HistoryEntry> {
        if self.can_go_forward() {
            self.current += 1;
            Some(self.entries[self.current].clone())
        } else {
            None
        }
    }

    /// All entries (oldest first)
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    fn enforce_size_limit(&mut self) {
        if self.max_size > 0 && self.entries.len() > self.max_size {
            let excess = self.entries.len() - self.max_size;
            self.entries.drain(0..excess);
            self.current = self.current.saturating_sub(excess);
        }
    }
}

impl Default for InMemoryHistory {
    fn default() -> Self {
        Self::new("/")
    }
}

impl HistoryHost for InMemoryHistory {
    fn push(&mut self, entry: HistoryEntry) -> Result<(), NavigationError> {
        // Pushing truncates any forward entries
        self.entries.truncate(self.current + 1);
        self.entries.push(entry);
        self.current += 1;
        self.enforce_size_limit();
        Ok(())
    }

    fn replace(&mut self, entry: HistoryEntry) -> Result<(), NavigationError> {
        self.entries[self.current] = entry;
        Ok(())
    }

    fn depth(&self) -> usize {
        self.entries.len()
    }

    fn index(&self) -> usize {
        self.current
    }
}

// ============================================================================
// Adapter
// ============================================================================

/// Bridge between the engine and the host navigation stack
///
/// The adapter is the only writer to the underlying stack. It records
/// committed transitions (`record_forward` for in-app pushes,
/// `record_replace` for redirects and replacements) and exposes the host's
/// depth/index for [`NavigationState`](crate::controller::NavigationState)
/// bookkeeping.
pub struct HistoryAdapter {
    host: Box<dyn HistoryHost>,
}

impl HistoryAdapter {
    /// Create an adapter over a host
    pub fn new(host: impl HistoryHost + 'static) -> Self {
        Self {
            host: Box::new(host),
        }
    }

    /// Push a new entry for an in-app navigation
    ///
    /// Push semantics: the back button later returns to the previous in-app
    /// route. Grows the observable depth by exactly one.
    pub fn record_forward(
        &mut self,
        path: impl Into<String>,
        state: HistoryState,
    ) -> Result<(), NavigationError> {
        let path = path.into();
        trace_log!("History push: {}", path);
        self.host.push(HistoryEntry::with_state(path, state))
    }

    /// Replace the current entry without growing the stack
    ///
    /// Used for redirects that should not be individually reachable via back.
    pub fn record_replace(
        &mut self,
        path: impl Into<String>,
        state: HistoryState,
    ) -> Result<(), NavigationError> {
        let path = path.into();
        trace_log!("History replace: {}", path);
        self.host.replace(HistoryEntry::with_state(path, state))
    }

    /// Current stack depth as reported by the host
    pub fn depth(&self) -> usize {
        self.host.depth()
    }

    /// Current stack index as reported by the host
    pub fn index(&self) -> usize {
        self.host.index()
    }
}

impl std::fmt::Debug for HistoryAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryAdapter")
            .field("depth", &self.depth())
            .field("index", &self.index())
            .finish()
    }
}

impl Default for HistoryAdapter {
    fn default() -> Self {
        debug_log!("Using in-memory history host");
        Self::new(InMemoryHistory::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_stack() {
        let history = InMemoryHistory::new("/");
        assert_eq!(history.current_path(), "/");
        assert_eq!(history.depth(), 1);
        assert!(!history.can_go_back());
        assert!(!history.can_go_forward());
    }

    #[test]
    fn test_push_grows_depth_by_one() {
        let mut history = InMemoryHistory::new("/");

        history.push(HistoryEntry::new("/users")).unwrap();
        assert_eq!(history.current_path(), "/users");
        assert_eq!(history.depth(), 2);
        assert!(history.can_go_back());
    }

    #[test]
    fn test_replace_never_grows_depth() {
        let mut history = InMemoryHistory::new("/");
        history.push(HistoryEntry::new("/login")).unwrap();

        let depth_before = history.depth();
        history.replace(HistoryEntry::new("/dashboard")).unwrap();

        assert_eq!(history.depth(), depth_before);
        assert_eq!(history.current_path(), "/dashboard");

        // Back skips the replaced entry
        history.back().unwrap();
        assert_eq!(history.current_path(), "/");
    }

    #[test]
    fn test_back_and_forward_move_cursor() {
        let mut history = InMemoryHistory::new("/");
        history.push(HistoryEntry::new("/page1")).unwrap();
        history.push(HistoryEntry::new("/page2")).unwrap();

        let entry = history.back().unwrap();
        assert_eq!(entry.path, "/page1");
        assert!(history.can_go_forward());

        let entry = history.forward().unwrap();
        assert_eq!(entry.path, "/page2");
        assert!(!history.can_go_forward());
    }

    #[test]
    fn test_back_at_root_returns_none() {
        let mut history = InMemoryHistory::new("/");
        assert!(history.back().is_none());
        assert!(history.forward().is_none());
    }

    #[test]
    fn test_push_truncates_forward_entries() {
        let mut history = InMemoryHistory::new("/");
        history.push(HistoryEntry::new("/page1")).unwrap();
        history.push(HistoryEntry::new("/page2")).unwrap();
        history.back();

        history.push(HistoryEntry::new("/page3")).unwrap();
        assert_eq!(history.current_path(), "/page3");
        assert_eq!(history.depth(), 3); // /, /page1, /page3
        assert!(!history.can_go_forward());
    }

    #[test]
    fn test_max_size_evicts_oldest() {
        let mut history = InMemoryHistory::with_max_size("/", 3);

        history.push(HistoryEntry::new("/page1")).unwrap();
        history.push(HistoryEntry::new("/page2")).unwrap();
        history.push(HistoryEntry::new("/page3")).unwrap();
        history.push(HistoryEntry::new("/page4")).unwrap();

        assert_eq!(history.depth(), 3);
        assert_eq!(history.current_path(), "/page4");

        history.back();
        history.back();
        assert_eq!(history.current_path(), "/page2");
    }

    #[test]
    fn test_entry_state_survives_traversal() {
        let mut history = InMemoryHistory::new("/");

        let mut state = HistoryState::new();
        state.set("scrollY".to_string(), "100".to_string());
        history
            .push(HistoryEntry::with_state("/page1", state))
            .unwrap();
        history.push(HistoryEntry::new("/page2")).unwrap();

        let entry = history.back().unwrap();
        assert_eq!(entry.path, "/page1");
        assert_eq!(entry.state.get("scrollY"), Some(&"100".to_string()));
    }

    #[test]
    fn test_adapter_records_through_shared_host() {
        let host = Rc::new(RefCell::new(InMemoryHistory::new("/")));
        let mut adapter = HistoryAdapter::new(Rc::clone(&host));

        adapter
            .record_forward("/users", HistoryState::new())
            .unwrap();
        assert_eq!(adapter.depth(), 2);
        assert_eq!(host.borrow().current_path(), "/users");

        adapter
            .record_replace("/login", HistoryState::new())
            .unwrap();
        assert_eq!(adapter.depth(), 2);
        assert_eq!(host.borrow().current_path(), "/login");
    }

    #[test]
    fn test_failing_host_surfaces_error() {
        struct BrokenHost;

        impl HistoryHost for BrokenHost {
            fn push(&mut self, _entry: HistoryEntry) -> Result<(), NavigationError> {
                Err(NavigationError::HistoryUnavailable {
                    message: "stack detached".to_string(),
                })
            }
            fn replace(&mut self, _entry: HistoryEntry) -> Result<(), NavigationError> {
                Err(NavigationError::HistoryUnavailable {
                    message: "stack detached".to_string(),
                })
            }
            fn depth(&self) -> usize {
                0
            }
            fn index(&self) -> usize {
                0
            }
        }

        let mut adapter = HistoryAdapter::new(BrokenHost);
        let err = adapter
            .record_forward("/users", HistoryState::new())
            .unwrap_err();
        assert!(matches!(err, NavigationError::HistoryUnavailable { .. }));
    }
}
