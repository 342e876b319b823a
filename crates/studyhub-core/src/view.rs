//! State holders for views.
//!
//! A view owns a `ViewScope` and one `ViewState` per thing it shows. Each
//! load takes a `LoadTicket`; when the result arrives it is applied only if
//! no newer load has started and the view has not been torn down. Late
//! results are dropped.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::api::ApiError;
use crate::models::Resource;

#[derive(Debug, Default)]
struct ScopeInner {
    generation: AtomicU64,
    torn_down: AtomicBool,
}

/// Lifetime of one view. Cheap to clone; clones share the same lifetime.
#[derive(Debug, Clone, Default)]
pub struct ViewScope {
    inner: Arc<ScopeInner>,
}

impl ViewScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a load. Every earlier ticket of this scope becomes stale.
    pub fn begin(&self) -> LoadTicket {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        LoadTicket {
            scope: Arc::clone(&self.inner),
            generation,
        }
    }

    /// The view is gone. No ticket of this scope will be current again.
    pub fn teardown(&self) {
        self.inner.torn_down.store(true, Ordering::SeqCst);
    }

    pub fn is_torn_down(&self) -> bool {
        self.inner.torn_down.load(Ordering::SeqCst)
    }
}

/// Proof of which load a result belongs to.
#[derive(Debug, Clone)]
pub struct LoadTicket {
    scope: Arc<ScopeInner>,
    generation: u64,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Newest load of a live scope.
    pub fn is_current(&self) -> bool {
        !self.scope.torn_down.load(Ordering::SeqCst)
            && self.scope.generation.load(Ordering::SeqCst) == self.generation
    }
}

/// What a view renders for one load: data, spinner, error line.
#[derive(Debug, Clone)]
pub struct ViewState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

impl<T> ViewState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark loading and take a ticket for the result.
    pub fn start(&mut self, scope: &ViewScope) -> LoadTicket {
        self.loading = true;
        self.error = None;
        scope.begin()
    }

    /// Apply a finished load. Returns `false` (and changes nothing) when the
    /// ticket is stale. A failure keeps the previous data.
    pub fn apply(&mut self, ticket: &LoadTicket, result: Result<T, ApiError>) -> bool {
        if !ticket.is_current() {
            debug!(generation = ticket.generation(), "Discarding stale result");
            return false;
        }
        self.loading = false;
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
            }
            Err(e) => self.error = Some(e.user_message()),
        }
        true
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}

/// Local copy of a server-owned list.
///
/// Mutations take the entity as the server returned it, so the list never
/// shows a change the server has not accepted.
#[derive(Debug, Clone)]
pub struct ResourceList<T> {
    items: Vec<T>,
}

impl<T> Default for ResourceList<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Resource> ResourceList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_server(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn replace_all(&mut self, items: Vec<T>) {
        self.items = items;
    }

    /// Insert a created entity, or replace the one with the same id.
    pub fn upsert(&mut self, item: T) {
        match self.items.iter_mut().find(|existing| existing.id() == item.id()) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    /// Drop an entity after the server confirmed the delete.
    pub fn remove(&mut self, id: &str) -> Option<T> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(index))
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: String,
        name: String,
    }

    impl Resource for Item {
        fn id(&self) -> &str {
            &self.id
        }
    }

    fn item(id: &str, name: &str) -> Item {
        Item {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    fn server_error() -> ApiError {
        ApiError::Server {
            status: 500,
            message: "boom".to_string(),
        }
    }

    #[test]
    fn test_newer_load_makes_older_ticket_stale() {
        let scope = ViewScope::new();
        let mut state: ViewState<u32> = ViewState::new();

        let first = state.start(&scope);
        let second = state.start(&scope);

        assert!(state.apply(&second, Ok(2)));
        assert!(!state.apply(&first, Ok(1)));
        assert_eq!(state.data, Some(2));
    }

    #[test]
    fn test_teardown_discards_in_flight_results() {
        let scope = ViewScope::new();
        let mut state: ViewState<u32> = ViewState::new();
        let ticket = state.start(&scope);

        scope.teardown();

        assert!(!state.apply(&ticket, Ok(7)));
        assert_eq!(state.data, None);
        assert!(scope.is_torn_down());
    }

    #[test]
    fn test_failure_keeps_previous_data() {
        let scope = ViewScope::new();
        let mut state: ViewState<u32> = ViewState::new();

        let ticket = state.start(&scope);
        state.apply(&ticket, Ok(1));
        let ticket = state.start(&scope);
        assert!(state.loading);
        state.apply(&ticket, Err(server_error()));

        assert_eq!(state.data, Some(1));
        assert!(!state.loading);
        assert_eq!(
            state.error.as_deref(),
            Some("Erro no servidor. Tente novamente mais tarde.")
        );
    }

    #[tokio::test]
    async fn test_late_response_does_not_overwrite_newer_state() {
        let scope = ViewScope::new();
        let mut state: ViewState<&'static str> = ViewState::new();

        let slow_ticket = state.start(&scope);
        let slow = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            (slow_ticket, "old subject")
        });
        let fast_ticket = state.start(&scope);
        let fast = tokio::spawn(async move { (fast_ticket, "new subject") });

        let (ticket, value) = fast.await.unwrap();
        state.apply(&ticket, Ok(value));
        let (ticket, value) = slow.await.unwrap();
        state.apply(&ticket, Ok(value));

        assert_eq!(state.data, Some("new subject"));
    }

    #[test]
    fn test_resource_list_upsert_and_remove() {
        let mut list = ResourceList::from_server(vec![item("1", "Cálculo"), item("2", "Física")]);

        list.upsert(item("2", "Física II"));
        list.upsert(item("3", "Química"));
        assert_eq!(list.len(), 3);
        assert_eq!(list.get("2").unwrap().name, "Física II");

        assert_eq!(list.remove("1").map(|i| i.name), Some("Cálculo".to_string()));
        assert!(list.remove("1").is_none());
        let ids: Vec<&str> = list.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
    }
}
