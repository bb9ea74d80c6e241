//! Subscriber registry: event name → ordered handler list.

use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;

/// Counter for generating unique subscription IDs.
static NEXT_SUBSCRIPTION_ID: AtomicU64 = AtomicU64::new(1);

/// A subscriber callback. Receives the event payload by reference.
pub type Handler = Arc<dyn Fn(&Value) + Send + Sync>;

/// Identifies one registration, for targeted removal with `off`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Allocates a process-wide unique id.
    pub fn next() -> Self {
        Self(NEXT_SUBSCRIPTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Handlers keyed by event name, kept in registration order.
///
/// Dispatch is synchronous and isolated per handler: a panicking handler
/// is logged and skipped, the rest still run.
#[derive(Default)]
pub struct SubscriberRegistry {
    handlers: HashMap<String, Vec<(SubscriptionId, Handler)>>,
}

impl SubscriberRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `event` and returns its id.
    pub fn on<F>(&mut self, event: impl Into<String>, handler: F) -> SubscriptionId
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let id = SubscriptionId::next();
        self.insert(event, id, Arc::new(handler));
        id
    }

    /// Registers a handler under an id allocated elsewhere.
    pub fn insert(&mut self, event: impl Into<String>, id: SubscriptionId, handler: Handler) {
        self.handlers
            .entry(event.into())
            .or_default()
            .push((id, handler));
    }

    /// Removes one registration (`Some(id)`) or every handler for `event`
    /// (`None`). Returns how many were removed.
    pub fn off(&mut self, event: &str, id: Option<SubscriptionId>) -> usize {
        let Some(list) = self.handlers.get_mut(event) else {
            return 0;
        };
        let before = list.len();
        match id {
            Some(id) => list.retain(|(sub, _)| *sub != id),
            None => list.clear(),
        }
        let removed = before - list.len();
        if list.is_empty() {
            self.handlers.remove(event);
        }
        removed
    }

    /// Invokes every handler for `event` in registration order.
    ///
    /// Returns the number of handlers that completed without panicking.
    pub fn dispatch(&self, event: &str, data: &Value) -> usize {
        let Some(list) = self.handlers.get(event) else {
            return 0;
        };
        let mut completed = 0;
        for (id, handler) in list {
            match panic::catch_unwind(AssertUnwindSafe(|| handler(data))) {
                Ok(()) => completed += 1,
                Err(payload) => {
                    let message = payload
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| payload.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "non-string panic payload".to_string());
                    tracing::warn!(
                        event,
                        subscription = %id,
                        panic = %message,
                        "event handler panicked"
                    );
                }
            }
        }
        completed
    }

    /// Number of handlers registered for `event`.
    pub fn count(&self, event: &str) -> usize {
        self.handlers.get(event).map_or(0, Vec::len)
    }

    /// Returns `true` if `event` has at least one handler.
    pub fn has_subscribers(&self, event: &str) -> bool {
        self.count(event) > 0
    }

    /// Total number of registrations across all events.
    pub fn len(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Drops every registration.
    pub fn clear(&mut self) {
        self.handlers.clear();
    }
}

impl fmt::Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut counts: Vec<(&str, usize)> = self
            .handlers
            .iter()
            .map(|(event, list)| (event.as_str(), list.len()))
            .collect();
        counts.sort_unstable();
        f.debug_struct("SubscriberRegistry")
            .field("handlers", &counts)
            .finish()
    }
}
