// src/events.rs
//! A named-event bus that lets external stages hook into a normalization run.
//!
//! Listeners are either synchronous closures or deferred ones returning a
//! boxed future. `emit` awaits each listener in subscription order, so a
//! deferred listener finishes before the next one starts. The bus never holds
//! its lock across an await; listeners may subscribe or unsubscribe while an
//! emission is in flight, which affects the next emission only.

use crate::error::EventError;
use docprep_source::TableQuery;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};

/// The future returned by a deferred listener.
pub type ListenerFuture = Pin<Box<dyn Future<Output = Result<(), EventError>> + Send + 'static>>;

type SyncCallback = dyn Fn(&TraversalEvent) -> Result<(), EventError> + Send + Sync;
type DeferredCallback = dyn Fn(TraversalEvent) -> ListenerFuture + Send + Sync;

enum Callback {
    Sync(Box<SyncCallback>),
    Deferred(Box<DeferredCallback>),
}

/// A handle to a callback. Clones of a handle are the same listener:
/// subscribing a clone of an already subscribed listener is a no-op.
#[derive(Clone)]
pub struct Listener {
    callback: Arc<Callback>,
}

impl Listener {
    /// A listener that completes before `emit` moves on.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&TraversalEvent) -> Result<(), EventError> + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(Callback::Sync(Box::new(f))),
        }
    }

    /// A listener whose work is asynchronous; `emit` awaits it.
    pub fn deferred<F, Fut>(f: F) -> Self
    where
        F: Fn(TraversalEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), EventError>> + Send + 'static,
    {
        Self {
            callback: Arc::new(Callback::Deferred(Box::new(move |event| {
                Box::pin(f(event)) as ListenerFuture
            }))),
        }
    }

    async fn invoke(&self, event: &TraversalEvent) -> Result<(), EventError> {
        match &*self.callback {
            Callback::Sync(f) => f(event),
            Callback::Deferred(f) => f(event.clone()).await,
        }
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.callback, &other.callback)
    }
}

impl Eq for Listener {}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &*self.callback {
            Callback::Sync(_) => "sync",
            Callback::Deferred(_) => "deferred",
        };
        f.debug_struct("Listener").field("kind", &kind).finish()
    }
}

/// The payload delivered to listeners.
#[derive(Debug, Clone)]
pub enum TraversalEvent {
    /// A table declared external row data and is waiting for it.
    TableData(TableDataRequest),
    /// Host-defined events.
    Custom(Vec<Value>),
}

/// A table's request for rows. Listeners answer by pushing raw rows; the
/// normalizer projects and normalizes them once every listener is done.
#[derive(Debug, Clone)]
pub struct TableDataRequest {
    pub query: Arc<TableQuery>,
    rows: async_channel::Sender<Value>,
}

impl TableDataRequest {
    pub(crate) fn new(query: Arc<TableQuery>, rows: async_channel::Sender<Value>) -> Self {
        Self { query, rows }
    }

    /// Delivers one fetched row.
    pub async fn push_row(&self, row: Value) -> Result<(), EventError> {
        self.rows
            .send(row)
            .await
            .map_err(|_| EventError::listener("tableData", "row channel closed"))
    }

    /// Delivers one fetched row without awaiting. The channel is unbounded,
    /// so this only fails once the table stopped accepting rows.
    pub fn try_push_row(&self, row: Value) -> Result<(), EventError> {
        self.rows
            .try_send(row)
            .map_err(|_| EventError::listener("tableData", "row channel closed"))
    }
}

/// Named-event subscribe/emit bus. Cloning yields another handle to the
/// same bus.
#[derive(Clone, Default)]
pub struct TraversalEventBus {
    events: Arc<Mutex<HashMap<String, Vec<Listener>>>>,
}

impl fmt::Debug for TraversalEventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let events = self.lock();
        let counts: HashMap<&str, usize> =
            events.iter().map(|(k, v)| (k.as_str(), v.len())).collect();
        f.debug_struct("TraversalEventBus")
            .field("events", &counts)
            .finish()
    }
}

impl TraversalEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Listener>>> {
        // Listeners never run under the lock, so a poisoned map is still consistent.
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Registers `listener` for `event` unless it is already registered.
    pub fn subscribe(&self, event: &str, listener: Listener) {
        let mut events = self.lock();
        let listeners = events.entry(event.to_string()).or_default();
        if !listeners.contains(&listener) {
            listeners.push(listener);
        }
    }

    /// Removes `listener` from `event`. Unknown listeners are ignored.
    pub fn unsubscribe(&self, event: &str, listener: &Listener) {
        let mut events = self.lock();
        if let Some(listeners) = events.get_mut(event) {
            listeners.retain(|l| l != listener);
            if listeners.is_empty() {
                events.remove(event);
            }
        }
    }

    pub fn is_subscribed(&self, event: &str, listener: &Listener) -> bool {
        self.lock()
            .get(event)
            .is_some_and(|listeners| listeners.contains(listener))
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.lock().get(event).map_or(0, Vec::len)
    }

    /// Delivers `payload` to every listener registered for `event`, one at a
    /// time in subscription order. Stops at the first failing listener.
    pub async fn emit(&self, event: &str, payload: TraversalEvent) -> Result<(), EventError> {
        let listeners = match self.lock().get(event) {
            Some(listeners) => listeners.clone(),
            None => return Ok(()),
        };
        for listener in &listeners {
            listener.invoke(&payload).await?;
        }
        Ok(())
    }

    /// Subscribes `listener` until the returned guard is dropped.
    pub fn scoped(&self, event: &str, listener: Listener) -> ScopedSubscription {
        self.subscribe(event, listener.clone());
        ScopedSubscription {
            bus: self.clone(),
            event: event.to_string(),
            listener,
        }
    }

    /// Runs `inner` to completion with `listener` subscribed to `event`.
    ///
    /// The listener is removed when `inner` finishes, whether it succeeds,
    /// fails, panics, or the returned future is dropped early.
    pub async fn run_scoped<F, Fut, T>(&self, event: &str, listener: Listener, inner: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let _subscription = self.scoped(event, listener);
        inner().await
    }

    /// Synchronous counterpart of [`run_scoped`](Self::run_scoped).
    pub fn run_scoped_sync<F, T>(&self, event: &str, listener: Listener, inner: F) -> T
    where
        F: FnOnce() -> T,
    {
        let _subscription = self.scoped(event, listener);
        inner()
    }
}

/// Unsubscribes its listener when dropped.
#[must_use = "the listener is unsubscribed as soon as the guard is dropped"]
pub struct ScopedSubscription {
    bus: TraversalEventBus,
    event: String,
    listener: Listener,
}

impl Drop for ScopedSubscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(&self.event, &self.listener);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, Listener) {
        let hits = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&hits);
        let listener = Listener::sync(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        (hits, listener)
    }

    #[tokio::test]
    async fn test_duplicate_subscription_is_ignored() {
        let bus = TraversalEventBus::new();
        let (hits, listener) = counter();

        bus.subscribe("tick", listener.clone());
        bus.subscribe("tick", listener.clone());
        assert_eq!(bus.listener_count("tick"), 1);

        bus.emit("tick", TraversalEvent::Custom(vec![])).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unsubscribe_unknown_listener_is_a_no_op() {
        let bus = TraversalEventBus::new();
        let (_, registered) = counter();
        let (_, stranger) = counter();

        bus.unsubscribe("tick", &stranger);
        bus.subscribe("tick", registered.clone());
        bus.unsubscribe("tick", &stranger);
        assert!(bus.is_subscribed("tick", &registered));

        bus.unsubscribe("tick", &registered);
        assert_eq!(bus.listener_count("tick"), 0);
    }

    #[tokio::test]
    async fn test_emit_without_listeners() {
        let bus = TraversalEventBus::new();
        assert!(bus.emit("nobody", TraversalEvent::Custom(vec![])).await.is_ok());
    }

    #[tokio::test]
    async fn test_first_error_stops_delivery() {
        let bus = TraversalEventBus::new();
        let (hits, after) = counter();
        bus.subscribe("tick", Listener::sync(|_| Err(EventError::listener("tick", "boom"))));
        bus.subscribe("tick", after);

        let err = bus.emit("tick", TraversalEvent::Custom(vec![])).await.unwrap_err();
        assert_eq!(err, EventError::listener("tick", "boom"));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_scoped_guard_unsubscribes_on_drop() {
        let bus = TraversalEventBus::new();
        let (_, listener) = counter();
        {
            let _guard = bus.scoped("tick", listener.clone());
            assert!(bus.is_subscribed("tick", &listener));
        }
        assert!(!bus.is_subscribed("tick", &listener));
    }
}
