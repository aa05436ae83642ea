//! Message transport towards the remote reader
//!
//! A [`MessageTransport`] delivers requests to the remote side and reports
//! incoming messages and link closure to registered observers. Delivery of
//! notifications happens on the transport's own thread.

pub mod loopback;

use std::fmt;
use std::sync::{Arc, Weak};

use eid_remote_status::StatusCode;
use parking_lot::Mutex;
use serde_json::Value;

use crate::messages::{IfdMessage, IfdMessageType};

pub use loopback::{LoopbackTransport, Reply};

/// Receiver of transport notifications
pub trait TransportObserver: Send + Sync {
    /// A message of type `kind` arrived from the remote side
    fn on_received(&self, kind: IfdMessageType, payload: &Value);

    /// The link to the remote side was closed
    fn on_closed(&self, code: StatusCode, context_handle: &str);
}

/// Link to a remote reader
pub trait MessageTransport: Send + Sync + fmt::Debug {
    /// Identifier of the link, part of the reader names it announces
    fn context_handle(&self) -> String;

    /// Hand a request to the link without waiting for an answer
    fn send(&self, message: IfdMessage);

    /// Register an observer until the returned subscription is dropped
    fn subscribe(&self, observer: Arc<dyn TransportObserver>) -> Subscription;
}

#[derive(Default)]
struct Observers {
    next_id: u64,
    entries: Vec<(u64, Arc<dyn TransportObserver>)>,
}

/// Observer list shared by transport implementations
#[derive(Clone, Default)]
pub struct ObserverRegistry {
    inner: Arc<Mutex<Observers>>,
}

impl ObserverRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer
    pub fn subscribe(&self, observer: Arc<dyn TransportObserver>) -> Subscription {
        let mut observers = self.inner.lock();
        let id = observers.next_id;
        observers.next_id += 1;
        observers.entries.push((id, observer));
        Subscription {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Number of registered observers
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Whether no observer is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Report an incoming message to every observer
    pub fn notify_received(&self, kind: IfdMessageType, payload: &Value) {
        for observer in self.snapshot() {
            observer.on_received(kind, payload);
        }
    }

    /// Report closure of the link to every observer
    pub fn notify_closed(&self, code: StatusCode, context_handle: &str) {
        for observer in self.snapshot() {
            observer.on_closed(code, context_handle);
        }
    }

    // Observers run without the lock held so they may unsubscribe.
    fn snapshot(&self) -> Vec<Arc<dyn TransportObserver>> {
        self.inner
            .lock()
            .entries
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect()
    }
}

impl fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.len())
            .finish()
    }
}

/// Registration of an observer, released on drop
#[must_use = "the observer is unregistered when the subscription is dropped"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Observers>>,
}

impl Subscription {
    /// Subscription not bound to any registry
    pub const fn detached() -> Self {
        Self {
            id: 0,
            registry: Weak::new(),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.lock().entries.retain(|(id, _)| *id != self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &(self.registry.strong_count() > 0))
            .finish()
    }
}
