//! Typed notification stream
//!
//! The core reports state changes to interested observers (typically the UI
//! layer) through [`Notifier`]. Delivery is synchronous and in registration
//! order; emitting never fails and observers cannot veto an operation.

use std::sync::{Arc, Mutex};

use crate::sync::ConnectionState;

/// Notification emitted by the core
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerEvent {
    /// The object registry changed (one event per mutating operation)
    RegistryChanged,
    /// The sync channel moved to a new connection state
    ConnectionChanged(ConnectionState),
    /// A non-fatal fault was observed (malformed message, rejected add, ...)
    Fault(String),
}

type Subscriber = Box<dyn FnMut(&ViewerEvent) + Send>;

/// Observer registration and dispatch
///
/// Cheap to clone; clones share the same subscriber list.
#[derive(Clone, Default)]
pub struct Notifier {
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
}

impl Notifier {
    /// Create an empty notifier
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer callback
    pub fn subscribe<F>(&self, callback: F)
    where
        F: FnMut(&ViewerEvent) + Send + 'static,
    {
        self.subscribers.lock().unwrap().push(Box::new(callback));
    }

    /// Deliver an event to every observer, in registration order
    pub fn emit(&self, event: &ViewerEvent) {
        let mut subscribers = self.subscribers.lock().unwrap();
        for subscriber in subscribers.iter_mut() {
            subscriber(event);
        }
    }
}
