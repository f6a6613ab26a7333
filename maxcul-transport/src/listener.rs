//! Line listener registration

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::trace;

/// Receives lines read from a transport
#[async_trait]
pub trait LineListener: Send + Sync {
    /// Called once per received line, terminator included
    async fn line_received(&self, line: &str);
}

/// Token identifying a registered listener
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Set of weakly held listeners
///
/// Thread-safe; transports share it with their dispatch task.
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: AtomicU64,
    listeners: RwLock<Vec<(ListenerId, Weak<dyn LineListener>)>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener without taking ownership of it
    pub fn add(&self, listener: &Arc<dyn LineListener>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push((id, Arc::downgrade(listener)));
        id
    }

    /// Remove a listener, returning whether it was registered
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(other, _)| *other != id);
        listeners.len() != before
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver a line to every live listener
    ///
    /// Returns the number of listeners that received the line. Listeners
    /// that have been dropped are pruned.
    pub async fn dispatch(&self, line: &str) -> usize {
        let live: Vec<Arc<dyn LineListener>> = {
            let mut listeners = self.listeners.write();
            listeners.retain(|(_, listener)| listener.strong_count() > 0);
            listeners
                .iter()
                .filter_map(|(_, listener)| listener.upgrade())
                .collect()
        };

        trace!("Dispatching line to {} listener(s): {:?}", live.len(), line);

        for listener in &live {
            listener.line_received(line).await;
        }

        live.len()
    }
}
