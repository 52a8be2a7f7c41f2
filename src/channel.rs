//! channel.rs
//!
//! In-memory pub/sub channel used to hand controller state to the
//! presentation layer. The render layer is out of scope; this is the
//! explicit notify/subscribe seam that replaces framework state hooks.
//!
//! Two consumption styles are supported, both carrying full state
//! snapshots: registered callbacks (fired synchronously on update) and a
//! broadcast receiver for async consumers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use uuid::Uuid;

/// Metadata for a StateChannel
#[derive(Clone, Debug)]
pub struct ChannelMetadata {
    pub id: Uuid,
    pub name: String,
    pub version: u64,
}

/// A single-value channel: holds the latest state and notifies
/// subscribers on every update.
pub struct StateChannel<T: Send + Sync + Clone + 'static> {
    name: String,
    value: Arc<Mutex<T>>,
    metadata: Arc<Mutex<ChannelMetadata>>,
    subscribers: Arc<Mutex<HashMap<Uuid, Box<dyn Fn(&T) + Send + Sync>>>>,
    update_tx: broadcast::Sender<T>,
}

impl<T> StateChannel<T>
where
    T: Send + Sync + Clone + 'static,
{
    /// Create a new StateChannel
    pub fn new(name: &str, initial_value: T) -> Self {
        let metadata = ChannelMetadata {
            id: Uuid::new_v4(),
            name: name.to_string(),
            version: 1,
        };
        let (update_tx, _) = broadcast::channel(32);

        Self {
            name: name.to_string(),
            value: Arc::new(Mutex::new(initial_value)),
            metadata: Arc::new(Mutex::new(metadata)),
            subscribers: Arc::new(Mutex::new(HashMap::new())),
            update_tx,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the current value
    pub fn get_value(&self) -> Option<T> {
        self.value.lock().ok().map(|v| v.clone())
    }

    pub fn version(&self) -> u64 {
        self.metadata.lock().map(|m| m.version).unwrap_or(0)
    }

    /// Replace the value and notify subscribers
    pub fn update(&self, new_value: T) {
        if let Ok(mut metadata) = self.metadata.lock() {
            metadata.version += 1;
        }
        if let Ok(mut guard) = self.value.lock() {
            *guard = new_value.clone();
        }
        let _ = self.update_tx.send(new_value.clone());
        if let Ok(subs) = self.subscribers.lock() {
            for callback in subs.values() {
                callback(&new_value);
            }
        }
    }

    /// Subscribe to updates. Returns a subscription ID.
    pub fn subscribe(&self, callback: Box<dyn Fn(&T) + Send + Sync>) -> Uuid {
        let id = Uuid::new_v4();
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.insert(id, callback);
        }
        id
    }

    /// Unsubscribe
    pub fn unsubscribe(&self, id: Uuid) {
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.remove(&id);
        }
    }

    /// Broadcast receiver for async consumers. Only updates sent after
    /// this call are observed.
    pub fn watch(&self) -> broadcast::Receiver<T> {
        self.update_tx.subscribe()
    }
}
