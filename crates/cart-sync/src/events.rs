//! Transient "item added" notifications for fly-to-cart style effects.
//!
//! Events go out on a broadcast channel, so only receivers subscribed at
//! emission time observe them; nothing is queued for late subscribers. Each
//! emission schedules a `Cleared` event after a fixed delay, and a newer
//! emission cancels the older one's pending clear.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use cart_model::ProductSnapshot;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

const CHANNEL_CAPACITY: usize = 16;

/// Screen position the add was triggered from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AddOrigin {
    pub x: f64,
    pub y: f64,
}

impl AddOrigin {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An item was just added to the cart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemAdded {
    /// Monotonic emission number.
    pub sequence: u64,
    /// Normalized product that was added.
    pub product: ProductSnapshot,
    /// Where the add came from, if the UI supplied it.
    pub origin: Option<AddOrigin>,
}

/// Events delivered to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum NotifierEvent {
    Added(ItemAdded),
    /// The added event with this sequence number is no longer current.
    Cleared { sequence: u64 },
}

#[derive(Debug)]
struct Shared {
    tx: broadcast::Sender<NotifierEvent>,
    current: Mutex<Option<ItemAdded>>,
}

impl Shared {
    /// Clear `sequence` if it is still the current event.
    fn clear(&self, sequence: u64) -> bool {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if current.as_ref().map(|e| e.sequence) != Some(sequence) {
            return false;
        }
        *current = None;
        drop(current);
        let _ = self.tx.send(NotifierEvent::Cleared { sequence });
        true
    }
}

/// Publishes [`NotifierEvent`]s.
#[derive(Debug)]
pub struct EventNotifier {
    shared: Arc<Shared>,
    clear_after: Duration,
    sequence: AtomicU64,
    pending_clear: Mutex<Option<JoinHandle<()>>>,
}

impl EventNotifier {
    /// Create a notifier whose events clear after `clear_after`.
    pub fn new(clear_after: Duration) -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                tx,
                current: Mutex::new(None),
            }),
            clear_after,
            sequence: AtomicU64::new(0),
            pending_clear: Mutex::new(None),
        }
    }

    /// Register a listener for events emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<NotifierEvent> {
        self.shared.tx.subscribe()
    }

    /// The current added event, until it is cleared.
    pub fn current(&self) -> Option<ItemAdded> {
        self.shared
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Emit an added event and schedule its clear.
    ///
    /// Returns the emission's sequence number. The clear is only scheduled
    /// when called inside a Tokio runtime; otherwise the event stays current
    /// until [`clear`](Self::clear) or the next emission.
    pub fn emit_added(&self, product: ProductSnapshot, origin: Option<AddOrigin>) -> u64 {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let event = ItemAdded {
            sequence,
            product,
            origin,
        };

        *self
            .shared
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(event.clone());
        // No receivers is fine: nobody is animating.
        let _ = self.shared.tx.send(NotifierEvent::Added(event));

        let mut pending = self
            .pending_clear
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let shared = Arc::clone(&self.shared);
            let delay = self.clear_after;
            *pending = Some(handle.spawn(async move {
                tokio::time::sleep(delay).await;
                shared.clear(sequence);
            }));
        }

        tracing::trace!(sequence, "item added event emitted");
        sequence
    }

    /// Clear the current event immediately.
    pub fn clear(&self) {
        if let Some(handle) = self
            .pending_clear
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
        if let Some(sequence) = self.current().map(|e| e.sequence) {
            self.shared.clear(sequence);
        }
    }
}

impl Default for EventNotifier {
    fn default() -> Self {
        Self::new(Duration::from_millis(600))
    }
}

impl Drop for EventNotifier {
    fn drop(&mut self) {
        if let Some(handle) = self
            .pending_clear
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}
