//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`ContentEvent`]s. It is
//! designed to be shared via `Arc<EventBus>` across the application.

use tokio::sync::broadcast;

use marginalia_core::content::ContentItem;
use marginalia_core::DbId;

// ---------------------------------------------------------------------------
// ContentEvent
// ---------------------------------------------------------------------------

/// A lifecycle fact reported by the host CMS.
///
/// Events describe what already happened in the host; subscribers decide
/// whether anything follows from it. `actor_id` is the user whose action
/// triggered the event.
#[derive(Debug, Clone)]
pub enum ContentEvent {
    /// A content item was written, revision snapshots included.
    ItemSaved { item: ContentItem, actor_id: DbId },

    /// A content item moved between publication statuses.
    StatusChanged {
        item: ContentItem,
        old_status: String,
        new_status: String,
        actor_id: DbId,
    },
}

impl ContentEvent {
    /// Stable dot-separated event name, for logs and acknowledgements.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ItemSaved { .. } => "content.saved",
            Self::StatusChanged { .. } => "content.status_changed",
        }
    }

    /// Id of the content item the event concerns.
    pub fn item_id(&self) -> DbId {
        match self {
            Self::ItemSaved { item, .. } => item.id,
            Self::StatusChanged { item, .. } => item.id,
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`ContentEvent`].
///
/// # Usage
///
/// ```rust,ignore
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(ContentEvent::ItemSaved { item, actor_id: 7 });
/// ```
pub struct EventBus {
    sender: broadcast::Sender<ContentEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: ContentEvent) {
        // Ignore the SendError -- it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<ContentEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
