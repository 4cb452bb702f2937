//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`DomainEvent`]s. Handlers
//! publish after their database writes commit; the notification router
//! consumes events in its own task and performs the actual notification
//! inserts. Publishing never blocks and never fails the publisher.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskhive_core::types::DbId;
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// DomainEvent
// ---------------------------------------------------------------------------

/// What happened, from the notification pipeline's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A task was created with users assigned to it.
    TaskAssigned,
    /// A task's assignment set gained new members.
    TaskUpdated,
    /// A comment was added to a task.
    CommentAdded,
}

impl EventKind {
    /// Dot-separated event name for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::TaskAssigned => "task.assigned",
            EventKind::TaskUpdated => "task.updated",
            EventKind::CommentAdded => "comment.added",
        }
    }
}

/// A domain event emitted by a mutation handler.
///
/// Recipients are computed by the publisher (it holds the pre-mutation
/// state needed for set differences); the router re-reads the task and
/// actor when it processes the event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    pub kind: EventKind,

    /// The task the event concerns.
    pub task_id: DbId,

    /// The user whose action triggered the event.
    pub actor_id: DbId,

    /// Users to notify. Never contains the actor.
    pub recipients: Vec<DbId>,

    /// When the event was published (UTC).
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent {
    /// Create an event with an empty recipient list.
    pub fn new(kind: EventKind, task_id: DbId, actor_id: DbId) -> Self {
        Self {
            kind,
            task_id,
            actor_id,
            recipients: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// Set the recipient list.
    pub fn with_recipients(mut self, recipients: Vec<DbId>) -> Self {
        self.recipients = recipients;
        self
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
/// independently receive every published [`DomainEvent`].
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest un-consumed events are dropped and
    /// slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With zero subscribers the event is silently dropped; the publisher
    /// never learns whether delivery happened.
    pub fn publish(&self, event: DomainEvent) {
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
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
