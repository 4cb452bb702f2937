//! Event-to-notification routing engine.
//!
//! [`NotificationRouter`] subscribes to the domain event bus and, for each
//! event, inserts one notification row per recipient and pushes it over
//! any live WebSocket connections. It runs in its own task with its own
//! transactions: a failure here can never abort the mutation that
//! published the event, and events whose task or actor no longer resolve
//! are silently absorbed. Delivery is at-least-once with no idempotency
//! key; a redelivered event produces duplicate notifications.

use std::sync::Arc;

use axum::extract::ws::Message;
use taskhive_core::types::DbId;
use taskhive_db::models::notification::NotificationKind;
use taskhive_db::repositories::{NotificationRepo, TaskRepo, UserRepo};
use taskhive_db::DbPool;
use taskhive_events::{DomainEvent, EventKind};
use tokio::sync::broadcast;

use crate::ws::WsManager;

/// Routes domain events to user notifications.
pub struct NotificationRouter {
    pool: DbPool,
    ws_manager: Arc<WsManager>,
}

impl NotificationRouter {
    /// Create a new router with the given database pool and WebSocket
    /// manager.
    pub fn new(pool: DbPool, ws_manager: Arc<WsManager>) -> Self {
        Self { pool, ws_manager }
    }

    /// Run the main routing loop.
    ///
    /// Subscribes to the event bus via `receiver` and processes each event.
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](taskhive_events::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<DomainEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.route_event(&event).await {
                        tracing::error!(
                            error = %e,
                            event = event.kind.as_str(),
                            "Failed to route event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification router shutting down");
                    break;
                }
            }
        }
    }

    /// Process a single event: resolve the task and actor, then insert one
    /// notification per recipient.
    ///
    /// A task or actor that no longer resolves ends processing without an
    /// error -- the triggering mutation already succeeded and there is
    /// nothing useful to report. Public so tests can drive the router
    /// without the bus.
    pub async fn route_event(&self, event: &DomainEvent) -> Result<(), sqlx::Error> {
        let Some(task) = TaskRepo::find_by_id(&self.pool, event.task_id).await? else {
            return Ok(());
        };
        let Some(actor) = UserRepo::find_by_id(&self.pool, event.actor_id).await? else {
            return Ok(());
        };

        let (kind, title, message) = match event.kind {
            EventKind::TaskAssigned => (
                NotificationKind::TaskAssigned,
                "New Task Assigned",
                format!("{} assigned you to \"{}\"", actor.display_name(), task.title),
            ),
            EventKind::TaskUpdated => (
                NotificationKind::TaskUpdated,
                "Task Updated",
                format!("{} updated \"{}\"", actor.display_name(), task.title),
            ),
            EventKind::CommentAdded => (
                NotificationKind::CommentAdded,
                "New Comment",
                format!("{} commented on \"{}\"", actor.display_name(), task.title),
            ),
        };

        for &user_id in &event.recipients {
            // Per-recipient failures are absorbed so one bad row cannot
            // starve the rest of the fan-out.
            if let Err(e) = self
                .deliver(user_id, kind, title, &message, task.id)
                .await
            {
                tracing::error!(
                    user_id,
                    task_id = task.id,
                    error = %e,
                    "Failed to deliver notification"
                );
            }
        }

        Ok(())
    }

    /// Insert the notification row and push it over WebSocket.
    async fn deliver(
        &self,
        user_id: DbId,
        kind: NotificationKind,
        title: &str,
        message: &str,
        task_id: DbId,
    ) -> Result<(), sqlx::Error> {
        let notification = NotificationRepo::create(
            &self.pool,
            user_id,
            kind,
            title,
            message,
            Some(task_id),
        )
        .await?;

        let payload = serde_json::json!({
            "type": "notification",
            "notification": notification,
        });
        self.ws_manager
            .send_to_user(user_id, Message::Text(payload.to_string().into()))
            .await;

        Ok(())
    }
}
