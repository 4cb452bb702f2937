//! Due-date reminder scheduler.
//!
//! [`ReminderScheduler`] runs as a background task, periodically scanning
//! for incomplete tasks that are due within the reminder window and
//! inserting `due_date_reminder` notifications for everyone assigned.
//! An unread reminder per (user, task) suppresses re-insertion on the next
//! poll; once the user reads it, a still-due task may remind again.

use std::time::Duration;

use taskhive_core::assign::assignment_set;
use taskhive_core::types::DbId;
use taskhive_db::models::notification::NotificationKind;
use taskhive_db::models::task::Task;
use taskhive_db::repositories::{NotificationRepo, TaskRepo};
use taskhive_db::DbPool;
use tokio_util::sync::CancellationToken;

/// How often the scheduler polls for approaching due dates.
const REMINDER_CHECK_INTERVAL: Duration = Duration::from_secs(900);

/// How far ahead of the due date reminders are sent.
const REMINDER_WINDOW_HOURS: i64 = 24;

// ---------------------------------------------------------------------------
// ReminderScheduler
// ---------------------------------------------------------------------------

/// Background service that turns approaching due dates into notifications.
pub struct ReminderScheduler {
    pool: DbPool,
}

impl ReminderScheduler {
    /// Create a new scheduler with the given database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Run the scheduler loop.
    ///
    /// Polls every fifteen minutes. The loop exits gracefully when the
    /// provided [`CancellationToken`] is cancelled.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(REMINDER_CHECK_INTERVAL);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Reminder scheduler cancelled");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.process_due_tasks().await {
                        tracing::error!(error = %e, "Failed to process due-date reminders");
                    }
                }
            }
        }
    }

    /// Scan the reminder window and fan out reminders for each due task.
    ///
    /// Failures on individual tasks are logged and absorbed so one bad row
    /// cannot starve the rest of the scan.
    pub async fn process_due_tasks(&self) -> Result<(), sqlx::Error> {
        let now = chrono::Utc::now();
        let horizon = now + chrono::Duration::hours(REMINDER_WINDOW_HOURS);

        let due = TaskRepo::list_due_between(&self.pool, now, horizon).await?;

        let mut sent = 0usize;
        for task in &due {
            match self.remind_for_task(task).await {
                Ok(count) => sent += count,
                Err(e) => {
                    tracing::error!(task_id = task.id, error = %e, "Failed to send reminders for task");
                }
            }
        }

        if sent > 0 {
            tracing::info!(due_tasks = due.len(), reminders = sent, "Sent due-date reminders");
        }

        Ok(())
    }

    /// Insert reminders for one task's assignment set.
    ///
    /// Returns the number of reminders inserted.
    async fn remind_for_task(&self, task: &Task) -> Result<usize, sqlx::Error> {
        let mut sent = 0usize;
        for user_id in assignment_set(&task.assigned_users, task.assignee_id) {
            if NotificationRepo::has_unread_reminder(&self.pool, user_id, task.id).await? {
                continue;
            }
            self.insert_reminder(user_id, task).await?;
            sent += 1;
        }
        Ok(sent)
    }

    async fn insert_reminder(&self, user_id: DbId, task: &Task) -> Result<(), sqlx::Error> {
        NotificationRepo::create(
            &self.pool,
            user_id,
            NotificationKind::DueDateReminder,
            "Due Date Reminder",
            &format!("\"{}\" is due soon", task.title),
            Some(task.id),
        )
        .await?;
        Ok(())
    }
}
