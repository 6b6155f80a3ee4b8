//! Applies reminder setting changes outside the coordinator: persist the
//! settings, then cancel or (once notifications are permitted) arm the
//! scheduler.

use std::sync::Arc;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::watch;
use tracing::info;

use crate::error::ReminderError;
use crate::models::ReminderConfig;
use crate::preferences::PreferenceStore;
use crate::scheduler::ReminderScheduler;

/// Runtime authorization to show notifications.
#[async_trait]
pub trait NotificationPermission: Send + Sync {
    /// Whether permission is already granted, without prompting.
    async fn is_granted(&self) -> bool;

    /// Prompts the user; resolves to the answer.
    async fn request(&self) -> bool;
}

/// For hosts where notifications need no runtime permission.
pub struct AlwaysGranted;

#[async_trait]
impl NotificationPermission for AlwaysGranted {
    async fn is_granted(&self) -> bool {
        true
    }

    async fn request(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderOutcome {
    Scheduled(OffsetDateTime),
    Cancelled,
    /// Enabled in the settings but left unarmed because permission was refused.
    PermissionDenied,
}

pub struct ReminderShell {
    preferences: PreferenceStore,
    scheduler: Arc<ReminderScheduler>,
    permission: Arc<dyn NotificationPermission>,
}

impl ReminderShell {
    pub fn new(
        preferences: PreferenceStore,
        scheduler: Arc<ReminderScheduler>,
        permission: Arc<dyn NotificationPermission>,
    ) -> Self {
        Self {
            preferences,
            scheduler,
            permission,
        }
    }

    pub async fn apply(&self, config: ReminderConfig) -> Result<ReminderOutcome, ReminderError> {
        self.preferences.set(&config).await?;

        if !config.enabled {
            self.scheduler.cancel();
            return Ok(ReminderOutcome::Cancelled);
        }

        if !self.permission.is_granted().await && !self.permission.request().await {
            info!("notification permission denied, reminder not armed");
            return Ok(ReminderOutcome::PermissionDenied);
        }

        let trigger_at = self.scheduler.schedule(config.hour, config.minute)?;
        Ok(ReminderOutcome::Scheduled(trigger_at))
    }

    /// Re-arms the reminder from persisted settings at start-up. Never prompts.
    pub async fn restore(&self) -> Result<ReminderOutcome, ReminderError> {
        let config = self.preferences.get().await?;
        if !config.enabled {
            return Ok(ReminderOutcome::Cancelled);
        }
        if !self.permission.is_granted().await {
            return Ok(ReminderOutcome::PermissionDenied);
        }
        let trigger_at = self.scheduler.schedule(config.hour, config.minute)?;
        Ok(ReminderOutcome::Scheduled(trigger_at))
    }

    /// Applies every change published on `changes` until the sender is gone.
    pub async fn run(&self, mut changes: watch::Receiver<ReminderConfig>) -> Result<(), ReminderError> {
        while changes.changed().await.is_ok() {
            let config = *changes.borrow_and_update();
            let outcome = self.apply(config).await?;
            info!(?outcome, "reminder settings applied");
        }
        Ok(())
    }
}
