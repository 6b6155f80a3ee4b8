//! Daily reminder as a self-rescheduling one-shot wake-up.
//!
//! The scheduler is either `Unscheduled` or holds exactly one pending
//! registration identified by a token. When the wake-up fires it shows the
//! notification and registers the next one from the persisted settings, so
//! it works without any in-memory coordinator state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use time::{Duration, OffsetDateTime, Time};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::constants::{NOTIFICATION_BODY, NOTIFICATION_TITLE};
use crate::error::ReminderError;
use crate::preferences::PreferenceStore;

pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

/// Wall clock in the local offset, falling back to UTC when the offset
/// cannot be determined.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
    }
}

/// Host facility that wakes the process at an absolute instant.
pub trait WakeupBackend: Send + Sync {
    fn register(&self, token: Uuid, at: OffsetDateTime);
    fn deregister(&self, token: Uuid);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notification {
    pub title: &'static str,
    pub body: &'static str,
}

pub const REMINDER_NOTIFICATION: Notification = Notification {
    title: NOTIFICATION_TITLE,
    body: NOTIFICATION_BODY,
};

pub trait Notifier: Send + Sync {
    fn show(&self, notification: &Notification);
}

pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show(&self, notification: &Notification) {
        info!(title = notification.title, body = notification.body, "reminder");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Unscheduled,
    Scheduled {
        token: Uuid,
        trigger_at: OffsetDateTime,
    },
}

/// Next occurrence of `hour:minute:00.000` strictly after `now`.
pub fn next_trigger(
    now: OffsetDateTime,
    hour: u8,
    minute: u8,
) -> Result<OffsetDateTime, ReminderError> {
    let at = Time::from_hms(hour, minute, 0).map_err(|_| ReminderError::InvalidTime { hour, minute })?;
    let today = now.replace_time(at);
    if today > now {
        Ok(today)
    } else {
        Ok(today + Duration::days(1))
    }
}

// `generation` advances on every schedule and cancel
struct Inner {
    state: SchedulerState,
    generation: u64,
}

pub struct ReminderScheduler {
    preferences: PreferenceStore,
    backend: Arc<dyn WakeupBackend>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    inner: Mutex<Inner>,
}

impl ReminderScheduler {
    pub fn new(
        preferences: PreferenceStore,
        backend: Arc<dyn WakeupBackend>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            preferences,
            backend,
            notifier,
            clock,
            inner: Mutex::new(Inner {
                state: SchedulerState::Unscheduled,
                generation: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> SchedulerState {
        self.lock().state
    }

    /// Registers the next wake-up, replacing any pending one.
    pub fn schedule(&self, hour: u8, minute: u8) -> Result<OffsetDateTime, ReminderError> {
        let trigger_at = next_trigger(self.clock.now(), hour, minute)?;
        let mut inner = self.lock();
        Ok(self.arm(&mut inner, trigger_at))
    }

    fn arm(&self, inner: &mut Inner, trigger_at: OffsetDateTime) -> OffsetDateTime {
        let token = Uuid::new_v4();
        if let SchedulerState::Scheduled { token: previous, .. } = inner.state {
            self.backend.deregister(previous);
        }
        self.backend.register(token, trigger_at);
        inner.state = SchedulerState::Scheduled { token, trigger_at };
        inner.generation += 1;

        info!(%trigger_at, "reminder scheduled");
        trigger_at
    }

    pub fn cancel(&self) {
        let mut inner = self.lock();
        if let SchedulerState::Scheduled { token, .. } = inner.state {
            self.backend.deregister(token);
            info!("reminder cancelled");
        }
        inner.state = SchedulerState::Unscheduled;
        inner.generation += 1;
    }

    /// Handles a fired wake-up. Tokens that are not the pending registration
    /// are ignored and yield `None`; otherwise returns the next trigger.
    ///
    /// The next wake-up is armed only if the persisted settings are still
    /// enabled and no `schedule` or `cancel` ran while they were being read.
    pub async fn on_fire(&self, token: Uuid) -> Result<Option<OffsetDateTime>, ReminderError> {
        let accepted = {
            let mut inner = self.lock();
            match inner.state {
                SchedulerState::Scheduled { token: pending, .. } if pending == token => {
                    self.backend.deregister(token);
                    inner.state = SchedulerState::Unscheduled;
                    inner.generation
                }
                _ => {
                    warn!(%token, "ignoring stale reminder wake-up");
                    return Ok(None);
                }
            }
        };

        self.notifier.show(&REMINDER_NOTIFICATION);

        let config = self.preferences.get().await?;
        if !config.enabled {
            info!("reminder disabled, not rescheduling");
            return Ok(None);
        }
        let trigger_at = next_trigger(self.clock.now(), config.hour, config.minute)?;

        let mut inner = self.lock();
        if inner.generation != accepted {
            debug!("reminder changed while firing, not rescheduling");
            return Ok(None);
        }
        Ok(Some(self.arm(&mut inner, trigger_at)))
    }
}

/// Wake-ups backed by tokio timers. Fired tokens are delivered on the
/// receiver returned from [`TokioWakeup::new`]; the host feeds them to
/// [`ReminderScheduler::on_fire`].
pub struct TokioWakeup {
    timers: Mutex<HashMap<Uuid, JoinHandle<()>>>,
    fired: mpsc::UnboundedSender<Uuid>,
}

impl TokioWakeup {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Uuid>) {
        let (fired, rx) = mpsc::unbounded_channel();
        (
            Self {
                timers: Mutex::new(HashMap::new()),
                fired,
            },
            rx,
        )
    }
}

impl WakeupBackend for TokioWakeup {
    fn register(&self, token: Uuid, at: OffsetDateTime) {
        let delay = std::time::Duration::try_from(at - OffsetDateTime::now_utc())
            .unwrap_or(std::time::Duration::ZERO);
        let fired = self.fired.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = fired.send(token);
        });

        debug!(%token, ?delay, "wake-up armed");
        self.timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token, timer);
    }

    fn deregister(&self, token: Uuid) {
        if let Some(timer) = self
            .timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&token)
        {
            timer.abort();
            debug!(%token, "wake-up disarmed");
        }
    }
}
