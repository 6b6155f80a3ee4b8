//! Form and reminder state for the expense screen.
//!
//! The coordinator validates user input and dispatches writes to the
//! repository without waiting for them; results come back through the live
//! queries. Reminder settings are only held in memory here. Persisting them
//! and arming the OS wake-up is left to whoever watches
//! [`ExpenseCoordinator::reminder_changes`].

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{ReminderError, StoreResult};
use crate::live::LiveQuery;
use crate::models::{Category, Draft, Expense, NewExpense, PRESET_CATEGORIES, ReminderConfig};
use crate::repository::ExpenseRepository;
use crate::utils::{is_valid_amount_text, now_millis, parse_amount};

/// A write that has been dispatched but may not be visible yet.
pub type PendingWrite = JoinHandle<StoreResult<()>>;

pub struct ExpenseCoordinator {
    repository: ExpenseRepository,
    draft: watch::Sender<Draft>,
    editing: watch::Sender<Option<Expense>>,
    reminder: watch::Sender<ReminderConfig>,
    expenses: LiveQuery<Vec<Expense>>,
    total: LiveQuery<f64>,
}

impl ExpenseCoordinator {
    pub async fn new(repository: ExpenseRepository, reminder: ReminderConfig) -> StoreResult<Self> {
        let expenses = repository.expenses().await?;
        let total = repository.total().await?;

        Ok(Self {
            repository,
            draft: watch::Sender::new(Draft::default()),
            editing: watch::Sender::new(None),
            reminder: watch::Sender::new(reminder),
            expenses,
            total,
        })
    }

    pub fn categories(&self) -> &'static [Category] {
        &PRESET_CATEGORIES
    }

    pub fn expenses(&self) -> LiveQuery<Vec<Expense>> {
        self.expenses.clone()
    }

    pub fn total(&self) -> LiveQuery<f64> {
        self.total.clone()
    }

    pub async fn total_for(&self, category: Category) -> StoreResult<LiveQuery<f64>> {
        self.repository.total_for(category).await
    }

    pub fn draft(&self) -> watch::Receiver<Draft> {
        self.draft.subscribe()
    }

    pub fn editing(&self) -> watch::Receiver<Option<Expense>> {
        self.editing.subscribe()
    }

    pub fn reminder(&self) -> ReminderConfig {
        *self.reminder.borrow()
    }

    /// Emits the full `(enabled, hour, minute)` triple on every change.
    pub fn reminder_changes(&self) -> watch::Receiver<ReminderConfig> {
        self.reminder.subscribe()
    }

    /// Returns false and leaves the draft untouched if `text` is not empty
    /// or digits with at most one decimal point.
    pub fn set_draft_amount(&self, text: &str) -> bool {
        if !is_valid_amount_text(text) {
            return false;
        }
        self.draft.send_modify(|draft| draft.amount = text.to_string());
        true
    }

    pub fn set_draft_description(&self, text: &str) {
        self.draft
            .send_modify(|draft| draft.description = text.to_string());
    }

    pub fn set_draft_category(&self, category: Category) {
        self.draft.send_modify(|draft| draft.category = category);
    }

    pub fn begin_edit(&self, expense: Expense) {
        self.draft.send_replace(Draft {
            amount: expense.amount.to_string(),
            description: expense.description.clone(),
            category: expense.category.clone(),
        });
        self.editing.send_replace(Some(expense));
    }

    pub fn cancel_edit(&self) {
        self.editing.send_replace(None);
        self.draft.send_replace(Draft::default());
    }

    /// Inserts or updates from the current draft.
    ///
    /// Returns `None` without touching any state when the amount does not
    /// parse to a positive number or the trimmed description is empty.
    /// Otherwise the write is dispatched and the form reset immediately.
    pub fn save(&self) -> Option<PendingWrite> {
        let draft = self.draft.borrow().clone();
        let amount = parse_amount(&draft.amount)?;
        let description = draft.description.trim();
        if description.is_empty() {
            return None;
        }

        let editing = self.editing.borrow().clone();
        let repository = self.repository.clone();
        let pending = match editing {
            None => {
                let expense = NewExpense {
                    amount,
                    description: description.to_string(),
                    category: draft.category,
                    occurred_at: now_millis(),
                };
                tokio::spawn(async move {
                    match repository.add(&expense).await {
                        Ok(id) => {
                            debug!(id, "expense saved");
                            Ok(())
                        }
                        Err(e) => {
                            warn!(error = %e, "failed to add expense");
                            Err(e)
                        }
                    }
                })
            }
            Some(editing) => {
                let expense = Expense {
                    amount,
                    description: description.to_string(),
                    category: draft.category,
                    ..editing
                };
                tokio::spawn(async move {
                    repository.update(&expense).await.inspect_err(|e| {
                        warn!(id = expense.id, error = %e, "failed to update expense");
                    })
                })
            }
        };

        self.cancel_edit();
        Some(pending)
    }

    pub fn delete_expense(&self, expense: &Expense) -> PendingWrite {
        let repository = self.repository.clone();
        let id = expense.id;
        tokio::spawn(async move {
            repository.remove(id).await.map(|_| ()).inspect_err(|e| {
                warn!(id, error = %e, "failed to delete expense");
            })
        })
    }

    pub fn set_reminder_enabled(&self, enabled: bool) {
        self.reminder.send_if_modified(|config| {
            let modified = config.enabled != enabled;
            config.enabled = enabled;
            modified
        });
    }

    pub fn set_reminder_time(&self, hour: u8, minute: u8) -> Result<(), ReminderError> {
        let updated = ReminderConfig::new(self.reminder().enabled, hour, minute)?;
        self.reminder.send_if_modified(|config| {
            let modified = *config != updated;
            *config = updated;
            modified
        });
        Ok(())
    }
}
