#![allow(dead_code)]

use async_trait::async_trait;
use expense_tracker::database::{Db, init_db};
use expense_tracker::expenses::{ExpenseStore, SqliteExpenseStore};
use expense_tracker::models::{Category, NewExpense};
use expense_tracker::scheduler::{Clock, Notification, Notifier, WakeupBackend};
use expense_tracker::shell::NotificationPermission;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::{TempDir, tempdir};
use time::OffsetDateTime;
use uuid::Uuid;

pub const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn setup_test_environment() -> (Db, TempDir) {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let data_path = temp_dir
        .path()
        .to_str()
        .expect("Failed to convert path to string")
        .to_string();

    let db = init_db(&data_path)
        .await
        .unwrap_or_else(|e| panic!("Failed to initialize database at {}: {}", data_path, e));

    (db, temp_dir)
}

pub async fn setup_store() -> (Arc<SqliteExpenseStore>, TempDir) {
    let (db, temp_dir) = setup_test_environment().await;
    (Arc::new(SqliteExpenseStore::new(db)), temp_dir)
}

pub async fn create_test_expense(
    store: &SqliteExpenseStore,
    description: &str,
    amount: f64,
    category: Category,
    occurred_at: i64,
) -> i64 {
    let expense = NewExpense {
        amount,
        description: description.to_string(),
        category,
        occurred_at,
    };
    store
        .insert(&expense)
        .await
        .unwrap_or_else(|e| panic!("Failed to insert test expense '{}': {}", description, e))
}

/// Awaits a future, failing the test if it takes longer than `WAIT_TIMEOUT`.
pub async fn within<F: std::future::Future>(future: F) -> F::Output {
    tokio::time::timeout(WAIT_TIMEOUT, future)
        .await
        .expect("Timed out waiting for live query")
}

pub struct FixedClock {
    now: Mutex<OffsetDateTime>,
}

impl FixedClock {
    pub fn new(now: OffsetDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: OffsetDateTime) {
        *self.now.lock().unwrap() = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        *self.now.lock().unwrap()
    }
}

/// Records every registration and tracks which are still pending.
#[derive(Default)]
pub struct RecordingWakeup {
    pub registered: Mutex<Vec<(Uuid, OffsetDateTime)>>,
    pub pending: Mutex<HashSet<Uuid>>,
}

impl RecordingWakeup {
    pub fn pending_count(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    pub fn last_token(&self) -> Uuid {
        self.registered
            .lock()
            .unwrap()
            .last()
            .expect("Nothing registered")
            .0
    }
}

impl WakeupBackend for RecordingWakeup {
    fn register(&self, token: Uuid, at: OffsetDateTime) {
        self.registered.lock().unwrap().push((token, at));
        self.pending.lock().unwrap().insert(token);
    }

    fn deregister(&self, token: Uuid) {
        self.pending.lock().unwrap().remove(&token);
    }
}

#[derive(Default)]
pub struct CountingNotifier {
    pub shown: AtomicUsize,
}

impl CountingNotifier {
    pub fn count(&self) -> usize {
        self.shown.load(Ordering::SeqCst)
    }
}

impl Notifier for CountingNotifier {
    fn show(&self, _notification: &Notification) {
        self.shown.fetch_add(1, Ordering::SeqCst);
    }
}

/// Permission fake: `granted` is the current state, `answer` what a prompt returns.
pub struct FakePermission {
    pub granted: bool,
    pub answer: bool,
    pub prompts: AtomicUsize,
}

impl FakePermission {
    pub fn new(granted: bool, answer: bool) -> Self {
        Self {
            granted,
            answer,
            prompts: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl NotificationPermission for FakePermission {
    async fn is_granted(&self) -> bool {
        self.granted
    }

    async fn request(&self) -> bool {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        self.answer
    }
}
