//! Push-based reads over the expense store.
//!
//! A live query runs its read once, then re-runs it every time the store
//! announces a change and publishes the result through a `watch` channel.
//! The background task stops as soon as the last [`LiveQuery`] handle is
//! dropped.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::watch;
use tracing::{debug, error};

use crate::error::StoreResult;
use crate::expenses::{ExpenseStore, StoreChange};
use crate::models::{Category, Expense};

#[derive(Debug, Clone)]
pub struct LiveQuery<T> {
    rx: watch::Receiver<T>,
}

impl<T: Clone> LiveQuery<T> {
    /// Latest published value.
    pub fn get(&self) -> T {
        self.rx.borrow().clone()
    }

    /// Waits for the next re-emission. Returns false once the query has
    /// stopped. A failed re-evaluation publishes nothing.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Waits until the published value satisfies `predicate`, checking the
    /// current value first.
    pub async fn wait_for(&mut self, mut predicate: impl FnMut(&T) -> bool) -> Option<T> {
        self.rx
            .wait_for(|value| predicate(value))
            .await
            .ok()
            .map(|value| value.clone())
    }
}

/// Runs `query` now and again after every store change.
///
/// The change subscription is taken before the first evaluation so no write
/// can slip between the two.
pub async fn spawn_live_query<T, F, Fut>(
    mut changes: broadcast::Receiver<StoreChange>,
    name: &'static str,
    query: F,
) -> StoreResult<LiveQuery<T>>
where
    T: Send + Sync + 'static,
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = StoreResult<T>> + Send + 'static,
{
    let initial = query().await?;
    let (tx, rx) = watch::channel(initial);

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = tx.closed() => break,
                change = changes.recv() => match change {
                    Ok(change) => debug!(query = name, ?change, "re-evaluating"),
                    // Missed notifications collapse into one re-evaluation
                    Err(RecvError::Lagged(skipped)) => debug!(query = name, skipped, "re-evaluating after lag"),
                    Err(RecvError::Closed) => break,
                },
            }

            match query().await {
                Ok(value) => {
                    if tx.send(value).is_err() {
                        break;
                    }
                }
                // Keep the last good value; the next change retries
                Err(e) => error!(query = name, error = %e, "live query failed"),
            }
        }
        debug!(query = name, "live query stopped");
    });

    Ok(LiveQuery { rx })
}

pub async fn watch_all(store: Arc<dyn ExpenseStore>) -> StoreResult<LiveQuery<Vec<Expense>>> {
    let changes = store.changes();
    spawn_live_query(changes, "all_expenses", move || {
        let store = store.clone();
        async move { store.all().await }
    })
    .await
}

pub async fn watch_total(
    store: Arc<dyn ExpenseStore>,
    category: Option<Category>,
) -> StoreResult<LiveQuery<f64>> {
    let changes = store.changes();
    let name = if category.is_some() {
        "category_total"
    } else {
        "total"
    };
    spawn_live_query(changes, name, move || {
        let store = store.clone();
        let category = category.clone();
        async move { store.total(category.as_ref()).await }
    })
    .await
}
