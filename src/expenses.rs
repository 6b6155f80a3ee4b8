//! Durable expense table.
//!
//! [`ExpenseStore`] is the storage contract the repository is written
//! against; [`SqliteExpenseStore`] implements it on the shared libsql
//! connection. Every successful write is announced on a broadcast channel so
//! live queries can re-evaluate.

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

use crate::constants::CHANGE_CHANNEL_CAPACITY;
use crate::database::Db;
use crate::error::{StoreError, StoreResult};
use crate::models::{Category, Expense, NewExpense};

const INSERT_EXPENSE: &str =
    "INSERT INTO expenses (amount, description, category, occurred_at) VALUES (?, ?, ?, ?)";
const UPDATE_EXPENSE: &str =
    "UPDATE expenses SET amount = ?, description = ?, category = ? WHERE id = ?";
const DELETE_EXPENSE: &str = "DELETE FROM expenses WHERE id = ?";
const SELECT_ALL: &str = "SELECT id, amount, description, category, occurred_at FROM expenses ORDER BY occurred_at DESC, id DESC";
const SELECT_TOTAL: &str = "SELECT COALESCE(SUM(amount), 0.0) FROM expenses";
const SELECT_CATEGORY_TOTAL: &str =
    "SELECT COALESCE(SUM(amount), 0.0) FROM expenses WHERE category = ?";

/// A committed mutation of the expense table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreChange {
    Inserted(i64),
    Updated(i64),
    Deleted(i64),
}

#[async_trait]
pub trait ExpenseStore: Send + Sync {
    /// Stores a new expense and returns the id assigned to it.
    async fn insert(&self, expense: &NewExpense) -> StoreResult<i64>;

    /// Replaces amount, description and category of an existing expense.
    /// `occurred_at` is never rewritten. Fails with `NotFound` if the id is unknown.
    async fn update(&self, expense: &Expense) -> StoreResult<()>;

    /// Returns true if a row was removed; deleting an unknown id is a no-op.
    async fn delete(&self, id: i64) -> StoreResult<bool>;

    /// All expenses, newest first.
    async fn all(&self) -> StoreResult<Vec<Expense>>;

    /// Sum of amounts, optionally restricted to one category. Zero when empty.
    async fn total(&self, category: Option<&Category>) -> StoreResult<f64>;

    fn changes(&self) -> broadcast::Receiver<StoreChange>;
}

pub fn extract_expense_from_row(row: libsql::Row) -> StoreResult<Expense> {
    let id: i64 = row.get(0)?;
    let amount: f64 = row.get(1)?;
    let description: String = row.get(2)?;
    let category: String = row.get(3)?;
    let occurred_at: i64 = row.get(4)?;

    Ok(Expense {
        id,
        amount,
        description,
        category: Category::from(category),
        occurred_at,
    })
}

#[derive(Clone)]
pub struct SqliteExpenseStore {
    db: Db,
    changes: broadcast::Sender<StoreChange>,
}

impl SqliteExpenseStore {
    pub fn new(db: Db) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self { db, changes }
    }

    fn publish(&self, change: StoreChange) {
        // No receivers simply means nobody is watching yet
        let _ = self.changes.send(change);
    }
}

#[async_trait]
impl ExpenseStore for SqliteExpenseStore {
    async fn insert(&self, expense: &NewExpense) -> StoreResult<i64> {
        let id = {
            let conn = self.db.write().await;
            conn.execute(
                INSERT_EXPENSE,
                (
                    expense.amount,
                    expense.description.as_str(),
                    expense.category.as_str(),
                    expense.occurred_at,
                ),
            )
            .await?;
            conn.last_insert_rowid()
        };

        debug!(id, amount = expense.amount, category = %expense.category, "expense inserted");
        self.publish(StoreChange::Inserted(id));
        Ok(id)
    }

    async fn update(&self, expense: &Expense) -> StoreResult<()> {
        let affected_rows = {
            let conn = self.db.write().await;
            conn.execute(
                UPDATE_EXPENSE,
                (
                    expense.amount,
                    expense.description.as_str(),
                    expense.category.as_str(),
                    expense.id,
                ),
            )
            .await?
        };

        if affected_rows == 0 {
            return Err(StoreError::NotFound(expense.id));
        }

        debug!(id = expense.id, "expense updated");
        self.publish(StoreChange::Updated(expense.id));
        Ok(())
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        let affected_rows = {
            let conn = self.db.write().await;
            conn.execute(DELETE_EXPENSE, [id]).await?
        };

        if affected_rows == 0 {
            debug!(id, "delete of unknown expense ignored");
            return Ok(false);
        }

        debug!(id, "expense deleted");
        self.publish(StoreChange::Deleted(id));
        Ok(true)
    }

    async fn all(&self) -> StoreResult<Vec<Expense>> {
        let conn = self.db.read().await;
        let mut rows = conn.query(SELECT_ALL, ()).await?;

        let mut expenses = Vec::new();
        while let Some(row) = rows.next().await? {
            expenses.push(extract_expense_from_row(row)?);
        }
        Ok(expenses)
    }

    async fn total(&self, category: Option<&Category>) -> StoreResult<f64> {
        let conn = self.db.read().await;
        let mut rows = match category {
            Some(category) => conn.query(SELECT_CATEGORY_TOTAL, [category.as_str()]).await?,
            None => conn.query(SELECT_TOTAL, ()).await?,
        };

        match rows.next().await? {
            Some(row) => Ok(row.get::<f64>(0)?),
            None => Ok(0.0),
        }
    }

    fn changes(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }
}
