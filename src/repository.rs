use std::sync::Arc;

use crate::error::StoreResult;
use crate::expenses::ExpenseStore;
use crate::live::{self, LiveQuery};
use crate::models::{Category, Expense, NewExpense};

/// Domain-facing access to expenses. Writes go straight to the store and
/// reads are handed out as live queries.
#[derive(Clone)]
pub struct ExpenseRepository {
    store: Arc<dyn ExpenseStore>,
}

impl ExpenseRepository {
    pub fn new(store: Arc<dyn ExpenseStore>) -> Self {
        Self { store }
    }

    pub async fn add(&self, expense: &NewExpense) -> StoreResult<i64> {
        self.store.insert(expense).await
    }

    pub async fn update(&self, expense: &Expense) -> StoreResult<()> {
        self.store.update(expense).await
    }

    pub async fn remove(&self, id: i64) -> StoreResult<bool> {
        self.store.delete(id).await
    }

    pub async fn expenses(&self) -> StoreResult<LiveQuery<Vec<Expense>>> {
        live::watch_all(self.store.clone()).await
    }

    pub async fn total(&self) -> StoreResult<LiveQuery<f64>> {
        live::watch_total(self.store.clone(), None).await
    }

    pub async fn total_for(&self, category: Category) -> StoreResult<LiveQuery<f64>> {
        live::watch_total(self.store.clone(), Some(category)).await
    }
}
