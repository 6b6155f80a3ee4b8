use anyhow::Result;
use libsql::{Builder, Connection};
use std::{path::Path, sync::Arc};
use tokio::sync::RwLock;
use tracing::info;

use crate::constants::DATABASE_FILE;

const CREATE_EXPENSES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS expenses (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    amount       REAL    NOT NULL,
    description  TEXT    NOT NULL,
    category     TEXT    NOT NULL,
    occurred_at  INTEGER NOT NULL
);
"#;

const CREATE_EXPENSES_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_expenses_occurred_at
ON expenses(occurred_at DESC);
"#;

const CREATE_PREFERENCES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS preferences (
    namespace  TEXT    NOT NULL,
    key        TEXT    NOT NULL,
    value      INTEGER NOT NULL,
    PRIMARY KEY (namespace, key)
);
"#;

pub type Db = Arc<RwLock<Connection>>;

/// Opens (or creates) `expenses.db` under `data_dir` and ensures the schema.
///
/// Called once at start-up; the returned handle is passed to every component
/// that needs storage.
pub async fn init_db(data_dir: &str) -> Result<Db> {
    tokio::fs::create_dir_all(data_dir).await?;
    let path = Path::new(data_dir).join(DATABASE_FILE);
    let db = Builder::new_local(&path).build().await?;
    let conn = db.connect()?;

    conn.execute(CREATE_EXPENSES_TABLE, ()).await?;
    conn.execute(CREATE_EXPENSES_INDEX, ()).await?;
    conn.execute(CREATE_PREFERENCES_TABLE, ()).await?;

    info!(path = %path.display(), "database ready");
    Ok(Arc::new(RwLock::new(conn)))
}
