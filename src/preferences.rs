use tracing::debug;

use crate::constants::*;
use crate::database::Db;
use crate::error::{StoreError, StoreResult};
use crate::models::ReminderConfig;

const SELECT_PREFERENCES: &str = "SELECT key, value FROM preferences WHERE namespace = ?";

// One statement so the three settings are never observed half-written
const UPSERT_REMINDER: &str = r#"
INSERT INTO preferences (namespace, key, value) VALUES
    (?1, ?2, ?3),
    (?1, ?4, ?5),
    (?1, ?6, ?7)
ON CONFLICT(namespace, key) DO UPDATE SET value = excluded.value
"#;

/// Durable reminder settings under the `reminder_prefs` namespace.
#[derive(Clone)]
pub struct PreferenceStore {
    db: Db,
}

impl PreferenceStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Persisted settings, with defaults for anything never written.
    pub async fn get(&self) -> StoreResult<ReminderConfig> {
        let conn = self.db.read().await;
        let mut rows = conn.query(SELECT_PREFERENCES, [PREFERENCES_NAMESPACE]).await?;

        let mut config = ReminderConfig::default();
        while let Some(row) = rows.next().await? {
            let key: String = row.get(0)?;
            let value: i64 = row.get(1)?;

            match key.as_str() {
                KEY_REMINDER_ENABLED => config.enabled = value != 0,
                KEY_REMINDER_HOUR => config.hour = bounded(&key, value, 23)?,
                KEY_REMINDER_MINUTE => config.minute = bounded(&key, value, 59)?,
                _ => {}
            }
        }
        Ok(config)
    }

    pub async fn set(&self, config: &ReminderConfig) -> StoreResult<()> {
        let conn = self.db.write().await;
        conn.execute(
            UPSERT_REMINDER,
            (
                PREFERENCES_NAMESPACE,
                KEY_REMINDER_ENABLED,
                i64::from(config.enabled),
                KEY_REMINDER_HOUR,
                i64::from(config.hour),
                KEY_REMINDER_MINUTE,
                i64::from(config.minute),
            ),
        )
        .await?;

        debug!(
            enabled = config.enabled,
            hour = config.hour,
            minute = config.minute,
            "reminder preferences saved"
        );
        Ok(())
    }
}

fn bounded(key: &str, value: i64, max: u8) -> StoreResult<u8> {
    u8::try_from(value)
        .ok()
        .filter(|v| *v <= max)
        .ok_or_else(|| StoreError::InvalidValue {
            key: key.to_string(),
            value,
        })
}
