// Storage configuration
pub const DEFAULT_DATA_PATH: &str = "data";
pub const DATABASE_FILE: &str = "expenses.db";
pub const CHANGE_CHANNEL_CAPACITY: usize = 64;

// Logging
pub const DEFAULT_LOG_FILTER: &str = "info";

// Reminder preferences
pub const PREFERENCES_NAMESPACE: &str = "reminder_prefs";
pub const KEY_REMINDER_ENABLED: &str = "reminder_enabled";
pub const KEY_REMINDER_HOUR: &str = "reminder_hour";
pub const KEY_REMINDER_MINUTE: &str = "reminder_minute";

pub const DEFAULT_REMINDER_ENABLED: bool = true;
pub const DEFAULT_REMINDER_HOUR: u8 = 21; // 9 PM
pub const DEFAULT_REMINDER_MINUTE: u8 = 0;

// Notification content
pub const NOTIFICATION_TITLE: &str = "Did you log your expenses?";
pub const NOTIFICATION_BODY: &str = "Don't forget to write down what you spent today";
