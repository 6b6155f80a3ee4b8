use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::*;
use crate::error::ReminderError;

/// Spending category. The preset names are what the form offers; any other
/// stored name is kept verbatim as `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    #[default]
    Food,
    Transport,
    Entertainment,
    Services,
    Other,
    Custom(String),
}

pub static PRESET_CATEGORIES: [Category; 5] = [
    Category::Food,
    Category::Transport,
    Category::Entertainment,
    Category::Services,
    Category::Other,
];

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Entertainment => "Entertainment",
            Category::Services => "Services",
            Category::Other => "Other",
            Category::Custom(name) => name,
        }
    }
}

impl From<&str> for Category {
    fn from(name: &str) -> Self {
        match name {
            "Food" => Category::Food,
            "Transport" => Category::Transport,
            "Entertainment" => Category::Entertainment,
            "Services" => Category::Services,
            "Other" => Category::Other,
            custom => Category::Custom(custom.to_string()),
        }
    }
}

impl From<String> for Category {
    fn from(name: String) -> Self {
        Category::from(name.as_str())
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.as_str().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted expense. `occurred_at` is milliseconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub amount: f64,
    pub description: String,
    pub category: Category,
    pub occurred_at: i64,
}

/// An expense that has not been stored yet; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    pub amount: f64,
    pub description: String,
    pub category: Category,
    pub occurred_at: i64,
}

/// Unsaved form state held by the coordinator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub amount: String,
    pub description: String,
    pub category: Category,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderConfig {
    pub enabled: bool,
    pub hour: u8,
    pub minute: u8,
}

impl ReminderConfig {
    pub fn new(enabled: bool, hour: u8, minute: u8) -> Result<Self, ReminderError> {
        if hour > 23 || minute > 59 {
            return Err(ReminderError::InvalidTime { hour, minute });
        }
        Ok(Self {
            enabled,
            hour,
            minute,
        })
    }
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: DEFAULT_REMINDER_ENABLED,
            hour: DEFAULT_REMINDER_HOUR,
            minute: DEFAULT_REMINDER_MINUTE,
        }
    }
}
