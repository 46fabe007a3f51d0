use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status every message starts in until staff pick it up
pub const STATUS_NEW: &str = "new";

/// A message sent through the public contact form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl ContactMessage {
    pub fn generate_id() -> String {
        format!("contact::{}", Uuid::new_v4())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    #[error("{0}")]
    Validation(String),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl ContactError {
    pub fn kind(&self) -> &'static str {
        match self {
            ContactError::Validation(_) => "validation",
            ContactError::Unavailable(_) => "unavailable",
        }
    }
}
