use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Domain model for a parent account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parent {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Parent {
    pub fn generate_id() -> String {
        format!("parent::{}", Uuid::new_v4())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParentError {
    #[error("Parent not found")]
    NotFound,
    #[error("{0}")]
    Validation(String),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl ParentError {
    pub fn kind(&self) -> &'static str {
        match self {
            ParentError::NotFound => "not_found",
            ParentError::Validation(_) => "validation",
            ParentError::Unavailable(_) => "unavailable",
        }
    }
}
