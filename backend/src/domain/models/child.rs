use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AgeGroup;

/// Domain model representing a child profile.
/// A child belongs to exactly one parent and only that parent may read or change it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Child {
    pub id: String,
    pub parent_id: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub age_group: AgeGroup,
    pub medical_notes: Option<String>,
    pub emergency_contact_name: String,
    pub emergency_contact_phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Child {
    pub fn generate_id() -> String {
        format!("child::{}", Uuid::new_v4())
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_owned_by(&self, parent_id: &str) -> bool {
        self.parent_id == parent_id
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ChildError {
    #[error("Child not found")]
    NotFound,
    #[error("{0}")]
    Validation(String),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl ChildError {
    pub fn kind(&self) -> &'static str {
        match self {
            ChildError::NotFound => "not_found",
            ChildError::Validation(_) => "validation",
            ChildError::Unavailable(_) => "unavailable",
        }
    }
}
