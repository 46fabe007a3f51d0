use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::RegistrationStatus;

/// A child's seat in a match. At most one confirmed registration exists per (match, child).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub id: String,
    pub match_id: String,
    pub child_id: String,
    pub parent_id: String,
    pub status: RegistrationStatus,
    pub created_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Registration {
    pub fn generate_id() -> String {
        format!("registration::{}", Uuid::new_v4())
    }

    pub fn confirmed(match_id: &str, child_id: &str, parent_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: Self::generate_id(),
            match_id: match_id.to_string(),
            child_id: child_id.to_string(),
            parent_id: parent_id.to_string(),
            status: RegistrationStatus::Confirmed,
            created_at: now,
            cancelled_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == RegistrationStatus::Confirmed
    }

    pub fn cancelled(&self, at: DateTime<Utc>) -> Self {
        Self {
            status: RegistrationStatus::Cancelled,
            cancelled_at: Some(at),
            ..self.clone()
        }
    }
}

/// Why an admission attempt was rejected. Nothing is written when any of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdmissionError {
    #[error("Match is not open for registration")]
    MatchUnavailable,
    #[error("Child does not belong to this parent")]
    NotAuthorized,
    #[error("Child's age group does not match the match age group")]
    AgeGroupMismatch,
    #[error("This child is already registered for this match")]
    DuplicateRegistration,
    #[error("Match is full")]
    MatchFull,
    #[error("Match is being updated concurrently, please retry")]
    Contention,
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl AdmissionError {
    pub fn kind(&self) -> &'static str {
        match self {
            AdmissionError::MatchUnavailable => "match_unavailable",
            AdmissionError::NotAuthorized => "not_authorized",
            AdmissionError::AgeGroupMismatch => "age_group_mismatch",
            AdmissionError::DuplicateRegistration => "duplicate_registration",
            AdmissionError::MatchFull => "match_full",
            AdmissionError::Contention => "contention",
            AdmissionError::Unavailable(_) => "unavailable",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, AdmissionError::Contention)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CancellationError {
    #[error("Registration not found")]
    NotFound,
    #[error("Registration does not belong to this parent")]
    NotAuthorized,
    #[error("Registration is already cancelled")]
    AlreadyCancelled,
    #[error("Match is being updated concurrently, please retry")]
    Contention,
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl CancellationError {
    pub fn kind(&self) -> &'static str {
        match self {
            CancellationError::NotFound => "not_found",
            CancellationError::NotAuthorized => "not_authorized",
            CancellationError::AlreadyCancelled => "already_cancelled",
            CancellationError::Contention => "contention",
            CancellationError::Unavailable(_) => "unavailable",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, CancellationError::Contention)
    }
}
