//! Domain model for a scheduled match and its capacity record.
//!
//! `current_enrollment` and `status` only ever change through the transition
//! helpers below, each of which bumps `version`. Storage commits compare the
//! stored version against the one the caller observed, so a transition computed
//! from a stale read can never be written.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AgeGroup, MatchStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub age_group: AgeGroup,
    pub field_location: String,
    pub description: Option<String>,
    pub max_capacity: u32,
    pub current_enrollment: u32,
    pub status: MatchStatus,
    pub version: u64,
    pub created_at: DateTime<Utc>,
}

impl Match {
    pub fn generate_id() -> String {
        format!("match::{}", Uuid::new_v4())
    }

    pub fn remaining_slots(&self) -> u32 {
        self.max_capacity.saturating_sub(self.current_enrollment)
    }

    pub fn is_full(&self) -> bool {
        self.current_enrollment >= self.max_capacity
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == MatchStatus::Cancelled
    }

    /// A match can take registrations if it is not cancelled and has not been played yet.
    /// Capacity is checked separately.
    pub fn is_accepting_on(&self, today: NaiveDate) -> bool {
        !self.is_cancelled() && self.date >= today
    }

    /// Status implied by an enrollment count. Cancellation is sticky.
    pub fn status_for(&self, enrollment: u32) -> MatchStatus {
        if self.is_cancelled() {
            MatchStatus::Cancelled
        } else if enrollment >= self.max_capacity {
            MatchStatus::Full
        } else {
            MatchStatus::Open
        }
    }

    /// State after admitting one more child, or `None` when there is no slot left.
    pub fn after_admission(&self) -> Option<Match> {
        if self.is_full() {
            return None;
        }
        let enrollment = self.current_enrollment + 1;
        Some(Match {
            current_enrollment: enrollment,
            status: self.status_for(enrollment),
            version: self.version + 1,
            ..self.clone()
        })
    }

    /// State after releasing one slot. Saturates at zero.
    pub fn after_release(&self) -> Match {
        let enrollment = self.current_enrollment.saturating_sub(1);
        Match {
            current_enrollment: enrollment,
            status: self.status_for(enrollment),
            version: self.version + 1,
            ..self.clone()
        }
    }

    pub fn after_cancellation(&self) -> Match {
        Match {
            status: MatchStatus::Cancelled,
            version: self.version + 1,
            ..self.clone()
        }
    }
}

/// Storage-level filter for listing matches. `None` fields do not filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchFilter {
    pub age_group: Option<AgeGroup>,
    pub status: Option<MatchStatus>,
    pub date_from: Option<NaiveDate>,
}

impl MatchFilter {
    pub fn matches(&self, soccer_match: &Match) -> bool {
        self.age_group.map_or(true, |group| soccer_match.age_group == group)
            && self.status.map_or(true, |status| soccer_match.status == status)
            && self.date_from.map_or(true, |from| soccer_match.date >= from)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("Match not found")]
    NotFound,
    #[error("Match is already cancelled")]
    AlreadyCancelled,
    #[error("{0}")]
    Validation(String),
    #[error("Match is being updated concurrently, please retry")]
    Contention,
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl MatchError {
    pub fn kind(&self) -> &'static str {
        match self {
            MatchError::NotFound => "not_found",
            MatchError::AlreadyCancelled => "already_cancelled",
            MatchError::Validation(_) => "validation",
            MatchError::Contention => "contention",
            MatchError::Unavailable(_) => "unavailable",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, MatchError::Contention)
    }
}
